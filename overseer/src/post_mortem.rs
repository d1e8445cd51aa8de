//! Post-session analysis.

use snake_overseer_core::{
    Archetype, EscalationLevel, MetricsSnapshot, PostMortem, SessionRecord, TerminationCause,
};

/// Relative margin within which a score counts as on par with the average.
const PAR_MARGIN: f32 = 0.1;

/// Builds the post-mortem for a session that just ended.
///
/// `metrics` must already include `record` in its rolling window.
pub(crate) fn analyse(
    record: &SessionRecord,
    peak: EscalationLevel,
    metrics: &MetricsSnapshot,
    archetype: Archetype,
) -> PostMortem {
    let cause = record.termination.unwrap_or(TerminationCause::ManualReset);

    PostMortem {
        cause_description: cause.describe().to_owned(),
        escalation_note: escalation_note(peak),
        score_note: score_note(record.final_score, metrics),
        recommendation: recommendation(cause, archetype),
    }
}

fn escalation_note(peak: EscalationLevel) -> Option<String> {
    if peak == EscalationLevel::Observation {
        return None;
    }
    Some(format!(
        "I reached {} (level {}) before the end.",
        peak.label(),
        peak.value()
    ))
}

fn score_note(score: u32, metrics: &MetricsSnapshot) -> String {
    let completed = metrics.completed_sessions;
    if completed <= 1 {
        return format!("First score on record: {score}.");
    }

    let total = metrics.average_score * completed as f32;
    let previous = ((total - score as f32) / (completed - 1) as f32).max(0.0);
    let score_f = score as f32;
    if score_f > previous * (1.0 + PAR_MARGIN) {
        format!("Score {score} beats your average of {previous:.1}.")
    } else if score_f < previous * (1.0 - PAR_MARGIN) {
        format!("Score {score} falls short of your average of {previous:.1}.")
    } else {
        format!("Score {score} is right on your average of {previous:.1}.")
    }
}

fn recommendation(cause: TerminationCause, archetype: Archetype) -> Option<String> {
    if cause == TerminationCause::Victory {
        return Some("Enjoy it while it lasts.".to_owned());
    }

    let line = match archetype {
        Archetype::Cautious => return None,
        Archetype::WallHugger => "Try the middle of the board. The edges are where I build.",
        Archetype::SpiralAddict => "Break the spiral. I can see it coming.",
        Archetype::Improving => "Keep it up. I will adapt.",
        Archetype::Greedy => "Slow down after each meal.",
        Archetype::Erratic => "React faster, or at least on purpose.",
        Archetype::Predictable => "Vary your routes.",
    };
    Some(line.to_owned())
}
