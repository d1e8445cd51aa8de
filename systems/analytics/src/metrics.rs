//! Individual play-style signals derived from recorded telemetry.

use std::collections::{HashMap, VecDeque};

use snake_overseer_core::{Direction, MoveRecord, RollingCounters, SessionRecord, TurnAngle};

/// Number of most recent directions inspected by the cycle detector.
pub const CYCLE_WINDOW: usize = 8;

const CLOCKWISE: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];
const COUNTERCLOCKWISE: [Direction; 4] = [
    Direction::Up,
    Direction::Left,
    Direction::Down,
    Direction::Right,
];

/// Share of alive time spent near the boundary.
///
/// Both totals are accumulated from timestamp deltas between consecutive
/// moves, so the ratio is zero until at least two moves were recorded.
#[must_use]
pub fn boundary_hugging_frequency(counters: &RollingCounters) -> f32 {
    if counters.alive_time.is_zero() {
        return 0.0;
    }
    let ratio = counters.near_boundary_time.as_secs_f64() / counters.alive_time.as_secs_f64();
    ratio.clamp(0.0, 1.0) as f32
}

/// Share of all recorded moves per direction, indexed by [`Direction::index`].
#[must_use]
pub fn directional_bias(counters: &RollingCounters) -> [f32; 4] {
    let total = counters.total_moves();
    if total == 0 {
        return [0.0; 4];
    }
    counters
        .direction_counts
        .map(|count| (count as f64 / total as f64) as f32)
}

/// Reports whether the last [`CYCLE_WINDOW`] directions trace a rotation of
/// the clockwise or counterclockwise compass cycle.
#[must_use]
pub fn detect_cycle(recent: &[Direction]) -> bool {
    if recent.len() < CYCLE_WINDOW {
        return false;
    }
    let tail = &recent[recent.len() - CYCLE_WINDOW..];

    [CLOCKWISE, COUNTERCLOCKWISE].iter().any(|cycle| {
        (0..cycle.len()).any(|offset| {
            tail.iter()
                .enumerate()
                .all(|(index, direction)| *direction == cycle[(index + offset) % cycle.len()])
        })
    })
}

/// Reports whether cyclic patterns showed up in more than `share` of all sessions.
#[must_use]
pub fn spiral_habit(cyclic_detections: u32, sessions_started: u32, share: f32) -> bool {
    sessions_started > 0 && cyclic_detections as f32 > share * sessions_started as f32
}

/// Mean of `max_length / survival_seconds` over the last `count` completed
/// sessions that lasted a positive amount of time.
#[must_use]
pub fn greed_ratio(sessions: &VecDeque<SessionRecord>, count: usize) -> f32 {
    let ratios: Vec<f64> = sessions
        .iter()
        .rev()
        .filter(|session| !session.survival().is_zero())
        .take(count)
        .map(|session| f64::from(session.max_length) / session.survival().as_secs_f64())
        .collect();

    mean(&ratios) as f32
}

/// Share of 3-move direction windows that occur again later in the combined
/// move sequence of the last `count` completed sessions.
#[must_use]
pub fn pattern_repetition(sessions: &VecDeque<SessionRecord>, count: usize) -> f32 {
    let skip = sessions.len().saturating_sub(count);
    let directions: Vec<Direction> = sessions
        .iter()
        .skip(skip)
        .flat_map(|session| session.moves.iter().map(|record| record.direction))
        .collect();

    if directions.len() < 3 {
        return 0.0;
    }

    let windows: Vec<&[Direction]> = directions.windows(3).collect();
    let mut last_seen: HashMap<&[Direction], usize> = HashMap::with_capacity(windows.len());
    for (index, window) in windows.iter().enumerate() {
        let _ = last_seen.insert(*window, index);
    }

    let recurring = windows
        .iter()
        .enumerate()
        .filter(|(index, window)| last_seen.get(*window).is_some_and(|last| last > index))
        .count();

    recurring as f32 / windows.len() as f32
}

/// Mean boundary distance of the provided moves divided by `reference`, in `[0, 1]`.
#[must_use]
pub fn comfort_zone(recent: &[&MoveRecord], reference: f32) -> f32 {
    if recent.is_empty() || reference <= 0.0 {
        return 0.0;
    }
    let distances: Vec<f64> = recent
        .iter()
        .map(|record| f64::from(record.boundary_distance))
        .collect();
    (mean(&distances) as f32 / reference).clamp(0.0, 1.0)
}

/// Share of the provided moves taken within `risk_distance` of an edge, or
/// near an edge while turning at least 90 degrees.
#[must_use]
pub fn risk_tolerance(recent: &[&MoveRecord], risk_distance: u32) -> f32 {
    if recent.is_empty() {
        return 0.0;
    }
    let risky = recent
        .iter()
        .filter(|record| {
            record.boundary_distance <= risk_distance
                || (record.near_boundary && record.turn_angle != TurnAngle::Straight)
        })
        .count();
    risky as f32 / recent.len() as f32
}

/// Mean reaction latency of the provided moves in milliseconds.
#[must_use]
pub fn average_reaction_latency_ms(recent: &[&MoveRecord]) -> f32 {
    let latencies: Vec<f64> = recent
        .iter()
        .map(|record| record.reaction_latency.as_secs_f64() * 1_000.0)
        .collect();
    mean(&latencies) as f32
}

/// Relative change of the last `span` final scores against the `span` before them.
///
/// Returns zero until both blocks are full, i.e. fewer than `2 * span`
/// completed sessions. The result is clamped to `[-1, 1]`.
#[must_use]
pub fn score_trend(sessions: &VecDeque<SessionRecord>, span: usize) -> f32 {
    if span == 0 || sessions.len() < span.saturating_mul(2) {
        return 0.0;
    }

    let scores: Vec<f64> = sessions
        .iter()
        .map(|session| f64::from(session.final_score))
        .collect();
    let split = scores.len() - span;
    let recent = mean(&scores[split..]);
    let previous = mean(&scores[split - span..split]);

    ((recent - previous) / previous.max(1.0)).clamp(-1.0, 1.0) as f32
}

/// Mean final score across the provided sessions.
#[must_use]
pub fn average_score(sessions: &VecDeque<SessionRecord>) -> f32 {
    let scores: Vec<f64> = sessions
        .iter()
        .map(|session| f64::from(session.final_score))
        .collect();
    mean(&scores) as f32
}

/// Share of the provided sessions that ended in a death.
#[must_use]
pub fn death_rate(sessions: &VecDeque<SessionRecord>) -> f32 {
    if sessions.is_empty() {
        return 0.0;
    }
    let deaths = sessions.iter().filter(|session| session.is_death()).count();
    deaths as f32 / sessions.len() as f32
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
