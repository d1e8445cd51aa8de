//! Lines spoken by the game-master, keyed by trigger.

use snake_overseer_core::{
    Archetype, Cue, DecoyReason, EscalationLevel, SpeedCause, TerminationCause, TriggerCategory,
};

/// Primary pool for `cue`.
pub(crate) fn primary(cue: &Cue) -> &'static [&'static str] {
    match *cue {
        Cue::SessionStarted {
            completed_sessions: 0,
            ..
        } => &[
            "A new session. I have no idea who you are yet.",
            "New session, new subject. Let's see what you do.",
        ],
        Cue::SessionStarted { archetype, .. } => returning(archetype),
        Cue::SessionEnded { cause } => ended(cause),
        Cue::Escalated { level } => escalated(level),
        Cue::DecoyConsumed => &[
            "That one was fake. Obviously.",
            "Delicious, wasn't it? No? Right, it wasn't real.",
            "You fell for it.",
        ],
        Cue::SpeedChanged { cause } => match cause {
            SpeedCause::ComfortCreep => &[
                "You look comfortable. Let's fix that.",
                "A little faster. You won't notice.",
            ],
            SpeedCause::Surge => &["Enjoy the sugar rush.", "Fed and faster."],
            SpeedCause::Fluctuation => &[
                "Is the floor moving or is it you?",
                "Speed is more of a suggestion now.",
            ],
        },
        Cue::ObstacleSpawned => &[
            "Was that wall always there?",
            "Construction work in progress.",
        ],
        Cue::DecoySpawned { reason } => match reason {
            DecoyReason::Idle | DecoyReason::Hostile => {
                &["Look, food.", "Something shiny just appeared."]
            }
            DecoyReason::Consumption => &["Still hungry?", "Here, have another."],
            DecoyReason::Comfort => &[
                "You seem bored. Have a snack.",
                "Playing it safe? Try this one.",
            ],
            DecoyReason::Reappearance => &["Miss me?", "Back again."],
        },
        Cue::Ambient { archetype } => ambient(archetype),
    }
}

/// Fallback pool used when the primary pick would repeat the last message.
pub(crate) fn alternate(category: TriggerCategory) -> &'static [&'static str] {
    match category {
        TriggerCategory::SessionStart => &[
            "Another new session. I remember everything.",
            "New session. Same snake, same mistakes?",
        ],
        TriggerCategory::SessionEnd => &["And that's that.", "Noted. Filed. Judged."],
        TriggerCategory::EscalationChange => &[
            "Turning things up.",
            "You made me do this.",
        ],
        TriggerCategory::DecoyConsumed => &["Gotcha.", "Fooled again."],
        TriggerCategory::SpeedChange => &["Faster.", "Keep up."],
        TriggerCategory::ObstacleSpawn => &["Mind the gap.", "New furniture."],
        TriggerCategory::DecoySpawn => &["Another one.", "Choose wisely."],
        TriggerCategory::AmbientTaunt => &["Still here.", "I'm watching."],
    }
}

fn returning(archetype: Archetype) -> &'static [&'static str] {
    match archetype {
        Archetype::Cautious => &[
            "Back again. Still playing it safe?",
            "Welcome back, careful one.",
        ],
        Archetype::WallHugger => &[
            "The walls missed you.",
            "Back to hug the edges?",
        ],
        Archetype::SpiralAddict => &[
            "Round and round we go.",
            "Let me guess: clockwise again?",
        ],
        Archetype::Improving => &[
            "You're getting better. I don't like it.",
            "Someone has been practising.",
        ],
        Archetype::Greedy => &[
            "Hungry as ever, I see.",
            "Try not to choke this time.",
        ],
        Archetype::Erratic => &[
            "Ah, the unpredictable one. Or just slow?",
            "Take your time. Not too much though.",
        ],
        Archetype::Predictable => &[
            "I already know your next move.",
            "Same routine as last time?",
        ],
    }
}

fn ended(cause: TerminationCause) -> &'static [&'static str] {
    match cause {
        TerminationCause::WallCollision => &[
            "The wall wins again.",
            "Walls: 1. You: 0.",
        ],
        TerminationCause::SelfCollision => &[
            "Eaten by your own tail.",
            "You were your own worst enemy.",
        ],
        TerminationCause::ObstacleCollision => &[
            "Oops. That wasn't there before.",
            "Should have watched where I was building.",
        ],
        TerminationCause::ManualReset => &[
            "Giving up already?",
            "Reset. Running away fixes nothing.",
        ],
        TerminationCause::Victory => &[
            "Fine. You win. This time.",
            "Enjoy it. It won't happen again.",
        ],
    }
}

fn escalated(level: EscalationLevel) -> &'static [&'static str] {
    match level {
        EscalationLevel::Observation => &["Just watching."],
        EscalationLevel::SubtleInterference => &[
            "Let's make this interesting.",
            "Did you feel that? No? Good.",
        ],
        EscalationLevel::ActiveManipulation => &[
            "No more subtlety.",
            "Now I'm actually trying.",
        ],
        EscalationLevel::HostileTakeover => &[
            "This board is mine now.",
            "Hostile takeover complete.",
        ],
    }
}

fn ambient(archetype: Archetype) -> &'static [&'static str] {
    match archetype {
        Archetype::Cautious => &["So careful. So boring.", "Any time now."],
        Archetype::WallHugger => &[
            "The middle of the board won't bite.",
            "Those walls must be very cosy.",
        ],
        Archetype::SpiralAddict => &["Dizzy yet?", "Another lap?"],
        Archetype::Improving => &["Don't get cocky.", "Impressive. Almost."],
        Archetype::Greedy => &["Slow down, you'll choke.", "Always more, isn't it?"],
        Archetype::Erratic => &["Was that on purpose?", "Reflexes of a houseplant."],
        Archetype::Predictable => &["Saw that coming.", "Left, up, right. Yawn."],
    }
}
