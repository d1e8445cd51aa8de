use std::time::Duration;

use snake_overseer_core::EscalationLevel;
use snake_overseer_system_escalation::Escalation;

#[test]
fn length_alone_advances_the_level() {
    let mut escalation = Escalation::default();
    assert_eq!(escalation.evaluate(Duration::ZERO, Duration::ZERO, 5), None);
    assert_eq!(
        escalation.evaluate(Duration::from_millis(16), Duration::from_millis(16), 6),
        Some(EscalationLevel::SubtleInterference)
    );
    assert_eq!(escalation.state().entered_at(), Duration::from_millis(16));
}

#[test]
fn advances_at_most_one_level_per_evaluation() {
    let mut escalation = Escalation::default();
    let late = Duration::from_secs(45);

    assert_eq!(
        escalation.evaluate(late, late, 30),
        Some(EscalationLevel::SubtleInterference)
    );
    assert_eq!(
        escalation.evaluate(late, late, 30),
        Some(EscalationLevel::ActiveManipulation)
    );
    assert_eq!(
        escalation.evaluate(late, late, 30),
        Some(EscalationLevel::HostileTakeover)
    );
    assert_eq!(escalation.evaluate(late, late, 30), None);
    assert_eq!(escalation.transitions(), 3);
}

#[test]
fn level_never_decreases_within_a_session() {
    let mut escalation = Escalation::default();
    let mut highest = EscalationLevel::Observation;

    // Length drops after a shrink effect; time keeps moving.
    let samples = [(2, 8), (6, 3), (12, 12), (15, 2), (21, 1), (25, 4), (31, 1)];
    for (seconds, length) in samples {
        let now = Duration::from_secs(seconds);
        let _ = escalation.evaluate(now, now, length);
        assert!(escalation.level() >= highest);
        highest = escalation.level();
    }
    assert_eq!(highest, EscalationLevel::HostileTakeover);
}

#[test]
fn reset_returns_to_observation() {
    let mut escalation = Escalation::default();
    let late = Duration::from_secs(40);
    for _ in 0..3 {
        let _ = escalation.evaluate(late, late, 20);
    }
    assert_eq!(escalation.level(), EscalationLevel::HostileTakeover);

    escalation.reset(Duration::from_secs(41));
    assert_eq!(escalation.level(), EscalationLevel::Observation);
    assert_eq!(escalation.transitions(), 0);
    assert_eq!(escalation.state().entered_at(), Duration::from_secs(41));
}
