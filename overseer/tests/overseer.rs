use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use snake_overseer::{GameMaster, OverseerConfig};
use snake_overseer_core::{
    Archetype, BoardDimensions, BoardState, CellCoord, Direction, EscalationLevel,
    InterferenceBundle, MoveInput, OverseerSnapshot, RandomSource, SeededRandom,
    TerminationCause, TriggerCategory,
};

const BOARD: BoardDimensions = BoardDimensions::new(20, 20);

struct Fixed(f32);

impl RandomSource for Fixed {
    fn next_unit(&mut self) -> f32 {
        self.0
    }
}

fn board(head: CellCoord, length: u32, consumed: u32) -> BoardState {
    BoardState {
        dimensions: BOARD,
        head,
        body: vec![head],
        objective: CellCoord::new(18, 18),
        length,
        objectives_consumed: consumed,
        win_reached: false,
    }
}

fn step(direction: Direction, head: CellCoord, length: u32) -> MoveInput {
    MoveInput {
        direction,
        head,
        length,
        objective: CellCoord::new(18, 18),
        board: BOARD,
    }
}

#[test]
fn first_session_is_cautious_and_announced() {
    let mut master = GameMaster::new(OverseerConfig::default(), SeededRandom::new(7));
    let snapshot = master.on_session_start(Duration::ZERO);

    assert_eq!(snapshot.archetype, Archetype::Cautious);
    assert_eq!(snapshot.escalation_level, EscalationLevel::Observation);
    assert_eq!(snapshot.commentary.len(), 1);
    assert_eq!(snapshot.commentary[0].source, TriggerCategory::SessionStart);
    assert!(snapshot.commentary[0]
        .message
        .to_lowercase()
        .contains("new session"));
}

#[test]
fn escalation_resets_at_every_session_start() {
    let mut master = GameMaster::new(OverseerConfig::default(), Fixed(0.9));
    let _ = master.on_session_start(Duration::ZERO);

    for second in 1..=35u64 {
        let now = Duration::from_secs(second);
        let _ = master.on_tick(now, &board(CellCoord::new(10, 10), 3, 0));
    }
    assert_eq!(master.escalation_level(), EscalationLevel::HostileTakeover);

    let summary = master
        .on_session_end(Duration::from_secs(36), 4, TerminationCause::WallCollision)
        .expect("session was active");
    assert_eq!(summary.record.escalation_events, 3);
    assert_eq!(summary.snapshot.escalation_level, EscalationLevel::Observation);
    assert_eq!(summary.snapshot.interference, InterferenceBundle::default());
    assert!(summary.post_mortem.escalation_note.is_some());

    let snapshot = master.on_session_start(Duration::from_secs(40));
    assert_eq!(snapshot.escalation_level, EscalationLevel::Observation);
}

#[test]
fn decoy_contact_is_commented_once() {
    // Comfortable, risk-free play forces a comfort decoy on the first tick.
    let mut master = GameMaster::new(OverseerConfig::default(), Fixed(0.5));
    let _ = master.on_session_start(Duration::ZERO);
    let _ = master.on_move(
        Duration::from_millis(10),
        step(Direction::Right, CellCoord::new(10, 10), 3),
    );

    // The fixed source always samples (10, 10), so keep the head clear of it.
    let snapshot = master.on_tick(
        Duration::from_millis(20),
        &board(CellCoord::new(4, 10), 3, 0),
    );
    let decoy = snapshot.interference.decoys[0];

    let hit = master.on_tick(Duration::from_millis(40), &board(decoy.position, 3, 0));
    let reactions: Vec<_> = hit
        .commentary
        .iter()
        .filter(|event| event.source == TriggerCategory::DecoyConsumed)
        .collect();
    assert_eq!(reactions.len(), 1);
    assert!(hit.interference.decoys.is_empty());

    let again = master.on_tick(Duration::from_millis(60), &board(decoy.position, 3, 0));
    assert!(again
        .commentary
        .iter()
        .all(|event| event.source != TriggerCategory::DecoyConsumed));
}

#[test]
fn moves_outside_a_session_are_ignored() {
    let mut master = GameMaster::default();
    assert!(master
        .on_move(Duration::ZERO, step(Direction::Up, CellCoord::new(3, 3), 1))
        .is_none());
    assert!(master
        .on_session_end(Duration::ZERO, 0, TerminationCause::ManualReset)
        .is_none());

    let idle = master.on_tick(Duration::from_secs(1), &board(CellCoord::new(3, 3), 1, 0));
    assert_eq!(idle, OverseerSnapshot::default());

    let _ = master.on_session_start(Duration::ZERO);
    let off_board = step(Direction::Up, CellCoord::new(40, 3), 1);
    assert!(master.on_move(Duration::from_millis(5), off_board).is_none());
}

#[test]
fn spiral_sessions_are_counted_once() {
    let mut master = GameMaster::default();
    let _ = master.on_session_start(Duration::ZERO);
    let cycle = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];
    for index in 0..16u64 {
        let direction = cycle[(index % 4) as usize];
        let _ = master.on_move(
            Duration::from_millis(100 * (index + 1)),
            step(direction, CellCoord::new(8, 8), 4),
        );
    }
    assert_eq!(master.archive().cyclic_detections, 1);
}

#[test]
fn restored_history_shapes_the_next_session() {
    let mut first = GameMaster::default();
    for round in 0..3u64 {
        let start = Duration::from_secs(round * 100);
        let _ = first.on_session_start(start);
        let _ = first.on_move(
            start + Duration::from_millis(500),
            step(Direction::Right, CellCoord::new(5, 0), 4),
        );
        let _ = first.on_move(
            start + Duration::from_secs(5),
            step(Direction::Right, CellCoord::new(10, 0), 4),
        );
        let _ = first.on_session_end(
            start + Duration::from_secs(6),
            3,
            TerminationCause::WallCollision,
        );
    }

    let mut second = GameMaster::default();
    second.restore(first.archive());
    let snapshot = second.on_session_start(Duration::from_secs(1_000));
    assert_eq!(snapshot.archetype, Archetype::WallHugger);
    assert!(snapshot.commentary.iter().all(|event| !event.message.is_empty()));
}

#[test]
fn seeded_runs_replay_identically() {
    let first = replay(0xdead_beef);
    let second = replay(0xdead_beef);
    assert_eq!(first, second, "replay diverged between runs");
}

fn replay(seed: u64) -> u64 {
    let mut master = GameMaster::new(OverseerConfig::default(), SeededRandom::new(seed));
    let mut hasher = DefaultHasher::new();
    let mut consumed = 0;
    let mut head = CellCoord::new(1, 10);

    for session in 0..3u64 {
        let start = Duration::from_secs(session * 120);
        fingerprint(&master.on_session_start(start), &mut hasher);
        for tick in 1..=400u64 {
            let now = start + Duration::from_millis(tick * 100);
            let column = 1 + (tick % 18) as u32;
            head = CellCoord::new(column, head.row());
            let _ = master.on_move(now, step(Direction::Right, head, 3 + consumed));
            if tick % 25 == 0 {
                consumed += 1;
            }
            fingerprint(&master.on_tick(now, &board(head, 3 + consumed, consumed)), &mut hasher);
        }
        if let Some(summary) = master.on_session_end(
            start + Duration::from_secs(41),
            consumed,
            TerminationCause::SelfCollision,
        ) {
            fingerprint(&summary.snapshot, &mut hasher);
            summary.post_mortem.score_note.hash(&mut hasher);
        }
        consumed = 0;
    }
    hasher.finish()
}

fn fingerprint(snapshot: &OverseerSnapshot, hasher: &mut DefaultHasher) {
    snapshot.session.hash(hasher);
    snapshot.escalation_level.hash(hasher);
    snapshot.archetype.hash(hasher);
    snapshot
        .interference
        .velocity_multiplier
        .get()
        .to_bits()
        .hash(hasher);
    for decoy in &snapshot.interference.decoys {
        decoy.position.hash(hasher);
        decoy.reason.hash(hasher);
    }
    for obstacle in &snapshot.interference.obstacles {
        obstacle.position.hash(hasher);
    }
    for event in &snapshot.commentary {
        event.message.hash(hasher);
        event.priority.hash(hasher);
    }
}
