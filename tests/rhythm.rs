// tests/rhythm.rs
use symbios_crawler::{
    CommitPolicy, RhythmArbiter, RhythmConfig, RhythmPhase, StepSide, TravelDirection,
};

use StepSide::{Left, Right};

#[test]
fn test_alternation_commits_forward_and_holds() {
    let mut arbiter = RhythmArbiter::new(RhythmConfig::default());

    let first = arbiter.step(Left, 0.0);
    assert_eq!(first.propulsion, None);
    assert_eq!(arbiter.phase(), RhythmPhase::DirectionPending);

    let second = arbiter.step(Right, 0.1);
    assert!(second.committed);
    assert_eq!(arbiter.state().direction, TravelDirection::Forward);
    assert_eq!(arbiter.phase(), RhythmPhase::DirectionLocked);

    for (i, side) in [Left, Right].into_iter().enumerate() {
        let outcome = arbiter.step(side, 0.2 + 0.1 * i as f64);
        assert!(!outcome.committed);
        assert!(!outcome.repeated);
        let request = outcome.propulsion.unwrap();
        assert_eq!(request.direction, TravelDirection::Forward);
        assert_eq!(request.power, 5.0);
    }
    assert_eq!(arbiter.state().direction, TravelDirection::Forward);
}

#[test]
fn test_right_then_left_commits_backward() {
    let mut arbiter = RhythmArbiter::new(RhythmConfig::default());

    arbiter.step(Right, 0.0);
    let outcome = arbiter.step(Left, 0.1);

    assert_eq!(arbiter.state().direction, TravelDirection::Backward);
    assert_eq!(
        outcome.propulsion.map(|r| r.direction),
        Some(TravelDirection::Backward)
    );
}

#[test]
fn test_repeated_foot_is_penalized_without_changing_direction() {
    let mut arbiter = RhythmArbiter::new(RhythmConfig::default());
    arbiter.step(Left, 0.0);
    arbiter.step(Right, 0.1);
    arbiter.step(Left, 0.2);

    let outcome = arbiter.step(Left, 0.3);

    assert!(outcome.repeated);
    assert!(!outcome.committed);
    let request = outcome.propulsion.unwrap();
    assert_eq!(request.direction, TravelDirection::Forward);
    assert!((request.power - 5.0 * 0.3).abs() < 1e-6);
    assert_eq!(arbiter.state().direction, TravelDirection::Forward);
}

#[test]
fn test_repeated_foot_from_idle_never_commits() {
    let mut arbiter = RhythmArbiter::new(RhythmConfig::default());

    arbiter.step(Left, 0.0);
    let outcome = arbiter.step(Left, 0.1);

    assert!(outcome.repeated);
    assert_eq!(outcome.propulsion, None);
    assert_eq!(arbiter.state().direction, TravelDirection::Undecided);
    assert_eq!(arbiter.phase(), RhythmPhase::DirectionPending);
    assert_eq!(arbiter.state().last_step_at, Some(0.1));
}

#[test]
fn test_timeout_forgets_stale_step() {
    let mut stale = RhythmArbiter::new(RhythmConfig::default());
    stale.step(Left, 0.0);
    let outcome = stale.step(Right, 1.0);

    let mut fresh = RhythmArbiter::new(RhythmConfig::default());
    let fresh_outcome = fresh.step(Right, 1.0);

    assert!(outcome.reset);
    assert!(!fresh_outcome.reset);
    assert_eq!(outcome.propulsion, fresh_outcome.propulsion);
    assert_eq!(outcome.committed, fresh_outcome.committed);
    assert_eq!(stale.state(), fresh.state());
    assert_eq!(stale.state().direction, TravelDirection::Undecided);
}

#[test]
fn test_timeout_releases_locked_direction() {
    let mut arbiter = RhythmArbiter::new(RhythmConfig::default());
    arbiter.step(Left, 0.0);
    arbiter.step(Right, 0.1);
    assert!(arbiter.is_active(0.25));

    assert!(!arbiter.is_active(0.5));
    assert!(arbiter.refresh(0.5));
    assert_eq!(arbiter.phase(), RhythmPhase::Idle);
    assert!(!arbiter.refresh(0.6));

    // A new alternation may now commit the other way.
    arbiter.step(Right, 1.0);
    arbiter.step(Left, 1.1);
    assert_eq!(arbiter.state().direction, TravelDirection::Backward);
}

#[test]
fn test_commit_on_first_step_policy() {
    let config = RhythmConfig {
        commit_policy: CommitPolicy::CommitOnFirstStep,
        ..RhythmConfig::default()
    };

    let mut forward = RhythmArbiter::new(config.clone());
    let outcome = forward.step(Right, 0.0);
    assert!(outcome.committed);
    assert_eq!(
        outcome.propulsion.map(|r| r.direction),
        Some(TravelDirection::Forward)
    );

    let mut backward = RhythmArbiter::new(config);
    let outcome = backward.step(Left, 0.0);
    assert_eq!(
        outcome.propulsion.map(|r| r.direction),
        Some(TravelDirection::Backward)
    );
}

#[test]
fn test_idle_arbiter_state() {
    let arbiter = RhythmArbiter::new(RhythmConfig::default());

    assert_eq!(arbiter.phase(), RhythmPhase::Idle);
    assert!(!arbiter.is_active(0.0));
    assert_eq!(arbiter.state().last_side, None);
    assert_eq!(TravelDirection::Undecided.sign(), 0.0);
}
