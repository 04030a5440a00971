//! FSM unit tests

use deployctl::controller::fsm::{AttemptEvent, AttemptFsm, AttemptState};

#[test]
fn test_fsm_initial_state() {
    let fsm = AttemptFsm::new();
    assert_eq!(fsm.state(), &AttemptState::Idle);
    assert!(fsm.error().is_none());
    assert!(!fsm.state().is_terminal());
    assert!(!fsm.state().is_in_flight());
}

#[test]
fn test_fsm_sync_flow() {
    let mut fsm = AttemptFsm::new();

    fsm.process(AttemptEvent::Submit).unwrap();
    assert!(fsm.state().is_in_flight());

    // Submitting -> Complete, no polling in between
    fsm.process(AttemptEvent::Completed).unwrap();
    assert_eq!(fsm.state(), &AttemptState::Complete);
}

#[test]
fn test_fsm_submit_preempts_polling() {
    let mut fsm = AttemptFsm::new();

    fsm.process(AttemptEvent::Submit).unwrap();
    fsm.process(AttemptEvent::Accepted).unwrap();
    assert_eq!(fsm.state(), &AttemptState::Polling);

    fsm.process(AttemptEvent::Submit).unwrap();
    assert_eq!(fsm.state(), &AttemptState::Submitting);
}

#[test]
fn test_fsm_reset_only_clears_finished_attempts() {
    let mut fsm = AttemptFsm::new();

    fsm.process(AttemptEvent::Submit).unwrap();
    fsm.process(AttemptEvent::Accepted).unwrap();
    fsm.process(AttemptEvent::Reset).unwrap();
    assert_eq!(fsm.state(), &AttemptState::Polling);

    fsm.process(AttemptEvent::Completed).unwrap();
    fsm.process(AttemptEvent::Reset).unwrap();
    assert_eq!(fsm.state(), &AttemptState::Idle);

    fsm.process(AttemptEvent::Submit).unwrap();
    fsm.process(AttemptEvent::Failed("timed out".to_string())).unwrap();
    fsm.process(AttemptEvent::Reset).unwrap();
    assert_eq!(fsm.state(), &AttemptState::Idle);
    assert!(fsm.error().is_none());
}

#[test]
fn test_fsm_invalid_transition() {
    let mut fsm = AttemptFsm::new();

    // Nothing to accept before a submission
    assert!(fsm.process(AttemptEvent::Accepted).is_err());
    assert_eq!(fsm.state(), &AttemptState::Idle);

    fsm.process(AttemptEvent::Submit).unwrap();
    fsm.process(AttemptEvent::Completed).unwrap();

    // A finished attempt cannot complete twice
    assert!(fsm.process(AttemptEvent::Completed).is_err());
    assert!(fsm.process(AttemptEvent::Failed("late".to_string())).is_err());
}
