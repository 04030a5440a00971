//! Submission control flow

pub mod fsm;
pub mod session;
pub mod submission;
