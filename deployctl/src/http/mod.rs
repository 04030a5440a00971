//! HTTP transport for the deploy service

pub mod client;
pub mod deployments;
