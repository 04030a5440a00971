//! deployctl library
//!
//! Builds deploy requests from form fields, submits them to the deploy
//! service and supervises the background poll for their results.

pub mod app;
pub mod config;
pub mod controller;
pub mod errors;
pub mod filesys;
pub mod form;
pub mod http;
pub mod logs;
pub mod models;
pub mod present;
pub mod utils;
pub mod workers;
