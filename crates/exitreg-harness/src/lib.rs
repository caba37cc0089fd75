//! Scenario tooling for exitreg.
//!
//! This crate provides:
//! - Scenarios: JSON descriptions of handlers, their behavior, and the
//!   expected drain order and outcome
//! - Runner: executes a scenario through a fresh registry and reports
//! - Demo: the canonical four-handler example run
//! - Structured logging: JSONL records of every drain step

#![forbid(unsafe_code)]

pub mod demo;
pub mod error;
pub mod runner;
pub mod scenario;
pub mod structured_log;

pub use error::HarnessError;
pub use runner::{ScenarioReport, ScenarioRunner};
pub use scenario::{Behavior, DrainOutcome, HandlerSpec, Scenario, ScenarioSet};
