// lib.rs - reconvapt library root
// Menu-driven orchestration of external reconnaissance tools

pub mod aggregator;
pub mod catalog;
pub mod console;
pub mod error;
pub mod executor;
pub mod logging;
pub mod menu;
pub mod output;
pub mod progress;
pub mod resolver;
pub mod runner;
pub mod summarizer;
pub mod validator;

pub use error::{ReconError, Result};
