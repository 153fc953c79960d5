#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

//! stepchain: a chain-of-thought CLI agent.
//!
//! The model works through an explicit step protocol (START, PLAN, TOOL,
//! OBSERVE, OUTPUT), one JSON step per request, calling local tools along
//! the way. See [`agent`] for the loop, [`tools`] for the toolset and
//! [`providers`] for the chat backend.

pub mod agent;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod providers;
pub mod tools;
pub mod ui;

pub use config::Config;
pub use error::{Result, StepchainError};
