//! Pocker: a terminal dashboard for local Docker containers.
//!
//! The core keeps an in-memory registry of containers in sync with the engine
//! (event reconciliation, log tailing, stats polling) while the terminal UI
//! reads it. This library exposes the core modules for use by the binary and by tests.

pub mod app;
pub mod config;
pub mod docker;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod registry;
pub mod scheduler;
pub mod selection;
pub mod tasks;
pub mod view;
