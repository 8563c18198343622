//! git-opener library crate.
//!
//! This library provides the core functionality for git-opener, including:
//! - The filterable project picker
//! - tmux session provisioning
//! - Project discovery and configuration
//! - Terminal UI components

pub mod app;
pub mod config;
pub mod event_loop;
pub mod logging;
pub mod picker;
pub mod projects;
pub mod provision;
pub mod terminal;
pub mod tmux;
pub mod ui;
