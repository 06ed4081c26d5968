//! jira-tui - Terminal issue browser for Jira
//!
//! This library crate exposes internal modules for integration testing.

pub mod config;
pub mod data;
pub mod editing;
pub mod jira;
pub mod tui;
pub mod util;
