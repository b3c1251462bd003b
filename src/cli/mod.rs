//! CLI module for fiszki - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for reviewing, seeding
//! and generating cards.

pub mod commands;
pub mod review;

pub use commands::Cli;
