//! # keel-cli
//!
//! Command-line interface for Keel.
//!
//! ## Commands
//!
//! - `keel config` - Show the resolved configuration (keys redacted)
//! - `keel compiler` - Print compiler settings as solc standard-JSON
//! - `keel profiles` - List network profiles and credential status
//! - `keel resolve <profile>` - Check a profile is ready to deploy
//! - `keel doctor` - Audit the configuration

pub mod commands;

pub use commands::Cli;
