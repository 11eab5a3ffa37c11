//! bottlerun - Wine bottle component discovery and launch resolution
//!
//! Discovers the runners, runtimes and graphics layers installed for a
//! bottle manager, and turns a bottle's configuration into the environment
//! and command line that launch a program inside it.

pub mod catalog;
pub mod config;
pub mod connection;
pub mod discovery;
pub mod error;
pub mod events;
pub mod execution;
pub mod gamescope;
pub mod gpu;
pub mod host;
pub mod launch;
pub mod paths;
pub mod runtime;
pub mod sandbox;
pub mod steam;
pub mod umu;
pub mod version;
pub mod winepath;
