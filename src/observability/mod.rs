//! Tracing-based observability.
//!
//! The crate emits structured `tracing` events and spans on store operations,
//! feed dispatch, and the ranking flows. This module wires up the subscriber
//! that surfaces them.
//!
//! # Configuration
//!
//! Trace level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` config option
//! 3. Default: `"info"`
//!
//! # Usage
//!
//! Initialize tracing early, before touching the store:
//!
//! ```rust
//! use reelrank::observability::init_tracing;
//! use reelrank::Config;
//!
//! let config = Config::default();
//! init_tracing(&config);
//!
//! tracing::debug!("core initialized");
//! ```
//!
//! # Modules
//!
//! - [`init`]: Tracing initialization and subscriber setup

mod init;

pub use init::init_tracing;
