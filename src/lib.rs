//! Host runtime for the content board.
//!
//! The `canvas` crate owns interaction and layout; this crate owns everything
//! that talks to the outside world: the content API, background ingestion and
//! analysis, and board persistence.

pub mod api;
pub mod config;
pub mod services;
pub mod state;
