//! Core hyphae growth engine library.
//!
//! Main components:
//! - [`node`] — node records and the append-only node store.
//! - [`grid`] — uniform spatial grid for proximity queries.
//! - [`engine`] — the random branching growth loop.
//! - [`render`] — the renderer boundary trait.
//! - [`config`] — global configuration for the growth algorithm.
//! - [`types`] — shared type aliases and IDs.

pub mod config;
pub mod engine;
pub mod grid;
pub mod node;
pub mod render;
pub mod types;
