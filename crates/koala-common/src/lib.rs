//! Common utilities for the Koala selector engine.
//!
//! This crate provides shared infrastructure used by all engine components:
//! - **Warning System** - deduplicated warnings routed through the `log` facade

pub mod warning;
