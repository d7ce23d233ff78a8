//! Analysis modules.
//!
//! Combines readings from several providers into a single answer.

pub mod aggregator;

pub use aggregator::*;
