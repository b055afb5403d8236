//! Gable Core
//!
//! This crate contains shared utilities for the Gable engine.

pub mod alloc;
pub mod logging;
