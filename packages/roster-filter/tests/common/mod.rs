//! Common test utilities for roster-filter
//!
//! Shared fixtures, a call-recording store wrapper and assertions for the
//! integration tests.

#![allow(dead_code)]

mod assertions;
mod fixtures;
mod recording;

pub use assertions::*;
pub use fixtures::*;
pub use recording::*;
