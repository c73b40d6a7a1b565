//! Access to trajectory frames.
//!
//! Reading and decoding trajectory files is left to external crates. This module defines the
//! [`traits::Trajectory`] interface the reweighting driver consumes, and an in-memory
//! implementation for frames that are already loaded.

pub mod memory;
pub mod traits;
