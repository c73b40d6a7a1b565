//! # Workflows Module
//!
//! High-level entry points that run a complete reweighting pass over a trajectory.
//!
//! ## Overview
//!
//! A workflow validates its inputs before the first frame is read, streams the frames through
//! the per-frame energy accumulator, and converts the resulting energy series into Boltzmann
//! weights. Any failure aborts the whole pass; no partial result is returned.
//!
//! ## Architecture
//!
//! - **Reweighting Workflow** ([`reweight`]) - Single-group (self-interaction) and two-group
//!   entry points, each with a variant that reports progress.

pub mod reweight;
