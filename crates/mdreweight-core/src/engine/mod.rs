//! # Engine Module
//!
//! The computational layer between the stateless [`core`](crate::core) models and the public
//! [`workflows`](crate::workflows). It validates run settings, evaluates the perturbation
//! energy of single frames, and turns energy series into Boltzmann weights.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Cutoff, Boltzmann constant, temperature and distance mode
//! - **Contribution Filters** ([`contribution`]) - Per-group atom predicates restricting which distances count
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Results** ([`result`]) - The immutable per-frame energy/weight/probability record
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation

pub mod config;
pub mod contribution;
pub mod error;
pub mod progress;
pub mod result;
pub(crate) mod tasks;
