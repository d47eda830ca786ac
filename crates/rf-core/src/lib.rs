//! rf-core: Shared types for RaffleForge
//!
//! This crate provides the foundational types used across all RaffleForge crates.

mod error;
mod participant;

pub use error::*;
pub use participant::*;
