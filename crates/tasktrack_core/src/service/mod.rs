//! Use-case layer between a presentation front end and the core.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - Services hold no task state of their own; views are recomputed.

pub mod board;
