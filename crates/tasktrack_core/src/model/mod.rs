//! Task domain model.
//!
//! # Responsibility
//! - Define the single entity tracked by core and its input shapes.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard remove; ids are still never reused.

pub mod task;
