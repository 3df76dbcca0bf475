//! Repository layer: the in-memory task collection and its write contract.
//!
//! # Invariants
//! - Writes validate input before touching the collection.
//! - Every successful write is persisted before returning.
//! - A failed persist restores the pre-operation collection.

pub mod task_repo;
