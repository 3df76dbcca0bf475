//! Persistence adapter for the task collection.
//!
//! # Responsibility
//! - Load/save the whole collection as one serialized blob.
//! - Hide key-value storage details from the repository.
//!
//! # Invariants
//! - `load` never fails its caller; corrupt data degrades to empty.
//! - `save` either replaces the whole blob or leaves it untouched.

pub mod task_store;
