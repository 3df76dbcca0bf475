//! Derived, read-only views over the task collection.

pub mod view;
