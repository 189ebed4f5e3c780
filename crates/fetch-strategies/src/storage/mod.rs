//! # Storage Module
//!
//! Deferred wrappers around caller-supplied cache and network operations.

pub mod function;

pub use function::{Continuation, StorageFunction, WriteBackFunction};
