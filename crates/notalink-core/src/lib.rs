//! Core types and trait definitions for the NotaLink note repository.
//!
//! This crate is deliberately free of filesystem and HTTP dependencies.
//! Storage backends and the API layer depend on it; it performs no I/O.

pub mod error;
pub mod id;
pub mod note;
pub mod store;

pub use error::{Error, Result};
pub use id::NoteId;
