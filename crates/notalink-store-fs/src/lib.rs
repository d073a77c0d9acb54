//! Filesystem backend for the NotaLink note repository.
//!
//! Notes are stored one JSON file per note, sharded by creation month. All
//! blocking filesystem work runs on tokio's blocking pool so the async runtime
//! is never stalled.

mod encode;
mod layout;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FsStore;
