//! Reproducible generation calls for NotaLink.
//!
//! Every generation request is reduced to a deterministic [`Fingerprint`]
//! over the resolved prompt text, the request variables and the sampling
//! parameters. Each call is appended to a per-fingerprint JSONL trace so
//! identical requests can be recognised and their outcomes compared.
//!
//! The generation itself is delegated to an [`Engine`]; the bundled
//! [`ExtractiveEngine`] is a deterministic stand-in.

pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod generate;
pub mod template;
pub mod trace;

pub use engine::{Engine, ExtractiveEngine, Generation};
pub use error::{Error, Result};
pub use fingerprint::{Fingerprint, ParamValue, fingerprint};
pub use generate::{GenerateRequest, GenerateResponse, Orchestrator, TokenUsage};
pub use template::{TemplateDir, TemplateSource};
pub use trace::{TraceLog, TraceRecord};
