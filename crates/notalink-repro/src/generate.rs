//! The generation orchestrator.
//!
//! Per call: validate → load template → invoke engine (timed) → fingerprint
//! → append trace → respond. Nothing is persisted across calls except the
//! trace line.

use std::{collections::BTreeMap, time::Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  Error, Result,
  engine::Engine,
  fingerprint::{Fingerprint, ParamValue, fingerprint},
  template::TemplateSource,
  trace::{TraceLog, TraceRecord},
};

// ─── Request / response ──────────────────────────────────────────────────────

fn default_prompt_id() -> String { "summarization".to_owned() }
fn default_max_tokens() -> u32 { 256 }
fn default_model() -> String { "dummy".to_owned() }

/// A generation request as accepted at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
  #[serde(default = "default_prompt_id")]
  pub prompt_id:   String,
  pub variables:   BTreeMap<String, String>,
  #[serde(default)]
  pub temperature: f64,
  #[serde(default)]
  pub seed:        i64,
  #[serde(default = "default_max_tokens")]
  pub max_tokens:  u32,
  #[serde(default = "default_model")]
  pub model:       String,
}

impl GenerateRequest {
  /// A request for the default prompt with default sampling parameters.
  pub fn new(variables: BTreeMap<String, String>) -> Self {
    Self {
      prompt_id: default_prompt_id(),
      variables,
      temperature: 0.0,
      seed: 0,
      max_tokens: default_max_tokens(),
      model: default_model(),
    }
  }

  pub fn validate(&self) -> Result<()> {
    if !self.temperature.is_finite() || self.temperature < 0.0 {
      return Err(Error::InvalidRequest(format!(
        "temperature must be a finite number >= 0, got {}",
        self.temperature
      )));
    }
    if self.max_tokens == 0 {
      return Err(Error::InvalidRequest("max_tokens must be at least 1".into()));
    }
    Ok(())
  }

  /// Sampling parameters that take part in the fingerprint. `prompt_id` is
  /// not included; only the resolved template text counts.
  pub fn params(&self) -> [(&'static str, ParamValue); 4] {
    [
      ("temperature", self.temperature.into()),
      ("seed", self.seed.into()),
      ("max_tokens", self.max_tokens.into()),
      ("model", self.model.as_str().into()),
    ]
  }
}

/// Token counts reported by an engine.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct TokenUsage {
  pub prompt:     u64,
  pub completion: u64,
  pub total:      u64,
}

impl TokenUsage {
  pub fn new(prompt: u64, completion: u64) -> Self {
    Self { prompt, completion, total: prompt + completion }
  }
}

/// Result envelope of one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
  pub text:               String,
  pub usage:              TokenUsage,
  /// Equal to `prompt_fingerprint`; names the trace file.
  pub trace_id:           Fingerprint,
  pub elapsed_ms:         u64,
  pub prompt_fingerprint: Fingerprint,
  /// Set when the result was generated but could not be traced.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub trace_error:        Option<String>,
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

/// Runs generation calls against an engine, recording each one in a trace
/// log keyed by the request fingerprint.
#[derive(Debug, Clone)]
pub struct Orchestrator<E, T> {
  engine:    E,
  templates: T,
  traces:    TraceLog,
}

impl<E: Engine, T: TemplateSource> Orchestrator<E, T> {
  pub fn new(engine: E, templates: T, traces: TraceLog) -> Self {
    Self { engine, templates, traces }
  }

  pub fn traces(&self) -> &TraceLog { &self.traces }

  /// Run one generation call.
  ///
  /// Fails before the engine runs on an invalid request or unknown template;
  /// no trace is written in that case. A trace-log failure after a successful
  /// generation does not discard the result: it is logged and reported in
  /// [`GenerateResponse::trace_error`].
  pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
    request.validate()?;
    let template = self.templates.load(&request.prompt_id).await?;

    let started = Instant::now();
    let generation = self
      .engine
      .generate(&request, &template)
      .await
      .map_err(|e| Error::Engine(Box::new(e)))?;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let params = request.params();
    let fingerprint = fingerprint(
      &template,
      &request.variables,
      params.iter().map(|(k, v)| (*k, v)),
    )?;

    let record = TraceRecord {
      req:         request,
      out:         generation.text.clone(),
      usage:       generation.usage,
      elapsed_ms,
      recorded_at: Utc::now(),
    };
    let trace_error = match self.traces.append(&fingerprint, &record).await {
      Ok(()) => None,
      Err(e) => {
        warn!(%fingerprint, error = %e, "generation succeeded but trace append failed");
        Some(e.to_string())
      }
    };

    info!(
      %fingerprint,
      prompt_id = %record.req.prompt_id,
      elapsed_ms,
      tokens = generation.usage.total,
      "generation complete"
    );

    Ok(GenerateResponse {
      text: generation.text,
      usage: generation.usage,
      trace_id: fingerprint.clone(),
      elapsed_ms,
      prompt_fingerprint: fingerprint,
      trace_error,
    })
  }
}
