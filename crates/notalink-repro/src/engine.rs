//! Generation engines.
//!
//! The orchestrator only relies on the [`Engine`] contract: given a validated
//! request and the resolved template text, produce output text and token
//! usage. [`ExtractiveEngine`] is a deterministic stand-in that picks
//! sentences from the input.

use std::{convert::Infallible, future::Future, sync::LazyLock};

use rand::{SeedableRng, rngs::StdRng, seq::index};
use regex::Regex;

use crate::generate::{GenerateRequest, TokenUsage};

/// Output of a single engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
  pub text:  String,
  pub usage: TokenUsage,
}

/// A pluggable text generator.
pub trait Engine: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn generate<'a>(
    &'a self,
    request: &'a GenerateRequest,
    template: &'a str,
  ) -> impl Future<Output = Result<Generation, Self::Error>> + Send + 'a;
}

// ─── Extractive engine ───────────────────────────────────────────────────────

/// Sentence boundary: terminal punctuation followed by whitespace.
static SENTENCE_END: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence regex is valid"));

/// Number of sentences kept in a summary.
const PICKS: usize = 3;

/// Bullet-point "summary" made of up to three input sentences.
///
/// Reads `variables["text"]`, or all variable values joined by spaces when
/// there is no `text`. Inputs of three sentences or fewer are returned in
/// order; longer inputs are sampled with an RNG seeded from
/// [`GenerateRequest::seed`], so the same seed and text always give the same
/// output within a build.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveEngine;

impl ExtractiveEngine {
  pub fn summarize(
    &self,
    request: &GenerateRequest,
    template: &str,
  ) -> Generation {
    let text = match request.variables.get("text") {
      Some(t) if !t.is_empty() => t.clone(),
      _ => request
        .variables
        .values()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" "),
    };

    let sentences: Vec<&str> = SENTENCE_END
      .split(&text)
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .collect();

    let picks: Vec<&str> = if sentences.len() <= PICKS {
      sentences
    } else {
      let mut rng = StdRng::seed_from_u64(request.seed as u64);
      index::sample(&mut rng, sentences.len(), PICKS)
        .into_iter()
        .map(|i| sentences[i])
        .collect()
    };

    let text = if picks.is_empty() {
      "- (no content)".to_owned()
    } else {
      format!("- {}", picks.join("\n- "))
    };

    let usage = TokenUsage::new(word_count(template), word_count(&text));
    Generation { text, usage }
  }
}

impl Engine for ExtractiveEngine {
  type Error = Infallible;

  async fn generate(
    &self,
    request: &GenerateRequest,
    template: &str,
  ) -> Result<Generation, Infallible> {
    Ok(self.summarize(request, template))
  }
}

fn word_count(s: &str) -> u64 { s.split_whitespace().count() as u64 }

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use super::*;

  fn request(vars: &[(&str, &str)], seed: i64) -> GenerateRequest {
    let variables: BTreeMap<String, String> = vars
      .iter()
      .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
      .collect();
    GenerateRequest { seed, ..GenerateRequest::new(variables) }
  }

  #[test]
  fn short_input_is_kept_in_order() {
    let req = request(&[("text", "One. Two! Three?")], 0);
    let g = ExtractiveEngine.summarize(&req, "Summarize this");
    assert_eq!(g.text, "- One\n- Two\n- Three?");
    assert_eq!(g.usage.prompt, 2);
    assert_eq!(g.usage.completion, 6);
    assert_eq!(g.usage.total, 8);
  }

  #[test]
  fn long_input_is_sampled_deterministically() {
    let req = request(&[("text", "One. Two. Three. Four. Five. Six.")], 42);
    let a = ExtractiveEngine.summarize(&req, "t");
    let b = ExtractiveEngine.summarize(&req, "t");
    assert_eq!(a, b);
    assert_eq!(a.text.lines().count(), 3);

    let lines: Vec<&str> = a.text.lines().collect();
    let mut unique = lines.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), 3, "sentences picked twice: {lines:?}");
  }

  #[test]
  fn falls_back_to_all_variables() {
    let g = ExtractiveEngine
      .summarize(&request(&[("a", "Alpha."), ("b", "Beta.")], 0), "");
    assert_eq!(g.text, "- Alpha\n- Beta.");
  }

  #[test]
  fn empty_input_yields_placeholder() {
    let g = ExtractiveEngine.summarize(&request(&[], 0), "");
    assert_eq!(g.text, "- (no content)");
  }
}
