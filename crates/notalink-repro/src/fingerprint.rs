//! Canonical request fingerprints.
//!
//! A fingerprint is the first 16 hex characters of the SHA-256 digest of a
//! canonical JSON document:
//!
//! ```text
//! {"params": {...}, "prompt": "...", "vars": {...}}
//! ```
//!
//! Every map is key-sorted, items are separated by `", "` and keys by `": "`,
//! the encoding is UTF-8 without ASCII escaping, and floats are written in their shortest round-trip decimal form
//! (always with a fractional part, e.g. `0.0`, `0.7`). The result is
//! therefore independent of map insertion order, locale and platform.

use std::{collections::BTreeMap, fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Number of hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 16;

/// A scalar sampling parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
}

impl From<bool> for ParamValue {
  fn from(v: bool) -> Self { Self::Bool(v) }
}

impl From<i64> for ParamValue {
  fn from(v: i64) -> Self { Self::Int(v) }
}

impl From<u32> for ParamValue {
  fn from(v: u32) -> Self { Self::Int(i64::from(v)) }
}

impl From<f64> for ParamValue {
  fn from(v: f64) -> Self { Self::Float(v) }
}

impl From<&str> for ParamValue {
  fn from(v: &str) -> Self { Self::Str(v.to_owned()) }
}

impl From<String> for ParamValue {
  fn from(v: String) -> Self { Self::Str(v) }
}

/// A 16-character lowercase hex key identifying a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Compact JSON with a space after each `,` and `:`, so digests agree with
/// traces recorded by earlier NotaLink deployments.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
  fn begin_array_value<W: ?Sized + io::Write>(
    &mut self,
    writer: &mut W,
    first: bool,
  ) -> io::Result<()> {
    if first { Ok(()) } else { writer.write_all(b", ") }
  }

  fn begin_object_key<W: ?Sized + io::Write>(
    &mut self,
    writer: &mut W,
    first: bool,
  ) -> io::Result<()> {
    if first { Ok(()) } else { writer.write_all(b", ") }
  }

  fn begin_object_value<W: ?Sized + io::Write>(
    &mut self,
    writer: &mut W,
  ) -> io::Result<()> {
    writer.write_all(b": ")
  }
}

#[derive(Serialize)]
struct Canonical<'a> {
  params: BTreeMap<&'a str, &'a ParamValue>,
  prompt: &'a str,
  vars:   BTreeMap<&'a str, &'a str>,
}

/// Compute the fingerprint of `(prompt, variables, params)`.
///
/// Pure: no I/O, and stable across runs and platforms. Non-finite float
/// parameters have no canonical encoding and are rejected.
pub fn fingerprint<'a, V, P>(
  prompt: &'a str,
  variables: V,
  params: P,
) -> Result<Fingerprint>
where
  V: IntoIterator<Item = (&'a String, &'a String)>,
  P: IntoIterator<Item = (&'a str, &'a ParamValue)>,
{
  let params: BTreeMap<&str, &ParamValue> = params.into_iter().collect();
  for (name, value) in &params {
    if let ParamValue::Float(f) = value
      && !f.is_finite()
    {
      return Err(Error::InvalidRequest(format!(
        "parameter {name:?} must be finite, got {f}"
      )));
    }
  }

  let canonical = Canonical {
    params,
    prompt,
    vars: variables
      .into_iter()
      .map(|(k, v)| (k.as_str(), v.as_str()))
      .collect(),
  };

  let mut ser = serde_json::Serializer::with_formatter(Vec::new(), SpacedFormatter);
  canonical.serialize(&mut ser)?;
  let digest = Sha256::digest(ser.into_inner());
  Ok(Fingerprint(hex::encode(&digest[..FINGERPRINT_LEN / 2])))
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn params(temperature: f64, seed: i64) -> Vec<(&'static str, ParamValue)> {
    vec![
      ("temperature", temperature.into()),
      ("seed", seed.into()),
      ("max_tokens", 256u32.into()),
      ("model", "dummy".into()),
    ]
  }

  fn fp(
    prompt: &str,
    vars: &HashMap<String, String>,
    params: &[(&'static str, ParamValue)],
  ) -> Fingerprint {
    fingerprint(prompt, vars, params.iter().map(|(k, v)| (*k, v))).unwrap()
  }

  fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
      .iter()
      .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
      .collect()
  }

  #[test]
  fn is_sixteen_lowercase_hex_chars() {
    let f = fp("p", &vars(&[("text", "t")]), &params(0.0, 0));
    assert_eq!(f.as_str().len(), FINGERPRINT_LEN);
    assert!(f.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
  }

  #[test]
  fn insertion_order_does_not_matter() {
    let forward: Vec<(&str, &str)> =
      (0..50).map(|i| (["a", "b", "c", "d", "e"][i % 5], "v")).collect();
    let mut m1 = HashMap::new();
    let mut m2 = HashMap::new();
    for (i, (k, v)) in forward.iter().enumerate() {
      m1.insert(format!("{k}{i}"), (*v).to_owned());
    }
    for (i, (k, v)) in forward.iter().enumerate().rev() {
      m2.insert(format!("{k}{i}"), (*v).to_owned());
    }

    let mut p_rev = params(0.7, 42);
    p_rev.reverse();
    assert_eq!(fp("x", &m1, &params(0.7, 42)), fp("x", &m2, &p_rev));
  }

  #[test]
  fn every_field_changes_the_fingerprint() {
    let base = fp("prompt", &vars(&[("text", "One. Two.")]), &params(0.0, 0));

    assert_ne!(base, fp("prompt!", &vars(&[("text", "One. Two.")]), &params(0.0, 0)));
    assert_ne!(base, fp("prompt", &vars(&[("text", "One. Three.")]), &params(0.0, 0)));
    assert_ne!(base, fp("prompt", &vars(&[("body", "One. Two.")]), &params(0.0, 0)));
    assert_ne!(base, fp("prompt", &vars(&[("text", "One. Two.")]), &params(0.1, 0)));
    assert_ne!(base, fp("prompt", &vars(&[("text", "One. Two.")]), &params(0.0, 1)));
  }

  #[test]
  fn int_and_float_parameters_are_distinct() {
    let v = vars(&[]);
    let as_int = fp("p", &v, &[("n", ParamValue::Int(1))]);
    let as_float = fp("p", &v, &[("n", ParamValue::Float(1.0))]);
    assert_ne!(as_int, as_float);
  }

  #[test]
  fn canonical_encoding_is_pinned() {
    // {"params": {"seed": 1, "t": 0.5}, "prompt": "p", "vars": {"k": "v"}}
    let v = vars(&[("k", "v")]);
    let p = [("t", ParamValue::Float(0.5)), ("seed", ParamValue::Int(1))];
    assert_eq!(fp("p", &v, &p).as_str(), "f2f13b88a495d8db");
  }

  #[test]
  fn matches_digests_of_recorded_traces() {
    let v = vars(&[("text", "One. Two. Three. Four.")]);
    assert_eq!(fp("Summarize.", &v, &params(0.0, 42)).as_str(), "958bad0d78ec6c36");
  }


  #[test]
  fn non_finite_floats_are_rejected() {
    let v = vars(&[]);
    let p = [("temperature", ParamValue::Float(f64::NAN))];
    let err = fingerprint("p", &v, p.iter().map(|(k, v)| (*k, v))).unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
  }
}
