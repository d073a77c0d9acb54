//! Note types: the persisted entity of the repository.
//!
//! A note arrives as an untrusted [`NoteInput`], is checked once at the
//! boundary into a [`NewNote`], and is materialised by the store into a
//! [`Note`] carrying its id and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, NoteId, Result};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Zettelkasten category of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Fleeting,
  Literature,
  Permanent,
}

/// How the note's content entered the system.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
  #[default]
  Manual,
  Url,
  Quip,
}

fn default_source_kind() -> Option<SourceKind> { Some(SourceKind::Manual) }

// ─── Citation ────────────────────────────────────────────────────────────────

/// A reference to an external resource the note draws on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
  pub id:    String,
  pub url:   Url,
  pub title: String,
  pub at:    DateTime<Utc>,
}

/// Unchecked citation as submitted by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationInput {
  pub id:    String,
  pub url:   String,
  pub title: String,
  pub at:    DateTime<Utc>,
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Boundary payload for note creation.
///
/// Unknown `category` or `source_kind` values fail deserialisation; everything
/// else is checked by [`NoteInput::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteInput {
  #[serde(default)]
  pub title:       Option<String>,
  pub body:        String,
  pub category:    Category,
  #[serde(default)]
  pub tags:        Vec<String>,
  #[serde(default)]
  pub source_url:  Option<String>,
  #[serde(default = "default_source_kind")]
  pub source_kind: Option<SourceKind>,
  /// External id for idempotent re-submission. Allocated by the store if
  /// absent.
  #[serde(default)]
  pub id:          Option<String>,
  #[serde(default)]
  pub citations:   Vec<CitationInput>,
  #[serde(default)]
  pub provenance:  Vec<String>,
}

impl NoteInput {
  /// Convenience constructor with all optional fields set to their defaults.
  pub fn new(body: impl Into<String>, category: Category) -> Self {
    Self {
      title: None,
      body: body.into(),
      category,
      tags: Vec::new(),
      source_url: None,
      source_kind: default_source_kind(),
      id: None,
      citations: Vec::new(),
      provenance: Vec::new(),
    }
  }

  /// Parse a JSON payload, folding schema errors into [`Error::Validation`].
  pub fn from_json(payload: &str) -> Result<Self> {
    serde_json::from_str(payload).map_err(|e| Error::Validation(e.to_string()))
  }

  /// Check the payload against the note schema.
  pub fn validate(self) -> Result<NewNote> {
    if self.body.is_empty() {
      return Err(Error::Validation("body must not be empty".into()));
    }

    let id = self.id.map(NoteId::parse).transpose()?;

    let source_url = self
      .source_url
      .as_deref()
      .map(|u| parse_url("source_url", u))
      .transpose()?;

    let citations = self
      .citations
      .into_iter()
      .map(|c| {
        Ok(Citation {
          url:   parse_url("citation url", &c.url)?,
          id:    c.id,
          title: c.title,
          at:    c.at,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(NewNote {
      id,
      title: self.title,
      body: self.body,
      category: self.category,
      tags: self.tags,
      source_url,
      source_kind: self.source_kind,
      citations,
      provenance: self.provenance,
    })
  }
}

fn parse_url(field: &str, raw: &str) -> Result<Url> {
  Url::parse(raw).map_err(|e| Error::Validation(format!("{field} {raw:?}: {e}")))
}

// ─── NewNote ─────────────────────────────────────────────────────────────────

/// A validated note awaiting persistence. Only obtainable through
/// [`NoteInput::validate`].
#[derive(Debug, Clone)]
pub struct NewNote {
  id:              Option<NoteId>,
  pub title:       Option<String>,
  pub body:        String,
  pub category:    Category,
  pub tags:        Vec<String>,
  pub source_url:  Option<Url>,
  pub source_kind: Option<SourceKind>,
  pub citations:   Vec<Citation>,
  pub provenance:  Vec<String>,
}

impl NewNote {
  /// The caller-supplied id, if any.
  pub fn id(&self) -> Option<&NoteId> { self.id.as_ref() }

  /// Materialise the stored form, allocating an id if none was supplied.
  /// `created_at` and `updated_at` are both set to `now`.
  pub fn into_note(self, now: DateTime<Utc>) -> Note {
    Note {
      id:          self.id.unwrap_or_else(NoteId::generate),
      title:       self.title,
      body:        self.body,
      category:    self.category,
      tags:        self.tags,
      source_url:  self.source_url,
      source_kind: self.source_kind,
      created_at:  now,
      updated_at:  now,
      backlinks:   Vec::new(),
      citations:   self.citations,
      provenance:  self.provenance,
    }
  }
}

// ─── Note ────────────────────────────────────────────────────────────────────

/// A persisted note. The file on disk is the only source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
  pub id:          NoteId,
  pub title:       Option<String>,
  pub body:        String,
  pub category:    Category,
  #[serde(default)]
  pub tags:        Vec<String>,
  pub source_url:  Option<Url>,
  #[serde(default = "default_source_kind")]
  pub source_kind: Option<SourceKind>,
  pub created_at:  DateTime<Utc>,
  /// Equal to `created_at`; no update path exists yet.
  pub updated_at:  DateTime<Utc>,
  /// Always empty: nothing maintains note links yet.
  #[serde(default)]
  pub backlinks:   Vec<NoteId>,
  #[serde(default)]
  pub citations:   Vec<Citation>,
  #[serde(default)]
  pub provenance:  Vec<String>,
}
