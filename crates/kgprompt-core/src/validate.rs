//! Referential-integrity and uniqueness checks over an [`Ontology`].
//!
//! Validation is pure and recomputed after every edit. Errors are keyed by
//! record id so a UI can attach each one to the input that caused it; they
//! block prompt generation but never alter the model.

use std::{
  collections::{BTreeMap, HashSet},
  fmt,
};

use serde::Serialize;

use crate::model::{Ontology, normalize_name};

pub const DOMAIN_REQUIRED: &str = "Domain name is required.";
pub const GOAL_REQUIRED: &str = "Extraction goal is required.";
pub const CLASS_NAME_REQUIRED: &str = "Class name is required.";
pub const CLASS_NAME_UNIQUE: &str = "Class name must be unique.";
pub const RELATIONSHIP_NAME_REQUIRED: &str = "Relationship name is required.";
pub const RELATIONSHIP_NAME_UNIQUE: &str = "Relationship name must be unique.";
pub const SOURCE_REQUIRED: &str = "Source class is required.";
pub const SOURCE_UNKNOWN: &str = "Source class must match a defined entity.";
pub const TARGET_REQUIRED: &str = "Target class is required.";
pub const TARGET_UNKNOWN: &str = "Target class must match a defined entity.";

/// Field-scoped validation failures. Each map is keyed by record id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
  pub domain:               Option<String>,
  pub goal:                 Option<String>,
  pub entity_names:         BTreeMap<String, String>,
  pub relationship_names:   BTreeMap<String, String>,
  pub relationship_sources: BTreeMap<String, String>,
  pub relationship_targets: BTreeMap<String, String>,
}

/// Compute every validation error for `model`.
///
/// Name uniqueness is decided in declaration order: the first record with a
/// given normalised name is accepted and every later one is flagged.
pub fn validate_state(model: &Ontology) -> ValidationErrors {
  let mut errors = ValidationErrors::default();

  if model.domain.trim().is_empty() {
    errors.domain = Some(DOMAIN_REQUIRED.to_owned());
  }
  if model.goal.trim().is_empty() {
    errors.goal = Some(GOAL_REQUIRED.to_owned());
  }

  let mut entity_names = HashSet::new();
  for entity in &model.entities {
    let normalized = entity.canonical_name();
    if normalized.is_empty() {
      errors.entity_names.insert(entity.id.clone(), CLASS_NAME_REQUIRED.to_owned());
    } else if !entity_names.insert(normalized) {
      errors.entity_names.insert(entity.id.clone(), CLASS_NAME_UNIQUE.to_owned());
    }
  }

  let mut relationship_names = HashSet::new();
  for rel in &model.relationships {
    let normalized = rel.canonical_name();
    if normalized.is_empty() {
      errors
        .relationship_names
        .insert(rel.id.clone(), RELATIONSHIP_NAME_REQUIRED.to_owned());
    } else if !relationship_names.insert(normalized) {
      errors
        .relationship_names
        .insert(rel.id.clone(), RELATIONSHIP_NAME_UNIQUE.to_owned());
    }

    let endpoint_error = |name: String, required: &str, unknown: &str| {
      if name.is_empty() {
        Some(required.to_owned())
      } else if !entity_names.contains(&name) {
        Some(unknown.to_owned())
      } else {
        None
      }
    };

    if let Some(message) = endpoint_error(rel.canonical_source(), SOURCE_REQUIRED, SOURCE_UNKNOWN) {
      errors.relationship_sources.insert(rel.id.clone(), message);
    }
    if let Some(message) = endpoint_error(rel.canonical_target(), TARGET_REQUIRED, TARGET_UNKNOWN) {
      errors.relationship_targets.insert(rel.id.clone(), message);
    }
  }

  errors
}

impl ValidationErrors {
  pub fn has_errors(&self) -> bool {
    self.domain.is_some()
      || self.goal.is_some()
      || !self.entity_names.is_empty()
      || !self.relationship_names.is_empty()
      || !self.relationship_sources.is_empty()
      || !self.relationship_targets.is_empty()
  }

  pub fn is_valid(&self) -> bool { !self.has_errors() }

  /// Human-readable overview of what needs fixing, one line per problem
  /// class. Empty when the model is valid.
  pub fn summary(&self, model: &Ontology) -> Vec<String> {
    let mut lines = Vec::new();

    if self.domain.is_some() {
      lines.push("Missing domain name.".to_owned());
    }
    if self.goal.is_some() {
      lines.push("Missing extraction goal.".to_owned());
    }

    if !self.entity_names.is_empty() {
      let names = model.entities.iter().map(|e| e.name.as_str());
      let duplicates = duplicated_names(names);
      if !duplicates.is_empty() {
        lines.push(format!("Duplicate entity names: {}", duplicates.join(", ")));
      }
      let blank = self.entity_names.keys().any(|id| {
        model.entity(id).is_none_or(|e| e.name.trim().is_empty())
      });
      if blank {
        lines.push("Missing entity names.".to_owned());
      }
    }

    if !self.relationship_names.is_empty() {
      let names = model.relationships.iter().map(|r| r.name.as_str());
      let duplicates = duplicated_names(names);
      if !duplicates.is_empty() {
        lines.push(format!("Duplicate relationship names: {}", duplicates.join(", ")));
      }
      let blank = self.relationship_names.keys().any(|id| {
        model.relationship(id).is_none_or(|r| r.name.trim().is_empty())
      });
      if blank {
        lines.push("Missing relationship names.".to_owned());
      }
    }

    if !self.relationship_sources.is_empty() {
      lines.push("Missing or invalid relationship source classes.".to_owned());
    }
    if !self.relationship_targets.is_empty() {
      lines.push("Missing or invalid relationship target classes.".to_owned());
    }

    lines
  }
}

/// Normalised names occurring more than once, in first-seen order.
fn duplicated_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
  let mut counts: Vec<(String, usize)> = Vec::new();
  for name in names {
    let normalized = normalize_name(name);
    if normalized.is_empty() {
      continue;
    }
    match counts.iter_mut().find(|(n, _)| *n == normalized) {
      Some((_, count)) => *count += 1,
      None => counts.push((normalized, 1)),
    }
  }
  counts
    .into_iter()
    .filter(|(_, count)| *count > 1)
    .map(|(name, _)| name)
    .collect()
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let messages: Vec<&str> = self
      .domain
      .iter()
      .chain(self.goal.iter())
      .chain(self.entity_names.values())
      .chain(self.relationship_names.values())
      .chain(self.relationship_sources.values())
      .chain(self.relationship_targets.values())
      .map(String::as_str)
      .collect();
    write!(f, "{}", messages.join(" "))
  }
}
