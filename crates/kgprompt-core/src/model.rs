//! The ontology model: the canonical, persisted representation of what the
//! user has defined.
//!
//! Only source-of-truth fields live here. Case-normalised lookup keys are
//! derived on demand (see [`normalize_name`]) and are never stored, so they
//! cannot drift from the names they are computed from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::id::new_id;

/// The schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Trim and lowercase a name for case-insensitive comparison.
pub fn normalize_name(value: &str) -> String { value.trim().to_lowercase() }

// ─── Property ────────────────────────────────────────────────────────────────

/// How a property participates in extraction.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PropertyConstraint {
  #[default]
  Optional,
  Required,
  Unique,
}

impl PropertyConstraint {
  /// Parse a constraint tag, degrading anything unrecognised to
  /// [`PropertyConstraint::Optional`].
  pub fn parse_lenient(tag: &str) -> Self { tag.trim().parse().unwrap_or_default() }
}

/// A named, typed attribute owned by one [`Entity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
  pub id:         String,
  pub name:       String,
  /// Free-form type label; the editor offers string/number/date/boolean.
  #[serde(rename = "type")]
  pub kind:       String,
  pub constraint: PropertyConstraint,
}

impl Property {
  /// A blank `string`/`optional` property with a fresh id.
  pub fn empty() -> Self {
    Self {
      id:         new_id(),
      name:       String::new(),
      kind:       "string".to_owned(),
      constraint: PropertyConstraint::Optional,
    }
  }

  pub fn new(name: &str, kind: &str, constraint: PropertyConstraint) -> Self {
    Self { name: name.to_owned(), kind: kind.to_owned(), constraint, ..Self::empty() }
  }
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A declared class (node type) in the ontology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
  pub id:         String,
  pub name:       String,
  /// Free-text name of the parent class. Display only; not required to exist.
  pub parent:     String,
  pub desc:       String,
  pub properties: Vec<Property>,
}

impl Entity {
  /// A blank entity carrying exactly one blank property.
  pub fn empty() -> Self {
    Self {
      id:         new_id(),
      name:       String::new(),
      parent:     String::new(),
      desc:       String::new(),
      properties: vec![Property::empty()],
    }
  }

  pub fn canonical_name(&self) -> String { normalize_name(&self.name) }

  pub fn property(&self, id: &str) -> Option<&Property> {
    self.properties.iter().find(|p| p.id == id)
  }

  pub fn property_mut(&mut self, id: &str) -> Option<&mut Property> {
    self.properties.iter_mut().find(|p| p.id == id)
  }
}

// ─── Relationship ────────────────────────────────────────────────────────────

/// A directed edge type between two entity classes, referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
  pub id:     String,
  pub name:   String,
  pub source: String,
  pub target: String,
  /// Comma-separated edge property names, kept as typed.
  pub props:  String,
}

impl Relationship {
  pub fn empty() -> Self {
    Self {
      id:     new_id(),
      name:   String::new(),
      source: String::new(),
      target: String::new(),
      props:  String::new(),
    }
  }

  pub fn canonical_name(&self) -> String { normalize_name(&self.name) }

  pub fn canonical_source(&self) -> String { normalize_name(&self.source) }

  pub fn canonical_target(&self) -> String { normalize_name(&self.target) }
}

// ─── Ontology ────────────────────────────────────────────────────────────────

/// The root model: domain, goal, classes, predicates and global rule text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ontology {
  #[serde(rename = "schemaVersion")]
  pub schema_version: u32,
  pub domain:         String,
  pub goal:           String,
  pub entities:       Vec<Entity>,
  pub relationships:  Vec<Relationship>,
  /// Newline-delimited inference rules.
  pub inference:      String,
  /// Newline-delimited structural constraints.
  pub constraints:    String,
}

impl Default for Ontology {
  fn default() -> Self {
    Self {
      schema_version: SCHEMA_VERSION,
      domain:         String::new(),
      goal:           String::new(),
      entities:       Vec::new(),
      relationships:  Vec::new(),
      inference:      String::new(),
      constraints:    String::new(),
    }
  }
}

impl Ontology {
  /// The state a fresh editor starts from: one blank entity and one blank
  /// relationship so there is always a row to type into.
  pub fn initial() -> Self {
    Self {
      entities: vec![Entity::empty()],
      relationships: vec![Relationship::empty()],
      ..Self::default()
    }
  }

  pub fn entity(&self, id: &str) -> Option<&Entity> {
    self.entities.iter().find(|e| e.id == id)
  }

  pub fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
    self.entities.iter_mut().find(|e| e.id == id)
  }

  pub fn relationship(&self, id: &str) -> Option<&Relationship> {
    self.relationships.iter().find(|r| r.id == id)
  }

  pub fn relationship_mut(&mut self, id: &str) -> Option<&mut Relationship> {
    self.relationships.iter_mut().find(|r| r.id == id)
  }

  /// Normalised entity name → id of the first entity declaring it.
  /// Blank names are skipped.
  pub fn entity_index(&self) -> HashMap<String, &str> {
    let mut index = HashMap::new();
    for entity in &self.entities {
      let key = entity.canonical_name();
      if !key.is_empty() {
        index.entry(key).or_insert(entity.id.as_str());
      }
    }
    index
  }
}
