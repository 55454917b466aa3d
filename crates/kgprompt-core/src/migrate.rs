//! Schema migration and the canonical wire format.
//!
//! [`migrate_state`] accepts any JSON value (a legacy save, a hand-written
//! import, garbage) and always produces a current-version [`Ontology`].
//! Version upgrades run first, then a defaulting pass fills every missing
//! field. Malformed input degrades to defaults; it never fails.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  id::new_id,
  model::{Entity, Ontology, Property, PropertyConstraint, Relationship, SCHEMA_VERSION},
};

type Object = Map<String, Value>;

/// One upgrade step, rewriting the raw payload in place.
type Step = fn(&mut Object);

/// `STEPS[n]` upgrades a version-`n` payload to version `n + 1`.
/// Append new steps here; never edit an existing one.
const STEPS: &[Step] = &[v0_to_v1];

const _: () = assert!(STEPS.len() == SCHEMA_VERSION as usize);

/// Version 1 introduced the version stamp itself; the shape is unchanged.
fn v0_to_v1(raw: &mut Object) { raw.insert("schemaVersion".into(), Value::from(1)); }

// ─── Migration ───────────────────────────────────────────────────────────────

/// Normalise arbitrary JSON into the current [`Ontology`].
///
/// A missing `schemaVersion` counts as version 0. Records without an id get a
/// fresh one; existing ids are kept verbatim, so migrating an already
/// canonical model is a no-op.
pub fn migrate_state(raw: &Value) -> Ontology {
  let mut object = raw.as_object().cloned().unwrap_or_default();
  let version = schema_version(&object);

  if version > SCHEMA_VERSION {
    warn!(version, current = SCHEMA_VERSION, "payload is newer than this build; defaulting");
  }

  for (from, step) in STEPS.iter().enumerate().skip(version as usize) {
    debug!(from, to = from + 1, "applying schema upgrade");
    step(&mut object);
  }

  default_pass(&object)
}

fn schema_version(object: &Object) -> u32 {
  object
    .get("schemaVersion")
    .and_then(Value::as_u64)
    .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
    .unwrap_or(0)
}

// ─── Defaulting pass ─────────────────────────────────────────────────────────

fn default_pass(object: &Object) -> Ontology {
  let root = Some(object);
  let mut model = Ontology {
    schema_version: SCHEMA_VERSION,
    domain:         text(root, "domain"),
    goal:           text(root, "goal"),
    entities:       records(root, "entities").map(entity).collect(),
    relationships:  records(root, "relationships").map(relationship).collect(),
    inference:      text(root, "inference"),
    constraints:    text(root, "constraints"),
  };
  reissue_repeated_ids(&mut model);
  model
}

/// Ids are unique across the whole model. The first record holding an id
/// keeps it; later holders get a fresh one.
fn reissue_repeated_ids(model: &mut Ontology) {
  let mut seen = HashSet::new();
  let mut claim = |id: &mut String| {
    if !seen.insert(id.clone()) {
      debug!(id = %id, "reissuing repeated id");
      *id = new_id();
      seen.insert(id.clone());
    }
  };
  for entity in &mut model.entities {
    claim(&mut entity.id);
    for prop in &mut entity.properties {
      claim(&mut prop.id);
    }
  }
  for rel in &mut model.relationships {
    claim(&mut rel.id);
  }
}

fn entity(fields: Option<&Object>) -> Entity {
  Entity {
    id:         id(fields),
    name:       text(fields, "name"),
    parent:     text(fields, "parent"),
    desc:       text(fields, "desc"),
    properties: records(fields, "properties").map(property).collect(),
  }
}

fn property(fields: Option<&Object>) -> Property {
  Property {
    id:         id(fields),
    name:       text(fields, "name"),
    kind:       str_field(fields, "type").unwrap_or("string").to_owned(),
    constraint: str_field(fields, "constraint")
      .map(PropertyConstraint::parse_lenient)
      .unwrap_or_default(),
  }
}

fn relationship(fields: Option<&Object>) -> Relationship {
  Relationship {
    id:     id(fields),
    name:   text(fields, "name"),
    source: text(fields, "source"),
    target: text(fields, "target"),
    props:  text(fields, "props"),
  }
}

fn str_field<'a>(fields: Option<&'a Object>, key: &str) -> Option<&'a str> {
  fields?.get(key)?.as_str()
}

fn text(fields: Option<&Object>, key: &str) -> String {
  str_field(fields, key).unwrap_or_default().to_owned()
}

/// Reuse a non-empty id, otherwise mint one.
fn id(fields: Option<&Object>) -> String {
  match str_field(fields, "id") {
    Some(id) if !id.is_empty() => id.to_owned(),
    _ => new_id(),
  }
}

/// Elements of an array field. Non-object elements come through as `None`
/// and are defaulted like an empty record.
fn records<'a>(
  fields: Option<&'a Object>,
  key: &str,
) -> impl Iterator<Item = Option<&'a Object>> + 'a {
  fields
    .and_then(|f| f.get(key))
    .and_then(Value::as_array)
    .into_iter()
    .flatten()
    .map(Value::as_object)
}

// ─── Wire format ─────────────────────────────────────────────────────────────

/// The canonical persisted/exported form, stamped with the current version.
pub fn serialize_state(model: &Ontology) -> Result<Value> {
  let mut value = serde_json::to_value(model)?;
  if let Some(object) = value.as_object_mut() {
    object.insert("schemaVersion".into(), Value::from(SCHEMA_VERSION));
  }
  Ok(value)
}

/// Pretty-printed canonical JSON for the export file.
pub fn export_json(model: &Ontology) -> Result<String> {
  Ok(serde_json::to_string_pretty(&serialize_state(model)?)?)
}

/// Parse an ontology document as written. A JSON syntax error, or a top
/// level that is not an object, is an error; everything past that is
/// migrated leniently.
pub fn parse_document(text: &str) -> Result<Ontology> {
  let raw: Value = serde_json::from_str(text)?;
  if !raw.is_object() {
    return Err(Error::InvalidImport("top-level value must be a JSON object".into()));
  }
  Ok(migrate_state(&raw))
}

/// [`parse_document`] for the editor: empty entity/relationship lists are
/// seeded with one blank row each.
pub fn import_json(text: &str) -> Result<Ontology> {
  let mut model = parse_document(text)?;
  model.ensure_editable();
  Ok(model)
}

/// Decode a persisted payload. Anything unreadable is treated as "nothing
/// saved" rather than an error.
pub fn decode_saved(payload: &str) -> Option<Ontology> {
  match serde_json::from_str::<Value>(payload) {
    Ok(raw) if raw.is_object() => Some(migrate_state(&raw)),
    Ok(_) => {
      warn!("saved state is not a JSON object; ignoring");
      None
    }
    Err(e) => {
      warn!(error = %e, "unable to load saved state");
      None
    }
  }
}
