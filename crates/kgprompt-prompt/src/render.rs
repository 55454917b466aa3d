//! Normalisation and rendering of the prompt document.

use std::cmp::Ordering;

use kgprompt_core::model::{Entity, Ontology, Property, PropertyConstraint, Relationship};

use crate::collate::natural_cmp;

pub(crate) const TITLE: &str = "# SYSTEM PROMPT: ADVANCED KNOWLEDGE GRAPH EXTRACTION";
pub(crate) const DEFAULT_DOMAIN: &str = "specified";
pub(crate) const NO_GOAL: &str = "No extraction goal provided.";
pub(crate) const NO_CLASSES: &str = "- No classes defined.";
pub(crate) const NO_PREDICATES: &str = "- No relationship predicates defined.";
pub(crate) const NO_INFERENCE: &str = "- No specific inference rules provided.";
pub(crate) const DEFAULT_CONSTRAINTS: &str =
  "- Ensure all typed literals match their declared types (String, Number, Date).";
const NO_DESCRIPTION: &str = "No description provided.";
const UNSPECIFIED: &str = "Unspecified";

const OUTPUT_CONTRACT: &str = r#"## OUTPUT REQUIREMENTS (JSON)
Return only a valid JSON object with:
```json
{
  "nodes": [
    { "id": "unique_id", "class": "ClassName", "properties": { "name": "val", ... }, "evidence": "verbatim text" }
  ],
  "edges": [
    { "source": "node_id", "predicate": "REL_NAME", "target": "node_id", "properties": { ... }, "evidence": "verbatim text" }
  ]
}
```"#;

// ─── Cleaning ────────────────────────────────────────────────────────────────

/// Trim, then neutralise code fences and CRLF line endings.
pub(crate) fn clean(value: &str) -> String {
  value.trim().replace("```", "\\`\\`\\`").replace("\r\n", "\n")
}

fn or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
  if value.is_empty() { fallback } else { value }
}

// ─── Normalised records ──────────────────────────────────────────────────────

struct Attr<'a> {
  id:         &'a str,
  name:       String,
  kind:       String,
  constraint: PropertyConstraint,
}

struct Class<'a> {
  id:         &'a str,
  name:       String,
  parent:     String,
  desc:       String,
  properties: Vec<Attr<'a>>,
}

struct Predicate<'a> {
  id:     &'a str,
  name:   String,
  source: String,
  target: String,
  props:  String,
}

trait Named {
  fn name(&self) -> &str;
  fn id(&self) -> &str;
  /// The text this record contributes to the prompt.
  fn rendered(&self) -> String;
}

macro_rules! named {
  ($($ty:ident => $render:ident),*) => {
    $(impl Named for $ty<'_> {
      fn name(&self) -> &str { &self.name }
      fn id(&self) -> &str { self.id }
      fn rendered(&self) -> String { $render(self) }
    })*
  };
}

named!(Attr => attr_text, Class => class_block, Predicate => predicate_line);

/// Order by display name, then id, then rendered text, so records sharing a
/// name and an id still land in a fixed order.
fn by_name<T: Named>(a: &T, b: &T) -> Ordering {
  natural_cmp(a.name(), b.name())
    .then_with(|| a.id().cmp(b.id()))
    .then_with(|| a.rendered().cmp(&b.rendered()))
}

fn normalize_property(p: &Property) -> Attr<'_> {
  Attr {
    id:         &p.id,
    name:       clean(&p.name),
    kind:       clean(&p.kind),
    constraint: p.constraint,
  }
}

fn normalize_entity(e: &Entity) -> Class<'_> {
  let mut properties: Vec<Attr<'_>> = e
    .properties
    .iter()
    .map(normalize_property)
    .filter(|p| !p.name.is_empty())
    .collect();
  properties.sort_by(by_name);

  Class {
    id: &e.id,
    name: clean(&e.name),
    parent: clean(&e.parent),
    desc: clean(&e.desc),
    properties,
  }
}

fn normalize_relationship(r: &Relationship) -> Predicate<'_> {
  Predicate {
    id:     &r.id,
    name:   clean(&r.name),
    source: clean(&r.source),
    target: clean(&r.target),
    props:  clean(&r.props),
  }
}

// ─── Sections ────────────────────────────────────────────────────────────────

fn attr_text(attr: &Attr<'_>) -> String {
  format!("{} [{}] {}", attr.name, attr.kind, attr.constraint)
}

fn property_list(props: &[Attr<'_>], constraint: PropertyConstraint) -> String {
  let listed: Vec<String> = props
    .iter()
    .filter(|p| p.constraint == constraint)
    .map(|p| format!("{} [{}]", p.name, p.kind))
    .collect();
  if listed.is_empty() { "None".to_owned() } else { listed.join(", ") }
}

fn class_block(class: &Class<'_>) -> String {
  let parent = if class.parent.is_empty() {
    String::new()
  } else {
    format!("(Sub-class of: {})", class.parent)
  };
  format!(
    "\n### Class: {} {}\n- **Definition:** {}\n- **Required Properties:** {}\n- **Optional \
     Properties:** {}\n- **Unique Properties:** {}",
    class.name,
    parent,
    or(&class.desc, NO_DESCRIPTION),
    property_list(&class.properties, PropertyConstraint::Required),
    property_list(&class.properties, PropertyConstraint::Optional),
    property_list(&class.properties, PropertyConstraint::Unique),
  )
}

/// Comma-separated edge properties, trimmed, de-blanked and sorted.
fn edge_properties(props: &str) -> String {
  let mut tokens: Vec<&str> = props
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .collect();
  if tokens.is_empty() {
    return String::new();
  }
  tokens.sort_by(|a, b| natural_cmp(a, b).then_with(|| a.cmp(b)));
  format!(" | Edge Properties: [{}]", tokens.join(", "))
}

fn predicate_line(rel: &Predicate<'_>) -> String {
  format!(
    "\n- **{}**: (Source: {}) → (Target: {}){}",
    rel.name,
    or(&rel.source, UNSPECIFIED),
    or(&rel.target, UNSPECIFIED),
    edge_properties(&rel.props),
  )
}

// ─── Document ────────────────────────────────────────────────────────────────

pub(crate) fn render(model: &Ontology) -> String {
  let domain = clean(&model.domain);
  let goal = clean(&model.goal);
  let inference = clean(&model.inference);
  let constraints = clean(&model.constraints);

  let mut classes: Vec<Class<'_>> = model
    .entities
    .iter()
    .map(normalize_entity)
    .filter(|c| !c.name.is_empty())
    .collect();
  classes.sort_by(by_name);

  let mut predicates: Vec<Predicate<'_>> = model
    .relationships
    .iter()
    .map(normalize_relationship)
    .filter(|p| !p.name.is_empty())
    .collect();
  predicates.sort_by(by_name);

  let class_section = if classes.is_empty() {
    NO_CLASSES.to_owned()
  } else {
    classes.iter().map(class_block).collect::<Vec<_>>().join("\n")
  };

  let predicate_section = if predicates.is_empty() {
    NO_PREDICATES.to_owned()
  } else {
    predicates.iter().map(predicate_line).collect::<Vec<_>>().join("\n")
  };

  let mission = format!(
    "You are an expert Ontology Engineer and Information Extraction specialist for the {} \
     domain.",
    or(&domain, DEFAULT_DOMAIN)
  );

  [
    TITLE,
    mission.as_str(),
    "## MISSION",
    or(&goal, NO_GOAL),
    "## CONCEPTUAL HIERARCHY (CLASSES)",
    "The following entity classes define the nodes of our graph. Pay close attention to \
     parent-child relationships.",
    class_section.as_str(),
    "## RELATIONSHIP SCHEMA (PREDICATES)",
    "Define these edges connecting the instances of the classes above.",
    predicate_section.as_str(),
    "## LOGICAL ONTOLOGY & INFERENCE RULES",
    "Apply these logical rules during extraction:",
    or(&inference, NO_INFERENCE),
    "## STRUCTURAL CONSTRAINTS",
    "Strictly adhere to these graph constraints:",
    or(&constraints, DEFAULT_CONSTRAINTS),
    OUTPUT_CONTRACT,
  ]
  .join("\n")
}
