//! Compiler tests over whole models.

use kgprompt_core::{
  Error,
  model::{Entity, Ontology, Property, PropertyConstraint, Relationship},
};

use crate::{build_prompt, compile, fingerprint};

fn property(id: &str, name: &str, kind: &str, constraint: PropertyConstraint) -> Property {
  Property { id: id.into(), name: name.into(), kind: kind.into(), constraint }
}

fn entity(id: &str, name: &str, desc: &str, properties: Vec<Property>) -> Entity {
  Entity {
    id:         id.into(),
    name:       name.into(),
    parent:     String::new(),
    desc:       desc.into(),
    properties,
  }
}

fn relationship(id: &str, name: &str, source: &str, target: &str, props: &str) -> Relationship {
  Relationship {
    id:     id.into(),
    name:   name.into(),
    source: source.into(),
    target: target.into(),
    props:  props.into(),
  }
}

fn base_model() -> Ontology {
  use PropertyConstraint::{Optional, Required};

  Ontology {
    domain: "Test Domain".into(),
    goal: "Extract facts.".into(),
    entities: vec![
      entity("e-1", "Person", "A human.", vec![
        property("p-1", "age", "number", Optional),
        property("p-2", "name", "string", Required),
      ]),
      entity("e-2", "Organization", "A company.", vec![property(
        "p-3",
        "legal_name",
        "string",
        Required,
      )]),
    ],
    relationships: vec![relationship("r-1", "EMPLOYED_BY", "Person", "Organization", "since, role")],
    inference: "If X EMPLOYED_BY Y, then X WORKS_AT Y".into(),
    constraints: "Person must have a name".into(),
    ..Ontology::default()
  }
}

// ─── Determinism ─────────────────────────────────────────────────────────────

/// Every ordering of `items`.
fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
  if items.len() <= 1 {
    return vec![items.to_vec()];
  }
  let mut out = Vec::new();
  for i in 0..items.len() {
    let mut rest = items.to_vec();
    let head = rest.remove(i);
    for mut tail in permutations(&rest) {
      tail.insert(0, head.clone());
      out.push(tail);
    }
  }
  out
}

#[test]
fn output_is_independent_of_input_order() {
  let mut base = base_model();
  base.entities.push(entity("e-3", "Drug", "", vec![]));
  base
    .relationships
    .push(relationship("r-2", "FOUNDED", "Person", "Organization", "year"));
  base
    .relationships
    .push(relationship("r-3", "ACQUIRED", "Organization", "Organization", ""));
  let expected = build_prompt(&base);

  let entity_orders = permutations(&base.entities);
  let relationship_orders = permutations(&base.relationships);
  assert_eq!(entity_orders.len() * relationship_orders.len(), 36);

  for entities in &entity_orders {
    for relationships in &relationship_orders {
      let mut shuffled = base.clone();
      shuffled.entities = entities.clone();
      shuffled.relationships = relationships.clone();
      for entity in &mut shuffled.entities {
        entity.properties.reverse();
      }
      assert_eq!(build_prompt(&shuffled), expected);
    }
  }
}

#[test]
fn repeated_ids_still_render_in_a_fixed_order() {
  let mut a = base_model();
  a.entities.push(entity("e-9", "Drug", "First copy.", vec![]));
  a.entities.push(entity("e-9", "Drug", "Second copy.", vec![]));
  let mut b = a.clone();
  b.entities.reverse();

  let out = build_prompt(&a);
  assert_eq!(out, build_prompt(&b));
  let first = out.find("First copy.").unwrap();
  let second = out.find("Second copy.").unwrap();
  assert!(first < second);
}

#[test]
fn equal_names_are_ordered_by_id() {
  let mut a = base_model();
  a.entities.push(entity("e-4", "person", "Second.", vec![]));
  a.entities.push(entity("e-3", "PERSON", "Third.", vec![]));
  let mut b = a.clone();
  b.entities.reverse();

  let out = build_prompt(&a);
  assert_eq!(out, build_prompt(&b));

  let first = out.find("### Class: Person ").unwrap();
  let third = out.find("### Class: PERSON ").unwrap();
  let second = out.find("### Class: person ").unwrap();
  assert!(first < third && third < second);
}

#[test]
fn names_sort_numerically_and_case_insensitively() {
  let mut model = base_model();
  model.entities = vec![
    entity("a", "Item10", "", vec![]),
    entity("b", "item2", "", vec![]),
    entity("c", "Apple", "", vec![]),
  ];

  let out = build_prompt(&model);
  let apple = out.find("### Class: Apple").unwrap();
  let item2 = out.find("### Class: item2").unwrap();
  let item10 = out.find("### Class: Item10").unwrap();
  assert!(apple < item2 && item2 < item10);
}

// ─── Rendering ───────────────────────────────────────────────────────────────

#[test]
fn sorts_relationship_edge_properties() {
  let mut model = base_model();
  model.relationships[0].props = "role, since, department".into();
  assert!(build_prompt(&model).contains("Edge Properties: [department, role, since]"));
}

#[test]
fn escapes_triple_backticks_in_user_input() {
  let mut model = base_model();
  model.goal = "Use ```json blocks``` safely.".into();
  model.entities[0].properties[0].name = "```raw".into();

  let out = build_prompt(&model);
  assert!(out.contains("Use \\`\\`\\`json blocks\\`\\`\\` safely."));
  assert!(out.contains("\\`\\`\\`raw [number]"));
  assert!(out.ends_with("}\n```"));
  assert_eq!(out.matches("```json").count(), 1);
}

#[test]
fn falls_back_when_fields_are_missing() {
  let out = build_prompt(&Ontology::default());
  for expected in [
    "for the specified domain.",
    "No extraction goal provided.",
    "- No classes defined.",
    "- No relationship predicates defined.",
    "- No specific inference rules provided.",
    "- Ensure all typed literals match their declared types (String, Number, Date).",
  ] {
    assert!(out.contains(expected), "missing {expected:?}");
  }
}

#[test]
fn person_organization_scenario() {
  let out = build_prompt(&base_model());
  assert!(out.contains("### Class: Person "));
  assert!(out.contains("### Class: Organization "));
  assert!(out.contains(
    "- **EMPLOYED_BY**: (Source: Person) → (Target: Organization) | Edge Properties: [role, \
     since]"
  ));
  assert!(out.contains("- **Required Properties:** name [string]"));
  assert!(out.contains("- **Optional Properties:** age [number]"));
  assert!(out.contains("- **Unique Properties:** None"));
}

#[test]
fn drops_blank_records_and_collapses_crlf() {
  let mut model = base_model();
  model.entities.push(entity("e-9", "   ", "ignored", vec![]));
  model.entities[0].properties.push(property("p-9", " ", "string", PropertyConstraint::Unique));
  model.relationships.push(relationship("r-9", "", "Person", "Person", "x"));
  model.inference = "  rule one\r\nrule two  ".into();

  let out = build_prompt(&model);
  assert!(!out.contains("ignored"));
  assert!(out.contains("- **Unique Properties:** None"));
  assert!(!out.contains("Edge Properties: [x]"));
  assert!(out.contains("Apply these logical rules during extraction:\nrule one\nrule two\n"));
  assert!(!out.contains('\r'));
}

#[test]
fn renders_exact_document_for_a_minimal_model() {
  let model = Ontology {
    domain: "D".into(),
    goal: "G".into(),
    entities: vec![Entity {
      parent: "Agent".into(),
      ..entity("e", "Person", "", vec![property("p", "name", "string", PropertyConstraint::Required)])
    }],
    relationships: vec![relationship("r", "KNOWS", "Person", "", "")],
    ..Ontology::default()
  };

  let expected_head = concat!(
    "# SYSTEM PROMPT: ADVANCED KNOWLEDGE GRAPH EXTRACTION\n",
    "You are an expert Ontology Engineer and Information Extraction specialist for the D domain.\n",
    "## MISSION\n",
    "G\n",
    "## CONCEPTUAL HIERARCHY (CLASSES)\n",
    "The following entity classes define the nodes of our graph. Pay close attention to ",
    "parent-child relationships.\n",
    "\n",
    "### Class: Person (Sub-class of: Agent)\n",
    "- **Definition:** No description provided.\n",
    "- **Required Properties:** name [string]\n",
    "- **Optional Properties:** None\n",
    "- **Unique Properties:** None\n",
    "## RELATIONSHIP SCHEMA (PREDICATES)\n",
    "Define these edges connecting the instances of the classes above.\n",
    "\n",
    "- **KNOWS**: (Source: Person) → (Target: Unspecified)\n",
    "## LOGICAL ONTOLOGY & INFERENCE RULES\n",
    "Apply these logical rules during extraction:\n",
    "- No specific inference rules provided.\n",
    "## STRUCTURAL CONSTRAINTS\n",
    "Strictly adhere to these graph constraints:\n",
    "- Ensure all typed literals match their declared types (String, Number, Date).\n",
    "## OUTPUT REQUIREMENTS (JSON)\n",
    "Return only a valid JSON object with:\n",
    "```json\n",
  );

  let out = build_prompt(&model);
  assert!(out.starts_with(expected_head), "unexpected prompt:\n{out}");
  assert!(out.ends_with("  ]\n}\n```"));
}

// ─── compile / fingerprint ───────────────────────────────────────────────────

#[test]
fn compile_refuses_invalid_models() {
  let mut model = base_model();
  model.relationships[0].target = "Nowhere".into();

  match compile(&model) {
    Err(Error::ValidationFailed(errors)) => {
      assert!(errors.relationship_targets.contains_key("r-1"));
    }
    other => panic!("expected validation failure, got {other:?}"),
  }
}

#[test]
fn compile_matches_build_prompt_for_valid_models() {
  let model = Ontology::defaults();
  assert_eq!(compile(&model).unwrap(), build_prompt(&model));
}

#[test]
fn fingerprint_is_hex_sha256() {
  assert_eq!(
    fingerprint(""),
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
  );
  let a = fingerprint(&build_prompt(&base_model()));
  let mut changed = base_model();
  changed.goal = "Extract other facts.".into();
  assert_ne!(a, fingerprint(&build_prompt(&changed)));
}
