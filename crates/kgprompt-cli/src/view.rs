//! Plain-text rendering of the model, validation errors and help.

use std::fmt::Write as _;

use kgprompt_core::{
  action::{Action, Field},
  model::Ontology,
  validate::ValidationErrors,
};

/// Argument synopsis for an action, shown in help and usage errors.
pub fn usage(action: Action) -> &'static str {
  match action {
    Action::AddEntity => "add-entity",
    Action::AddRelationship => "add-relationship",
    Action::AddProperty => "add-property <entity-id>",
    Action::RemoveEntity => "remove-entity <entity-id>",
    Action::RemoveRelationship => "remove-relationship <relationship-id>",
    Action::RemoveProperty => "remove-property <entity-id> <property-id>",
    Action::UseDefaults => "use-defaults",
    Action::ExportJson => "export-json [path]",
    Action::ImportJson => "import-json <path>",
    Action::Generate => "generate",
    Action::Copy => "copy",
  }
}

pub fn help() -> String {
  let mut out = String::from("Actions:\n");
  for action in Action::all() {
    let _ = writeln!(out, "  {}", usage(action));
  }
  out.push_str("Editing:\n  set <field> [ids…] <value…>   (\\n in a value inserts a newline)\n");
  out.push_str("  fields:");
  for field in Field::all() {
    let _ = write!(out, " {field}");
  }
  out.push_str("\nOther:\n  show | errors | help | quit");
  out
}

fn or_dash(value: &str) -> &str {
  if value.trim().is_empty() { "-" } else { value }
}

fn indent_block(out: &mut String, title: &str, body: &str) {
  let _ = writeln!(out, "{title}:");
  if body.trim().is_empty() {
    out.push_str("  -\n");
  }
  for line in body.lines().filter(|l| !l.trim().is_empty()) {
    let _ = writeln!(out, "  {line}");
  }
}

/// Everything in the model, with the ids needed to address each record.
pub fn render_model(model: &Ontology) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "Domain: {}", or_dash(&model.domain));
  let _ = writeln!(out, "Goal:   {}", or_dash(&model.goal));

  out.push_str("Entities:\n");
  for entity in &model.entities {
    let _ = write!(out, "  [{}] {}", entity.id, or_dash(&entity.name));
    if !entity.parent.trim().is_empty() {
      let _ = write!(out, " < {}", entity.parent);
    }
    out.push('\n');
    if !entity.desc.trim().is_empty() {
      let _ = writeln!(out, "      {}", entity.desc);
    }
    for prop in &entity.properties {
      let _ = writeln!(
        out,
        "    [{}] {}: {} ({})",
        prop.id,
        or_dash(&prop.name),
        or_dash(&prop.kind),
        prop.constraint
      );
    }
  }

  out.push_str("Relationships:\n");
  for rel in &model.relationships {
    let _ = write!(
      out,
      "  [{}] {}: {} -> {}",
      rel.id,
      or_dash(&rel.name),
      or_dash(&rel.source),
      or_dash(&rel.target)
    );
    if !rel.props.trim().is_empty() {
      let _ = write!(out, " {{{}}}", rel.props);
    }
    out.push('\n');
  }

  indent_block(&mut out, "Inference", &model.inference);
  indent_block(&mut out, "Constraints", &model.constraints);
  out.truncate(out.trim_end().len());
  out
}

/// Every field-scoped error, one per line, tagged with the record it is on.
pub fn render_errors(errors: &ValidationErrors) -> String {
  let mut lines = Vec::new();
  if let Some(message) = &errors.domain {
    lines.push(format!("domain: {message}"));
  }
  if let Some(message) = &errors.goal {
    lines.push(format!("goal: {message}"));
  }
  let scoped = [
    ("entity-name", &errors.entity_names),
    ("rel-name", &errors.relationship_names),
    ("rel-source", &errors.relationship_sources),
    ("rel-target", &errors.relationship_targets),
  ];
  for (field, map) in scoped {
    for (id, message) in map {
      lines.push(format!("{field} [{id}]: {message}"));
    }
  }
  if lines.is_empty() {
    return "No validation errors.".to_owned();
  }
  lines.join("\n")
}

#[cfg(test)]
mod tests {
  use kgprompt_core::validate::validate_state;

  use super::*;

  #[test]
  fn help_lists_every_action() {
    let text = help();
    for action in Action::all() {
      assert!(text.contains(usage(action)));
    }
    assert!(text.contains("prop-constraint"));
  }

  #[test]
  fn model_listing_shows_ids_and_fields() {
    let model = Ontology::defaults();
    let text = render_model(&model);
    let doctor = &model.entities[0];
    assert!(text.contains(&format!("[{}] Doctor < Person", doctor.id)));
    assert!(text.contains(&format!("[{}] npi: string (unique)", doctor.properties[1].id)));
    assert!(text.contains("PRESCRIBES: Doctor -> Drug {dosage, frequency}"));
    assert!(text.contains("Constraints:\n  Use only the listed Classes"));
    assert!(text.contains("Inference:\n  -"));
  }

  #[test]
  fn errors_are_tagged_with_record_ids() {
    let model = Ontology::initial();
    let text = render_errors(&validate_state(&model));
    assert!(text.contains("domain: Domain name is required."));
    assert!(text.contains(&format!("entity-name [{}]", model.entities[0].id)));
    assert!(text.contains(&format!("rel-target [{}]", model.relationships[0].id)));

    assert_eq!(render_errors(&validate_state(&Ontology::defaults())), "No validation errors.");
  }
}
