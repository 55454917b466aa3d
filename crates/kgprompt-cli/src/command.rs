//! Parsing of editor input lines into [`Command`]s.

use anyhow::{Result, bail};
use kgprompt_core::{
  action::{Action, Field, FieldScope},
  edit::{Edit, Target},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// One of the editor actions, with its positional arguments.
  Run(Action, Vec<String>),
  Set(Edit),
  Show,
  Errors,
  Help,
  Quit,
}

/// Split off the first whitespace-delimited word.
fn next_word(input: &str) -> Option<(&str, &str)> {
  let input = input.trim_start();
  if input.is_empty() {
    return None;
  }
  let end = input.find(char::is_whitespace).unwrap_or(input.len());
  let (word, rest) = input.split_at(end);
  Some((word, rest.trim_start()))
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
  let Some((head, rest)) = next_word(line.trim_end_matches(['\r', '\n'])) else {
    return Ok(None);
  };

  let command = match head {
    "show" => Command::Show,
    "errors" => Command::Errors,
    "help" | "?" => Command::Help,
    "quit" | "exit" => Command::Quit,
    "set" => Command::Set(parse_set(rest)?),
    tag => {
      let action = Action::parse(tag)?;
      Command::Run(action, rest.split_whitespace().map(str::to_owned).collect())
    }
  };
  Ok(Some(command))
}

/// `set <field> [ids…] <value…>`. The field decides how many ids follow; the
/// remainder of the line is the value, with `\n` standing for a newline.
fn parse_set(input: &str) -> Result<Edit> {
  let Some((tag, mut rest)) = next_word(input) else {
    bail!("usage: set <field> [ids…] <value…>");
  };
  let field = Field::parse(tag)?;

  let wanted = match field.scope() {
    FieldScope::Ontology => 0,
    FieldScope::Entity | FieldScope::Relationship => 1,
    FieldScope::Property => 2,
  };
  let mut ids = Vec::with_capacity(wanted);
  for _ in 0..wanted {
    let Some((id, tail)) = next_word(rest) else {
      bail!("{field} needs {wanted} id(s) before the value");
    };
    ids.push(id.to_owned());
    rest = tail;
  }

  let target = match (field.scope(), ids.as_slice()) {
    (FieldScope::Ontology, []) => Target::Ontology,
    (FieldScope::Entity, [id]) => Target::Entity(id.clone()),
    (FieldScope::Relationship, [id]) => Target::Relationship(id.clone()),
    (FieldScope::Property, [entity, property]) => {
      Target::Property { entity: entity.clone(), property: property.clone() }
    }
    _ => bail!("{field} needs {wanted} id(s) before the value"),
  };

  Ok(Edit::new(field, target, rest.replace("\\n", "\n")))
}
