//! The closed vocabularies through which a UI drives the model.
//!
//! [`Action`] covers the buttons, [`Field`] the editable inputs. Both parse
//! from the kebab-case tags a front end carries, and reject anything else at
//! that boundary.

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{Error, Result};

// ─── Actions ─────────────────────────────────────────────────────────────────

/// Every operation a user can trigger.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
  AddEntity,
  AddRelationship,
  AddProperty,
  RemoveEntity,
  RemoveRelationship,
  RemoveProperty,
  UseDefaults,
  ExportJson,
  ImportJson,
  Generate,
  Copy,
}

impl Action {
  pub fn parse(tag: &str) -> Result<Self> {
    tag.parse().map_err(|_| Error::UnknownAction(tag.to_owned()))
  }

  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }
}

// ─── Fields ──────────────────────────────────────────────────────────────────

/// Which record a [`Field`] lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
  Ontology,
  Entity,
  Property,
  Relationship,
}

/// Every editable input.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Field {
  Domain,
  Goal,
  Inference,
  Constraints,
  EntityName,
  EntityParent,
  EntityDesc,
  PropName,
  PropType,
  PropConstraint,
  RelName,
  RelSource,
  RelTarget,
  RelProps,
}

impl Field {
  pub fn parse(tag: &str) -> Result<Self> {
    tag.parse().map_err(|_| Error::UnknownField(tag.to_owned()))
  }

  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  pub fn scope(self) -> FieldScope {
    match self {
      Self::Domain | Self::Goal | Self::Inference | Self::Constraints => FieldScope::Ontology,
      Self::EntityName | Self::EntityParent | Self::EntityDesc => FieldScope::Entity,
      Self::PropName | Self::PropType | Self::PropConstraint => FieldScope::Property,
      Self::RelName | Self::RelSource | Self::RelTarget | Self::RelProps => {
        FieldScope::Relationship
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn action_tags_are_unique() {
    let tags: Vec<String> = Action::all().map(|a| a.to_string()).collect();
    let unique: HashSet<&String> = tags.iter().collect();
    assert_eq!(unique.len(), tags.len());
  }

  #[test]
  fn exposes_every_required_action() {
    let required = [
      "add-entity",
      "add-relationship",
      "add-property",
      "remove-entity",
      "remove-relationship",
      "remove-property",
      "use-defaults",
      "export-json",
      "import-json",
      "generate",
      "copy",
    ];
    for tag in required {
      let action = Action::parse(tag).unwrap();
      assert_eq!(action.as_ref(), tag);
    }
    assert_eq!(Action::all().count(), required.len());
  }

  #[test]
  fn unknown_action_is_rejected() {
    let err = Action::parse("delete-everything").unwrap_err();
    assert!(matches!(err, Error::UnknownAction(tag) if tag == "delete-everything"));
  }

  #[test]
  fn field_tags_round_trip_and_scope() {
    assert_eq!(Field::parse("prop-constraint").unwrap(), Field::PropConstraint);
    assert_eq!(Field::parse("rel-source").unwrap().scope(), FieldScope::Relationship);
    assert_eq!(Field::EntityDesc.to_string(), "entity-desc");
    assert!(matches!(Field::parse("colour"), Err(Error::UnknownField(_))));
  }
}
