//! In-place mutation of an [`Ontology`].
//!
//! Ids are assigned when a record is created here and never touched by later
//! edits. The model is allowed to pass through invalid states (blank or
//! duplicate names, dangling relationship endpoints) while the user types;
//! [`crate::validate`] reports those separately.

use crate::{
  Error, Result,
  action::Field,
  model::{Entity, Ontology, Property, PropertyConstraint, Relationship},
};

/// The record an [`Edit`] applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  Ontology,
  Entity(String),
  Property { entity: String, property: String },
  Relationship(String),
}

/// A single field change coming from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
  pub field:  Field,
  pub target: Target,
  pub value:  String,
}

impl Edit {
  pub fn new(field: Field, target: Target, value: impl Into<String>) -> Self {
    Self { field, target, value: value.into() }
  }
}

impl Ontology {
  // ── Entities ──────────────────────────────────────────────────────────

  /// Append a blank entity and return its id.
  pub fn add_entity(&mut self) -> String {
    let entity = Entity::empty();
    let id = entity.id.clone();
    self.entities.push(entity);
    id
  }

  pub fn remove_entity(&mut self, id: &str) -> Result<Entity> {
    let pos = self
      .entities
      .iter()
      .position(|e| e.id == id)
      .ok_or_else(|| Error::EntityNotFound(id.to_owned()))?;
    Ok(self.entities.remove(pos))
  }

  // ── Properties ────────────────────────────────────────────────────────

  /// Append a blank property to `entity_id` and return the property's id.
  pub fn add_property(&mut self, entity_id: &str) -> Result<String> {
    let entity = self
      .entity_mut(entity_id)
      .ok_or_else(|| Error::EntityNotFound(entity_id.to_owned()))?;
    let property = Property::empty();
    let id = property.id.clone();
    entity.properties.push(property);
    Ok(id)
  }

  /// Remove a property. Removing an entity's last property re-seeds one
  /// blank property so the entity always has a row to edit.
  pub fn remove_property(&mut self, entity_id: &str, property_id: &str) -> Result<Property> {
    let entity = self
      .entity_mut(entity_id)
      .ok_or_else(|| Error::EntityNotFound(entity_id.to_owned()))?;
    let pos = entity
      .properties
      .iter()
      .position(|p| p.id == property_id)
      .ok_or_else(|| Error::PropertyNotFound {
        entity:   entity_id.to_owned(),
        property: property_id.to_owned(),
      })?;
    let removed = entity.properties.remove(pos);
    if entity.properties.is_empty() {
      entity.properties.push(Property::empty());
    }
    Ok(removed)
  }

  // ── Relationships ─────────────────────────────────────────────────────

  pub fn add_relationship(&mut self) -> String {
    let relationship = Relationship::empty();
    let id = relationship.id.clone();
    self.relationships.push(relationship);
    id
  }

  pub fn remove_relationship(&mut self, id: &str) -> Result<Relationship> {
    let pos = self
      .relationships
      .iter()
      .position(|r| r.id == id)
      .ok_or_else(|| Error::RelationshipNotFound(id.to_owned()))?;
    Ok(self.relationships.remove(pos))
  }

  /// Seed one blank entity and one blank relationship when either list is
  /// empty, e.g. after importing a sparse file.
  pub fn ensure_editable(&mut self) {
    if self.entities.is_empty() {
      self.entities.push(Entity::empty());
    }
    if self.relationships.is_empty() {
      self.relationships.push(Relationship::empty());
    }
  }

  // ── Field edits ───────────────────────────────────────────────────────

  /// Apply one field edit. The edit's target must match the field's scope.
  pub fn apply_edit(&mut self, edit: Edit) -> Result<()> {
    let Edit { field, target, value } = edit;

    match field {
      Field::Domain => {
        ontology_target(field, &target)?;
        self.domain = value;
      }
      Field::Goal => {
        ontology_target(field, &target)?;
        self.goal = value;
      }
      Field::Inference => {
        ontology_target(field, &target)?;
        self.inference = value;
      }
      Field::Constraints => {
        ontology_target(field, &target)?;
        self.constraints = value;
      }

      Field::EntityName => self.entity_target(field, target)?.name = value,
      Field::EntityParent => self.entity_target(field, target)?.parent = value,
      Field::EntityDesc => self.entity_target(field, target)?.desc = value,

      Field::PropName => self.property_target(field, target)?.name = value,
      Field::PropType => self.property_target(field, target)?.kind = value,
      Field::PropConstraint => {
        self.property_target(field, target)?.constraint = PropertyConstraint::parse_lenient(&value)
      }

      Field::RelName => self.relationship_target(field, target)?.name = value,
      Field::RelSource => self.relationship_target(field, target)?.source = value,
      Field::RelTarget => self.relationship_target(field, target)?.target = value,
      Field::RelProps => self.relationship_target(field, target)?.props = value,
    }

    Ok(())
  }

  fn entity_target(&mut self, field: Field, target: Target) -> Result<&mut Entity> {
    let Target::Entity(id) = target else {
      return Err(Error::MissingTarget(field.to_string()));
    };
    self.entity_mut(&id).ok_or(Error::EntityNotFound(id))
  }

  fn property_target(&mut self, field: Field, target: Target) -> Result<&mut Property> {
    let Target::Property { entity, property } = target else {
      return Err(Error::MissingTarget(field.to_string()));
    };
    self
      .entity_mut(&entity)
      .ok_or_else(|| Error::EntityNotFound(entity.clone()))?
      .property_mut(&property)
      .ok_or(Error::PropertyNotFound { entity, property })
  }

  fn relationship_target(&mut self, field: Field, target: Target) -> Result<&mut Relationship> {
    let Target::Relationship(id) = target else {
      return Err(Error::MissingTarget(field.to_string()));
    };
    self
      .relationship_mut(&id)
      .ok_or(Error::RelationshipNotFound(id))
  }
}

fn ontology_target(field: Field, target: &Target) -> Result<()> {
  match target {
    Target::Ontology => Ok(()),
    _ => Err(Error::MissingTarget(field.to_string())),
  }
}
