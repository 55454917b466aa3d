//! The built-in sample ontology loaded by the "use defaults" action.

use crate::model::{Entity, Ontology, Property, PropertyConstraint, Relationship, SCHEMA_VERSION};

const DOMAIN: &str = "Medical Research & Clinical Trials";

const GOAL: &str = "Track drug-disease treatment relationships, dosage efficacy, and clinical \
                    outcomes from research papers.";

const CONSTRAINTS: &str = "Use only the listed Classes and Relationship Predicates.\n\
                           Return JSON only (no markdown, no prose).\n\
                           If nothing is found, return {\"nodes\":[],\"edges\":[]}.\n\
                           Dates must follow YYYY-MM-DD format.";

impl Ontology {
  /// A populated medical-research example. Every call mints fresh ids.
  pub fn defaults() -> Self {
    use PropertyConstraint::{Optional, Required, Unique};

    let doctor = Entity {
      name: "Doctor".into(),
      parent: "Person".into(),
      desc: "Medical professionals performing the treatment or study.".into(),
      properties: vec![
        Property::new("specialization", "string", Required),
        Property::new("npi", "string", Unique),
      ],
      ..Entity::empty()
    };

    let drug = Entity {
      name: "Drug".into(),
      parent: "Treatment".into(),
      desc: "Pharmaceutical substances administered to patients.".into(),
      properties: vec![
        Property::new("generic_name", "string", Required),
        Property::new("approval_date", "date", Optional),
      ],
      ..Entity::empty()
    };

    let prescribes = Relationship {
      name: "PRESCRIBES".into(),
      source: "Doctor".into(),
      target: "Drug".into(),
      props: "dosage, frequency".into(),
      ..Relationship::empty()
    };

    Self {
      schema_version: SCHEMA_VERSION,
      domain:         DOMAIN.into(),
      goal:           GOAL.into(),
      entities:       vec![doctor, drug],
      relationships:  vec![prescribes],
      inference:      String::new(),
      constraints:    CONSTRAINTS.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::validate::validate_state;

  #[test]
  fn defaults_are_valid() {
    let model = Ontology::defaults();
    assert!(validate_state(&model).is_valid());
    assert_eq!(model.entities.len(), 2);
    assert_eq!(model.relationships[0].name, "PRESCRIBES");
    assert_eq!(model.constraints.lines().count(), 4);
  }

  #[test]
  fn defaults_mint_fresh_ids() {
    let a = Ontology::defaults();
    let b = Ontology::defaults();
    assert_ne!(a.entities[0].id, b.entities[0].id);
    assert_ne!(a.entities[0].properties[0].id, b.entities[0].properties[0].id);
    assert_ne!(a.relationships[0].id, b.relationships[0].id);
  }
}
