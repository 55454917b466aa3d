//! The editor session: one explicitly owned model plus the last generated
//! prompt. No I/O happens here; the [`crate::app::App`] drives it.

use kgprompt_core::{
  Result,
  edit::Edit,
  migrate,
  model::Ontology,
  validate::{ValidationErrors, validate_state},
};
use tracing::info;

/// A compiled prompt and its content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
  pub prompt:      String,
  pub fingerprint: String,
}

#[derive(Debug, Clone)]
pub struct Session {
  model:  Ontology,
  output: Option<Output>,
}

impl Default for Session {
  fn default() -> Self { Self::new(Ontology::initial()) }
}

impl Session {
  pub fn new(model: Ontology) -> Self { Self { model, output: None } }

  pub fn model(&self) -> &Ontology { &self.model }

  pub fn output(&self) -> Option<&Output> { self.output.as_ref() }

  // ── Records ───────────────────────────────────────────────────────────

  pub fn add_entity(&mut self) -> String { self.model.add_entity() }

  pub fn remove_entity(&mut self, id: &str) -> Result<()> {
    self.model.remove_entity(id).map(drop)
  }

  pub fn add_relationship(&mut self) -> String { self.model.add_relationship() }

  pub fn remove_relationship(&mut self, id: &str) -> Result<()> {
    self.model.remove_relationship(id).map(drop)
  }

  pub fn add_property(&mut self, entity_id: &str) -> Result<String> {
    self.model.add_property(entity_id)
  }

  pub fn remove_property(&mut self, entity_id: &str, property_id: &str) -> Result<()> {
    self.model.remove_property(entity_id, property_id).map(drop)
  }

  pub fn apply_edit(&mut self, edit: Edit) -> Result<()> { self.model.apply_edit(edit) }

  // ── Whole-model operations ────────────────────────────────────────────

  pub fn load_defaults(&mut self) { self.replace(Ontology::defaults()); }

  /// Swap in a new model wholesale. The previous output is kept until the
  /// next successful generate.
  pub fn replace(&mut self, model: Ontology) { self.model = model; }

  /// Replace the model with an imported file. On any error the current model
  /// is left untouched.
  pub fn import_json(&mut self, text: &str) -> Result<()> {
    let model = migrate::import_json(text)?;
    info!(
      entities = model.entities.len(),
      relationships = model.relationships.len(),
      "imported configuration"
    );
    self.replace(model);
    Ok(())
  }

  pub fn export_json(&self) -> Result<String> { migrate::export_json(&self.model) }

  pub fn validate(&self) -> ValidationErrors { validate_state(&self.model) }

  /// Compile the current model. Validation errors block generation and keep
  /// the previous output.
  pub fn generate(&mut self) -> Result<&Output> {
    let prompt = kgprompt_prompt::compile(&self.model)?;
    let fingerprint = kgprompt_prompt::fingerprint(&prompt);
    Ok(self.output.insert(Output { prompt, fingerprint }))
  }
}
