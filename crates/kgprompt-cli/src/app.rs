//! Application state and command dispatcher.

use std::path::PathBuf;

use kgprompt_core::{
  Error,
  action::Action,
  persist::Persistence,
  store::StateStore,
};
use tracing::{info, warn};

use crate::{clipboard, command::Command, session::Session, view};

pub const DEFAULTS_LOADED: &str = "✅ Form populated with default research values!";
pub const FIX_ERRORS: &str = "Please fix the highlighted errors before generating.";
pub const COPIED: &str = "Copied prompt to clipboard!";
pub const COPY_FAILED: &str = "Unable to copy. Select the text and copy manually.";
pub const NOTHING_TO_COPY: &str = "Generate a prompt before copying.";
pub const EXPORTED: &str = "Exported configuration JSON.";
pub const IMPORTED: &str = "Imported configuration JSON.";
pub const INVALID_IMPORT: &str = "Invalid JSON file. Please check the format.";
pub const SAVE_FAILED: &str = "Unable to save changes:";

/// Whether the editor loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  Continue,
  Quit,
}

/// Settings the [`App`] needs beyond its store.
#[derive(Debug, Clone)]
pub struct Options {
  pub export_path:       PathBuf,
  pub clipboard_command: String,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S: StateStore + 'static> {
  /// The model being edited and the last generated prompt.
  pub session: Session,

  /// Debounced writer for the session's model.
  persistence: Persistence<S>,

  options: Options,

  /// Lines produced by the last command, drained by the caller.
  notices: Vec<String>,
}

impl<S: StateStore + 'static> App<S> {
  /// Restore the saved session, or start a fresh one.
  pub async fn start(persistence: Persistence<S>, options: Options) -> Self {
    let session = match persistence.load_saved_state().await {
      Some(model) => Session::new(model),
      None => Session::default(),
    };
    Self { session, persistence, options, notices: Vec::new() }
  }

  pub fn take_notices(&mut self) -> Vec<String> { std::mem::take(&mut self.notices) }

  fn notify(&mut self, message: impl Into<String>) { self.notices.push(message.into()); }

  /// Write any pending save. Call before exiting.
  pub async fn shutdown(&mut self) -> kgprompt_core::Result<()> {
    self.persistence.flush().await
  }

  // ── Dispatch ──────────────────────────────────────────────────────────

  pub async fn execute(&mut self, command: Command) -> Flow {
    match command {
      Command::Run(action, args) => self.run(action, &args).await,
      Command::Set(edit) => match self.session.apply_edit(edit) {
        Ok(()) => self.after_mutation(),
        Err(e) => self.notify(format!("Error: {e}")),
      },
      Command::Show => self.notify(view::render_model(self.session.model())),
      Command::Errors => self.notify(view::render_errors(&self.session.validate())),
      Command::Help => self.notify(view::help()),
      Command::Quit => return Flow::Quit,
    }
    self.report_save_failure();
    Flow::Continue
  }

  /// Surface a debounced write that failed since the last command.
  fn report_save_failure(&mut self) {
    if let Some(e) = self.persistence.take_failure() {
      self.notify(format!("{SAVE_FAILED} {e}"));
    }
  }

  async fn run(&mut self, action: Action, args: &[String]) {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match (action, args.as_slice()) {
      (Action::AddEntity, []) => {
        let id = self.session.add_entity();
        self.notify(format!("Added entity {id}"));
        self.after_mutation();
      }
      (Action::AddRelationship, []) => {
        let id = self.session.add_relationship();
        self.notify(format!("Added relationship {id}"));
        self.after_mutation();
      }
      (Action::AddProperty, [entity]) => {
        let result = self.session.add_property(entity);
        self.mutated(result.map(|id| format!("Added property {id}")));
      }
      (Action::RemoveEntity, [id]) => {
        let result = self.session.remove_entity(id);
        self.mutated(result.map(|()| format!("Removed entity {id}")));
      }
      (Action::RemoveRelationship, [id]) => {
        let result = self.session.remove_relationship(id);
        self.mutated(result.map(|()| format!("Removed relationship {id}")));
      }
      (Action::RemoveProperty, [entity, property]) => {
        let result = self.session.remove_property(entity, property);
        self.mutated(result.map(|()| format!("Removed property {property}")));
      }
      (Action::UseDefaults, []) => {
        self.session.load_defaults();
        self.notify(DEFAULTS_LOADED);
        self.after_mutation();
      }
      (Action::ExportJson, []) => {
        let path = self.options.export_path.clone();
        self.export(path).await;
      }
      (Action::ExportJson, [path]) => self.export(PathBuf::from(path)).await,
      (Action::ImportJson, [path]) => self.import(PathBuf::from(path)).await,
      (Action::Generate, []) => self.generate(),
      (Action::Copy, []) => self.copy().await,
      _ => self.notify(format!("usage: {}", view::usage(action))),
    }
  }

  fn mutated(&mut self, result: kgprompt_core::Result<String>) {
    match result {
      Ok(message) => {
        self.notify(message);
        self.after_mutation();
      }
      Err(e) => self.notify(format!("Error: {e}")),
    }
  }

  /// Re-validate, report what needs fixing, and schedule a save.
  fn after_mutation(&mut self) {
    let errors = self.session.validate();
    for line in errors.summary(self.session.model()) {
      self.notify(line);
    }
    if let Err(e) = self.persistence.schedule_save(self.session.model()) {
      warn!(error = %e, "unable to schedule save");
      self.notify(format!("Error: {e}"));
    }
  }

  // ── Actions with side effects ─────────────────────────────────────────

  fn generate(&mut self) {
    let result = self
      .session
      .generate()
      .map(|output| format!("{}\n\nFingerprint: {}", output.prompt, output.fingerprint));
    match result {
      Ok(message) => self.notify(message),
      Err(Error::ValidationFailed(errors)) => {
        self.notify(FIX_ERRORS);
        for line in errors.summary(self.session.model()) {
          self.notify(line);
        }
      }
      Err(e) => self.notify(format!("Error: {e}")),
    }
  }

  async fn copy(&mut self) {
    let Some(output) = self.session.output() else {
      self.notify(NOTHING_TO_COPY);
      return;
    };
    let result = clipboard::copy(&self.options.clipboard_command, &output.prompt).await;
    match result {
      Ok(()) => self.notify(COPIED),
      Err(e) => {
        warn!(error = %e, "copy failed");
        self.notify(COPY_FAILED);
      }
    }
  }

  async fn export(&mut self, path: PathBuf) {
    let payload = match self.session.export_json() {
      Ok(payload) => payload,
      Err(e) => {
        self.notify(format!("Error: {e}"));
        return;
      }
    };
    match tokio::fs::write(&path, payload).await {
      Ok(()) => {
        info!(path = %path.display(), "exported configuration");
        self.notify(EXPORTED);
      }
      Err(e) => {
        warn!(path = %path.display(), error = %e, "export failed");
        self.notify(format!("Unable to write {}: {e}", path.display()));
      }
    }
  }

  async fn import(&mut self, path: PathBuf) {
    let text = match tokio::fs::read_to_string(&path).await {
      Ok(text) => text,
      Err(e) => {
        warn!(path = %path.display(), error = %e, "import failed");
        self.notify(format!("Unable to read {}: {e}", path.display()));
        return;
      }
    };
    match self.session.import_json(&text) {
      Ok(()) => {
        self.after_mutation();
        self.notify(IMPORTED);
      }
      Err(e) => {
        warn!(path = %path.display(), error = %e, "rejected import");
        self.notify(INVALID_IMPORT);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use kgprompt_core::{
    action::Field,
    edit::{Edit, Target},
    migrate::decode_saved,
    persist::DEFAULT_STORAGE_KEY,
    store::MemoryStore,
  };

  use super::*;

  fn options(dir: &std::path::Path) -> Options {
    Options {
      export_path:       dir.join("kg-prompt-config.json"),
      clipboard_command: "cat".into(),
    }
  }

  async fn app(store: &MemoryStore, dir: &std::path::Path) -> App<MemoryStore> {
    let persistence = Persistence::new(store.clone()).with_delay(Duration::from_millis(10));
    App::start(persistence, options(dir)).await
  }

  fn run(action: Action, args: &[&str]) -> Command {
    Command::Run(action, args.iter().map(|a| a.to_string()).collect())
  }

  #[tokio::test]
  async fn starts_fresh_without_saved_state() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&MemoryStore::new(), dir.path()).await;
    assert_eq!(app.session.model().entities.len(), 1);
  }

  #[tokio::test]
  async fn restores_saved_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::new();
    {
      let mut first = app(&store, dir.path()).await;
      first.execute(run(Action::UseDefaults, &[])).await;
      first.shutdown().await.unwrap();
    }
    let second = app(&store, dir.path()).await;
    assert_eq!(second.session.model().domain, "Medical Research & Clinical Trials");
  }

  #[tokio::test]
  async fn defaults_then_generate_and_copy() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(&MemoryStore::new(), dir.path()).await;

    app.execute(run(Action::Copy, &[])).await;
    assert_eq!(app.take_notices(), vec![NOTHING_TO_COPY.to_owned()]);

    app.execute(run(Action::UseDefaults, &[])).await;
    assert_eq!(app.take_notices(), vec![DEFAULTS_LOADED.to_owned()]);

    app.execute(run(Action::Generate, &[])).await;
    let notices = app.take_notices();
    assert!(notices[0].starts_with("# SYSTEM PROMPT"));
    assert!(notices[0].contains("Fingerprint: "));

    app.execute(run(Action::Copy, &[])).await;
    assert_eq!(app.take_notices(), vec![COPIED.to_owned()]);
  }

  #[tokio::test]
  async fn generate_reports_errors_on_invalid_model() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(&MemoryStore::new(), dir.path()).await;

    app.execute(run(Action::Generate, &[])).await;
    let notices = app.take_notices();
    assert_eq!(notices[0], FIX_ERRORS);
    assert!(notices.contains(&"Missing domain name.".to_owned()));
    assert!(app.session.output().is_none());
  }

  #[tokio::test]
  async fn copy_failure_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(&MemoryStore::new(), dir.path()).await;
    app.options.clipboard_command = "false".into();

    app.execute(run(Action::UseDefaults, &[])).await;
    app.execute(run(Action::Generate, &[])).await;
    app.take_notices();

    app.execute(run(Action::Copy, &[])).await;
    assert_eq!(app.take_notices(), vec![COPY_FAILED.to_owned()]);
  }

  #[tokio::test]
  async fn edits_are_saved_after_the_debounce_window() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::new();
    let mut app = app(&store, dir.path()).await;

    for value in ["M", "Me", "Med"] {
      app
        .execute(Command::Set(Edit::new(Field::Domain, Target::Ontology, value)))
        .await;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(store.write_count(), 1);
    let saved = decode_saved(&store.get(DEFAULT_STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(saved.domain, "Med");
  }

  #[tokio::test]
  async fn export_and_import_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(&MemoryStore::new(), dir.path()).await;

    app.execute(run(Action::UseDefaults, &[])).await;
    app.execute(run(Action::ExportJson, &[])).await;
    assert!(app.take_notices().contains(&EXPORTED.to_owned()));
    let exported = dir.path().join("kg-prompt-config.json");
    assert!(std::fs::read_to_string(&exported).unwrap().contains("\"schemaVersion\": 1"));

    let mut other = App::start(
      Persistence::new(MemoryStore::new()),
      options(dir.path()),
    )
    .await;
    let path = exported.to_string_lossy().into_owned();
    other.execute(run(Action::ImportJson, &[path.as_str()])).await;
    assert_eq!(other.take_notices(), vec![IMPORTED.to_owned()]);
    assert_eq!(other.session.model(), app.session.model());
  }

  #[tokio::test]
  async fn invalid_import_leaves_state_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(&MemoryStore::new(), dir.path()).await;
    app.execute(run(Action::UseDefaults, &[])).await;
    let before = app.session.model().clone();

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ broken").unwrap();
    let bad = bad.to_string_lossy().into_owned();
    app.take_notices();
    app.execute(run(Action::ImportJson, &[bad.as_str()])).await;

    assert_eq!(app.take_notices(), vec![INVALID_IMPORT.to_owned()]);
    assert_eq!(app.session.model(), &before);
  }

  #[tokio::test]
  async fn wrong_arguments_print_usage() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(&MemoryStore::new(), dir.path()).await;

    app.execute(run(Action::AddProperty, &[])).await;
    assert_eq!(app.take_notices(), vec!["usage: add-property <entity-id>".to_owned()]);

    app.execute(run(Action::RemoveEntity, &["missing"])).await;
    assert_eq!(app.take_notices(), vec!["Error: entity not found: missing".to_owned()]);
  }

  /// Refuses every write.
  struct ReadOnlyStore;

  impl StateStore for ReadOnlyStore {
    type Error = std::io::Error;

    async fn read_blob<'a>(&'a self, _key: &'a str) -> Result<Option<String>, std::io::Error> {
      Ok(None)
    }

    async fn write_blob<'a>(&'a self, _key: &'a str, _payload: String) -> Result<(), std::io::Error> {
      Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "disk is read-only"))
    }
  }

  #[tokio::test]
  async fn failed_background_save_is_reported_once() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = Persistence::new(ReadOnlyStore).with_delay(Duration::from_millis(10));
    let mut app = App::start(persistence, options(dir.path())).await;

    app
      .execute(Command::Set(Edit::new(Field::Domain, Target::Ontology, "Med")))
      .await;
    app.take_notices();
    tokio::time::sleep(Duration::from_millis(200)).await;

    app.execute(Command::Errors).await;
    let notices = app.take_notices();
    let failure = notices.last().unwrap();
    assert!(failure.starts_with(SAVE_FAILED));
    assert!(failure.contains("disk is read-only"));

    app.execute(Command::Errors).await;
    assert!(!app.take_notices().iter().any(|n| n.starts_with(SAVE_FAILED)));
    assert_eq!(app.session.model().domain, "Med");
  }

  #[tokio::test]
  async fn quit_stops_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(&MemoryStore::new(), dir.path()).await;
    assert_eq!(app.execute(Command::Quit).await, Flow::Quit);
    assert_eq!(app.execute(Command::Help).await, Flow::Continue);
  }
}
