//! Debounced persistence of the canonical model.
//!
//! [`Persistence::schedule_save`] snapshots the payload immediately and owns
//! a single pending write task. Scheduling again cancels that task and starts
//! a new one, so only the last model in a burst of edits reaches the store.
//! A write that fails in the background is kept until the owner collects it
//! with [`Persistence::take_failure`].

use std::{
  sync::{Arc, Mutex},
  time::Duration,
};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  migrate::{decode_saved, serialize_state},
  model::Ontology,
  store::StateStore,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);
pub const DEFAULT_STORAGE_KEY: &str = "kg-prompt-generator:v1";

struct Pending {
  payload: String,
  task:    JoinHandle<()>,
}

/// Owns the debounce timer for one storage key.
///
/// Must be used from within a tokio runtime.
pub struct Persistence<S> {
  store:   Arc<S>,
  key:     String,
  delay:   Duration,
  pending: Option<Pending>,
  failure: Arc<Mutex<Option<Error>>>,
}

impl<S: StateStore + 'static> Persistence<S> {
  pub fn new(store: S) -> Self {
    Self {
      store:   Arc::new(store),
      key:     DEFAULT_STORAGE_KEY.to_owned(),
      delay:   DEFAULT_DEBOUNCE,
      pending: None,
      failure: Arc::default(),
    }
  }

  pub fn with_key(mut self, key: impl Into<String>) -> Self {
    self.key = key.into();
    self
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn key(&self) -> &str { &self.key }

  /// Read and migrate the saved model. A missing row, a backend error or an
  /// undecodable payload all yield `None`.
  pub async fn load_saved_state(&self) -> Option<Ontology> {
    match self.store.read_blob(&self.key).await {
      Ok(Some(payload)) => {
        let model = decode_saved(&payload)?;
        info!(key = %self.key, entities = model.entities.len(), "loaded saved state");
        Some(model)
      }
      Ok(None) => {
        debug!(key = %self.key, "no saved state");
        None
      }
      Err(e) => {
        warn!(key = %self.key, error = %e, "unable to read saved state");
        None
      }
    }
  }

  /// Cancel any pending write and schedule `model` to be written after the
  /// debounce window.
  pub fn schedule_save(&mut self, model: &Ontology) -> Result<()> {
    let payload = serde_json::to_string(&serialize_state(model)?)?;
    self.cancel_pending();

    let store = Arc::clone(&self.store);
    let key = self.key.clone();
    let delay = self.delay;
    let body = payload.clone();
    let failure = Arc::clone(&self.failure);
    let task = tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      match store.write_blob(&key, body).await {
        Ok(()) => debug!(key = %key, "saved state"),
        Err(e) => {
          warn!(key = %key, error = %e, "unable to save state");
          if let Ok(mut slot) = failure.lock() {
            *slot = Some(Error::Storage(Box::new(e)));
          }
        }
      }
    });

    debug!(delay_ms = delay.as_millis() as u64, "save scheduled");
    self.pending = Some(Pending { payload, task });
    Ok(())
  }

  /// The most recent background write failure, if any, clearing it.
  pub fn take_failure(&self) -> Option<Error> { self.failure.lock().ok()?.take() }

  /// Whether a scheduled write has not completed yet.
  pub fn has_pending(&self) -> bool {
    self.pending.as_ref().is_some_and(|p| !p.task.is_finished())
  }

  /// Write any still-pending payload now instead of waiting for the timer.
  pub async fn flush(&mut self) -> Result<()> {
    let Some(Pending { payload, task }) = self.pending.take() else {
      return Ok(());
    };
    if task.is_finished() {
      return Ok(());
    }
    task.abort();
    self.write(payload).await
  }

  /// Write `model` immediately, superseding any pending write.
  pub async fn save_now(&mut self, model: &Ontology) -> Result<()> {
    let payload = serde_json::to_string(&serialize_state(model)?)?;
    self.cancel_pending();
    self.write(payload).await
  }

  fn cancel_pending(&mut self) {
    if let Some(pending) = self.pending.take() {
      pending.task.abort();
    }
  }

  async fn write(&self, payload: String) -> Result<()> {
    self
      .store
      .write_blob(&self.key, payload)
      .await
      .map_err(|e| Error::Storage(Box::new(e)))?;
    info!(key = %self.key, "saved state");
    Ok(())
  }
}
