//! The `StateStore` trait: durable key → blob storage for saved editor state.
//!
//! Backends (e.g. `kgprompt-store-sqlite`) implement this; the debounced
//! [`crate::persist::Persistence`] adapter is written against it.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::Future,
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A single-blob-per-key store.
///
/// All methods return `Send` futures so writes can run on spawned tasks.
pub trait StateStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the payload stored under `key`, or `None` if nothing was saved.
  fn read_blob<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Replace the payload stored under `key`.
  fn write_blob<'a>(
    &'a self,
    key: &'a str,
    payload: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── In-memory store ─────────────────────────────────────────────────────────

/// A process-local store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  blobs:  Arc<Mutex<HashMap<String, String>>>,
  writes: Arc<AtomicUsize>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Number of completed writes since creation.
  pub fn write_count(&self) -> usize { self.writes.load(Ordering::SeqCst) }

  pub fn get(&self, key: &str) -> Option<String> {
    self.blobs.lock().ok()?.get(key).cloned()
  }
}

impl StateStore for MemoryStore {
  type Error = Infallible;

  async fn read_blob<'a>(&'a self, key: &'a str) -> Result<Option<String>, Infallible> {
    Ok(self.get(key))
  }

  async fn write_blob<'a>(&'a self, key: &'a str, payload: String) -> Result<(), Infallible> {
    if let Ok(mut blobs) = self.blobs.lock() {
      blobs.insert(key.to_owned(), payload);
      self.writes.fetch_add(1, Ordering::SeqCst);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn memory_store_round_trip() {
    let store = MemoryStore::new();
    assert_eq!(store.read_blob("k").await.unwrap(), None);

    store.write_blob("k", "one".into()).await.unwrap();
    store.write_blob("k", "two".into()).await.unwrap();

    assert_eq!(store.read_blob("k").await.unwrap().as_deref(), Some("two"));
    assert_eq!(store.write_count(), 2);
  }

  #[tokio::test]
  async fn clones_share_contents() {
    let store = MemoryStore::new();
    let clone = store.clone();
    clone.write_blob("k", "v".into()).await.unwrap();
    assert_eq!(store.get("k").as_deref(), Some("v"));
  }
}
