//! Identifier generation for entities, properties and relationships.
//!
//! Ids are generated once, when a record is created, and never regenerated.
//! Ids read from persisted or imported data are reused verbatim.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh, process-unique identifier.
///
/// Uses a random v4 UUID wherever the target has an OS entropy source and
/// falls back to [`sequential_id`] where it does not.
pub fn new_id() -> String {
  #[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
  {
    uuid::Uuid::new_v4().to_string()
  }

  #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
  {
    sequential_id()
  }
}

/// `id-<unix millis>-<counter>`. Unique within the running process; the
/// counter is not persisted across restarts.
pub fn sequential_id() -> String {
  let n = COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
  format!("id-{}-{n}", Utc::now().timestamp_millis())
}
