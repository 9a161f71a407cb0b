//! A registry of asynchronous locks, one exclusive lock per key.
//!
//! Locks are created the first time a key is requested and evicted as soon as
//! nobody holds or waits for them any more, so the registry only ever contains
//! keys that are currently in use.
//!
//! ```
//! use gehi_core::KeyedMutex;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mutex = KeyedMutex::new();
//! let guard = mutex.acquire("berlin").await;
//! assert!(mutex.try_acquire("berlin").is_none());
//! assert!(mutex.try_acquire("paris").is_some());
//! drop(guard);
//! assert!(mutex.is_empty());
//! # }
//! ```

use anyhow::{Result, anyhow};
use parking_lot::Mutex;
use std::{
	collections::HashMap,
	fmt::Debug,
	sync::{Arc, LazyLock},
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

static GLOBAL: LazyLock<Arc<KeyedMutex>> = LazyLock::new(|| Arc::new(KeyedMutex::new()));

struct Slot {
	lock: Arc<AsyncMutex<()>>,
	/// holders plus waiters
	leases: usize,
}

type SlotMap = HashMap<String, Slot>;

/// One exclusive lock per key, shared by every caller of the same `KeyedMutex`.
#[derive(Default)]
pub struct KeyedMutex {
	slots: Arc<Mutex<SlotMap>>,
}

impl KeyedMutex {
	pub fn new() -> Self {
		Self::default()
	}

	/// The process-wide instance.
	pub fn global() -> Arc<KeyedMutex> {
		Arc::clone(&GLOBAL)
	}

	/// Wait until the lock for `key` is free and take it.
	pub async fn acquire(&self, key: &str) -> KeyedMutexGuard {
		let lease = self.lease(key);
		let guard = Arc::clone(&lease.lock).lock_owned().await;
		KeyedMutexGuard { _guard: guard, lease }
	}

	/// Like [`KeyedMutex::acquire`], but gives up as soon as `cancel` fires.
	pub async fn acquire_cancellable(&self, key: &str, cancel: &CancellationToken) -> Result<KeyedMutexGuard> {
		let lease = self.lease(key);
		let lock = Arc::clone(&lease.lock);
		tokio::select! {
			biased;
			() = cancel.cancelled() => {
				log::debug!("lock acquisition for '{key}' was cancelled");
				Err(anyhow!("lock acquisition for '{key}' was cancelled"))
			}
			guard = lock.lock_owned() => Ok(KeyedMutexGuard { _guard: guard, lease }),
		}
	}

	/// Take the lock for `key` only if nobody holds it right now.
	pub fn try_acquire(&self, key: &str) -> Option<KeyedMutexGuard> {
		let lease = self.lease(key);
		let guard = Arc::clone(&lease.lock).try_lock_owned().ok()?;
		Some(KeyedMutexGuard { _guard: guard, lease })
	}

	/// Number of keys that are currently held or waited for.
	pub fn len(&self) -> usize {
		self.slots.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.lock().is_empty()
	}

	fn lease(&self, key: &str) -> Lease {
		let mut slots = self.slots.lock();
		let slot = slots.entry(key.to_owned()).or_insert_with(|| Slot {
			lock: Arc::new(AsyncMutex::new(())),
			leases: 0,
		});
		slot.leases += 1;
		Lease {
			slots: Arc::clone(&self.slots),
			key: key.to_owned(),
			lock: Arc::clone(&slot.lock),
		}
	}
}

impl Debug for KeyedMutex {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let slots = self.slots.lock();
		let mut keys: Vec<&String> = slots.keys().collect();
		keys.sort();
		f.debug_struct("KeyedMutex").field("keys", &keys).finish()
	}
}

/// Registration of one holder or waiter for a key. The slot is removed when the last lease drops.
struct Lease {
	slots: Arc<Mutex<SlotMap>>,
	key: String,
	lock: Arc<AsyncMutex<()>>,
}

impl Drop for Lease {
	fn drop(&mut self) {
		let mut slots = self.slots.lock();
		if let Some(slot) = slots.get_mut(&self.key) {
			slot.leases -= 1;
			if slot.leases == 0 {
				slots.remove(&self.key);
			}
		}
	}
}

/// Holds the lock for one key; releases it on drop.
pub struct KeyedMutexGuard {
	// dropped before `lease`, so the lock is free before the slot can be evicted
	_guard: OwnedMutexGuard<()>,
	lease: Lease,
}

impl KeyedMutexGuard {
	pub fn key(&self) -> &str {
		&self.lease.key
	}
}

impl Debug for KeyedMutexGuard {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("KeyedMutexGuard")
			.field("key", &self.lease.key)
			.finish_non_exhaustive()
	}
}
