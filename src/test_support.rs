//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeSet, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex as StdMutex, PoisonError};

use serde_json::{Value, json};
use tokio::sync::{Mutex, MutexGuard};

use crate::api::ApiError;
use crate::api::types::Vm;
use crate::wait::{LookupFuture, VmSource};

/// One scripted answer for [`ScriptedVmSource`].
#[derive(Clone, Debug)]
pub enum ScriptedLookup {
    /// The lookup returns this VM.
    Found(Vm),
    /// The lookup fails with this error.
    Failed(ApiError),
}

impl ScriptedLookup {
    fn into_result(self) -> Result<Vm, ApiError> {
        match self {
            Self::Found(vm) => Ok(vm),
            Self::Failed(error) => Err(error),
        }
    }
}

/// Scripted VM source that returns pre-seeded lookups in FIFO order.
///
/// The final response repeats once the queue drains so a wait can be driven
/// past the scripted sequence, for example into a timeout.
#[derive(Debug, Default)]
pub struct ScriptedVmSource {
    responses: StdMutex<VecDeque<ScriptedLookup>>,
    calls: AtomicUsize,
}

impl ScriptedVmSource {
    /// Creates a source with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source that reports each status in turn for `vm_id`.
    #[must_use]
    pub fn with_statuses(vm_id: &str, statuses: &[&str]) -> Self {
        let source = Self::new();
        for status in statuses {
            source.push_status(vm_id, status);
        }
        source
    }

    /// Queues a VM with the given status.
    pub fn push_status(&self, vm_id: &str, status: &str) {
        self.push(ScriptedLookup::Found(vm_with_status(vm_id, status)));
    }

    /// Queues a failed lookup.
    pub fn push_error(&self, error: ApiError) {
        self.push(ScriptedLookup::Failed(error));
    }

    fn push(&self, lookup: ScriptedLookup) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(lookup);
    }

    /// Number of lookups made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self, vm_id: &str) -> Result<Vm, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut queue = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let lookup = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        lookup.map_or_else(
            || {
                Err(ApiError::VmNotFound {
                    vm_id: vm_id.to_owned(),
                })
            },
            ScriptedLookup::into_result,
        )
    }
}

impl VmSource for ScriptedVmSource {
    fn fetch_vm<'a>(&'a self, vm_id: &'a str) -> LookupFuture<'a> {
        let response = self.next_response(vm_id);
        Box::pin(async move { response })
    }
}

/// Builds a VM with only an id and status set.
#[must_use]
pub fn vm_with_status(vm_id: &str, status: &str) -> Vm {
    Vm {
        id: vm_id.to_owned(),
        status: status.to_owned(),
        ..Vm::default()
    }
}

/// Produces a VM payload shaped like an entry of `GET vms/v3`.
#[must_use]
pub fn vm_json(vm_id: &str, name: &str, status: &str) -> Value {
    json!({
        "id": vm_id,
        "vmName": name,
        "status": status,
        "publicIp": "203.0.113.10",
        "resources": [
            {"type": "VCPU", "supply": 2},
            {"type": "RAM", "supply": 4},
            {"type": "STORAGE", "supply": 25}
        ],
        "datacenter": {"countryCode": "US", "cityCode": "NYC"},
        "ports": [{"port": 22, "protocol": "tcp"}],
        "osImage": "https://images.example/ubuntu.img",
        "createdAt": "2025-01-01T00:00:00Z",
        "pricePerEpoch": "1.25"
    })
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets `pairs` and removes `unset` while holding a global mutex.
    pub async fn apply(pairs: &[(&str, &str)], unset: &[&str]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs
                    .iter()
                    .map(|(key, _)| *key)
                    .chain(unset.iter().copied())
                    .all(|key| seen.insert(key))
            },
            "duplicate environment variable keys passed to EnvGuard"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len() + unset.len());
        for (key, value) in pairs {
            previous.push(((*key).to_owned(), env::var_os(key)));
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
        }
        for key in unset {
            previous.push(((*key).to_owned(), env::var_os(key)));
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::remove_var(key) };
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
