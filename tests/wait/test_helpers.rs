//! Shared fixtures for status wait scenarios.

use std::sync::Arc;

use fvm_cli::WaitError;
use fvm_cli::test_support::ScriptedVmSource;
use rstest::fixture;

#[derive(Clone, Debug)]
pub enum WaitOutcome {
    Reached { status: String },
    Failed(WaitError),
}

#[derive(Clone, Debug)]
pub struct WaitContext {
    pub vm_id: String,
    pub source: Arc<ScriptedVmSource>,
    pub outcome: Option<WaitOutcome>,
}

#[fixture]
pub fn wait_context() -> WaitContext {
    WaitContext {
        vm_id: String::from("vm-1"),
        source: Arc::new(ScriptedVmSource::new()),
        outcome: None,
    }
}
