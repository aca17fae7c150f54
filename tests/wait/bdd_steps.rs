//! BDD step definitions for status waits.

use std::time::Duration;

use fvm_cli::{ApiError, WaitError, WaitOptions, wait_for_status};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;

use super::test_helpers::{WaitContext, WaitOutcome};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Wait(#[from] WaitError),
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a VM \"{vm_id}\" that reports \"{statuses}\"")]
fn vm_reports(mut wait_context: WaitContext, vm_id: String, statuses: String) -> WaitContext {
    wait_context.vm_id = vm_id;
    for status in statuses.split(',').map(str::trim) {
        wait_context.source.push_status(&wait_context.vm_id, status);
    }
    wait_context
}

#[given("a VM \"{vm_id}\" whose first lookup fails")]
fn first_lookup_fails(mut wait_context: WaitContext, vm_id: String) -> WaitContext {
    wait_context.source.push_error(ApiError::VmNotFound {
        vm_id: vm_id.clone(),
    });
    wait_context.vm_id = vm_id;
    wait_context
}

#[given("the VM then reports \"{status}\"")]
fn then_reports(wait_context: WaitContext, status: String) -> WaitContext {
    wait_context.source.push_status(&wait_context.vm_id, &status);
    wait_context
}

#[when("I wait up to {millis} milliseconds for status \"{status}\"")]
fn wait_for(
    wait_context: WaitContext,
    millis: u64,
    status: String,
) -> Result<WaitContext, StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let options = WaitOptions::new(Duration::from_millis(millis), POLL_INTERVAL)?;
    let source = wait_context.source.clone();
    let vm_id = wait_context.vm_id.clone();
    let result = runtime
        .block_on(async move { wait_for_status(source.as_ref(), &vm_id, &status, options).await });
    let outcome = match result {
        Ok(vm) => WaitOutcome::Reached { status: vm.status },
        Err(err) => WaitOutcome::Failed(err),
    };
    Ok(WaitContext {
        outcome: Some(outcome),
        ..wait_context
    })
}

#[then("the wait succeeds with status \"{status}\"")]
fn wait_succeeds(wait_context: &WaitContext, status: String) -> Result<(), StepError> {
    match wait_context.outcome {
        Some(WaitOutcome::Reached { status: ref reached }) if *reached == status => Ok(()),
        Some(WaitOutcome::Reached { status: ref reached }) => Err(StepError::Assertion(
            format!("expected status {status}, got {reached}"),
        )),
        Some(WaitOutcome::Failed(ref err)) => Err(StepError::Assertion(format!(
            "expected success, got failure: {err}"
        ))),
        None => Err(StepError::Assertion(String::from("wait was not executed"))),
    }
}

#[then("the VM was polled {count} times")]
fn polled_times(wait_context: &WaitContext, count: usize) -> Result<(), StepError> {
    let calls = wait_context.source.calls();
    if calls == count {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {count} polls, saw {calls}"
        )))
    }
}

#[then("the wait times out for VM \"{vm_id}\"")]
fn wait_times_out(wait_context: &WaitContext, vm_id: String) -> Result<(), StepError> {
    match wait_context.outcome {
        Some(WaitOutcome::Failed(WaitError::Timeout {
            vm_id: ref timed_out,
            ref target,
            ..
        })) if *timed_out == vm_id && target == "Active" => Ok(()),
        Some(ref other) => Err(StepError::Assertion(format!(
            "expected a timeout for {vm_id}, got {other:?}"
        ))),
        None => Err(StepError::Assertion(String::from("wait was not executed"))),
    }
}
