//! BDD scenarios for status waits.

use rstest_bdd::IntoStepResult;
use rstest_bdd_macros::scenario;

use super::test_helpers::{WaitContext, wait_context};

#[scenario(
    path = "tests/features/wait.feature",
    name = "A launching VM becomes active"
)]
fn scenario_launching_vm_becomes_active(wait_context: WaitContext) {
    drop(wait_context);
}

#[scenario(
    path = "tests/features/wait.feature",
    name = "Status comparison ignores case"
)]
fn scenario_status_ignores_case(wait_context: WaitContext) {
    drop(wait_context);
}

#[scenario(
    path = "tests/features/wait.feature",
    name = "A failed lookup is retried on the next poll"
)]
fn scenario_failed_lookup_retried(wait_context: WaitContext) {
    drop(wait_context);
}

#[scenario(
    path = "tests/features/wait.feature",
    name = "The wait gives up at the deadline"
)]
fn scenario_wait_times_out(wait_context: WaitContext) {
    drop(wait_context);
}

fn accepts_step_value<T: IntoStepResult>() {}

#[test]
fn wait_context_can_be_passed_between_steps() {
    accepts_step_value::<WaitContext>();
}
