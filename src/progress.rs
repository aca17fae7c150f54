//! Spinner that renders [`StatusWatch`] events on stderr.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::api::types::Vm;
use crate::wait::{StatusWatch, VmSource, WaitError, WaitEvent};

const TICK: Duration = Duration::from_millis(120);

/// Drives `watch` to completion while showing progress.
///
/// When `visible` is false the spinner is hidden, keeping stderr quiet for
/// machine readable output.
///
/// # Errors
///
/// Returns [`WaitError::Timeout`] when the VM does not reach the target.
pub async fn watch_with_spinner<S>(
    watch: &mut StatusWatch<'_, S>,
    visible: bool,
) -> Result<Vm, WaitError>
where
    S: VmSource + ?Sized,
{
    let spinner = new_spinner(visible);
    spinner.set_message(format!(
        "Waiting for VM {} to become {}",
        watch.vm_id(),
        watch.target()
    ));

    while let Some(next) = watch.next_event().await {
        let event = match next {
            Ok(event) => event,
            Err(err) => {
                spinner.abandon_with_message(format!("Gave up on VM {}", watch.vm_id()));
                return Err(err);
            }
        };
        let message = describe(watch.vm_id(), watch.target(), &event);
        if let WaitEvent::Reached { vm, .. } = event {
            spinner.finish_with_message(message);
            return Ok(*vm);
        }
        spinner.set_message(message);
    }

    spinner.finish_and_clear();
    Err(watch.timeout_error())
}

fn new_spinner(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.enable_steady_tick(TICK);
    bar
}

/// One-line description of a poll result.
#[must_use]
pub fn describe(vm_id: &str, target: &str, event: &WaitEvent) -> String {
    let secs = event.elapsed().as_secs();
    match event {
        WaitEvent::Polled { vm, .. } => {
            format!("VM {vm_id} is {} ({secs}s elapsed), waiting for {target}", vm.status)
        }
        WaitEvent::FetchFailed { error, .. } => {
            format!("Could not fetch VM {vm_id} ({secs}s elapsed): {error}")
        }
        WaitEvent::Reached { vm, .. } => {
            format!("VM {vm_id} is {} after {secs}s", vm.status)
        }
    }
}
