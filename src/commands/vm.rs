//! `fvm vm` handlers.

use fvm_cli::api::types::{
    ACTIVE_STATUS, CreateVmRequest, EstimateRequest, ScaleRequest, Vm, VmUpdate,
};
use fvm_cli::basic_config::STANDARD_STORAGE_GB;
use fvm_cli::display::{
    needs_full_id_hint, render_created, render_estimate, render_images, render_vm_details,
    render_vm_list, to_json,
};
use fvm_cli::progress::watch_with_spinner;
use fvm_cli::{
    BasicConfiguration, ImageChoice, Port, PortPlan, RequestError, Resolution, StatusWatch,
    VmFilter, VmRequest, VmRequestBuilder, WaitError, is_image_url, resolve_image,
};
use tracing::warn;

use super::{Console, Session, read_json_file};
use crate::CliError;
use crate::cli::{
    CreateArgs, DeleteArgs, EstimateArgs, ListArgs, ScaleArgs, ShapeArgs, UpdateArgs, VmCommand,
    WaitArgs,
};

pub(crate) async fn run(console: &Console, command: VmCommand) -> Result<(), CliError> {
    let session = Session::connect()?;
    match command {
        VmCommand::List(args) => list(console, &session, &args).await,
        VmCommand::Get(args) => {
            let vm = session.client.get_vm(&args.vm_id).await?;
            console.result(&render_vm_details(&vm, console.format())?)
        }
        VmCommand::Create(args) => create(console, &session, &args).await,
        VmCommand::Estimate(args) => estimate(console, &session, &args).await,
        VmCommand::Images => {
            console.heading("Listing available OS images...");
            let images = session.client.default_images_or_empty().await;
            if images.is_empty() && !console.format().is_json() {
                console.status("No OS images are available.");
                return Ok(());
            }
            console.result(&render_images(&images, console.format())?)
        }
        VmCommand::Delete(args) => delete(console, &session, &args).await,
        VmCommand::Update(args) => update(console, &session, &args).await,
        VmCommand::Scale(args) => scale(console, &session, &args).await,
        VmCommand::Wait(args) => wait(console, &session, &args).await,
    }
}

async fn list(console: &Console, session: &Session, args: &ListArgs) -> Result<(), CliError> {
    let filter = VmFilter::from_flags(args.all, args.status.as_deref());
    let vms = filter.apply(session.client.list_vms().await?);

    if vms.is_empty() && !console.format().is_json() {
        let message = if matches!(filter, VmFilter::ActiveOnly) {
            String::from("No active VMs found. Use --all to see all VMs.")
        } else {
            format!("No {} found.", filter.describe())
        };
        console.status(message);
        return Ok(());
    }

    console.result(&render_vm_list(&vms, console.format(), args.full_id)?)?;
    if !console.format().is_json() && needs_full_id_hint(&vms, args.full_id) {
        console.status("Use --full-id to see complete VM IDs");
    }
    Ok(())
}

fn shape_request(session: &Session, shape: &ShapeArgs) -> Result<VmRequestBuilder, CliError> {
    Ok(VmRequestBuilder::from_config(&session.config)?
        .cpu(shape.cpu)
        .memory_gb(shape.memory)
        .storage_gb(shape.storage)
        .region(shape.region.clone()))
}

fn report_resolution(console: &Console, resolution: &Resolution) {
    match resolution {
        Resolution::Exact(configuration) => {
            console.status(format!("Using configuration: {configuration}"));
        }
        Resolution::Substituted { requested, chosen } => console.warn(format!(
            "{requested} is not a standard configuration; using {chosen}"
        )),
        Resolution::Custom(configuration) => console.warn(format!(
            "no standard configuration covers {configuration}; requesting it as is"
        )),
    }
}

async fn choose_image(console: &Console, session: &Session, choice: &str) -> String {
    let catalogue = if is_image_url(choice) {
        Vec::new()
    } else {
        session.client.default_images_or_empty().await
    };
    let chosen = resolve_image(choice, &catalogue, &session.config.os_image);
    match &chosen {
        ImageChoice::Url(_) => {}
        ImageChoice::Catalogue { name, slug, .. } => {
            console.status(format!("Using image: {name} ({slug})"));
        }
        ImageChoice::Fallback { slug, url } => console.warn(format!(
            "image '{slug}' not found in default images; using {url}"
        )),
    }
    chosen.url().to_owned()
}

async fn build_create_request(
    console: &Console,
    session: &Session,
    args: &CreateArgs,
) -> Result<CreateVmRequest, CliError> {
    let ssh_key = session.config.require_ssh_public_key()?;
    let os_image = match args.image.as_deref() {
        Some(choice) => choose_image(console, session, choice).await,
        None => session.config.os_image.clone(),
    };
    let request: VmRequest = shape_request(session, &args.shape)?
        .name(args.name.clone())
        .os_image(os_image)
        .ssh_key(ssh_key)
        .build()?;
    report_resolution(console, &request.resolution);

    if !console.format().is_json() {
        let estimate = session
            .client
            .estimate_vm_or_default(&request.estimate_request())
            .await;
        if let Some(daily) = estimate.daily() {
            console.status(format!("Estimated price: ${daily} per day"));
        }
    }

    console.heading(format!("Creating VM: {}", request.name));
    Ok(request.create_request()?)
}

async fn create(console: &Console, session: &Session, args: &CreateArgs) -> Result<(), CliError> {
    let request = match args.config.as_deref() {
        Some(path) => read_json_file::<CreateVmRequest>(path)?,
        None => build_create_request(console, session, args).await?,
    };

    let created = session.client.create_vm(&request).await?;
    let Some(first) = created.first() else {
        return Err(CliError::UnexpectedResponse(String::from(
            "VM creation returned no VMs",
        )));
    };

    if !args.wait {
        console.result(&render_created(&created, console.format())?)?;
        console.warn("VM creation is in progress. Use 'fvm vm get <ID>' to check its status.");
        return Ok(());
    }

    if !console.format().is_json() {
        console.result(&render_created(&created, console.format())?)?;
    }
    match wait_until_active(console, session, &first.vm_id, args.timeout).await? {
        Some(vm) => report_active(console, &vm),
        None => {
            if console.format().is_json() {
                console.result(&render_created(&created, console.format())?)?;
            }
            console.warn("The VM creation is still in progress. You can check its status later.");
            Ok(())
        }
    }
}

/// Waits for `Active`, downgrading a timeout to a warning.
async fn wait_until_active(
    console: &Console,
    session: &Session,
    vm_id: &str,
    timeout_secs: Option<u64>,
) -> Result<Option<Vm>, CliError> {
    let options = session.wait_options(timeout_secs, None)?;
    let mut watch = StatusWatch::new(&session.client, vm_id, ACTIVE_STATUS, options)?;
    match watch_with_spinner(&mut watch, console.shows_progress()).await {
        Ok(vm) => Ok(Some(vm)),
        Err(err @ WaitError::Timeout { .. }) => {
            console.warn(err);
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn report_active(console: &Console, vm: &Vm) -> Result<(), CliError> {
    if console.format().is_json() {
        return console.result(&to_json(vm)?);
    }
    console.success(format!(
        "VM is now active at IP: {}",
        vm.public_ip.as_deref().unwrap_or("unassigned")
    ));
    Ok(())
}

async fn estimate(
    console: &Console,
    session: &Session,
    args: &EstimateArgs,
) -> Result<(), CliError> {
    let request = match args.config.as_deref() {
        Some(path) => read_json_file::<EstimateRequest>(path)?,
        None => {
            let shaped = shape_request(session, &args.shape)?.build()?;
            report_resolution(console, &shaped.resolution);
            shaped.estimate_request()
        }
    };
    let estimate = session.client.estimate_vm(&request).await?;
    console.result(&render_estimate(&estimate, console.format())?)
}

async fn delete(console: &Console, session: &Session, args: &DeleteArgs) -> Result<(), CliError> {
    match session.client.get_vm(&args.vm_id).await {
        Ok(vm) => console.status(format!(
            "VM to delete: {} ({}), status {}",
            vm.id,
            if vm.name().is_empty() { "Unnamed" } else { vm.name() },
            vm.status
        )),
        Err(err) => {
            warn!(vm_id = %args.vm_id, error = %err, "could not fetch VM before deletion");
        }
    }

    let prompt = format!("Are you sure you want to delete VM {}?", args.vm_id);
    if !console.confirm(&prompt, args.force)? {
        console.status("Deletion cancelled.");
        return Ok(());
    }

    let response = session.client.delete_vm(&args.vm_id).await?;
    if console.format().is_json() {
        return console.result(&to_json(&response)?);
    }
    console.success(format!("Deletion of VM {} requested", args.vm_id));
    console.warn("VM deletion is in progress. It may take some time to complete.");
    Ok(())
}

fn parse_ports(values: &[String]) -> Result<Vec<Port>, CliError> {
    Ok(values
        .iter()
        .map(|value| value.parse::<Port>())
        .collect::<Result<Vec<_>, _>>()?)
}

async fn update(console: &Console, session: &Session, args: &UpdateArgs) -> Result<(), CliError> {
    let add = parse_ports(&args.add_ports)?;
    let remove = parse_ports(&args.remove_ports)?;
    let vm = session.client.get_vm(&args.vm_id).await?;

    let new_name = args
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != vm.name())
        .map(str::to_owned);
    let plan = PortPlan::build(&vm.ports, &add, &remove);
    for port in &plan.duplicates {
        console.warn(format!("port {port} is already open"));
    }
    for port in &plan.missing {
        console.warn(format!("port {port} is not open"));
    }

    let changes = VmUpdate {
        id: vm.id.clone(),
        vm_name: new_name,
        open_ports: plan.has_changes().then(|| plan.ports.clone()),
    };
    if changes.is_empty() {
        console.status("No updates specified.");
        return Ok(());
    }

    console.heading(format!("Changes for VM {}:", vm.id));
    if let Some(name) = &changes.vm_name {
        console.status(format!("  Name: {} -> {name}", vm.name()));
    }
    for port in &plan.added {
        console.status(format!("  Open port {port}"));
    }
    for port in &plan.removed {
        console.status(format!("  Close port {port}"));
    }
    if !console.confirm("Apply these changes?", args.force)? {
        console.status("Update cancelled.");
        return Ok(());
    }

    let response = session.client.update_vm(changes).await?;
    if console.format().is_json() {
        return console.result(&to_json(&response)?);
    }
    console.success(format!("VM {} updated", vm.id));
    Ok(())
}

async fn scale(console: &Console, session: &Session, args: &ScaleArgs) -> Result<(), CliError> {
    BasicConfiguration::new(args.cpu, args.memory, STANDARD_STORAGE_GB)
        .map_err(RequestError::from)?;
    let request = ScaleRequest {
        cpu: args.cpu,
        memory: args.memory,
        cpu_manufacturer: args.cpu_manufacturer.clone(),
        cpu_architecture: args.cpu_architecture.clone(),
    };

    console.heading(format!(
        "Scaling VM {} to {} vCPU and {} GB memory",
        args.vm_id, args.cpu, args.memory
    ));
    let response = session.client.scale_vm(&args.vm_id, &request).await?;

    if !args.wait {
        if console.format().is_json() {
            return console.result(&to_json(&response)?);
        }
        console.success(format!("Scaling of VM {} requested", args.vm_id));
        return Ok(());
    }

    match wait_until_active(console, session, &args.vm_id, args.timeout).await? {
        Some(vm) => report_active(console, &vm),
        None => {
            console.warn("Scaling is still in progress. You can check its status later.");
            if console.format().is_json() {
                return console.result(&to_json(&response)?);
            }
            Ok(())
        }
    }
}

async fn wait(console: &Console, session: &Session, args: &WaitArgs) -> Result<(), CliError> {
    let options = session.wait_options(args.timeout, args.interval)?;
    let mut watch = StatusWatch::new(&session.client, &args.vm_id, &args.status, options)?;
    let vm = watch_with_spinner(&mut watch, console.shows_progress()).await?;
    console.result(&render_vm_details(&vm, console.format())?)
}
