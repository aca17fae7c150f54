//! `fvm market` handlers.

use fvm_cli::api::types::{Constraints, DatacenterConstraint};
use fvm_cli::display::{
    render_configurations, render_countries, render_estimate, render_hardware, render_offers,
};
use fvm_cli::{BasicConfiguration, RequestError, VmRequestBuilder};

use super::{Console, Session};
use crate::CliError;
use crate::cli::{MarketCommand, OffersArgs, PricingArgs};

pub(crate) async fn run(console: &Console, command: MarketCommand) -> Result<(), CliError> {
    match command {
        MarketCommand::Configurations => {
            let standard = BasicConfiguration::standard();
            console.result(&render_configurations(&standard, console.format())?)
        }
        MarketCommand::Countries => {
            let session = Session::connect()?;
            let countries = session.client.countries_or_empty().await;
            if countries.is_empty() && !console.format().is_json() {
                console.status("No datacenter countries are available.");
                return Ok(());
            }
            console.result(&render_countries(&countries, console.format())?)
        }
        MarketCommand::Pricing(args) => pricing(console, &Session::connect()?, &args).await,
        MarketCommand::Hardware => {
            let session = Session::connect()?;
            let hardware = session.client.hardware_or_empty().await;
            if hardware.is_empty() && !console.format().is_json() {
                console.status("No hardware options are available.");
                return Ok(());
            }
            console.result(&render_hardware(&hardware, console.format())?)
        }
        MarketCommand::Offers(args) => offers(console, &Session::connect()?, &args).await,
    }
}

async fn pricing(console: &Console, session: &Session, args: &PricingArgs) -> Result<(), CliError> {
    let request = VmRequestBuilder::from_config(&session.config)?
        .cpu(Some(args.cpu))
        .memory_gb(Some(args.memory))
        .storage_gb(args.storage)
        .region(args.region.clone())
        .build()?;
    console.heading(format!(
        "Pricing {} in {}",
        request.resolution.configuration(),
        request.region
    ));
    let estimate = session
        .client
        .estimate_vm_or_default(&request.estimate_request())
        .await;
    console.result(&render_estimate(&estimate, console.format())?)
}

/// Builds offer constraints from the optional shape and region flags.
fn offer_constraints(args: &OffersArgs, default_storage_gb: u32) -> Result<Constraints, CliError> {
    let basic_configuration = match (args.cpu, args.memory) {
        (Some(cpu), Some(memory)) => {
            let storage = args.storage.unwrap_or(default_storage_gb);
            let shape = BasicConfiguration::new(cpu, memory, storage).map_err(RequestError::from)?;
            Some(shape.resolve().configuration().to_string())
        }
        _ => None,
    };
    let datacenter = args
        .region
        .as_deref()
        .map(str::trim)
        .filter(|region| !region.is_empty())
        .map(|region| DatacenterConstraint {
            countries: vec![region.to_uppercase()],
        });
    Ok(Constraints {
        basic_configuration,
        datacenter,
        hardware: None,
    })
}

async fn offers(console: &Console, session: &Session, args: &OffersArgs) -> Result<(), CliError> {
    let constraints = offer_constraints(args, session.config.storage_gb)?;
    let offers = session.client.offers(&constraints).await?;
    if offers.is_empty() && !console.format().is_json() {
        console.status("No offers match the given constraints.");
        return Ok(());
    }
    console.result(&render_offers(&offers, console.format())?)
}
