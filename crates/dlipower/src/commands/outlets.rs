//! Outlet command handlers.

use tabled::Tabled;
use tracing::info;

use dlipower_core::{Command as CoreCommand, OutletRecord, OutletSelector, PowerSwitch};

use crate::cli::{GlobalOpts, OutletArgs, SetNameArgs};
use crate::error::CliError;
use crate::output;
use crate::range;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OutletRow {
    #[tabled(rename = "Outlet")]
    number: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
}

impl OutletRow {
    fn new(record: &OutletRecord, color: bool) -> Self {
        Self {
            number: record.number,
            name: record.name.clone(),
            state: output::paint_state(record.state, color),
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn selectors(args: &OutletArgs) -> Vec<OutletSelector> {
    range::expand_args(&args.outlets)
        .into_iter()
        .map(OutletSelector::from)
        .collect()
}

/// Fail with the "unable to communicate" error if the switch lists no outlets.
async fn ensure_reachable(switch: &PowerSwitch) -> Result<(), CliError> {
    if switch.outlet_count().await == 0 {
        return Err(CliError::Unreachable {
            host: switch.hostname().into(),
        });
    }
    Ok(())
}

fn operation_label(command: CoreCommand) -> &'static str {
    match command {
        CoreCommand::On => "Power on",
        CoreCommand::Off => "Power off",
        CoreCommand::Cycle => "Power cycle",
        CoreCommand::Status => "Status",
        CoreCommand::GetOutletName => "Get name",
    }
}

// ── Handlers ────────────────────────────────────────────────────────

/// Status table of every outlet.
pub async fn list(switch: &PowerSwitch, global: &GlobalOpts) -> Result<(), CliError> {
    let outlets = switch.statuslist().await;
    if outlets.is_empty() {
        return Err(CliError::Unreachable {
            host: switch.hostname().into(),
        });
    }

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &outlets,
        |o| OutletRow::new(o, color),
        |o| format!("{}\t{}\t{}", o.number, o.name, o.state),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// `status` and `get-name`: print one answer per outlet.
pub async fn query(
    switch: &PowerSwitch,
    command: CoreCommand,
    args: &OutletArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = switch.apply(command, &selectors(args)).await?;
    let out = output::render_texts(&global.output, &result.texts())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// `on`, `off` and `cycle`: fail if any outlet did not switch.
pub async fn power(
    switch: &PowerSwitch,
    command: CoreCommand,
    args: &OutletArgs,
) -> Result<(), CliError> {
    ensure_reachable(switch).await?;

    let selectors = selectors(args);
    let result = switch.apply(command, &selectors).await?;
    if !result.is_success() {
        return Err(CliError::OperationFailed {
            operation: operation_label(command).into(),
        });
    }
    info!(%command, outlets = selectors.len(), "operation succeeded");
    Ok(())
}

pub async fn set_name(switch: &PowerSwitch, args: &SetNameArgs) -> Result<(), CliError> {
    ensure_reachable(switch).await?;

    let outcome = switch
        .set_outlet_name(args.outlet.as_str(), &args.name)
        .await?;
    if outcome.is_failure() {
        return Err(CliError::OperationFailed {
            operation: "Rename".into(),
        });
    }
    info!(outlet = %args.outlet, name = %args.name, "outlet renamed");
    Ok(())
}
