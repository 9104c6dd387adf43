//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use dlipower_config::{FileConfig, config_path, load_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

/// One resolved setting, with the password masked.
#[derive(Serialize, Tabled)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    key: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn rows(cfg: &FileConfig, https: bool) -> Vec<SettingRow> {
    let row = |key, value: String| SettingRow { key, value };
    vec![
        row("hostname", cfg.hostname.clone()),
        row("userid", cfg.userid.clone()),
        row("password", MASK.into()),
        row("timeout", cfg.timeout.to_string()),
        row("cycletime", cfg.cycletime.to_string()),
        row("retries", cfg.retries.to_string()),
        row("ssl", https.to_string()),
    ]
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let file = load_config()?;
            let effective = file.merged(&global.overrides());
            let rows = rows(&effective, global.ssl);

            let out = match global.output {
                OutputFormat::Json => output::render_json(&serde_json::json!({
                    "cycletime": effective.cycletime,
                    "hostname": effective.hostname,
                    "password": MASK,
                    "retries": effective.retries,
                    "ssl": global.ssl,
                    "timeout": effective.timeout,
                    "userid": effective.userid,
                }))?,
                ref format => output::render_list(
                    format,
                    &rows,
                    |r| SettingRow {
                        key: r.key,
                        value: r.value.clone(),
                    },
                    |r| format!("{}={}", r.key, r.value),
                )?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
