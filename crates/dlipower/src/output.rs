//! Output formatting: table, JSON, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! JSON uses serde, plain emits tab- or comma-separated text.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use dlipower_core::OutletState;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// An outlet state, green for on and red for off when `color` is set.
pub fn paint_state(state: OutletState, color: bool) -> String {
    if !color {
        return state.to_string();
    }
    match state {
        OutletState::On => state.green().bold().to_string(),
        OutletState::Off => state.red().to_string(),
        OutletState::Unknown => state.yellow().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json`: serializes the original data via serde
/// - `plain`: calls `line_fn` on each item, one line per item
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    line_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data)?,
        OutputFormat::Plain => data.iter().map(&line_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render the text answers of a command: comma-joined, or a JSON array.
pub fn render_texts(format: &OutputFormat, texts: &[&str]) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => render_json(texts),
        OutputFormat::Table | OutputFormat::Plain => Ok(texts.join(",")),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Pretty-printed JSON.
pub(crate) fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Item {
        id: u32,
        label: &'static str,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: u32,
        #[tabled(rename = "Label")]
        label: &'static str,
    }

    fn items() -> Vec<Item> {
        vec![
            Item { id: 1, label: "Router" },
            Item { id: 2, label: "Modem" },
        ]
    }

    fn render(format: &OutputFormat) -> String {
        render_list(
            format,
            &items(),
            |i| ItemRow { id: i.id, label: i.label },
            |i| format!("{}\t{}", i.id, i.label),
        )
        .unwrap_or_default()
    }

    #[test]
    fn list_formats() {
        let table = render(&OutputFormat::Table);
        assert!(table.contains("Label"));
        assert!(table.contains("Modem"));

        assert_eq!(render(&OutputFormat::Plain), "1\tRouter\n2\tModem");

        let json: serde_json::Value =
            serde_json::from_str(&render(&OutputFormat::Json)).unwrap_or_default();
        assert_eq!(json[1]["label"], "Modem");
    }

    #[test]
    fn texts_join_with_commas() {
        let texts = ["ON", "OFF"];
        assert_eq!(render_texts(&OutputFormat::Plain, &texts).ok().as_deref(), Some("ON,OFF"));
        assert_eq!(render_texts(&OutputFormat::Table, &texts).ok().as_deref(), Some("ON,OFF"));
        assert!(
            render_texts(&OutputFormat::Json, &texts)
                .unwrap_or_default()
                .contains("\"OFF\"")
        );
    }

    #[test]
    fn states_are_plain_without_color() {
        assert_eq!(paint_state(OutletState::On, false), "ON");
        assert!(paint_state(OutletState::Off, true).contains("OFF"));
        assert_ne!(paint_state(OutletState::Off, true), "OFF");
    }
}
