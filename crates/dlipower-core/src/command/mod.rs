// ── Command API ──
//
// Every operation the dispatcher can fan out over several outlets is a
// `Command` variant. `PowerSwitch::execute` routes each variant to the
// matching switch method; `PowerSwitch::apply` runs a batch.

use serde::Serialize;
use strum::{Display, EnumString};

/// An operation applied to one outlet at a time.
///
/// Parses from its name and from the legacy aliases (`poweron`,
/// `poweroff`, `get_name`, `getname`, `getoutletname`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Command {
    #[strum(to_string = "on", serialize = "poweron")]
    On,
    #[strum(to_string = "off", serialize = "poweroff")]
    Off,
    #[strum(to_string = "cycle")]
    Cycle,
    #[strum(to_string = "status")]
    Status,
    #[strum(
        to_string = "get_outlet_name",
        serialize = "get_name",
        serialize = "getname",
        serialize = "getoutletname"
    )]
    GetOutletName,
}

/// Whether a mutating operation had the observed effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandOutcome {
    Success,
    Failed,
}

impl CommandOutcome {
    pub fn from_success(success: bool) -> Self {
        if success { Self::Success } else { Self::Failed }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// The device protocol's inverted boolean: `true` means the operation
    /// failed.
    pub fn is_failure(self) -> bool {
        self == Self::Failed
    }
}

/// Result of running a [`Command`] against one or more outlets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommandResult {
    Outcome(CommandOutcome),
    Text(String),
    /// Text answers of a batch, in request order.
    Texts(Vec<String>),
}

impl CommandResult {
    /// `true` unless this is a failed outcome.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Outcome(CommandOutcome::Failed))
    }

    /// Text answers as a list, empty for outcomes.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Outcome(_) => Vec::new(),
            Self::Text(text) => vec![text.as_str()],
            Self::Texts(texts) => texts.iter().map(String::as_str).collect(),
        }
    }

    /// Fold the per-outlet results of a batch into one.
    ///
    /// Outcomes fail if any member failed and otherwise report the first
    /// member. Text answers are collected in order.
    pub fn aggregate(results: Vec<CommandResult>) -> CommandResult {
        if results
            .iter()
            .any(|r| matches!(r, Self::Text(_) | Self::Texts(_)))
        {
            let texts = results
                .into_iter()
                .flat_map(|r| match r {
                    Self::Outcome(_) => Vec::new(),
                    Self::Text(text) => vec![text],
                    Self::Texts(texts) => texts,
                })
                .collect();
            return Self::Texts(texts);
        }

        if results.iter().any(|r| !r.is_success()) {
            return Self::Outcome(CommandOutcome::Failed);
        }
        results
            .into_iter()
            .next()
            .unwrap_or(Self::Outcome(CommandOutcome::Success))
    }
}
