// Outlet status as reported by the switch's status page.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Power state of one outlet.
///
/// Displays as the device spells it (`ON` / `OFF`); anything the page
/// reports that is neither becomes [`Unknown`](Self::Unknown).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum OutletState {
    #[strum(serialize = "ON")]
    #[serde(rename = "ON")]
    On,
    #[strum(serialize = "OFF")]
    #[serde(rename = "OFF")]
    Off,
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl OutletState {
    /// Map the text of a status cell onto a state.
    pub fn from_cell(text: &str) -> Self {
        text.trim().parse().unwrap_or(Self::Unknown)
    }

    /// The keyword the `outlet?{n}=...` endpoint expects, if any.
    pub fn command_keyword(self) -> Option<&'static str> {
        match self {
            Self::On => Some("ON"),
            Self::Off => Some("OFF"),
            Self::Unknown => None,
        }
    }
}

/// One row of the status table: `(number, name, state)`.
///
/// Read fresh from the device on every status query; nothing holds on to
/// these between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletRecord {
    pub number: u32,
    pub name: String,
    pub state: OutletState,
}

impl OutletRecord {
    /// Build a record, falling back to the outlet number for a blank name.
    pub fn new(number: u32, name: &str, state: OutletState) -> Self {
        let name = name.trim();
        Self {
            number,
            name: if name.is_empty() {
                number.to_string()
            } else {
                name.to_owned()
            },
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_cells_are_case_insensitive() {
        assert_eq!(OutletState::from_cell("on"), OutletState::On);
        assert_eq!(OutletState::from_cell(" OFF "), OutletState::Off);
        assert_eq!(OutletState::from_cell("blinking"), OutletState::Unknown);
        assert_eq!(OutletState::Unknown.to_string(), "Unknown");
        assert_eq!(OutletState::Off.to_string(), "OFF");
    }

    #[test]
    fn blank_names_default_to_number() {
        let record = OutletRecord::new(4, "  ", OutletState::On);
        assert_eq!(record.name, "4");
        let record = OutletRecord::new(2, " Router ", OutletState::Off);
        assert_eq!(record.name, "Router");
    }
}
