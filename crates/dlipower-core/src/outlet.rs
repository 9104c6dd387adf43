// Outlet handles: a borrowed view of one outlet on a `PowerSwitch`.

use std::fmt;

use dlipower_api::{OutletRecord, OutletState};

use crate::command::CommandOutcome;
use crate::error::CoreError;
use crate::switch::PowerSwitch;

/// One outlet of a switch, as seen by the status read that produced it.
///
/// The description and state are a snapshot; every operation goes back to
/// the switch.
#[derive(Clone)]
pub struct Outlet<'a> {
    switch: &'a PowerSwitch,
    number: u32,
    description: String,
    state: OutletState,
}

impl<'a> Outlet<'a> {
    pub(crate) fn new(switch: &'a PowerSwitch, record: OutletRecord) -> Self {
        Self {
            switch,
            number: record.number,
            description: record.name,
            state: record.state,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Label at the time of the last read.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// State at the time of the last read.
    pub fn cached_state(&self) -> OutletState {
        self.state
    }

    pub async fn on(&self) -> Result<CommandOutcome, CoreError> {
        self.switch.on(self.number).await
    }

    pub async fn off(&self) -> Result<CommandOutcome, CoreError> {
        self.switch.off(self.number).await
    }

    pub async fn cycle(&self) -> Result<CommandOutcome, CoreError> {
        self.switch.cycle(self.number).await
    }

    /// Fresh label from the switch.
    pub async fn get_name(&self) -> Result<String, CoreError> {
        self.switch.get_outlet_name(self.number).await
    }

    /// Rename the outlet, updating the cached description on success.
    pub async fn rename(&mut self, name: &str) -> Result<CommandOutcome, CoreError> {
        let outcome = self.switch.set_outlet_name(self.number, name).await?;
        if outcome.is_success() {
            name.clone_into(&mut self.description);
        }
        Ok(outcome)
    }

    /// Fresh state from the switch, refreshing the cached state.
    pub async fn get_state(&mut self) -> Result<OutletState, CoreError> {
        self.state = self.switch.status(self.number).await?;
        Ok(self.state)
    }

    /// Drive the outlet to `state`. `Unknown` is rejected.
    pub async fn set_state(&mut self, state: OutletState) -> Result<CommandOutcome, CoreError> {
        let outcome = match state {
            OutletState::On => self.on().await?,
            OutletState::Off => self.off().await?,
            OutletState::Unknown => {
                return Err(CoreError::Validation {
                    message: format!("cannot set outlet {} to Unknown", self.number),
                });
            }
        };
        if outcome.is_success() {
            self.state = state;
        }
        Ok(outcome)
    }
}

impl fmt::Display for Outlet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}:{}", self.number, self.state)
        } else {
            write!(f, "{}:{}", self.description, self.state)
        }
    }
}

impl fmt::Debug for Outlet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outlet")
            .field("number", &self.number)
            .field("description", &self.description)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
