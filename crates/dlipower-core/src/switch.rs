// ── Power switch facade ──
//
// `PowerSwitch` owns the device client and turns its raw endpoints into
// outlet operations: resolve the identifier, send the request, then read
// the status page back to confirm the effect.

use std::ops::{Bound, RangeBounds};
use std::sync::OnceLock;

use dlipower_api::{DeviceClient, OutletRecord, OutletState, Session};
use futures_util::future::join_all;
use tracing::{debug, info};

use crate::command::{Command, CommandOutcome, CommandResult};
use crate::config::SwitchConfig;
use crate::error::CoreError;
use crate::outlet::Outlet;
use crate::resolver::{OutletSelector, resolve};

/// A client for one Digital Loggers web power switch.
///
/// Construct with [`connect`](Self::connect), which logs in. An unreachable
/// switch does not fail construction: every read then comes back empty and
/// status queries answer `Unknown`.
pub struct PowerSwitch {
    config: SwitchConfig,
    client: DeviceClient,
    outlet_count: OnceLock<u32>,
}

impl PowerSwitch {
    /// Build the client without talking to the switch.
    pub fn new(config: SwitchConfig) -> Result<Self, CoreError> {
        let client = DeviceClient::new(
            &config.hostname,
            config.scheme(),
            config.credentials.clone(),
            &config.transport(),
        )?;
        Ok(Self {
            config,
            client,
            outlet_count: OnceLock::new(),
        })
    }

    /// Build the client and log in.
    pub async fn connect(config: SwitchConfig) -> Result<Self, CoreError> {
        let mut switch = Self::new(config)?;
        switch.login().await;
        Ok(switch)
    }

    /// Re-run the challenge login. Never fails; see [`DeviceClient::login`].
    pub async fn login(&mut self) {
        self.client.login().await;
        info!(
            hostname = %self.config.hostname,
            secure = self.client.session().is_secure(),
            "connected to power switch"
        );
    }

    pub fn config(&self) -> &SwitchConfig {
        &self.config
    }

    pub fn hostname(&self) -> &str {
        &self.config.hostname
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }

    /// `true` if the status page is reachable.
    pub async fn verify(&self) -> bool {
        self.client.verify().await
    }

    // ── Status ───────────────────────────────────────────────────────

    /// Read every outlet from the switch.
    ///
    /// Empty when the switch is unreachable or the page was not recognized.
    /// The first non-empty read fixes the outlet count.
    pub async fn statuslist(&self) -> Vec<OutletRecord> {
        let outlets = self.client.read_outlets().await;
        if !outlets.is_empty() {
            let count = u32::try_from(outlets.len()).unwrap_or(u32::MAX);
            if self.outlet_count.set(count).is_ok() {
                debug!(count, "outlet count cached");
            }
        }
        outlets
    }

    /// Number of outlets, reading the switch once if it was never seen.
    pub async fn outlet_count(&self) -> u32 {
        if let Some(count) = self.outlet_count.get() {
            return *count;
        }
        self.statuslist().await;
        self.cached_count()
    }

    fn cached_count(&self) -> u32 {
        self.outlet_count.get().copied().unwrap_or(0)
    }

    /// Resolve an outlet name or number against a fresh status read.
    pub async fn determine_outlet(
        &self,
        selector: impl Into<OutletSelector>,
    ) -> Result<u32, CoreError> {
        let outlets = self.statuslist().await;
        resolve(&selector.into(), &outlets, self.cached_count())
    }

    /// Current state of one outlet, or `Unknown` if the switch did not answer.
    pub async fn status(
        &self,
        selector: impl Into<OutletSelector>,
    ) -> Result<OutletState, CoreError> {
        let outlets = self.statuslist().await;
        if outlets.is_empty() {
            return Ok(OutletState::Unknown);
        }
        let number = resolve(&selector.into(), &outlets, self.cached_count())?;
        Ok(outlets
            .iter()
            .find(|o| o.number == number)
            .map_or(OutletState::Unknown, |o| o.state))
    }

    /// Label of one outlet, or `"Unknown"` if the switch did not answer.
    pub async fn get_outlet_name(
        &self,
        selector: impl Into<OutletSelector>,
    ) -> Result<String, CoreError> {
        let outlets = self.statuslist().await;
        if outlets.is_empty() {
            return Ok(OutletState::Unknown.to_string());
        }
        let number = resolve(&selector.into(), &outlets, self.cached_count())?;
        Ok(outlets
            .into_iter()
            .find(|o| o.number == number)
            .map_or_else(|| OutletState::Unknown.to_string(), |o| o.name))
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Rename an outlet; succeeds if the switch reports the new name back.
    pub async fn set_outlet_name(
        &self,
        selector: impl Into<OutletSelector>,
        name: &str,
    ) -> Result<CommandOutcome, CoreError> {
        let number = self.determine_outlet(selector).await?;
        self.client.send_outlet_name(number, name).await;
        let current = self.get_outlet_name(number).await?;
        Ok(CommandOutcome::from_success(current == name))
    }

    /// Switch an outlet on. Already-on outlets succeed.
    pub async fn on(
        &self,
        selector: impl Into<OutletSelector>,
    ) -> Result<CommandOutcome, CoreError> {
        self.switch_to(selector.into(), OutletState::On).await
    }

    /// Switch an outlet off. Already-off outlets succeed.
    pub async fn off(
        &self,
        selector: impl Into<OutletSelector>,
    ) -> Result<CommandOutcome, CoreError> {
        self.switch_to(selector.into(), OutletState::Off).await
    }

    /// Power-cycle an outlet: off, wait `cycletime`, on.
    ///
    /// Reports only the off half. A failed off skips the on request; the
    /// outcome of the on request is not checked.
    pub async fn cycle(
        &self,
        selector: impl Into<OutletSelector>,
    ) -> Result<CommandOutcome, CoreError> {
        let number = self.determine_outlet(selector).await?;
        if self.off(number).await?.is_failure() {
            return Ok(CommandOutcome::Failed);
        }
        tokio::time::sleep(self.config.cycletime).await;
        let powered_on = self.on(number).await?;
        debug!(outlet = number, ?powered_on, "power cycle finished");
        Ok(CommandOutcome::Success)
    }

    async fn switch_to(
        &self,
        selector: OutletSelector,
        target: OutletState,
    ) -> Result<CommandOutcome, CoreError> {
        let number = self.determine_outlet(selector).await?;
        self.client.send_outlet_state(number, target).await;
        let observed = self.status(number).await?;
        debug!(outlet = number, %target, %observed, "outlet switched");
        Ok(CommandOutcome::from_success(observed == target))
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Run one command against one outlet.
    pub async fn execute(
        &self,
        command: Command,
        selector: impl Into<OutletSelector>,
    ) -> Result<CommandResult, CoreError> {
        let selector = selector.into();
        match command {
            Command::On => self.on(selector).await.map(CommandResult::Outcome),
            Command::Off => self.off(selector).await.map(CommandResult::Outcome),
            Command::Cycle => self.cycle(selector).await.map(CommandResult::Outcome),
            Command::Status => self
                .status(selector)
                .await
                .map(|state| CommandResult::Text(state.to_string())),
            Command::GetOutletName => self.get_outlet_name(selector).await.map(CommandResult::Text),
        }
    }

    /// Run one command against several outlets concurrently.
    ///
    /// A single outlet returns its own result. A batch fails if any outlet
    /// failed, and text commands return their answers in request order. An
    /// identifier that does not resolve fails the whole batch.
    pub async fn apply(
        &self,
        command: Command,
        selectors: &[OutletSelector],
    ) -> Result<CommandResult, CoreError> {
        match selectors {
            [] => Err(CoreError::Validation {
                message: format!("no outlets given for '{command}'"),
            }),
            [selector] => self.execute(command, selector).await,
            many => {
                debug!(%command, outlets = many.len(), "fanning out command");
                let results = join_all(many.iter().map(|s| self.execute(command, s))).await;
                let results = results.into_iter().collect::<Result<Vec<_>, _>>()?;
                Ok(CommandResult::aggregate(results))
            }
        }
    }

    // ── Outlet handles ───────────────────────────────────────────────

    /// Handles for every outlet currently listed by the switch.
    pub async fn outlets(&self) -> Vec<Outlet<'_>> {
        self.statuslist()
            .await
            .into_iter()
            .map(|record| Outlet::new(self, record))
            .collect()
    }

    /// Handle for the outlet at 0-based `index` in the status list.
    pub async fn outlet(&self, index: usize) -> Option<Outlet<'_>> {
        self.statuslist()
            .await
            .into_iter()
            .nth(index)
            .map(|record| Outlet::new(self, record))
    }

    /// Handles for a 0-based range of the status list, clamped to its length.
    pub async fn outlet_range(&self, range: impl RangeBounds<usize>) -> Vec<Outlet<'_>> {
        let outlets = self.statuslist().await;
        let (start, end) = clamp_range(&range, outlets.len());
        outlets
            .into_iter()
            .skip(start)
            .take(end.saturating_sub(start))
            .map(|record| Outlet::new(self, record))
            .collect()
    }
}

/// Turn `range` into `start..end` within `0..len`, like a sequence slice.
fn clamp_range(range: &impl RangeBounds<usize>, len: usize) -> (usize, usize) {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    (start.min(len), end.min(len))
}
