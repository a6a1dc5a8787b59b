use crate::config::settings::OrchestratorSettings;
use crate::macos::accessibility::{SystemWindowControl, WindowControl, WindowHandle};
use crate::macos::display::{DisplayProvider, SystemDisplayProvider};
use crate::macos::permissions::{PermissionProvider, SystemPermissionProvider};
use crate::macos::workspace::{ProcessDirectory, ProcessHandle, SystemProcessDirectory};
use crate::models::geometry::{PixelRect, ReferenceArea};
use crate::models::preset::{Preset, TargetGroup};
use crate::services::apply_report::{ApplyReport, GroupOutcome, GroupReport, SkipReason};
use crate::services::geometry_mapper;
use crate::{Result, WindowTemplatesError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, info_span, instrument, warn, Instrument};

/// Polling bounds used while applying a preset
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOrchestratorConfig {
    /// Upper bound on waiting for a launched application to finish launching
    pub ready_timeout: Duration,
    pub ready_poll_interval: Duration,
    /// Upper bound on waiting for one requested window to appear
    pub new_window_timeout: Duration,
    pub new_window_poll_interval: Duration,
}

impl Default for LayoutOrchestratorConfig {
    fn default() -> Self {
        Self::from(&OrchestratorSettings::default())
    }
}

impl From<&OrchestratorSettings> for LayoutOrchestratorConfig {
    fn from(settings: &OrchestratorSettings) -> Self {
        Self {
            ready_timeout: settings.ready_timeout(),
            ready_poll_interval: settings.ready_poll_interval(),
            new_window_timeout: settings.new_window_timeout(),
            new_window_poll_interval: settings.new_window_poll_interval(),
        }
    }
}

/// Windows available to a group once reconciliation is over
#[derive(Debug)]
struct Reconciliation {
    windows: Vec<WindowHandle>,
    opened: usize,
    affordance_unavailable: bool,
}

/// Applies presets against the windowing system.
///
/// Holds no state between calls; every `apply` reads the display, the
/// process table and the window lists fresh.
pub struct LayoutOrchestrator {
    permissions: Arc<dyn PermissionProvider>,
    processes: Arc<dyn ProcessDirectory>,
    windows: Arc<dyn WindowControl>,
    displays: Arc<dyn DisplayProvider>,
    config: LayoutOrchestratorConfig,
}

impl LayoutOrchestrator {
    pub fn new(
        permissions: Arc<dyn PermissionProvider>,
        processes: Arc<dyn ProcessDirectory>,
        windows: Arc<dyn WindowControl>,
        displays: Arc<dyn DisplayProvider>,
        config: LayoutOrchestratorConfig,
    ) -> Self {
        Self {
            permissions,
            processes,
            windows,
            displays,
            config,
        }
    }

    /// Orchestrator backed by the real macOS providers
    pub fn with_system_providers(settings: &OrchestratorSettings) -> Self {
        Self::new(
            Arc::new(SystemPermissionProvider::new()),
            Arc::new(SystemProcessDirectory::new()),
            Arc::new(SystemWindowControl::new(
                settings.new_window_menu_titles.clone(),
                settings.keyboard_fallback,
            )),
            Arc::new(SystemDisplayProvider::new()),
            LayoutOrchestratorConfig::from(settings),
        )
    }

    /// Orchestrator whose providers are all one object, e.g. a simulated desktop
    pub fn from_desktop<D>(desktop: Arc<D>, config: LayoutOrchestratorConfig) -> Self
    where
        D: PermissionProvider + ProcessDirectory + WindowControl + DisplayProvider + 'static,
    {
        Self::new(
            desktop.clone(),
            desktop.clone(),
            desktop.clone(),
            desktop,
            config,
        )
    }

    pub fn config(&self) -> &LayoutOrchestratorConfig {
        &self.config
    }

    /// Apply `preset`, launching applications and opening windows as needed.
    ///
    /// Fails only when accessibility access is missing; access is requested
    /// before returning. Without an active display nothing is attempted and
    /// an empty report comes back. Everything that goes wrong for a single
    /// application is recorded in that application's [`GroupReport`] and the
    /// remaining applications are still processed. Windows already moved
    /// stay moved.
    #[instrument(skip_all, fields(preset = %preset.name))]
    pub async fn apply(&self, preset: &Preset) -> Result<ApplyReport> {
        if !self.permissions.is_trusted() {
            warn!("Accessibility access not granted, requesting it");
            self.permissions.request_access();
            return Err(WindowTemplatesError::PermissionDenied(
                "Accessibility access is required to move other applications' windows".into(),
            )
            .into());
        }

        let area = match self.displays.active_display_usable_area() {
            Ok(area) => area,
            Err(err) => {
                warn!("No usable display, nothing to apply: {:#}", err);
                return Ok(ApplyReport::new(preset, None));
            }
        };
        debug!(
            "Reference area {}x{} at ({}, {})",
            area.width, area.height, area.x, area.y
        );

        let mut report = ApplyReport::new(preset, Some(area));
        for group in preset.groups() {
            let span = info_span!("group", bundle_id = group.app_bundle_id);
            let group_report = self.apply_group(&group, &area).instrument(span).await;
            report.groups.push(group_report);
        }

        info!(
            "Preset '{}' applied: {}/{} windows placed across {} application(s)",
            preset.name,
            report.placed(),
            report.targets(),
            report.groups.len()
        );
        Ok(report)
    }

    async fn apply_group(&self, group: &TargetGroup<'_>, area: &ReferenceArea) -> GroupReport {
        let bundle_id = group.app_bundle_id;
        let needed = group.targets.len();

        let process = match self.resolve_or_launch(bundle_id).await {
            Ok(process) => process,
            Err(err) => {
                warn!("Skipping {}: {:#}", bundle_id, err);
                return GroupReport::skipped(
                    bundle_id,
                    needed,
                    SkipReason::LaunchFailed(format!("{err:#}")),
                );
            }
        };

        if !self.wait_until_ready(&process).await {
            debug!(
                "{} did not finish launching within {:?}, continuing",
                bundle_id, self.config.ready_timeout
            );
        }

        let reconciliation = self.ensure_window_count(&process, needed).await;
        let mut report = GroupReport::new(bundle_id, needed);
        report.windows_opened = reconciliation.opened;
        report.affordance_unavailable = reconciliation.affordance_unavailable;

        if reconciliation.windows.is_empty() {
            warn!("Skipping {}: no eligible windows", bundle_id);
            return report;
        }

        for (target, window) in group.targets.iter().zip(&reconciliation.windows) {
            let frame = geometry_mapper::map(&target.rect, area);
            match self.place(window, &frame) {
                Ok(()) => {
                    debug!("Placed window {} at {}", window.window_id, frame);
                    report.placed += 1;
                }
                Err(err) => {
                    warn!("Failed to place window {}: {:#}", window.window_id, err);
                    report.failed_placements += 1;
                }
            }
        }

        report.skipped_targets = needed.saturating_sub(reconciliation.windows.len());
        if report.skipped_targets > 0 {
            info!(
                "{}: {} target(s) skipped, only {} window(s) available",
                bundle_id,
                report.skipped_targets,
                reconciliation.windows.len()
            );
        }

        report.outcome = if report.placed == needed {
            GroupOutcome::Placed
        } else if report.placed > 0 {
            GroupOutcome::Partial
        } else {
            GroupOutcome::Skipped(SkipReason::PlacementFailed)
        };
        report
    }

    /// Running process for the application, launching it in the background
    /// when none exists.
    async fn resolve_or_launch(&self, bundle_id: &str) -> Result<ProcessHandle> {
        if let Some(process) = self.processes.find_running_process(bundle_id) {
            debug!("{} already running as pid {}", bundle_id, process.pid);
            return Ok(process);
        }

        info!("Launching {}", bundle_id);
        let processes = Arc::clone(&self.processes);
        let owned_id = bundle_id.to_string();
        tokio::task::spawn_blocking(move || processes.launch(&owned_id))
            .await
            .map_err(|err| WindowTemplatesError::LaunchFailed {
                bundle_id: bundle_id.to_string(),
                reason: err.to_string(),
            })?
    }

    /// Poll until the process reports it finished launching. Returns `false`
    /// on timeout; callers carry on regardless.
    async fn wait_until_ready(&self, process: &ProcessHandle) -> bool {
        let deadline = Instant::now() + self.config.ready_timeout;
        while !self.processes.is_finished_launching(process) {
            if Instant::now() >= deadline {
                return false;
            }
            sleep(self.config.ready_poll_interval).await;
        }
        true
    }

    /// Open windows one at a time until `needed` exist. At most `needed`
    /// new-window requests are made; the first request that finds no
    /// affordance ends the loop.
    async fn ensure_window_count(&self, process: &ProcessHandle, needed: usize) -> Reconciliation {
        let mut windows = self.eligible_windows(process);
        let mut opened = 0;
        let mut attempts = 0;
        let mut affordance_unavailable = false;

        while windows.len() < needed && attempts < needed {
            if !self.windows.trigger_new_window(process) {
                let err = WindowTemplatesError::AffordanceUnavailable(process.bundle_id.clone());
                info!("{}, continuing with {} window(s)", err, windows.len());
                affordance_unavailable = true;
                break;
            }
            attempts += 1;

            let previous = windows.len();
            windows = self.wait_for_new_window(process, previous).await;
            if windows.len() > previous {
                opened += windows.len() - previous;
            } else {
                debug!(
                    "No new window for {} after {:?} (attempt {}/{})",
                    process.bundle_id, self.config.new_window_timeout, attempts, needed
                );
            }
        }

        Reconciliation {
            windows,
            opened,
            affordance_unavailable,
        }
    }

    /// Poll until more than `previous` eligible windows exist or the
    /// deadline passes; returns the latest window list either way.
    async fn wait_for_new_window(&self, process: &ProcessHandle, previous: usize) -> Vec<WindowHandle> {
        let deadline = Instant::now() + self.config.new_window_timeout;
        loop {
            let windows = self.eligible_windows(process);
            if windows.len() > previous || Instant::now() >= deadline {
                return windows;
            }
            sleep(self.config.new_window_poll_interval).await;
        }
    }

    fn eligible_windows(&self, process: &ProcessHandle) -> Vec<WindowHandle> {
        match self.windows.list_eligible_windows(process) {
            Ok(windows) => windows,
            Err(err) => {
                debug!("Listing windows of {} failed: {:#}", process.bundle_id, err);
                Vec::new()
            }
        }
    }

    fn place(&self, window: &WindowHandle, frame: &PixelRect) -> Result<()> {
        self.windows.set_position(window, frame.x, frame.y)?;
        self.windows.set_size(window, frame.width, frame.height)
    }
}
