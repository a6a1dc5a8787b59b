//! In-memory desktop used by tests and dry runs.
//!
//! `SimulatedDesktop` implements every platform trait against a small
//! process/window table so the orchestrator can be exercised without a
//! window server. It records each side effect for later inspection.

use crate::macos::accessibility::{WindowControl, WindowHandle};
use crate::macos::display::DisplayProvider;
use crate::macos::permissions::PermissionProvider;
use crate::macos::workspace::{ProcessDirectory, ProcessHandle};
use crate::models::geometry::{PixelRect, ReferenceArea};
use crate::{Result, WindowTemplatesError};
use std::collections::HashMap;
use std::sync::Mutex;

/// How a simulated application reacts to a new-window request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewWindowBehavior {
    /// A standard window appears immediately
    Opens,
    /// The request is accepted but no window ever appears
    Ignores,
    /// No new-window affordance exists
    Unsupported,
}

/// Kind of a simulated window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Standard,
    Panel,
}

#[derive(Debug, Clone)]
struct SimulatedWindow {
    id: u32,
    kind: WindowKind,
    frame: PixelRect,
}

/// Description of one application known to the simulated desktop
#[derive(Debug, Clone)]
pub struct SimulatedApp {
    bundle_id: String,
    installed: bool,
    running: bool,
    initial_windows: Vec<WindowKind>,
    new_window: NewWindowBehavior,
    ready_after_polls: u32,
}

impl SimulatedApp {
    /// Installed, not running, no windows, opens new windows on request
    pub fn new(bundle_id: impl Into<String>) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            installed: true,
            running: false,
            initial_windows: Vec::new(),
            new_window: NewWindowBehavior::Opens,
            ready_after_polls: 0,
        }
    }

    /// Application that cannot be resolved or launched
    pub fn missing(bundle_id: impl Into<String>) -> Self {
        Self {
            installed: false,
            ..Self::new(bundle_id)
        }
    }

    pub fn running(mut self) -> Self {
        self.running = true;
        self
    }

    /// Standard windows present when running (or right after launch)
    pub fn with_windows(mut self, count: usize) -> Self {
        self.initial_windows
            .extend(std::iter::repeat(WindowKind::Standard).take(count));
        self
    }

    pub fn with_panel(mut self) -> Self {
        self.initial_windows.push(WindowKind::Panel);
        self
    }

    pub fn new_window(mut self, behavior: NewWindowBehavior) -> Self {
        self.new_window = behavior;
        self
    }

    /// Number of `is_finished_launching` checks answered with `false`
    pub fn ready_after_polls(mut self, polls: u32) -> Self {
        self.ready_after_polls = polls;
        self
    }
}

#[derive(Debug)]
struct AppState {
    spec: SimulatedApp,
    pid: Option<i32>,
    windows: Vec<SimulatedWindow>,
    pending_ready_polls: u32,
    new_window_requests: u32,
}

#[derive(Debug)]
struct DesktopState {
    trusted: bool,
    area: Option<ReferenceArea>,
    apps: HashMap<String, AppState>,
    next_pid: i32,
    next_window_id: u32,
    launches: Vec<String>,
    access_requests: u32,
    position_calls: u32,
    size_calls: u32,
}

impl DesktopState {
    fn spawn_windows(&mut self, bundle_id: &str, kinds: &[WindowKind]) {
        for kind in kinds {
            let id = self.next_window_id;
            self.next_window_id += 1;
            if let Some(app) = self.apps.get_mut(bundle_id) {
                app.windows.push(SimulatedWindow {
                    id,
                    kind: *kind,
                    frame: PixelRect::new(0.0, 0.0, 800.0, 600.0),
                });
            }
        }
    }

    fn start(&mut self, bundle_id: &str) -> Option<i32> {
        let pid = self.next_pid;
        self.next_pid += 1;

        let kinds = {
            let app = self.apps.get_mut(bundle_id)?;
            app.pid = Some(pid);
            app.pending_ready_polls = app.spec.ready_after_polls;
            app.spec.initial_windows.clone()
        };
        self.spawn_windows(bundle_id, &kinds);
        Some(pid)
    }

    fn window_mut(&mut self, handle: &WindowHandle) -> Option<&mut SimulatedWindow> {
        self.apps
            .values_mut()
            .filter(|app| app.pid == Some(handle.pid))
            .flat_map(|app| app.windows.iter_mut())
            .find(|window| window.id == handle.window_id)
    }
}

/// In-memory implementation of every platform trait
#[derive(Debug)]
pub struct SimulatedDesktop {
    state: Mutex<DesktopState>,
}

impl SimulatedDesktop {
    /// Trusted desktop with the given usable area and no applications
    pub fn new(area: ReferenceArea) -> Self {
        Self {
            state: Mutex::new(DesktopState {
                trusted: true,
                area: Some(area),
                apps: HashMap::new(),
                next_pid: 100,
                next_window_id: 1,
                launches: Vec::new(),
                access_requests: 0,
                position_calls: 0,
                size_calls: 0,
            }),
        }
    }

    pub fn with_app(self, app: SimulatedApp) -> Self {
        {
            let mut state = self.lock();
            let bundle_id = app.bundle_id.clone();
            let running = app.running && app.installed;
            state.apps.insert(
                bundle_id.clone(),
                AppState {
                    spec: app,
                    pid: None,
                    windows: Vec::new(),
                    pending_ready_polls: 0,
                    new_window_requests: 0,
                },
            );
            if running {
                state.start(&bundle_id);
                if let Some(app) = state.apps.get_mut(&bundle_id) {
                    app.pending_ready_polls = 0;
                }
            }
        }
        self
    }

    pub fn untrusted(self) -> Self {
        self.lock().trusted = false;
        self
    }

    pub fn without_display(self) -> Self {
        self.lock().area = None;
        self
    }

    /// Bundle identifiers passed to `launch`, in call order
    pub fn launches(&self) -> Vec<String> {
        self.lock().launches.clone()
    }

    pub fn access_requests(&self) -> u32 {
        self.lock().access_requests
    }

    /// Number of `set_position` calls that reached a window
    pub fn position_calls(&self) -> u32 {
        self.lock().position_calls
    }

    /// Number of `set_size` calls that reached a window
    pub fn size_calls(&self) -> u32 {
        self.lock().size_calls
    }

    pub fn new_window_requests(&self, bundle_id: &str) -> u32 {
        self.lock()
            .apps
            .get(bundle_id)
            .map(|app| app.new_window_requests)
            .unwrap_or(0)
    }

    pub fn is_running(&self, bundle_id: &str) -> bool {
        self.lock()
            .apps
            .get(bundle_id)
            .is_some_and(|app| app.pid.is_some())
    }

    /// Current frames of the application's standard windows, in window order
    pub fn window_frames(&self, bundle_id: &str) -> Vec<PixelRect> {
        self.lock()
            .apps
            .get(bundle_id)
            .map(|app| {
                app.windows
                    .iter()
                    .filter(|window| window.kind == WindowKind::Standard)
                    .map(|window| window.frame)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DesktopState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PermissionProvider for SimulatedDesktop {
    fn is_trusted(&self) -> bool {
        self.lock().trusted
    }

    fn request_access(&self) {
        self.lock().access_requests += 1;
    }
}

impl DisplayProvider for SimulatedDesktop {
    fn active_display_usable_area(&self) -> Result<ReferenceArea> {
        self.lock()
            .area
            .ok_or_else(|| WindowTemplatesError::DisplayUnavailable.into())
    }
}

impl ProcessDirectory for SimulatedDesktop {
    fn find_running_process(&self, bundle_id: &str) -> Option<ProcessHandle> {
        let state = self.lock();
        let pid = state.apps.get(bundle_id)?.pid?;
        Some(ProcessHandle::new(pid, bundle_id))
    }

    fn launch(&self, bundle_id: &str) -> Result<ProcessHandle> {
        let mut state = self.lock();
        state.launches.push(bundle_id.to_string());

        let launchable = state
            .apps
            .get(bundle_id)
            .is_some_and(|app| app.spec.installed);
        if !launchable {
            return Err(WindowTemplatesError::LaunchFailed {
                bundle_id: bundle_id.to_string(),
                reason: "application not found".to_string(),
            }
            .into());
        }

        if let Some(pid) = state.apps.get(bundle_id).and_then(|app| app.pid) {
            return Ok(ProcessHandle::new(pid, bundle_id));
        }

        let pid = state
            .start(bundle_id)
            .ok_or_else(|| WindowTemplatesError::LaunchFailed {
                bundle_id: bundle_id.to_string(),
                reason: "application not found".to_string(),
            })?;
        Ok(ProcessHandle::new(pid, bundle_id))
    }

    fn is_finished_launching(&self, process: &ProcessHandle) -> bool {
        let mut state = self.lock();
        let Some(app) = state.apps.get_mut(&process.bundle_id) else {
            return false;
        };

        if app.pending_ready_polls == 0 {
            true
        } else {
            app.pending_ready_polls -= 1;
            false
        }
    }
}

impl WindowControl for SimulatedDesktop {
    fn list_eligible_windows(&self, process: &ProcessHandle) -> Result<Vec<WindowHandle>> {
        let state = self.lock();
        let app = state
            .apps
            .values()
            .find(|app| app.pid == Some(process.pid))
            .ok_or_else(|| {
                WindowTemplatesError::MacOSAPIError(format!("no process with pid {}", process.pid))
            })?;

        Ok(app
            .windows
            .iter()
            .filter(|window| window.kind == WindowKind::Standard)
            .map(|window| WindowHandle::new(process.pid, window.id))
            .collect())
    }

    fn trigger_new_window(&self, process: &ProcessHandle) -> bool {
        let mut state = self.lock();
        let behavior = match state.apps.get_mut(&process.bundle_id) {
            Some(app) if app.pid == Some(process.pid) => {
                app.new_window_requests += 1;
                app.spec.new_window
            }
            _ => return false,
        };

        match behavior {
            NewWindowBehavior::Opens => {
                state.spawn_windows(&process.bundle_id, &[WindowKind::Standard]);
                true
            }
            NewWindowBehavior::Ignores => true,
            NewWindowBehavior::Unsupported => false,
        }
    }

    fn set_position(&self, window: &WindowHandle, x: f64, y: f64) -> Result<()> {
        let mut state = self.lock();
        let target = state
            .window_mut(window)
            .ok_or(WindowTemplatesError::WindowNotFound(window.window_id))?;
        target.frame.x = x;
        target.frame.y = y;
        state.position_calls += 1;
        Ok(())
    }

    fn set_size(&self, window: &WindowHandle, width: f64, height: f64) -> Result<()> {
        let mut state = self.lock();
        let target = state
            .window_mut(window)
            .ok_or(WindowTemplatesError::WindowNotFound(window.window_id))?;
        target.frame.width = width;
        target.frame.height = height;
        state.size_calls += 1;
        Ok(())
    }
}
