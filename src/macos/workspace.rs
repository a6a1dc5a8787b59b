//! Running-application lookup and background launching

use crate::Result;
#[cfg(not(target_os = "macos"))]
use crate::WindowTemplatesError;

/// A running application process
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessHandle {
    pub pid: i32,
    pub bundle_id: String,
}

impl ProcessHandle {
    pub fn new(pid: i32, bundle_id: impl Into<String>) -> Self {
        Self {
            pid,
            bundle_id: bundle_id.into(),
        }
    }
}

/// Abstraction over the system's process table and application launcher
pub trait ProcessDirectory: Send + Sync {
    /// First running process for the bundle identifier, if any
    fn find_running_process(&self, bundle_id: &str) -> Option<ProcessHandle>;

    /// Launch the application without activating it
    fn launch(&self, bundle_id: &str) -> Result<ProcessHandle>;

    /// Whether the process has finished launching
    fn is_finished_launching(&self, process: &ProcessHandle) -> bool;
}

/// Process directory backed by `NSRunningApplication` and LaunchServices
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessDirectory;

impl SystemProcessDirectory {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::{ProcessDirectory, ProcessHandle, SystemProcessDirectory};
    use crate::{Result, WindowTemplatesError};
    use objc::runtime::{Class, Object, BOOL, NO};
    use objc::{msg_send, sel, sel_impl};
    use std::ffi::CString;
    use std::process::Command;
    use std::time::Duration;
    use tracing::debug;

    /// `open` returns once LaunchServices accepted the request, which can be
    /// slightly before the process shows up in the running list.
    const LOOKUP_ATTEMPTS: u32 = 20;
    const LOOKUP_INTERVAL: Duration = Duration::from_millis(50);

    unsafe fn nsstring(value: &str) -> Option<*mut Object> {
        let c_str = CString::new(value).ok()?;
        let class = Class::get("NSString")?;
        let string: *mut Object = msg_send![class, stringWithUTF8String: c_str.as_ptr()];
        (!string.is_null()).then_some(string)
    }

    /// Run `body` against the first `NSRunningApplication` for the bundle id
    fn with_running_application<T>(
        bundle_id: &str,
        body: impl FnOnce(*mut Object) -> T,
    ) -> Option<T> {
        unsafe {
            let class = Class::get("NSRunningApplication")?;
            let identifier = nsstring(bundle_id)?;
            let apps: *mut Object =
                msg_send![class, runningApplicationsWithBundleIdentifier: identifier];
            if apps.is_null() {
                return None;
            }

            let count: usize = msg_send![apps, count];
            if count == 0 {
                return None;
            }

            let app: *mut Object = msg_send![apps, objectAtIndex: 0usize];
            (!app.is_null()).then(|| body(app))
        }
    }

    impl ProcessDirectory for SystemProcessDirectory {
        fn find_running_process(&self, bundle_id: &str) -> Option<ProcessHandle> {
            with_running_application(bundle_id, |app| {
                let pid: i32 = unsafe { msg_send![app, processIdentifier] };
                pid
            })
            .filter(|pid| *pid > 0)
            .map(|pid| ProcessHandle::new(pid, bundle_id))
        }

        fn launch(&self, bundle_id: &str) -> Result<ProcessHandle> {
            // -g keeps the application in the background, -b resolves it by
            // bundle identifier.
            let output = Command::new("open")
                .args(["-g", "-b", bundle_id])
                .output()
                .map_err(|err| WindowTemplatesError::LaunchFailed {
                    bundle_id: bundle_id.to_string(),
                    reason: err.to_string(),
                })?;

            if !output.status.success() {
                return Err(WindowTemplatesError::LaunchFailed {
                    bundle_id: bundle_id.to_string(),
                    reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                }
                .into());
            }

            for attempt in 0..LOOKUP_ATTEMPTS {
                if let Some(process) = self.find_running_process(bundle_id) {
                    debug!(bundle_id, pid = process.pid, attempt, "Launched application found");
                    return Ok(process);
                }
                std::thread::sleep(LOOKUP_INTERVAL);
            }

            Err(WindowTemplatesError::LaunchFailed {
                bundle_id: bundle_id.to_string(),
                reason: "process did not appear after launch".to_string(),
            }
            .into())
        }

        fn is_finished_launching(&self, process: &ProcessHandle) -> bool {
            with_running_application(&process.bundle_id, |app| {
                let finished: BOOL = unsafe { msg_send![app, isFinishedLaunching] };
                finished != NO
            })
            .unwrap_or(false)
        }
    }
}

#[cfg(not(target_os = "macos"))]
impl ProcessDirectory for SystemProcessDirectory {
    fn find_running_process(&self, _bundle_id: &str) -> Option<ProcessHandle> {
        None
    }

    fn launch(&self, bundle_id: &str) -> Result<ProcessHandle> {
        Err(WindowTemplatesError::LaunchFailed {
            bundle_id: bundle_id.to_string(),
            reason: "SystemProcessDirectory is not implemented in this environment".into(),
        }
        .into())
    }

    fn is_finished_launching(&self, _process: &ProcessHandle) -> bool {
        false
    }
}

#[cfg(all(test, not(target_os = "macos")))]
mod tests {
    use super::*;

    #[test]
    fn system_directory_cannot_launch_off_macos() {
        let directory = SystemProcessDirectory::new();
        assert!(directory.find_running_process("com.apple.Safari").is_none());

        let error = directory.launch("com.apple.Safari").unwrap_err();
        assert!(matches!(
            error.downcast_ref::<WindowTemplatesError>(),
            Some(WindowTemplatesError::LaunchFailed { .. })
        ));
    }
}
