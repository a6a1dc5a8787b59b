use crate::Result;
use anyhow::{anyhow, Context};
use std::process::Command;
use tracing::{debug, info};

const ACCESSIBILITY_PANE_URL: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility";

/// Source of the "may this process control other applications' windows" flag
#[cfg_attr(test, mockall::automock)]
pub trait PermissionProvider: Send + Sync {
    /// Whether the process is currently trusted for accessibility control
    fn is_trusted(&self) -> bool;

    /// Ask the system to prompt the user. Returns immediately; the grant, if
    /// any, only shows up in a later `is_trusted` call.
    fn request_access(&self);
}

/// Permission provider backed by the Accessibility trust APIs
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPermissionProvider;

impl SystemPermissionProvider {
    pub fn new() -> Self {
        Self
    }
}

impl PermissionProvider for SystemPermissionProvider {
    fn is_trusted(&self) -> bool {
        match is_accessibility_permission_granted() {
            Ok(granted) => granted,
            Err(err) => {
                debug!("Accessibility trust check failed: {err:#}");
                false
            }
        }
    }

    fn request_access(&self) {
        match prompt_accessibility_permission() {
            Ok(true) => debug!("Accessibility already granted when prompting"),
            Ok(false) => info!("Accessibility permission requested from the user"),
            Err(err) => debug!("Accessibility prompt failed: {err:#}"),
        }
    }
}

/// Open the Accessibility privacy pane of System Settings so the user can
/// grant the permission manually.
pub fn open_accessibility_settings() -> Result<()> {
    let status = Command::new("open")
        .arg(ACCESSIBILITY_PANE_URL)
        .status()
        .context("failed to open System Settings")?;

    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("open command returned non-zero status: {status}"))
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use crate::Result;
    use core_foundation::base::TCFType;
    use core_foundation::boolean::CFBoolean;
    use core_foundation::dictionary::CFMutableDictionary;
    use core_foundation::string::CFString;
    use core_foundation_sys::dictionary::CFDictionaryRef;
    use core_foundation_sys::string::CFStringRef;

    #[link(name = "ApplicationServices", kind = "framework")]
    extern "C" {
        fn AXIsProcessTrusted() -> bool;
        fn AXIsProcessTrustedWithOptions(options: CFDictionaryRef) -> bool;
        static kAXTrustedCheckOptionPrompt: CFStringRef;
    }

    pub fn is_accessibility_permission_granted() -> Result<bool> {
        Ok(unsafe { AXIsProcessTrusted() })
    }

    pub fn prompt_accessibility_permission() -> Result<bool> {
        unsafe {
            let mut options = CFMutableDictionary::new();
            let key = CFString::wrap_under_get_rule(kAXTrustedCheckOptionPrompt);
            let value = CFBoolean::true_value();
            options.set(key, value);

            Ok(AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef()))
        }
    }
}

#[cfg(not(target_os = "macos"))]
mod platform {
    use crate::Result;

    pub(super) const ACCESSIBILITY_ENV: &str = "WINDOW_TEMPLATES_PERMISSION_ACCESSIBILITY";

    fn env_flag(name: &str) -> bool {
        std::env::var(name)
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn is_accessibility_permission_granted() -> Result<bool> {
        Ok(env_flag(ACCESSIBILITY_ENV))
    }

    pub fn prompt_accessibility_permission() -> Result<bool> {
        Ok(env_flag(ACCESSIBILITY_ENV))
    }
}

pub use platform::{is_accessibility_permission_granted, prompt_accessibility_permission};

#[cfg(all(test, not(target_os = "macos")))]
mod tests {
    use super::*;

    #[test]
    fn system_provider_reads_environment_flag() {
        std::env::set_var(platform::ACCESSIBILITY_ENV, "TRUE");
        assert!(SystemPermissionProvider::new().is_trusted());

        std::env::set_var(platform::ACCESSIBILITY_ENV, "no");
        assert!(!SystemPermissionProvider::new().is_trusted());

        std::env::remove_var(platform::ACCESSIBILITY_ENV);
        assert!(!SystemPermissionProvider::new().is_trusted());
    }
}
