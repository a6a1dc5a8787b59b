use crate::models::geometry::ReferenceArea;
use crate::Result;
#[cfg(not(target_os = "macos"))]
use crate::WindowTemplatesError;

/// Abstraction over display enumeration
pub trait DisplayProvider: Send + Sync {
    /// Usable area of the active display (menu bar and Dock excluded), in
    /// top-left-origin global coordinates.
    fn active_display_usable_area(&self) -> Result<ReferenceArea>;
}

/// Display provider backed by `NSScreen`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDisplayProvider;

impl SystemDisplayProvider {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "macos")]
impl DisplayProvider for SystemDisplayProvider {
    fn active_display_usable_area(&self) -> Result<ReferenceArea> {
        use cocoa::appkit::NSScreen;
        use cocoa::base::{id, nil};
        use cocoa::foundation::NSArray;

        use crate::WindowTemplatesError;

        unsafe {
            let main: id = NSScreen::mainScreen(nil);
            if main == nil {
                return Err(WindowTemplatesError::DisplayUnavailable.into());
            }

            // The first screen owns the global origin; AppKit frames are
            // measured upward from its bottom edge.
            let screens: id = NSScreen::screens(nil);
            let primary: id = if screens != nil && screens.count() > 0 {
                screens.objectAtIndex(0)
            } else {
                main
            };

            let visible = NSScreen::visibleFrame(main);
            let primary_height = NSScreen::frame(primary).size.height;

            Ok(ReferenceArea::from_bottom_left(
                visible.origin.x,
                visible.origin.y,
                visible.size.width,
                visible.size.height,
                primary_height,
            ))
        }
    }
}

#[cfg(not(target_os = "macos"))]
impl DisplayProvider for SystemDisplayProvider {
    fn active_display_usable_area(&self) -> Result<ReferenceArea> {
        Err(WindowTemplatesError::MacOSAPIError(
            "SystemDisplayProvider is not implemented in this environment".into(),
        )
        .into())
    }
}

/// Display provider with a fixed usable area
#[derive(Debug, Clone, Copy)]
pub struct FixedDisplayProvider {
    area: ReferenceArea,
}

impl FixedDisplayProvider {
    pub fn new(area: ReferenceArea) -> Self {
        Self { area }
    }
}

impl DisplayProvider for FixedDisplayProvider {
    fn active_display_usable_area(&self) -> Result<ReferenceArea> {
        Ok(self.area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_provider_returns_configured_area() {
        let area = ReferenceArea::new(0.0, 25.0, 1512.0, 920.0);
        let provider = FixedDisplayProvider::new(area);
        assert_eq!(provider.active_display_usable_area().unwrap(), area);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn system_provider_reports_unsupported_platform() {
        let error = SystemDisplayProvider::new()
            .active_display_usable_area()
            .unwrap_err();
        assert!(error.to_string().contains("not implemented"));
    }
}
