use crate::macos::workspace::ProcessHandle;
use crate::Result;
#[cfg(not(target_os = "macos"))]
use crate::WindowTemplatesError;

/// Menu titles tried, in order, when asking an application for a new window
pub const DEFAULT_NEW_WINDOW_MENU_TITLES: &[&str] = &["New Window", "New OS Window"];

/// Reference to one concrete window of a running process.
///
/// Only meaningful while the owning process stays alive; handles are looked
/// up fresh on every apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle {
    pub pid: i32,
    pub window_id: u32,
}

impl WindowHandle {
    pub fn new(pid: i32, window_id: u32) -> Self {
        Self { pid, window_id }
    }
}

/// Abstraction over the Accessibility window query/control surface
pub trait WindowControl: Send + Sync {
    /// Standard, user-facing windows of the process in the order the system
    /// reports them. Panels, sheets, and other utility windows are excluded.
    fn list_eligible_windows(&self, process: &ProcessHandle) -> Result<Vec<WindowHandle>>;

    /// Ask the application to open one more window. Returns `false` when no
    /// new-window affordance could be found or invoked.
    fn trigger_new_window(&self, process: &ProcessHandle) -> bool;

    /// Move the window's top-left corner to the absolute position
    fn set_position(&self, window: &WindowHandle, x: f64, y: f64) -> Result<()>;

    /// Resize the window
    fn set_size(&self, window: &WindowHandle, width: f64, height: f64) -> Result<()>;
}

/// Window control backed by the macOS Accessibility API
#[derive(Debug, Clone)]
pub struct SystemWindowControl {
    new_window_menu_titles: Vec<String>,
    keyboard_fallback: bool,
}

impl SystemWindowControl {
    pub fn new(new_window_menu_titles: Vec<String>, keyboard_fallback: bool) -> Self {
        Self {
            new_window_menu_titles,
            keyboard_fallback,
        }
    }
}

impl Default for SystemWindowControl {
    fn default() -> Self {
        Self::new(
            DEFAULT_NEW_WINDOW_MENU_TITLES
                .iter()
                .map(|title| title.to_string())
                .collect(),
            true,
        )
    }
}

/// Result of looking for and pressing a new-window menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
enum MenuPress {
    NotFound,
    Pressed,
    /// The item exists but refused the press, e.g. it is disabled
    Rejected,
}

/// Anything short of a successful menu press falls back to the keyboard
/// shortcut when allowed.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn new_window_with_fallback(
    menu: MenuPress,
    keyboard_fallback: bool,
    send_shortcut: impl FnOnce() -> bool,
) -> bool {
    match menu {
        MenuPress::Pressed => true,
        MenuPress::NotFound | MenuPress::Rejected if keyboard_fallback => send_shortcut(),
        MenuPress::NotFound | MenuPress::Rejected => false,
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::{new_window_with_fallback, MenuPress, SystemWindowControl, WindowControl, WindowHandle};
    use crate::macos::workspace::ProcessHandle;
    use crate::{Result, WindowTemplatesError};
    use core_foundation::base::TCFType;
    use core_foundation::string::{CFString, CFStringRef};
    use core_graphics::event::{CGEvent, CGEventFlags, CGKeyCode};
    use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
    use core_graphics::geometry::{CGPoint, CGSize};
    use std::ffi::c_void;
    use std::ptr;
    use tracing::debug;

    type AXUIElementRef = *mut c_void;
    type AXError = i32;

    const K_AX_ERROR_SUCCESS: AXError = 0;
    const K_AX_VALUE_TYPE_CG_POINT: i32 = 1;
    const K_AX_VALUE_TYPE_CG_SIZE: i32 = 2;
    const KEY_CODE_N: CGKeyCode = 45;

    const AX_WINDOWS: &str = "AXWindows";
    const AX_SUBROLE: &str = "AXSubrole";
    const AX_STANDARD_WINDOW: &str = "AXStandardWindow";
    const AX_MENU_BAR: &str = "AXMenuBar";
    const AX_CHILDREN: &str = "AXChildren";
    const AX_TITLE: &str = "AXTitle";
    const AX_POSITION: &str = "AXPosition";
    const AX_SIZE: &str = "AXSize";
    const AX_PRESS: &str = "AXPress";

    #[link(name = "ApplicationServices", kind = "framework")]
    extern "C" {
        fn AXUIElementCreateApplication(pid: i32) -> AXUIElementRef;
        fn AXUIElementCopyAttributeValue(
            element: AXUIElementRef,
            attribute: *const c_void,
            value: *mut *mut c_void,
        ) -> AXError;
        fn AXUIElementSetAttributeValue(
            element: AXUIElementRef,
            attribute: *const c_void,
            value: *const c_void,
        ) -> AXError;
        fn AXUIElementPerformAction(element: AXUIElementRef, action: *const c_void) -> AXError;
        fn AXUIElementGetTypeID() -> u64;
        fn AXValueCreate(value_type: i32, value: *const c_void) -> *mut c_void;
        fn _AXUIElementGetWindow(element: AXUIElementRef, window_id: *mut u32) -> AXError;
    }

    #[link(name = "CoreFoundation", kind = "framework")]
    extern "C" {
        fn CFGetTypeID(cf: *const c_void) -> u64;
        fn CFArrayGetCount(array: *const c_void) -> i64;
        fn CFArrayGetValueAtIndex(array: *const c_void, idx: i64) -> *const c_void;
        fn CFRelease(cf: *const c_void);
        fn CFRetain(cf: *const c_void) -> *const c_void;
    }

    /// Owned (+1) Core Foundation object, released on drop
    struct CFOwned(*mut c_void);

    impl Drop for CFOwned {
        fn drop(&mut self) {
            if !self.0.is_null() {
                unsafe { CFRelease(self.0) };
            }
        }
    }

    /// Owned accessibility element
    struct AXElement(CFOwned);

    impl AXElement {
        fn application(pid: i32) -> Option<Self> {
            let raw = unsafe { AXUIElementCreateApplication(pid) };
            (!raw.is_null()).then(|| Self(CFOwned(raw)))
        }

        fn as_ptr(&self) -> AXUIElementRef {
            self.0 .0
        }

        fn copy_attribute(&self, attribute: &str) -> Option<CFOwned> {
            let name = CFString::new(attribute);
            let mut value: *mut c_void = ptr::null_mut();
            let result = unsafe {
                AXUIElementCopyAttributeValue(
                    self.as_ptr(),
                    name.as_concrete_TypeRef().cast(),
                    &mut value,
                )
            };

            (result == K_AX_ERROR_SUCCESS && !value.is_null()).then(|| CFOwned(value))
        }

        fn string_attribute(&self, attribute: &str) -> Option<String> {
            let value = self.copy_attribute(attribute)?;
            if unsafe { CFGetTypeID(value.0) } != CFString::type_id() as u64 {
                return None;
            }
            let string = unsafe { CFString::wrap_under_get_rule(value.0 as CFStringRef) };
            Some(string.to_string())
        }

        fn element_attribute(&self, attribute: &str) -> Option<AXElement> {
            let value = self.copy_attribute(attribute)?;
            (unsafe { CFGetTypeID(value.0) } == unsafe { AXUIElementGetTypeID() })
                .then(|| AXElement(value))
        }

        /// Elements of an array-valued attribute, each retained
        fn element_list(&self, attribute: &str) -> Vec<AXElement> {
            let Some(array) = self.copy_attribute(attribute) else {
                return Vec::new();
            };

            let ax_type_id = unsafe { AXUIElementGetTypeID() };
            let count = unsafe { CFArrayGetCount(array.0) };
            let mut elements = Vec::with_capacity(count.max(0) as usize);

            for index in 0..count {
                let item = unsafe { CFArrayGetValueAtIndex(array.0, index) };
                if !item.is_null() && unsafe { CFGetTypeID(item) } == ax_type_id {
                    let retained = unsafe { CFRetain(item) };
                    elements.push(AXElement(CFOwned(retained as *mut c_void)));
                }
            }

            elements
        }

        fn window_id(&self) -> Option<u32> {
            let mut window_id: u32 = 0;
            let result = unsafe { _AXUIElementGetWindow(self.as_ptr(), &mut window_id) };
            (result == K_AX_ERROR_SUCCESS && window_id != 0).then_some(window_id)
        }

        fn set_value(&self, attribute: &str, value_type: i32, value: *const c_void) -> bool {
            let value = unsafe { AXValueCreate(value_type, value) };
            if value.is_null() {
                return false;
            }
            let value = CFOwned(value);
            let name = CFString::new(attribute);

            let result = unsafe {
                AXUIElementSetAttributeValue(
                    self.as_ptr(),
                    name.as_concrete_TypeRef().cast(),
                    value.0,
                )
            };
            result == K_AX_ERROR_SUCCESS
        }

        fn press(&self) -> bool {
            let action = CFString::new(AX_PRESS);
            let result = unsafe {
                AXUIElementPerformAction(self.as_ptr(), action.as_concrete_TypeRef().cast())
            };
            result == K_AX_ERROR_SUCCESS
        }
    }

    fn standard_windows(app: &AXElement) -> Vec<AXElement> {
        app.element_list(AX_WINDOWS)
            .into_iter()
            .filter(|window| {
                window.string_attribute(AX_SUBROLE).as_deref() == Some(AX_STANDARD_WINDOW)
            })
            .collect()
    }

    fn resolve_window(handle: &WindowHandle) -> Result<AXElement> {
        let app = AXElement::application(handle.pid).ok_or_else(|| {
            WindowTemplatesError::MacOSAPIError(format!(
                "no accessibility element for pid {}",
                handle.pid
            ))
        })?;

        app.element_list(AX_WINDOWS)
            .into_iter()
            .find(|window| window.window_id() == Some(handle.window_id))
            .ok_or_else(|| WindowTemplatesError::WindowNotFound(handle.window_id).into())
    }

    /// Menu bar items are menus whose children are items; submenu items sit
    /// one level further down.
    fn find_menu_item(app: &AXElement, title: &str) -> Option<AXElement> {
        let menu_bar = app.element_attribute(AX_MENU_BAR)?;

        for menu in menu_bar.element_list(AX_CHILDREN) {
            for item in menu.element_list(AX_CHILDREN) {
                if item.string_attribute(AX_TITLE).as_deref() == Some(title) {
                    return Some(item);
                }
                for sub_item in item.element_list(AX_CHILDREN) {
                    if sub_item.string_attribute(AX_TITLE).as_deref() == Some(title) {
                        return Some(sub_item);
                    }
                }
            }
        }

        None
    }

    fn post_new_window_shortcut(pid: i32) -> bool {
        let Ok(source) = CGEventSource::new(CGEventSourceStateID::HIDSystemState) else {
            return false;
        };

        for key_down in [true, false] {
            let Ok(event) = CGEvent::new_keyboard_event(source.clone(), KEY_CODE_N, key_down)
            else {
                return false;
            };
            event.set_flags(CGEventFlags::CGEventFlagCommand);
            event.post_to_pid(pid);
        }

        true
    }

    impl WindowControl for SystemWindowControl {
        fn list_eligible_windows(&self, process: &ProcessHandle) -> Result<Vec<WindowHandle>> {
            let app = AXElement::application(process.pid).ok_or_else(|| {
                WindowTemplatesError::MacOSAPIError(format!(
                    "no accessibility element for pid {}",
                    process.pid
                ))
            })?;

            Ok(standard_windows(&app)
                .iter()
                .filter_map(|window| window.window_id())
                .map(|window_id| WindowHandle::new(process.pid, window_id))
                .collect())
        }

        fn trigger_new_window(&self, process: &ProcessHandle) -> bool {
            let Some(app) = AXElement::application(process.pid) else {
                return false;
            };

            let menu = self
                .new_window_menu_titles
                .iter()
                .find_map(|title| find_menu_item(&app, title).map(|item| (title, item)))
                .map_or(MenuPress::NotFound, |(title, item)| {
                    debug!(bundle_id = %process.bundle_id, title = %title, "Pressing menu item");
                    if item.press() {
                        MenuPress::Pressed
                    } else {
                        MenuPress::Rejected
                    }
                });

            new_window_with_fallback(menu, self.keyboard_fallback, || {
                debug!(bundle_id = %process.bundle_id, ?menu, "Sending Cmd+N");
                post_new_window_shortcut(process.pid)
            })
        }

        fn set_position(&self, window: &WindowHandle, x: f64, y: f64) -> Result<()> {
            let element = resolve_window(window)?;
            let point = CGPoint::new(x, y);
            if element.set_value(
                AX_POSITION,
                K_AX_VALUE_TYPE_CG_POINT,
                (&point as *const CGPoint).cast(),
            ) {
                Ok(())
            } else {
                Err(WindowTemplatesError::MacOSAPIError(format!(
                    "failed to set position of window {}",
                    window.window_id
                ))
                .into())
            }
        }

        fn set_size(&self, window: &WindowHandle, width: f64, height: f64) -> Result<()> {
            let element = resolve_window(window)?;
            let size = CGSize::new(width, height);
            if element.set_value(
                AX_SIZE,
                K_AX_VALUE_TYPE_CG_SIZE,
                (&size as *const CGSize).cast(),
            ) {
                Ok(())
            } else {
                Err(WindowTemplatesError::MacOSAPIError(format!(
                    "failed to set size of window {}",
                    window.window_id
                ))
                .into())
            }
        }
    }
}

#[cfg(not(target_os = "macos"))]
impl WindowControl for SystemWindowControl {
    fn list_eligible_windows(&self, _process: &ProcessHandle) -> Result<Vec<WindowHandle>> {
        Err(WindowTemplatesError::MacOSAPIError(
            "SystemWindowControl is not implemented in this environment".into(),
        )
        .into())
    }

    fn trigger_new_window(&self, _process: &ProcessHandle) -> bool {
        false
    }

    fn set_position(&self, window: &WindowHandle, _x: f64, _y: f64) -> Result<()> {
        Err(WindowTemplatesError::WindowNotFound(window.window_id).into())
    }

    fn set_size(&self, window: &WindowHandle, _width: f64, _height: f64) -> Result<()> {
        Err(WindowTemplatesError::WindowNotFound(window.window_id).into())
    }
}
