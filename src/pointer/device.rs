use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Global pointer state
///
/// Platform-specific implementations:
/// - macOS: NSEvent button state + CGEvent cursor location
/// - elsewhere: `PassivePointer`, which never reports a press
pub trait PointerDevice: Send + Sync {
    /// True once for each press of the primary button since the last call
    fn take_press(&self) -> bool;

    /// Current cursor position in global screen pixels
    fn location(&self) -> (i32, i32);

    /// Get device name for logging
    fn name(&self) -> &str;
}

/// Turns a sampled "button is down" level into press edges
#[derive(Debug, Default)]
pub struct PressEdge {
    was_down: AtomicBool,
}

impl PressEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current level; true on an up -> down transition
    pub fn update(&self, down: bool) -> bool {
        let was_down = self.was_down.swap(down, Ordering::SeqCst);
        down && !was_down
    }
}

/// Pointer for platforms without global pointer access
#[derive(Debug, Default)]
pub struct PassivePointer;

impl PointerDevice for PassivePointer {
    fn take_press(&self) -> bool {
        false
    }

    fn location(&self) -> (i32, i32) {
        (0, 0)
    }

    fn name(&self) -> &str {
        "passive"
    }
}

/// Pointer driven by queued clicks instead of real hardware
#[derive(Debug, Default)]
pub struct ScriptedPointer {
    pending: Mutex<VecDeque<(i32, i32)>>,
    position: Mutex<(i32, i32)>,
}

impl ScriptedPointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a press at `(x, y)`; it is reported on the next sample
    pub fn click(&self, x: i32, y: i32) {
        self.pending.lock().push_back((x, y));
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }
}

impl PointerDevice for ScriptedPointer {
    fn take_press(&self) -> bool {
        match self.pending.lock().pop_front() {
            Some(pos) => {
                *self.position.lock() = pos;
                true
            }
            None => false,
        }
    }

    fn location(&self) -> (i32, i32) {
        *self.position.lock()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(target_os = "macos")]
pub use macos::MacOsPointer;

#[cfg(target_os = "macos")]
mod macos {
    use super::{PointerDevice, PressEdge};
    use core_graphics::event::CGEvent;
    use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
    use objc2_app_kit::NSEvent;

    /// macOS pointer backed by AppKit and CoreGraphics
    #[derive(Debug, Default)]
    pub struct MacOsPointer {
        left: PressEdge,
    }

    impl MacOsPointer {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl PointerDevice for MacOsPointer {
        fn take_press(&self) -> bool {
            // Bit 0 = left, bit 1 = right, bit 2 = middle
            let buttons = unsafe { NSEvent::pressedMouseButtons() };
            self.left.update(buttons & 1 != 0)
        }

        fn location(&self) -> (i32, i32) {
            // CGEvent locations use a top-left origin, matching captured frames
            CGEventSource::new(CGEventSourceStateID::CombinedSessionState)
                .and_then(CGEvent::new)
                .map(|event| {
                    let point = event.location();
                    (point.x.round() as i32, point.y.round() as i32)
                })
                .unwrap_or((0, 0))
        }

        fn name(&self) -> &str {
            "macOS"
        }
    }
}

/// Pointer device for the current platform
pub fn system_pointer() -> Arc<dyn PointerDevice> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(MacOsPointer::new())
    }

    #[cfg(not(target_os = "macos"))]
    {
        tracing::warn!("Global pointer tracking is only supported on macOS; clicks will not create zoom points");
        Arc::new(PassivePointer)
    }
}
