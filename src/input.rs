use web_sys::{DomRect, HtmlCanvasElement, MouseEvent, Touch, TouchEvent};

use namipazuru_core::{PointerSample, SurfaceRect};

pub(crate) const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;
pub(crate) const HAPTIC_LIFT_MS: u32 = 50;
pub(crate) const HAPTIC_SWAP_PATTERN: [u32; 3] = [30, 50, 30];

pub(crate) trait HasClientRect {
    fn client_rect(&self) -> DomRect;
}

impl HasClientRect for HtmlCanvasElement {
    fn client_rect(&self) -> DomRect {
        self.get_bounding_client_rect()
    }
}

pub(crate) fn surface_rect(element: &impl HasClientRect) -> SurfaceRect {
    let rect = element.client_rect();
    SurfaceRect::new(
        rect.left() as f32,
        rect.top() as f32,
        rect.width() as f32,
        rect.height() as f32,
    )
}

pub(crate) fn mouse_sample(event: &MouseEvent) -> PointerSample {
    PointerSample::mouse(event.client_x() as f32, event.client_y() as f32)
}

fn touch_sample(touch: &Touch) -> PointerSample {
    PointerSample::touch(
        touch.client_x() as f32,
        touch.client_y() as f32,
        touch.identifier(),
    )
}

/// Which part of a touch gesture an event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TouchPhase {
    Start,
    Move,
    End,
}

impl TouchPhase {
    /// Starts and ends carry the finger that just landed or lifted in
    /// `changedTouches`; `touches` may lead with a finger resting elsewhere.
    pub(crate) fn reads_changed(self) -> bool {
        !matches!(self, TouchPhase::Move)
    }
}

/// Picks the tracked touch when known, else the first one of the list the
/// phase reads.
pub(crate) fn touch_event_sample(
    event: &TouchEvent,
    touch_id: Option<i32>,
    phase: TouchPhase,
) -> Option<PointerSample> {
    let list = if phase.reads_changed() {
        event.changed_touches()
    } else {
        event.touches()
    };
    if let Some(id) = touch_id {
        for index in 0..list.length() {
            if let Some(touch) = list.get(index) {
                if touch.identifier() == id {
                    return Some(touch_sample(&touch));
                }
            }
        }
        return None;
    }
    list.get(0).map(|touch| touch_sample(&touch))
}

pub(crate) fn is_tablet_user_agent(user_agent: &str) -> bool {
    let agent = user_agent.to_ascii_lowercase();
    let android = agent.contains("android");
    let tablet_marker = ["tablet", "ipad", "playbook", "silk"]
        .iter()
        .any(|marker| agent.contains(marker));
    tablet_marker || (android && !agent.contains("mobile"))
}

pub(crate) fn is_tablet_device() -> bool {
    web_sys::window()
        .and_then(|window| window.navigator().user_agent().ok())
        .map(|agent| is_tablet_user_agent(&agent))
        .unwrap_or(false)
}

pub(crate) enum Haptic {
    Lift,
    Swap,
}

pub(crate) fn pulse(kind: Haptic) {
    if !is_tablet_device() {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    let navigator = window.navigator();
    match kind {
        Haptic::Lift => {
            navigator.vibrate_with_duration(HAPTIC_LIFT_MS);
        }
        Haptic::Swap => {
            let pattern = js_sys::Array::new();
            for step in HAPTIC_SWAP_PATTERN {
                pattern.push(&step.into());
            }
            navigator.vibrate_with_pattern(&pattern);
        }
    }
}

/// Remembers the last tap on a surface so a quick second tap can be
/// swallowed before the browser turns it into a zoom.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct DoubleTapGuard {
    last_tap_ms: Option<f64>,
}

impl DoubleTapGuard {
    pub(crate) fn tap(&mut self, now_ms: f64) -> bool {
        let suppress = self
            .last_tap_ms
            .map(|last| now_ms - last <= DOUBLE_TAP_WINDOW_MS)
            .unwrap_or(false);
        self.last_tap_ms = Some(now_ms);
        suppress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tablet_agents_are_detected() {
        assert!(is_tablet_user_agent(
            "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15"
        ));
        assert!(is_tablet_user_agent(
            "Mozilla/5.0 (Linux; Android 14; SM-X710) AppleWebKit/537.36 Chrome/120 Safari/537.36"
        ));
        assert!(is_tablet_user_agent("Mozilla/5.0 (Linux; U; Android 4.0.3; KFTT) Silk/3.68"));
    }

    #[test]
    fn phones_and_desktops_are_not_tablets() {
        assert!(!is_tablet_user_agent(
            "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 Chrome/120 Mobile Safari/537.36"
        ));
        assert!(!is_tablet_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120 Safari/537.36"
        ));
    }

    #[test]
    fn touch_start_reads_the_landing_finger() {
        assert!(TouchPhase::Start.reads_changed());
        assert!(TouchPhase::End.reads_changed());
        assert!(!TouchPhase::Move.reads_changed());
    }

    #[test]
    fn double_tap_window() {
        let mut guard = DoubleTapGuard::default();
        assert!(!guard.tap(1000.0));
        assert!(guard.tap(1250.0));
        assert!(!guard.tap(1700.0));
        assert!(guard.tap(2000.0));
    }
}
