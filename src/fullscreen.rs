use std::rc::Rc;

use gloo::events::EventListener;
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, OrientationLockType};

pub(crate) trait FullscreenControl {
    fn name(&self) -> &'static str;
    fn is_supported(&self) -> bool;
    fn enter(&self) -> Result<(), JsValue>;
    fn exit(&self) -> Result<(), JsValue>;
    fn is_fullscreen(&self) -> bool;
    fn on_change(&self, callback: Rc<dyn Fn()>) -> Vec<EventListener>;
}

/// Method and property names of one vendor flavour of the Fullscreen API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FullscreenVendor {
    pub(crate) name: &'static str,
    pub(crate) request: &'static [&'static str],
    pub(crate) exit: &'static [&'static str],
    pub(crate) element: &'static str,
    pub(crate) change_event: &'static str,
}

pub(crate) const FULLSCREEN_VENDORS: [FullscreenVendor; 4] = [
    FullscreenVendor {
        name: "standard",
        request: &["requestFullscreen"],
        exit: &["exitFullscreen"],
        element: "fullscreenElement",
        change_event: "fullscreenchange",
    },
    FullscreenVendor {
        name: "webkit",
        request: &["webkitRequestFullscreen", "webkitRequestFullScreen"],
        exit: &["webkitExitFullscreen", "webkitCancelFullScreen"],
        element: "webkitFullscreenElement",
        change_event: "webkitfullscreenchange",
    },
    FullscreenVendor {
        name: "moz",
        request: &["mozRequestFullScreen"],
        exit: &["mozCancelFullScreen"],
        element: "mozFullScreenElement",
        change_event: "mozfullscreenchange",
    },
    FullscreenVendor {
        name: "ms",
        request: &["msRequestFullscreen"],
        exit: &["msExitFullscreen"],
        element: "msFullscreenElement",
        change_event: "MSFullscreenChange",
    },
];

fn method(target: &JsValue, names: &[&str]) -> Option<Function> {
    names.iter().find_map(|name| {
        Reflect::get(target, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
    })
}

// Browsers disagree on whether these calls return a promise; rejections are
// logged instead of surfacing as unhandled errors.
fn watch_promise(value: JsValue, context: &'static str) {
    let Ok(promise) = value.dyn_into::<Promise>() else {
        return;
    };
    spawn_local(async move {
        if let Err(err) = JsFuture::from(promise).await {
            gloo::console::warn!(context, err);
        }
    });
}

pub(crate) struct VendorFullscreen {
    vendor: FullscreenVendor,
    document: Document,
    root: Element,
}

impl VendorFullscreen {
    pub(crate) fn new(vendor: FullscreenVendor, document: Document, root: Element) -> Self {
        Self {
            vendor,
            document,
            root,
        }
    }
}

impl FullscreenControl for VendorFullscreen {
    fn name(&self) -> &'static str {
        self.vendor.name
    }

    fn is_supported(&self) -> bool {
        true
    }

    fn enter(&self) -> Result<(), JsValue> {
        let Some(request) = method(&self.root, self.vendor.request) else {
            return Err(JsValue::from_str("fullscreen request unavailable"));
        };
        let result = request.call0(&self.root)?;
        watch_promise(result, "fullscreen request rejected");
        Ok(())
    }

    fn exit(&self) -> Result<(), JsValue> {
        let Some(exit) = method(&self.document, self.vendor.exit) else {
            return Err(JsValue::from_str("fullscreen exit unavailable"));
        };
        let result = exit.call0(&self.document)?;
        watch_promise(result, "fullscreen exit rejected");
        Ok(())
    }

    fn is_fullscreen(&self) -> bool {
        Reflect::get(&self.document, &JsValue::from_str(self.vendor.element))
            .map(|value| !value.is_null() && !value.is_undefined())
            .unwrap_or(false)
    }

    fn on_change(&self, callback: Rc<dyn Fn()>) -> Vec<EventListener> {
        vec![EventListener::new(
            &self.document,
            self.vendor.change_event,
            move |_| callback(),
        )]
    }
}

pub(crate) struct UnsupportedFullscreen;

impl FullscreenControl for UnsupportedFullscreen {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn is_supported(&self) -> bool {
        false
    }

    fn enter(&self) -> Result<(), JsValue> {
        Err(JsValue::from_str("Fullscreen API not supported"))
    }

    fn exit(&self) -> Result<(), JsValue> {
        Err(JsValue::from_str("Exit fullscreen API not supported"))
    }

    fn is_fullscreen(&self) -> bool {
        false
    }

    fn on_change(&self, _callback: Rc<dyn Fn()>) -> Vec<EventListener> {
        Vec::new()
    }
}

/// Checks the page once and returns the first vendor whose request method
/// exists on the root element.
pub(crate) fn select_fullscreen(document: &Document) -> Rc<dyn FullscreenControl> {
    let Some(root) = document.document_element() else {
        gloo::console::warn!("fullscreen: no document element");
        return Rc::new(UnsupportedFullscreen);
    };
    for vendor in FULLSCREEN_VENDORS {
        if method(&root, vendor.request).is_some() {
            return Rc::new(VendorFullscreen::new(vendor, document.clone(), root));
        }
    }
    gloo::console::warn!("fullscreen: api not available, continuing without it");
    Rc::new(UnsupportedFullscreen)
}

pub(crate) fn lock_landscape() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(screen) = window.screen() else {
        return;
    };
    let orientation = screen.orientation();
    // Older engines expose `screen.orientation` without `lock`.
    let has_lock = Reflect::get(&orientation, &JsValue::from_str("lock"))
        .map(|value| value.is_function())
        .unwrap_or(false);
    if !has_lock {
        gloo::console::log!("orientation lock not supported");
        return;
    }
    match orientation.lock(OrientationLockType::Landscape) {
        Ok(promise) => watch_promise(promise.into(), "orientation lock not supported or denied"),
        Err(err) => gloo::console::log!("orientation lock failed", err),
    }
}
