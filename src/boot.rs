#[cfg(target_arch = "wasm32")]
use std::cell::Cell;

#[cfg(target_arch = "wasm32")]
use js_sys::{Array, Function, Object, Reflect};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};

#[cfg(target_arch = "wasm32")]
const LOADER_KEY: &str = "__NP_BOOT";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BootPhase {
    ReadingPage,
    Mounting,
}

impl BootPhase {
    fn label(self) -> &'static str {
        match self {
            BootPhase::ReadingPage => "init",
            BootPhase::Mounting => "mount",
        }
    }

    fn detail(self) -> &'static str {
        match self {
            BootPhase::ReadingPage => "reading page",
            BootPhase::Mounting => "building puzzle",
        }
    }
}

/// Reasons the widget cannot start at all. Anything softer is logged and
/// skipped instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BootFailure {
    NoWindow,
    NoDocument,
    MissingElement(&'static str),
}

impl BootFailure {
    pub(crate) fn code(self) -> &'static str {
        match self {
            BootFailure::NoWindow => "no-window",
            BootFailure::NoDocument => "no-document",
            BootFailure::MissingElement(_) => "missing-element",
        }
    }

    pub(crate) fn message(self) -> String {
        match self {
            BootFailure::NoWindow => "no browser window".to_string(),
            BootFailure::NoDocument => "no document".to_string(),
            BootFailure::MissingElement(id) => format!("element #{id} not found"),
        }
    }

    pub(crate) fn hint(self) -> &'static str {
        match self {
            BootFailure::NoWindow | BootFailure::NoDocument => "run the widget inside a browser page",
            BootFailure::MissingElement(_) => {
                "the page markup must include the puzzle video and grid container"
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
thread_local! {
    static READY_SENT: Cell<bool> = Cell::new(false);
}

// The loader object and its hooks are optional; a bare page just gets the
// console output.
#[cfg(target_arch = "wasm32")]
fn notify_loader(hook: &str, args: &[&str]) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let loader = Reflect::get(&window, &JsValue::from_str(LOADER_KEY))
        .ok()
        .and_then(|value| value.dyn_into::<Object>().ok());
    let Some(loader) = loader else {
        return;
    };
    let Some(callback) = Reflect::get(&loader, &JsValue::from_str(hook))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
    else {
        return;
    };
    let values: Array = args.iter().map(|arg| JsValue::from_str(arg)).collect();
    if let Err(err) = callback.apply(&loader, &values) {
        gloo::console::warn!("boot loader hook failed", hook.to_string(), err);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn notify_loader(_hook: &str, _args: &[&str]) {}

pub(crate) fn enter(phase: BootPhase) {
    notify_loader("setPhase", &[phase.label(), phase.detail()]);
}

pub(crate) fn fail(failure: BootFailure) {
    let message = failure.message();
    gloo::console::error!("boot failed", failure.code(), message.clone());
    notify_loader("fail", &[failure.code(), &message, failure.hint()]);
}

/// Tells the loader the widget is live. Only the first call reaches it.
pub(crate) fn ready() {
    #[cfg(target_arch = "wasm32")]
    {
        if READY_SENT.with(|sent| sent.replace(true)) {
            return;
        }
    }
    notify_loader("ready", &[]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_element_names_the_id() {
        let failure = BootFailure::MissingElement("gridContainer");
        assert_eq!(failure.code(), "missing-element");
        assert_eq!(failure.message(), "element #gridContainer not found");
        assert!(failure.hint().contains("grid container"));
    }

    #[test]
    fn phases_map_to_loader_labels() {
        assert_eq!(BootPhase::ReadingPage.label(), "init");
        assert_eq!(BootPhase::Mounting.label(), "mount");
        assert_eq!(BootPhase::Mounting.detail(), "building puzzle");
    }

    #[test]
    fn page_level_failures_have_distinct_codes() {
        assert_eq!(BootFailure::NoWindow.code(), "no-window");
        assert_eq!(BootFailure::NoDocument.code(), "no-document");
    }
}
