use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, HtmlAudioElement, HtmlElement, HtmlVideoElement};
use yew::AppHandle;

use crate::audio::{AmbientAudio, ShoreAudio, SilentAudio};
use crate::boot::{self, BootFailure, BootPhase};
use crate::canvas_view::CanvasView;
use crate::chrome::ChromeController;
use crate::config::{
    load_widget_config, AUDIO_ID, CONTROLS_ROOT_ID, GRID_CONTAINER_ID, HOVER_TRIGGER_ID, VIDEO_ID,
};
use crate::fullscreen::select_fullscreen;
use crate::input::is_tablet_device;
use crate::widget_core::WidgetCore;
use crate::yew_app::{self, ChromeControls};

struct MountedWidget {
    view: Rc<CanvasView>,
    chrome: Rc<ChromeController>,
    _controls: Option<AppHandle<ChromeControls>>,
    _teardown: EventListener,
}

thread_local! {
    static MOUNTED: RefCell<Option<MountedWidget>> = RefCell::new(None);
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<T>().ok())
}

fn ambient_audio(document: &Document) -> Rc<dyn AmbientAudio> {
    let Some(element) = element_by_id::<HtmlAudioElement>(document, AUDIO_ID) else {
        gloo::console::warn!("ambient audio element missing, audio disabled");
        return Rc::new(SilentAudio);
    };
    let audio = ShoreAudio::new(element);
    if is_tablet_device() {
        gloo::console::log!("tablet detected, preloading audio");
        audio.preload();
    }
    audio
}

fn teardown() {
    let Some(widget) = MOUNTED.with(|slot| slot.borrow_mut().take()) else {
        return;
    };
    widget.chrome.detach();
    widget.view.dispose();
}

pub(crate) fn run() {
    boot::enter(BootPhase::ReadingPage);
    let Some(window) = window() else {
        boot::fail(BootFailure::NoWindow);
        return;
    };
    let Some(document) = window.document() else {
        boot::fail(BootFailure::NoDocument);
        return;
    };
    let Some(video) = element_by_id::<HtmlVideoElement>(&document, VIDEO_ID) else {
        boot::fail(BootFailure::MissingElement(VIDEO_ID));
        return;
    };
    let Some(container) = element_by_id::<HtmlElement>(&document, GRID_CONTAINER_ID) else {
        boot::fail(BootFailure::MissingElement(GRID_CONTAINER_ID));
        return;
    };

    let config = load_widget_config();
    let core = WidgetCore::install(&config);
    let fullscreen = select_fullscreen(&document);
    gloo::console::log!("fullscreen strategy", fullscreen.name());
    let audio = ambient_audio(&document);

    boot::enter(BootPhase::Mounting);
    let chrome = ChromeController::new(core.clone(), fullscreen.clone(), audio, document.body());
    let hover_trigger = document.get_element_by_id(HOVER_TRIGGER_ID);
    chrome.attach(&document, hover_trigger.as_ref());
    let view = CanvasView::mount(core, config, document.clone(), video, container, fullscreen);

    let controls = match document.get_element_by_id(CONTROLS_ROOT_ID) {
        Some(root) => Some(yew_app::mount_chrome(root, chrome.clone())),
        None => {
            gloo::console::warn!("controls root missing, running without buttons");
            None
        }
    };
    let teardown_listener = EventListener::new(&window, "pagehide", |_| teardown());
    MOUNTED.with(|slot| {
        *slot.borrow_mut() = Some(MountedWidget {
            view,
            chrome,
            _controls: controls,
            _teardown: teardown_listener,
        });
    });
    boot::ready();
}
