use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent};

use crate::audio::{AmbientAudio, AudioStatus};
use crate::fullscreen::FullscreenControl;
use crate::widget_core::{PlayAction, WidgetCore, WidgetSnapshot, WidgetSubscription};

pub(crate) const FULLSCREEN_CLASS: &str = "fullscreen-mode";
pub(crate) const SHOW_CONTROLS_CLASS: &str = "show-controls";
const FULLSCREEN_UNMUTE_DELAY_MS: u32 = 100;
const AUDIO_ERROR_RESET_MS: u32 = 2_000;
const CONTROLS_HIDE_DELAY_MS: u32 = 1_000;
const PRIMING_EVENTS: [&str; 4] = ["click", "keydown", "touchstart", "touchend"];

/// Play, audio and fullscreen behaviour around the puzzle: page classes,
/// hover reveal and the global keyboard and visibility hooks.
pub(crate) struct ChromeController {
    core: Rc<WidgetCore>,
    fullscreen: Rc<dyn FullscreenControl>,
    audio: Rc<dyn AmbientAudio>,
    body: Option<HtmlElement>,
    unmute_timer: RefCell<Option<Timeout>>,
    error_timer: RefCell<Option<Timeout>>,
    hide_timer: RefCell<Option<Timeout>>,
    listeners: RefCell<Vec<EventListener>>,
    subscription: RefCell<Option<WidgetSubscription>>,
}

impl ChromeController {
    pub(crate) fn new(
        core: Rc<WidgetCore>,
        fullscreen: Rc<dyn FullscreenControl>,
        audio: Rc<dyn AmbientAudio>,
        body: Option<HtmlElement>,
    ) -> Rc<Self> {
        Rc::new(Self {
            core,
            fullscreen,
            audio,
            body,
            unmute_timer: RefCell::new(None),
            error_timer: RefCell::new(None),
            hide_timer: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            subscription: RefCell::new(None),
        })
    }

    pub(crate) fn core(&self) -> &Rc<WidgetCore> {
        &self.core
    }

    pub(crate) fn play(&self) {
        if self.core.press_play() != PlayAction::ShuffleAndEnterFullscreen {
            return;
        }
        if self.fullscreen.is_fullscreen() {
            return;
        }
        if !self.fullscreen.is_supported() {
            gloo::console::warn!("fullscreen unavailable, shuffling in place");
            return;
        }
        if let Err(err) = self.fullscreen.enter() {
            gloo::console::error!("error attempting to enable fullscreen", err);
        }
    }

    pub(crate) fn toggle_audio(self: &Rc<Self>) {
        if !self.audio.is_muted() {
            self.audio.mute();
            self.core.set_audio_status(AudioStatus::Muted);
            return;
        }
        let chrome = Rc::downgrade(self);
        Rc::clone(&self.audio).unmute(Rc::new(move |status| {
            if let Some(chrome) = chrome.upgrade() {
                chrome.audio_settled(status);
            }
        }));
    }

    fn audio_settled(self: &Rc<Self>, status: AudioStatus) {
        self.core.set_audio_status(status);
        if status != AudioStatus::Error {
            self.error_timer.borrow_mut().take();
            return;
        }
        let chrome = Rc::downgrade(self);
        let timeout = Timeout::new(AUDIO_ERROR_RESET_MS, move || {
            let Some(chrome) = chrome.upgrade() else {
                return;
            };
            if chrome.core.snapshot().chrome.audio == AudioStatus::Error {
                chrome.core.set_audio_status(AudioStatus::Muted);
            }
        });
        *self.error_timer.borrow_mut() = Some(timeout);
    }

    pub(crate) fn fullscreen_changed(self: &Rc<Self>) {
        let fullscreen = self.fullscreen.is_fullscreen();
        gloo::console::log!("fullscreen changed", fullscreen);
        self.core.set_fullscreen(fullscreen);
        if fullscreen {
            if self.audio.is_muted() {
                let chrome = Rc::downgrade(self);
                let timeout = Timeout::new(FULLSCREEN_UNMUTE_DELAY_MS, move || {
                    let Some(chrome) = chrome.upgrade() else {
                        return;
                    };
                    if chrome.audio.is_muted() {
                        chrome.toggle_audio();
                    }
                });
                *self.unmute_timer.borrow_mut() = Some(timeout);
            }
            return;
        }
        self.unmute_timer.borrow_mut().take();
        self.hide_timer.borrow_mut().take();
        if !self.audio.is_muted() {
            self.audio.mute();
            self.core.set_audio_status(AudioStatus::Muted);
        }
    }

    /// Hover reveal only applies in fullscreen; controls are always shown
    /// otherwise.
    pub(crate) fn show_controls(&self) {
        if !self.core.snapshot().chrome.fullscreen {
            return;
        }
        self.hide_timer.borrow_mut().take();
        self.core.set_controls_visible(true);
    }

    pub(crate) fn hide_controls_later(self: &Rc<Self>) {
        if !self.core.snapshot().chrome.fullscreen {
            return;
        }
        let chrome = Rc::downgrade(self);
        let timeout = Timeout::new(CONTROLS_HIDE_DELAY_MS, move || {
            if let Some(chrome) = chrome.upgrade() {
                chrome.core.set_controls_visible(false);
            }
        });
        *self.hide_timer.borrow_mut() = Some(timeout);
    }

    fn sync_page_classes(&self, snapshot: &WidgetSnapshot) {
        let Some(body) = self.body.as_ref() else {
            return;
        };
        let classes = body.class_list();
        let _ = classes.toggle_with_force(FULLSCREEN_CLASS, snapshot.chrome.fullscreen);
        let _ = classes.toggle_with_force(
            SHOW_CONTROLS_CLASS,
            snapshot.chrome.fullscreen && snapshot.chrome.controls_visible,
        );
    }

    /// Wires document-level hooks. Listeners live as long as the controller.
    pub(crate) fn attach(self: &Rc<Self>, document: &Document, hover_trigger: Option<&Element>) {
        let weak = Rc::downgrade(self);
        let subscription = self.core.subscribe(Rc::new(move || {
            if let Some(chrome) = weak.upgrade() {
                chrome.sync_page_classes(&chrome.core.snapshot());
            }
        }));
        *self.subscription.borrow_mut() = Some(subscription);
        self.sync_page_classes(&self.core.snapshot());

        let mut listeners = Vec::new();
        let weak = Rc::downgrade(self);
        listeners.extend(self.fullscreen.on_change(Rc::new(move || {
            if let Some(chrome) = weak.upgrade() {
                chrome.fullscreen_changed();
            }
        })));

        for event in PRIMING_EVENTS {
            listeners.push(self.priming_listener(document, event));
        }

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            document,
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event: &Event| {
                let Some(chrome) = weak.upgrade() else {
                    return;
                };
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if event.code() != "Space" || targets_control(event) {
                    return;
                }
                event.prevent_default();
                chrome.toggle_audio();
            },
        ));

        let weak = Rc::downgrade(self);
        let visibility_document = document.clone();
        listeners.push(EventListener::new(document, "visibilitychange", move |_| {
            if visibility_document.hidden() {
                return;
            }
            if let Some(chrome) = weak.upgrade() {
                Rc::clone(&chrome.audio).resume();
            }
        }));

        if let Some(trigger) = hover_trigger {
            listeners.extend(self.hover_listeners(trigger));
        } else {
            gloo::console::warn!("hover trigger missing, controls reveal only over the buttons");
        }
        self.listeners.borrow_mut().extend(listeners);
    }

    pub(crate) fn hover_listeners(self: &Rc<Self>, target: &Element) -> [EventListener; 2] {
        let enter = weak_handler(self, |chrome| chrome.show_controls());
        let leave = weak_handler(self, |chrome| chrome.hide_controls_later());
        [
            EventListener::new(target, "mouseenter", move |_| enter()),
            EventListener::new(target, "mouseleave", move |_| leave()),
        ]
    }

    // Autoplay policies only allow playback after a gesture; each event type
    // primes at most once.
    fn priming_listener(self: &Rc<Self>, document: &Document, event: &'static str) -> EventListener {
        let weak = Rc::downgrade(self);
        let fired = Cell::new(false);
        EventListener::new(document, event, move |_| {
            if fired.replace(true) {
                return;
            }
            if let Some(chrome) = weak.upgrade() {
                Rc::clone(&chrome.audio).prime();
            }
        })
    }

    pub(crate) fn detach(&self) {
        if self.fullscreen.is_fullscreen() {
            if let Err(err) = self.fullscreen.exit() {
                gloo::console::warn!("failed to leave fullscreen", err);
            }
        }
        self.listeners.borrow_mut().clear();
        self.subscription.borrow_mut().take();
        self.unmute_timer.borrow_mut().take();
        self.error_timer.borrow_mut().take();
        self.hide_timer.borrow_mut().take();
    }
}

fn weak_handler(
    chrome: &Rc<ChromeController>,
    action: impl Fn(&Rc<ChromeController>) + 'static,
) -> impl Fn() + 'static {
    let weak: Weak<ChromeController> = Rc::downgrade(chrome);
    move || {
        if let Some(chrome) = weak.upgrade() {
            action(&chrome);
        }
    }
}

fn targets_control(event: &KeyboardEvent) -> bool {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .map(|element| element.matches("button, input, textarea").unwrap_or(false))
        .unwrap_or(false)
}
