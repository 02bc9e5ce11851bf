use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{AudioContext, AudioContextState, HtmlAudioElement};

pub(crate) const AUDIO_VOLUME: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AudioStatus {
    Muted,
    Playing,
    Error,
}

pub(crate) trait AmbientAudio {
    /// Unmutes, starting playback first when the platform has not allowed it
    /// yet. `done` receives the resulting status once it is known.
    fn unmute(self: Rc<Self>, done: Rc<dyn Fn(AudioStatus)>);
    fn mute(&self);
    fn is_muted(&self) -> bool;
    /// Best-effort start used on the first user gesture.
    fn prime(self: Rc<Self>);
    /// Resumes a suspended context after the page becomes visible again.
    fn resume(self: Rc<Self>);
}

pub(crate) struct ShoreAudio {
    element: HtmlAudioElement,
    context: RefCell<Option<AudioContext>>,
    started: Cell<bool>,
    muted: Cell<bool>,
    // Set while an unmute is waiting on `play()`; repeat toggles are dropped.
    unmuting: Cell<bool>,
}

impl ShoreAudio {
    pub(crate) fn new(element: HtmlAudioElement) -> Rc<Self> {
        element.set_volume(AUDIO_VOLUME);
        element.set_muted(true);
        Rc::new(Self {
            element,
            context: RefCell::new(None),
            started: Cell::new(false),
            muted: Cell::new(true),
            unmuting: Cell::new(false),
        })
    }

    pub(crate) fn preload(&self) {
        self.element.set_preload("auto");
        self.element.load();
    }

    fn ensure_context(&self) {
        let mut slot = self.context.borrow_mut();
        if slot.is_none() {
            match AudioContext::new() {
                Ok(context) => *slot = Some(context),
                Err(err) => {
                    gloo::console::log!("audio context initialization failed", err);
                    return;
                }
            }
        }
        let Some(context) = slot.as_ref() else {
            return;
        };
        if context.state() != AudioContextState::Suspended {
            return;
        }
        match context.resume() {
            Ok(promise) => spawn_local(async move {
                match JsFuture::from(promise).await {
                    Ok(_) => gloo::console::log!("audio context resumed"),
                    Err(err) => gloo::console::log!("failed to resume audio context", err),
                }
            }),
            Err(err) => gloo::console::log!("failed to resume audio context", err),
        }
    }

    fn play_promise(&self) -> Result<Promise, JsValue> {
        self.element.play()
    }

    fn apply_unmuted(&self) {
        self.element.set_volume(AUDIO_VOLUME);
        self.element.set_muted(false);
        self.muted.set(false);
    }
}

impl AmbientAudio for ShoreAudio {
    fn unmute(self: Rc<Self>, done: Rc<dyn Fn(AudioStatus)>) {
        self.ensure_context();
        if self.started.get() {
            self.apply_unmuted();
            done(AudioStatus::Playing);
            return;
        }
        if self.unmuting.replace(true) {
            return;
        }
        let promise = match self.play_promise() {
            Ok(promise) => promise,
            Err(err) => {
                self.unmuting.set(false);
                gloo::console::error!("failed to start audio", err);
                done(AudioStatus::Error);
                return;
            }
        };
        spawn_local(async move {
            let outcome = JsFuture::from(promise).await;
            self.unmuting.set(false);
            match outcome {
                Ok(_) => {
                    self.started.set(true);
                    self.apply_unmuted();
                    gloo::console::log!("audio unmuted");
                    done(AudioStatus::Playing);
                }
                Err(err) => {
                    gloo::console::error!("failed to start audio", err);
                    done(AudioStatus::Error);
                }
            }
        });
    }

    fn mute(&self) {
        self.element.set_muted(true);
        self.muted.set(true);
    }

    fn is_muted(&self) -> bool {
        self.muted.get()
    }

    fn prime(self: Rc<Self>) {
        self.ensure_context();
        if self.started.get() {
            return;
        }
        let Ok(promise) = self.play_promise() else {
            return;
        };
        spawn_local(async move {
            match JsFuture::from(promise).await {
                Ok(_) => {
                    gloo::console::log!("audio playback started");
                    self.started.set(true);
                }
                Err(err) => {
                    gloo::console::log!(
                        "audio autoplay prevented, will retry on next interaction",
                        err
                    );
                }
            }
        });
    }

    fn resume(self: Rc<Self>) {
        if !self.started.get() || self.muted.get() {
            return;
        }
        self.ensure_context();
        if !self.element.paused() {
            return;
        }
        let Ok(promise) = self.play_promise() else {
            return;
        };
        spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                gloo::console::log!("failed to resume audio playback", err);
            }
        });
    }
}

/// Stand-in when the page has no audio element; every unmute fails.
pub(crate) struct SilentAudio;

impl AmbientAudio for SilentAudio {
    fn unmute(self: Rc<Self>, done: Rc<dyn Fn(AudioStatus)>) {
        gloo::console::warn!("no ambient audio element on this page");
        done(AudioStatus::Error);
    }

    fn mute(&self) {}

    fn is_muted(&self) -> bool {
        true
    }

    fn prime(self: Rc<Self>) {}

    fn resume(self: Rc<Self>) {}
}
