use std::rc::Rc;

use web_sys::Element;
use yew::prelude::*;

use crate::audio::AudioStatus;
use crate::chrome::ChromeController;
use crate::widget_core::{audio_label, play_label};

#[derive(Properties)]
pub(crate) struct ChromeProps {
    pub(crate) chrome: Rc<ChromeController>,
}

impl PartialEq for ChromeProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.chrome, &other.chrome)
    }
}

fn audio_class(status: AudioStatus) -> &'static str {
    match status {
        AudioStatus::Muted => "audio-muted",
        AudioStatus::Playing => "audio-playing",
        AudioStatus::Error => "audio-error",
    }
}

#[function_component(ChromeControls)]
pub(crate) fn chrome_controls(props: &ChromeProps) -> Html {
    let chrome = props.chrome.clone();
    let snapshot = use_state(|| chrome.core().snapshot());
    {
        let chrome = chrome.clone();
        let snapshot = snapshot.clone();
        use_effect_with((), move |_| {
            let core = chrome.core().clone();
            let core_for_cb = core.clone();
            let subscription = core.subscribe(Rc::new(move || {
                snapshot.set(core_for_cb.snapshot());
            }));
            move || drop(subscription)
        });
    }

    let on_play = {
        let chrome = chrome.clone();
        Callback::from(move |_: MouseEvent| chrome.play())
    };
    let on_audio_click = {
        let chrome = chrome.clone();
        Callback::from(move |_: MouseEvent| chrome.toggle_audio())
    };
    // Tablets fire both touchend and click; keep only the touch.
    let on_audio_touch = {
        let chrome = chrome.clone();
        Callback::from(move |event: TouchEvent| {
            event.prevent_default();
            chrome.toggle_audio();
        })
    };
    let on_enter = {
        let chrome = chrome.clone();
        Callback::from(move |_: MouseEvent| chrome.show_controls())
    };
    let on_leave = {
        let chrome = chrome.clone();
        Callback::from(move |_: MouseEvent| chrome.hide_controls_later())
    };

    let state = snapshot.chrome;
    html! {
        <div class="button-container" onmouseenter={on_enter} onmouseleave={on_leave}>
            <button id="playBtn" class="control-btn" onclick={on_play}>
                { play_label(&state) }
            </button>
            <button
                id="audioBtn"
                class={classes!("control-btn", audio_class(state.audio))}
                onclick={on_audio_click}
                ontouchend={on_audio_touch}
            >
                { audio_label(&state) }
            </button>
        </div>
    }
}

pub(crate) fn mount_chrome(root: Element, chrome: Rc<ChromeController>) -> yew::AppHandle<ChromeControls> {
    yew::Renderer::<ChromeControls>::with_root_and_props(root, ChromeProps { chrome }).render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_status_maps_to_button_class() {
        assert_eq!(audio_class(AudioStatus::Muted), "audio-muted");
        assert_eq!(audio_class(AudioStatus::Playing), "audio-playing");
        assert_eq!(audio_class(AudioStatus::Error), "audio-error");
    }
}
