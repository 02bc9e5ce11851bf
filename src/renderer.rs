use std::cell::RefCell;
use std::rc::Rc;

use gloo::render::{request_animation_frame, AnimationFrame};
use wasm_bindgen::JsValue;
use web_sys::HtmlVideoElement;

use crate::surface_pool::SurfacePool;
use namipazuru_core::{GeometryCache, TileMapping};

pub(crate) trait VideoSource {
    fn frame_size(&self) -> Option<(u32, u32)>;
    fn is_stopped(&self) -> bool;
    fn start(&self);
}

impl VideoSource for HtmlVideoElement {
    fn frame_size(&self) -> Option<(u32, u32)> {
        let width = self.video_width();
        let height = self.video_height();
        if width == 0 || height == 0 {
            None
        } else {
            Some((width, height))
        }
    }

    fn is_stopped(&self) -> bool {
        self.paused() || self.ended()
    }

    fn start(&self) {
        let Ok(promise) = self.play() else {
            return;
        };
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                gloo::console::warn!("video playback rejected", err);
            }
        });
    }
}

pub(crate) fn viewport_size() -> Option<(f64, f64)> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some((width, height))
}

/// Blits the mapped video region onto every surface.
pub(crate) fn draw_frame(
    video: &HtmlVideoElement,
    pool: &SurfacePool,
    mapping: &TileMapping,
    cache: &mut GeometryCache,
    viewport: (f64, f64),
) -> Result<(), JsValue> {
    let Some(frame) = video.frame_size() else {
        return Ok(());
    };
    let Some(geometry) = cache.get(frame, viewport, pool.grid()) else {
        return Ok(());
    };
    for (index, surface) in pool.surfaces().iter().enumerate() {
        let Some(position) = mapping.position_of(index) else {
            continue;
        };
        let src = geometry.source_rect(position);
        surface
            .context
            .draw_image_with_html_video_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                video,
                src.x,
                src.y,
                src.width,
                src.height,
                0.0,
                0.0,
                surface.canvas.width() as f64,
                surface.canvas.height() as f64,
            )?;
    }
    Ok(())
}

pub(crate) type FrameHook = Rc<dyn Fn()>;

/// Restartable animation-frame chain. It stops by itself once the video
/// pauses or ends and has to be armed again when playback resumes.
pub(crate) struct RenderLoop {
    video: HtmlVideoElement,
    on_frame: FrameHook,
    frame: RefCell<Option<AnimationFrame>>,
}

impl RenderLoop {
    pub(crate) fn new(video: HtmlVideoElement, on_frame: FrameHook) -> Rc<Self> {
        Rc::new(Self {
            video,
            on_frame,
            frame: RefCell::new(None),
        })
    }

    pub(crate) fn is_running(&self) -> bool {
        self.frame.borrow().is_some()
    }

    pub(crate) fn arm(self: &Rc<Self>) {
        if self.is_running() {
            return;
        }
        self.schedule();
    }

    fn schedule(self: &Rc<Self>) {
        let render_loop = Rc::clone(self);
        let handle = request_animation_frame(move |_timestamp| {
            render_loop.tick();
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn tick(self: &Rc<Self>) {
        self.frame.borrow_mut().take();
        if self.video.is_stopped() {
            return;
        }
        (self.on_frame)();
        self.schedule();
    }

    pub(crate) fn stop(&self) {
        self.frame.borrow_mut().take();
    }
}
