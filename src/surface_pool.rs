use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, Event, HtmlCanvasElement, HtmlElement, MouseEvent, TouchEvent};

use crate::input::{mouse_sample, surface_rect, touch_event_sample, TouchPhase};
use namipazuru_core::{surface_backing_size, GridSize, PointerSample, SurfaceRect};

pub(crate) const DRAG_SCALE: f32 = 1.05;
const SOLVED_CLASS: &str = "solved";
const DRAGGING_CLASS: &str = "dragging";

pub(crate) type SurfaceDown = Rc<dyn Fn(usize, PointerSample)>;

pub(crate) struct Surface {
    pub(crate) canvas: HtmlCanvasElement,
    pub(crate) context: CanvasRenderingContext2d,
    _listeners: Vec<EventListener>,
}

/// Canvases laid out in the grid container, one per cell, indexed by
/// identity.
pub(crate) struct SurfacePool {
    document: Document,
    container: HtmlElement,
    surfaces: Vec<Surface>,
    grid: GridSize,
}

impl SurfacePool {
    pub(crate) fn new(document: Document, container: HtmlElement, grid: GridSize) -> Self {
        Self {
            document,
            container,
            surfaces: Vec::new(),
            grid,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub(crate) fn grid(&self) -> GridSize {
        self.grid
    }

    pub(crate) fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Drops every canvas (and its listeners) and lays out a fresh set.
    pub(crate) fn rebuild(
        &mut self,
        grid: GridSize,
        video_size: Option<(u32, u32)>,
        on_down: SurfaceDown,
    ) -> Result<(), JsValue> {
        self.surfaces.clear();
        self.container.set_inner_html("");
        self.grid = grid;
        let style = self.container.style();
        style.set_property("grid-template-columns", &format!("repeat({}, 1fr)", grid.cols))?;
        style.set_property("grid-template-rows", &format!("repeat({}, 1fr)", grid.rows))?;
        for index in 0..grid.total() {
            let surface = self.create_surface(index, on_down.clone())?;
            self.surfaces.push(surface);
        }
        if let Some((width, height)) = video_size {
            self.resize(width, height);
        }
        self.set_solved(false);
        Ok(())
    }

    fn create_surface(&self, index: usize, on_down: SurfaceDown) -> Result<Surface, JsValue> {
        let holder = self.document.create_element("div")?;
        holder.set_class_name("canvas-container");
        let canvas = self
            .document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        canvas.style().set_property("touch-action", "none")?;
        holder.append_child(&canvas)?;
        self.container.append_child(&holder)?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let mouse_down = on_down.clone();
        let mouse_listener = EventListener::new(&canvas, "mousedown", move |event: &Event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            if event.button() != 0 {
                return;
            }
            mouse_down(index, mouse_sample(event));
        });
        let touch_listener = EventListener::new_with_options(
            &canvas,
            "touchstart",
            EventListenerOptions::enable_prevent_default(),
            move |event: &Event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                event.stop_propagation();
                if let Some(sample) = touch_event_sample(event, None, TouchPhase::Start) {
                    on_down(index, sample);
                }
            },
        );
        Ok(Surface {
            canvas,
            context,
            _listeners: vec![mouse_listener, touch_listener],
        })
    }

    /// Sets backing pixel sizes; identities and mapping are untouched.
    pub(crate) fn resize(&self, video_width: u32, video_height: u32) {
        let Some((width, height)) = surface_backing_size(video_width, video_height, self.grid) else {
            return;
        };
        for surface in &self.surfaces {
            surface.canvas.set_width(width);
            surface.canvas.set_height(height);
        }
    }

    pub(crate) fn rects(&self) -> Vec<SurfaceRect> {
        self.surfaces
            .iter()
            .map(|surface| surface_rect(&surface.canvas))
            .collect()
    }

    pub(crate) fn rect_of(&self, index: usize) -> Option<SurfaceRect> {
        self.surfaces
            .get(index)
            .map(|surface| surface_rect(&surface.canvas))
    }

    pub(crate) fn lift(&self, index: usize, dx: f32, dy: f32) {
        let Some(surface) = self.surfaces.get(index) else {
            return;
        };
        let _ = surface.canvas.class_list().add_1(DRAGGING_CLASS);
        let _ = surface.canvas.style().set_property(
            "transform",
            &format!("scale({DRAG_SCALE}) translate({dx}px, {dy}px)"),
        );
    }

    pub(crate) fn settle(&self, index: usize) {
        let Some(surface) = self.surfaces.get(index) else {
            return;
        };
        let _ = surface.canvas.class_list().remove_1(DRAGGING_CLASS);
        let _ = surface.canvas.style().remove_property("transform");
    }

    pub(crate) fn set_solved(&self, solved: bool) {
        let class_list = self.container.class_list();
        let _ = if solved {
            class_list.add_1(SOLVED_CLASS)
        } else {
            class_list.remove_1(SOLVED_CLASS)
        };
    }

    pub(crate) fn dispose(&mut self) {
        self.surfaces.clear();
        self.container.set_inner_html("");
    }
}
