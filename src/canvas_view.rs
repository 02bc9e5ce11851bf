use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use js_sys::Date;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlElement, HtmlVideoElement, MouseEvent, TouchEvent, Window};

use crate::config::WidgetConfig;
use crate::debounce::Debouncer;
use crate::fullscreen::{lock_landscape, FullscreenControl};
use crate::input::{mouse_sample, pulse, touch_event_sample, DoubleTapGuard, Haptic, TouchPhase};
use crate::renderer::{draw_frame, viewport_size, RenderLoop, VideoSource};
use crate::surface_pool::{SurfaceDown, SurfacePool};
use crate::widget_core::{WidgetCore, WidgetSubscription};
use namipazuru_core::{DragRelease, DropResult, GeometryCache, PointerSample};

const DRAG_OPTIONS: EventListenerOptions = EventListenerOptions {
    phase: EventListenerPhase::Capture,
    passive: false,
};

/// The puzzle surface: canvases over the video, pointer wiring and the frame
/// loop. Structure follows `WidgetCore` snapshots.
pub(crate) struct CanvasView {
    core: Rc<WidgetCore>,
    config: WidgetConfig,
    video: HtmlVideoElement,
    fullscreen: Rc<dyn FullscreenControl>,
    pool: RefCell<SurfacePool>,
    cache: RefCell<GeometryCache>,
    render: Rc<RenderLoop>,
    resize: Rc<Debouncer>,
    orientation: Rc<Debouncer>,
    tap_guard: Cell<DoubleTapGuard>,
    built_revision: Cell<u64>,
    video_size: Cell<Option<(u32, u32)>>,
    draw_failed: Cell<bool>,
    listeners: RefCell<Vec<EventListener>>,
    subscription: RefCell<Option<WidgetSubscription>>,
}

impl CanvasView {
    pub(crate) fn mount(
        core: Rc<WidgetCore>,
        config: WidgetConfig,
        document: Document,
        video: HtmlVideoElement,
        container: HtmlElement,
        fullscreen: Rc<dyn FullscreenControl>,
    ) -> Rc<Self> {
        let initial_grid = core.snapshot().grid;
        let view = Rc::new_cyclic(|weak: &Weak<Self>| {
            let frame_view = weak.clone();
            let render = RenderLoop::new(
                video.clone(),
                Rc::new(move || {
                    if let Some(view) = frame_view.upgrade() {
                        view.draw();
                    }
                }),
            );
            let resize_view = weak.clone();
            let resize = Debouncer::new(
                config.resize_debounce_ms,
                Rc::new(move || {
                    if let Some(view) = resize_view.upgrade() {
                        view.viewport_changed();
                    }
                }),
            );
            let orientation_view = weak.clone();
            let orientation = Debouncer::new(
                config.orientation_debounce_ms,
                Rc::new(move || {
                    if let Some(view) = orientation_view.upgrade() {
                        view.orientation_settled();
                    }
                }),
            );
            Self {
                core,
                config,
                video,
                fullscreen,
                pool: RefCell::new(SurfacePool::new(document, container, initial_grid)),
                cache: RefCell::new(GeometryCache::new()),
                render,
                resize,
                orientation,
                tap_guard: Cell::new(DoubleTapGuard::default()),
                built_revision: Cell::new(0),
                video_size: Cell::new(None),
                draw_failed: Cell::new(false),
                listeners: RefCell::new(Vec::new()),
                subscription: RefCell::new(None),
            }
        });
        view.attach();
        view
    }

    fn attach(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let subscription = self.core.subscribe(Rc::new(move || {
            if let Some(view) = weak.upgrade() {
                view.sync();
            }
        }));
        *self.subscription.borrow_mut() = Some(subscription);

        let mut listeners = Vec::new();
        listeners.extend(self.video_listeners());
        if let Some(window) = web_sys::window() {
            listeners.extend(self.window_listeners(&window));
            if let Some(document) = window.document() {
                listeners.extend(self.pointer_listeners(&document));
            }
        }
        self.listeners.borrow_mut().extend(listeners);

        let viewport = viewport_size().unwrap_or((0.0, 0.0));
        self.core.init(viewport);
        let grid = self.core.snapshot().grid;
        gloo::console::log!("puzzle grid", grid.to_string());
        if self.config.verbose {
            gloo::console::log!("grid mode", format!("{:?}", self.config.grid_mode));
        }
        if self.video.is_stopped() {
            self.video.start();
        } else {
            self.render.arm();
        }
    }

    /// Brings the canvases in line with the latest snapshot. A new board
    /// revision rebuilds the pool before anything else reads it.
    fn sync(self: &Rc<Self>) {
        let snapshot = self.core.snapshot();
        if snapshot.rebuilds != self.built_revision.get() {
            self.built_revision.set(snapshot.rebuilds);
            if let Err(err) = self.rebuild_surfaces() {
                gloo::console::error!("failed to rebuild puzzle surfaces", err);
                return;
            }
        }
        self.pool.borrow().set_solved(snapshot.solved);
        self.draw();
    }

    fn rebuild_surfaces(self: &Rc<Self>) -> Result<(), JsValue> {
        let grid = self.core.snapshot().grid;
        let weak = Rc::downgrade(self);
        let on_down: SurfaceDown = Rc::new(move |index, sample| {
            if let Some(view) = weak.upgrade() {
                view.surface_down(index, sample);
            }
        });
        self.pool
            .borrow_mut()
            .rebuild(grid, self.video.frame_size(), on_down)?;
        self.cache.borrow_mut().invalidate();
        if self.config.verbose {
            gloo::console::log!("surfaces rebuilt", self.pool.borrow().len());
        }
        self.render.arm();
        Ok(())
    }

    fn draw(&self) {
        let Some(viewport) = viewport_size() else {
            return;
        };
        let pool = self.pool.borrow();
        let mut cache = self.cache.borrow_mut();
        let result = self
            .core
            .with_mapping(|mapping| draw_frame(&self.video, &pool, mapping, &mut cache, viewport));
        if let Err(err) = result {
            if !self.draw_failed.replace(true) {
                gloo::console::warn!("frame draw failed", err);
            }
        }
    }

    fn metadata_loaded(&self) {
        let Some(size) = self.video.frame_size() else {
            return;
        };
        if self.video_size.replace(Some(size)) != Some(size) {
            gloo::console::log!("video size", size.0, size.1);
            self.cache.borrow_mut().invalidate();
        }
        self.pool.borrow().resize(size.0, size.1);
        self.render.arm();
    }

    fn viewport_changed(&self) {
        let Some((width, height)) = viewport_size() else {
            return;
        };
        if self.core.apply_viewport(width, height) {
            gloo::console::log!("grid changed", self.core.snapshot().grid.to_string());
        }
    }

    fn orientation_settled(&self) {
        lock_landscape();
        self.viewport_changed();
    }

    fn surface_down(&self, index: usize, sample: PointerSample) {
        let Some(rect) = self.pool.borrow().rect_of(index) else {
            return;
        };
        if !self.core.begin_drag(index, sample, rect) {
            return;
        }
        self.pool.borrow().lift(index, 0.0, 0.0);
        if self.config.haptics {
            pulse(Haptic::Lift);
        }
    }

    fn pointer_moved(&self, sample: PointerSample) -> bool {
        let Some(offset) = self.core.drag_move(sample) else {
            return false;
        };
        self.pool.borrow().lift(offset.surface, offset.dx, offset.dy);
        true
    }

    fn pointer_released(&self, sample: PointerSample) {
        let rects = self.pool.borrow().rects();
        let result = self.core.end_drag(sample, &rects);
        self.settle(result);
    }

    fn settle(&self, result: DropResult) {
        if let Some(surface) = result.release.lifted_surface() {
            self.pool.borrow().settle(surface);
        }
        match result.release {
            DragRelease::Swap { from, to } => {
                gloo::console::log!("swapped tiles", from, to);
                if self.config.haptics {
                    pulse(Haptic::Swap);
                }
                if result.solved {
                    gloo::console::log!("puzzle solved");
                }
            }
            DragRelease::Cancelled { surface } => {
                gloo::console::log!("no drop target for tile", surface);
            }
            DragRelease::Ignored => {}
        }
    }

    fn drag_cancelled(&self) {
        if let Some(surface) = self.core.cancel_drag() {
            self.pool.borrow().settle(surface);
        }
    }

    fn video_listeners(self: &Rc<Self>) -> Vec<EventListener> {
        let mut listeners = Vec::new();
        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&self.video, "loadedmetadata", move |_| {
            if let Some(view) = weak.upgrade() {
                view.metadata_loaded();
            }
        }));
        for event in ["play", "playing"] {
            let weak = Rc::downgrade(self);
            listeners.push(EventListener::new(&self.video, event, move |_| {
                if let Some(view) = weak.upgrade() {
                    view.render.arm();
                }
            }));
        }
        listeners
    }

    fn window_listeners(self: &Rc<Self>, window: &Window) -> Vec<EventListener> {
        let resize = Rc::clone(&self.resize);
        let weak = Rc::downgrade(self);
        vec![
            EventListener::new(window, "resize", move |_| resize.trigger()),
            EventListener::new(window, "orientationchange", move |_| {
                let Some(view) = weak.upgrade() else {
                    return;
                };
                if view.fullscreen.is_fullscreen() || view.core.snapshot().chrome.fullscreen {
                    view.orientation.trigger();
                }
            }),
        ]
    }

    fn pointer_listeners(self: &Rc<Self>, document: &Document) -> Vec<EventListener> {
        let mut listeners = Vec::new();

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            document,
            "mousemove",
            DRAG_OPTIONS,
            move |event: &Event| {
                let (Some(view), Some(event)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>()) else {
                    return;
                };
                if view.pointer_moved(mouse_sample(event)) {
                    event.prevent_default();
                }
            },
        ));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            document,
            "mouseup",
            DRAG_OPTIONS,
            move |event: &Event| {
                let (Some(view), Some(event)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>()) else {
                    return;
                };
                view.pointer_released(mouse_sample(event));
            },
        ));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            document,
            "touchmove",
            DRAG_OPTIONS,
            move |event: &Event| {
                let (Some(view), Some(event)) = (weak.upgrade(), event.dyn_ref::<TouchEvent>()) else {
                    return;
                };
                if !view.core.is_dragging() {
                    return;
                }
                event.prevent_default();
                if let Some(sample) = touch_event_sample(event, view.core.dragged_touch(), TouchPhase::Move) {
                    view.pointer_moved(sample);
                }
            },
        ));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            document,
            "touchend",
            DRAG_OPTIONS,
            move |event: &Event| {
                let (Some(view), Some(event)) = (weak.upgrade(), event.dyn_ref::<TouchEvent>()) else {
                    return;
                };
                if !view.core.is_dragging() {
                    view.guard_double_tap(event);
                    return;
                }
                event.prevent_default();
                if let Some(sample) = touch_event_sample(event, view.core.dragged_touch(), TouchPhase::End) {
                    view.pointer_released(sample);
                }
            },
        ));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            document,
            "touchcancel",
            DRAG_OPTIONS,
            move |_| {
                if let Some(view) = weak.upgrade() {
                    view.drag_cancelled();
                }
            },
        ));
        listeners
    }

    fn guard_double_tap(&self, event: &TouchEvent) {
        let on_canvas = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .map(|element| element.tag_name().eq_ignore_ascii_case("canvas"))
            .unwrap_or(false);
        if !on_canvas {
            return;
        }
        let mut guard = self.tap_guard.get();
        if guard.tap(Date::now()) {
            event.prevent_default();
        }
        self.tap_guard.set(guard);
    }

    pub(crate) fn dispose(&self) {
        self.listeners.borrow_mut().clear();
        self.subscription.borrow_mut().take();
        self.render.stop();
        self.resize.cancel();
        self.orientation.cancel();
        self.pool.borrow_mut().dispose();
        self.core.dispose();
    }
}
