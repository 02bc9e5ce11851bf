use std::cell::RefCell;
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use js_sys::{Date, Math};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::AudioStatus;
use crate::config::WidgetConfig;
use namipazuru_core::{
    DragOffset, DropResult, GridMode, GridSize, PointerSample, PuzzleBoard, SurfaceRect, TileMapping,
};

pub(crate) type WidgetSubscriber = Rc<dyn Fn()>;

thread_local! {
    static SHARED_CORE: RefCell<Option<Rc<WidgetCore>>> = RefCell::new(None);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ChromeState {
    pub(crate) first_play: bool,
    pub(crate) fullscreen: bool,
    pub(crate) controls_visible: bool,
    pub(crate) audio: AudioStatus,
}

impl Default for ChromeState {
    fn default() -> Self {
        Self {
            first_play: true,
            fullscreen: false,
            controls_visible: false,
            audio: AudioStatus::Muted,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WidgetSnapshot {
    pub(crate) grid: GridSize,
    pub(crate) rebuilds: u64,
    pub(crate) shuffled: bool,
    pub(crate) solved: bool,
    pub(crate) dragging: Option<usize>,
    pub(crate) chrome: ChromeState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayAction {
    Shuffle,
    ShuffleAndEnterFullscreen,
}

struct WidgetState {
    board: PuzzleBoard,
    grid_mode: GridMode,
    chrome: ChromeState,
    rng: StdRng,
}

/// Owns the puzzle board and chrome flags of the page widget. Views read
/// snapshots and get notified after every structural change.
pub(crate) struct WidgetCore {
    state: RefCell<WidgetState>,
    snapshot: RefCell<WidgetSnapshot>,
    subscribers: Rc<RefCell<Vec<WidgetSubscriber>>>,
}

pub(crate) struct WidgetSubscription {
    subscriber: WidgetSubscriber,
    subscribers: Rc<RefCell<Vec<WidgetSubscriber>>>,
}

impl Drop for WidgetSubscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|item| !Rc::ptr_eq(item, &self.subscriber));
    }
}

impl WidgetCore {
    pub(crate) fn new(config: &WidgetConfig, seed: u64) -> Rc<Self> {
        let grid = config.grid_mode.grid_for(0.0, 0.0);
        let state = WidgetState {
            board: PuzzleBoard::new(grid),
            grid_mode: config.grid_mode,
            chrome: ChromeState::default(),
            rng: StdRng::seed_from_u64(seed),
        };
        let snapshot = build_snapshot(&state);
        Rc::new(Self {
            state: RefCell::new(state),
            snapshot: RefCell::new(snapshot),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Installs the page-wide instance. A second call keeps the first one.
    pub(crate) fn install(config: &WidgetConfig) -> Rc<Self> {
        if let Some(core) = Self::shared() {
            return core;
        }
        let core = Self::new(config, shuffle_seed());
        SHARED_CORE.with(|slot| {
            *slot.borrow_mut() = Some(Rc::clone(&core));
        });
        core
    }

    pub(crate) fn shared() -> Option<Rc<Self>> {
        SHARED_CORE.with(|slot| slot.borrow().clone())
    }

    pub(crate) fn subscribe(&self, subscriber: WidgetSubscriber) -> WidgetSubscription {
        self.subscribers.borrow_mut().push(subscriber.clone());
        WidgetSubscription {
            subscriber,
            subscribers: Rc::clone(&self.subscribers),
        }
    }

    pub(crate) fn snapshot(&self) -> WidgetSnapshot {
        *self.snapshot.borrow()
    }

    fn notify(&self) {
        {
            let state = self.state.borrow();
            *self.snapshot.borrow_mut() = build_snapshot(&state);
        }
        let subscribers = self.subscribers.borrow().clone();
        for subscriber in subscribers {
            (subscriber)();
        }
    }

    fn update<R>(&self, mutator: impl FnOnce(&mut WidgetState) -> R) -> R {
        let result = {
            let mut state = self.state.borrow_mut();
            mutator(&mut state)
        };
        self.notify();
        result
    }

    pub(crate) fn with_mapping<R>(&self, reader: impl FnOnce(&TileMapping) -> R) -> R {
        let state = self.state.borrow();
        reader(state.board.mapping())
    }

    /// Sizes the board for the first viewport and lays it out.
    pub(crate) fn init(&self, viewport: (f64, f64)) {
        self.update(|state| {
            let grid = state.grid_mode.grid_for(viewport.0 as f32, viewport.1 as f32);
            if !state.board.apply_grid(grid) {
                state.board.rebuild();
            }
        });
    }

    /// Re-runs the grid decision. Returns `true` when the board was rebuilt.
    pub(crate) fn apply_viewport(&self, width: f64, height: f64) -> bool {
        let rebuilt = {
            let mut state = self.state.borrow_mut();
            let grid = state.grid_mode.grid_for(width as f32, height as f32);
            state.board.apply_grid(grid)
        };
        if rebuilt {
            self.notify();
        }
        rebuilt
    }

    pub(crate) fn dispose(&self) {
        self.subscribers.borrow_mut().clear();
        let mut state = self.state.borrow_mut();
        state.board.cancel_drag();
    }

    pub(crate) fn shuffle(&self) -> bool {
        self.update(|state| {
            let WidgetState { board, rng, .. } = state;
            board.shuffle(rng)
        })
    }

    /// Every press reshuffles; only the first one asks for fullscreen.
    pub(crate) fn press_play(&self) -> PlayAction {
        self.shuffle();
        self.update(|state| {
            let chrome = &mut state.chrome;
            if chrome.first_play {
                chrome.first_play = false;
                PlayAction::ShuffleAndEnterFullscreen
            } else {
                PlayAction::Shuffle
            }
        })
    }

    pub(crate) fn begin_drag(&self, surface: usize, pointer: PointerSample, rect: SurfaceRect) -> bool {
        let started = self.state.borrow_mut().board.begin_drag(surface, pointer, rect);
        if started {
            self.notify();
        }
        started
    }

    /// Cosmetic only; does not notify.
    pub(crate) fn drag_move(&self, pointer: PointerSample) -> Option<DragOffset> {
        self.state.borrow().board.drag_move(pointer)
    }

    pub(crate) fn end_drag(&self, pointer: PointerSample, rects: &[SurfaceRect]) -> DropResult {
        let result = self.state.borrow_mut().board.end_drag(pointer, rects);
        if result.release.lifted_surface().is_some() {
            self.notify();
        }
        result
    }

    pub(crate) fn cancel_drag(&self) -> Option<usize> {
        let cancelled = self.state.borrow_mut().board.cancel_drag();
        if cancelled.is_some() {
            self.notify();
        }
        cancelled
    }

    pub(crate) fn is_dragging(&self) -> bool {
        self.state.borrow().board.drag().is_dragging()
    }

    pub(crate) fn dragged_touch(&self) -> Option<i32> {
        self.state
            .borrow()
            .board
            .drag()
            .state()
            .and_then(|drag| drag.touch_id)
    }

    /// Leaving fullscreen hides the controls and re-arms the first-play
    /// behaviour.
    pub(crate) fn set_fullscreen(&self, fullscreen: bool) {
        self.update(|state| {
            let chrome = &mut state.chrome;
            chrome.fullscreen = fullscreen;
            if !fullscreen {
                chrome.controls_visible = false;
                chrome.first_play = true;
            }
        });
    }

    pub(crate) fn set_controls_visible(&self, visible: bool) {
        if self.snapshot().chrome.controls_visible == visible {
            return;
        }
        self.update(|state| state.chrome.controls_visible = visible);
    }

    pub(crate) fn set_audio_status(&self, audio: AudioStatus) {
        if self.snapshot().chrome.audio == audio {
            return;
        }
        self.update(|state| state.chrome.audio = audio);
    }
}

fn build_snapshot(state: &WidgetState) -> WidgetSnapshot {
    let mapping = state.board.mapping();
    WidgetSnapshot {
        grid: state.board.grid(),
        rebuilds: state.board.rebuilds(),
        shuffled: mapping.has_been_shuffled(),
        solved: mapping.is_solved(),
        dragging: state.board.drag().dragged_surface(),
        chrome: state.chrome,
    }
}

pub(crate) fn play_label(chrome: &ChromeState) -> &'static str {
    if chrome.first_play {
        "Play"
    } else {
        "Shuffle"
    }
}

pub(crate) fn audio_label(chrome: &ChromeState) -> &'static str {
    match chrome.audio {
        AudioStatus::Muted => "🔇 Shore Audio",
        AudioStatus::Playing => "🔊 Shore Audio",
        AudioStatus::Error => "❌ Audio Error",
    }
}

fn splitmix64(mut value: u64) -> u64 {
    value = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = value;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn shuffle_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        let noise = (Math::random() * u32::MAX as f64) as u64;
        let now = Date::now() as u64;
        return splitmix64((noise << 32) ^ now);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|duration| duration.as_nanos() as u64)
            .unwrap_or(0);
        return splitmix64(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use namipazuru_core::DragRelease;

    fn fixed_core(rows: u32, cols: u32) -> Rc<WidgetCore> {
        let config = WidgetConfig {
            grid_mode: GridMode::Fixed(GridSize::new(rows, cols)),
            ..WidgetConfig::default()
        };
        WidgetCore::new(&config, 7)
    }

    #[test]
    fn first_play_requests_fullscreen_once() {
        let core = fixed_core(3, 5);
        core.init((1280.0, 720.0));
        assert_eq!(core.press_play(), PlayAction::ShuffleAndEnterFullscreen);
        assert_eq!(core.press_play(), PlayAction::Shuffle);
        assert_eq!(play_label(&core.snapshot().chrome), "Shuffle");
        assert!(core.snapshot().shuffled);
    }

    #[test]
    fn every_play_press_reshuffles() {
        let core = fixed_core(3, 5);
        core.init((1280.0, 720.0));
        core.press_play();
        let first = core.with_mapping(|mapping| mapping.as_slice().to_vec());
        core.press_play();
        let second = core.with_mapping(|mapping| mapping.as_slice().to_vec());
        assert_ne!(first, second);
    }

    #[test]
    fn leaving_fullscreen_resets_play_button() {
        let core = fixed_core(3, 5);
        core.press_play();
        core.set_fullscreen(true);
        core.set_controls_visible(true);
        core.set_fullscreen(false);
        let chrome = core.snapshot().chrome;
        assert!(chrome.first_play);
        assert!(!chrome.controls_visible);
        assert_eq!(play_label(&chrome), "Play");
    }

    #[test]
    fn audio_labels() {
        let mut chrome = ChromeState::default();
        assert_eq!(audio_label(&chrome), "🔇 Shore Audio");
        chrome.audio = AudioStatus::Playing;
        assert_eq!(audio_label(&chrome), "🔊 Shore Audio");
        chrome.audio = AudioStatus::Error;
        assert_eq!(audio_label(&chrome), "❌ Audio Error");
    }

    #[test]
    fn viewport_change_rebuilds_only_on_new_grid() {
        let config = WidgetConfig::default();
        let core = WidgetCore::new(&config, 3);
        core.init((1280.0, 720.0));
        let before = core.snapshot();
        assert_eq!(before.grid, GridSize::new(3, 5));
        assert!(!core.apply_viewport(1300.0, 740.0));
        assert_eq!(core.snapshot().rebuilds, before.rebuilds);
        assert!(core.apply_viewport(1920.0, 1080.0));
        let after = core.snapshot();
        assert_eq!(after.grid, GridSize::new(4, 7));
        assert_eq!(after.rebuilds, before.rebuilds + 1);
        assert!(!after.shuffled);
    }

    #[test]
    fn subscribers_are_notified_until_dropped() {
        let core = fixed_core(2, 2);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let subscription = core.subscribe(Rc::new(move || counter.set(counter.get() + 1)));
        core.shuffle();
        assert_eq!(hits.get(), 1);
        drop(subscription);
        core.shuffle();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn drag_swap_flows_through_core() {
        let core = fixed_core(1, 2);
        core.init((400.0, 200.0));
        let rects = [
            SurfaceRect::new(0.0, 0.0, 100.0, 100.0),
            SurfaceRect::new(100.0, 0.0, 100.0, 100.0),
        ];
        assert!(core.begin_drag(0, PointerSample::mouse(10.0, 10.0), rects[0]));
        assert_eq!(core.snapshot().dragging, Some(0));
        let offset = core.drag_move(PointerSample::mouse(60.0, 30.0));
        assert_eq!(offset.map(|offset| (offset.dx, offset.dy)), Some((50.0, 20.0)));
        let result = core.end_drag(PointerSample::mouse(150.0, 50.0), &rects);
        assert_eq!(result.release, DragRelease::Swap { from: 0, to: 1 });
        assert!(result.swapped);
        core.with_mapping(|mapping| assert_eq!(mapping.as_slice(), &[1, 0]));
        assert_eq!(core.snapshot().dragging, None);
    }

    #[test]
    fn duplicate_status_updates_are_quiet() {
        let core = fixed_core(2, 2);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let _subscription = core.subscribe(Rc::new(move || counter.set(counter.get() + 1)));
        core.set_audio_status(AudioStatus::Muted);
        core.set_controls_visible(false);
        assert_eq!(hits.get(), 0);
        core.set_audio_status(AudioStatus::Playing);
        assert_eq!(hits.get(), 1);
    }
}
