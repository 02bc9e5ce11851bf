#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub kind: PointerKind,
    pub touch_id: Option<i32>,
}

impl PointerSample {
    pub fn mouse(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            kind: PointerKind::Mouse,
            touch_id: None,
        }
    }

    pub fn touch(x: f32, y: f32, touch_id: i32) -> Self {
        Self {
            x,
            y,
            kind: PointerKind::Touch,
            touch_id: Some(touch_id),
        }
    }
}

/// Axis-aligned box in client pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl SurfaceRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    // Edges are inclusive, so a release on a shared border hits the first box.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

pub fn find_drop_target(rects: &[SurfaceRect], exclude: usize, x: f32, y: f32) -> Option<usize> {
    rects
        .iter()
        .enumerate()
        .find(|(index, rect)| *index != exclude && rect.contains(x, y))
        .map(|(index, _)| index)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pub surface: usize,
    pub start_x: f32,
    pub start_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub kind: PointerKind,
    pub touch_id: Option<i32>,
}

impl DragState {
    fn accepts(&self, pointer: &PointerSample) -> bool {
        match self.kind {
            PointerKind::Mouse => pointer.kind == PointerKind::Mouse,
            PointerKind::Touch => {
                pointer.kind == PointerKind::Touch
                    && (self.touch_id.is_none() || pointer.touch_id == self.touch_id)
            }
        }
    }
}

/// Visual translation of the lifted surface relative to where the drag began.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragOffset {
    pub surface: usize,
    pub dx: f32,
    pub dy: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragRelease {
    /// No drag was active, or the event came from a different pointer.
    Ignored,
    Cancelled { surface: usize },
    Swap { from: usize, to: usize },
}

impl DragRelease {
    pub fn lifted_surface(&self) -> Option<usize> {
        match self {
            DragRelease::Ignored => None,
            DragRelease::Cancelled { surface } => Some(*surface),
            DragRelease::Swap { from, .. } => Some(*from),
        }
    }
}

/// Single-slot drag tracker: idle, or exactly one surface in flight.
#[derive(Clone, Debug, Default)]
pub struct DragController {
    active: Option<DragState>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn state(&self) -> Option<&DragState> {
        self.active.as_ref()
    }

    pub fn dragged_surface(&self) -> Option<usize> {
        self.active.map(|drag| drag.surface)
    }

    /// Starts a drag unless one is already running.
    pub fn begin(&mut self, surface: usize, pointer: PointerSample, rect: SurfaceRect) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(DragState {
            surface,
            start_x: pointer.x,
            start_y: pointer.y,
            offset_x: pointer.x - rect.left,
            offset_y: pointer.y - rect.top,
            kind: pointer.kind,
            touch_id: pointer.touch_id,
        });
        true
    }

    pub fn update(&self, pointer: PointerSample) -> Option<DragOffset> {
        let drag = self.active.as_ref()?;
        if !drag.accepts(&pointer) {
            return None;
        }
        Some(DragOffset {
            surface: drag.surface,
            dx: pointer.x - drag.start_x,
            dy: pointer.y - drag.start_y,
        })
    }

    pub fn end(&mut self, pointer: PointerSample, rects: &[SurfaceRect]) -> DragRelease {
        let Some(drag) = self.active else {
            return DragRelease::Ignored;
        };
        if !drag.accepts(&pointer) {
            return DragRelease::Ignored;
        }
        self.active = None;
        match find_drop_target(rects, drag.surface, pointer.x, pointer.y) {
            Some(target) => DragRelease::Swap {
                from: drag.surface,
                to: target,
            },
            None => DragRelease::Cancelled {
                surface: drag.surface,
            },
        }
    }

    pub fn cancel(&mut self) -> Option<usize> {
        self.active.take().map(|drag| drag.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of_rects(count: usize, size: f32) -> Vec<SurfaceRect> {
        (0..count)
            .map(|index| SurfaceRect::new(index as f32 * size, 0.0, size, size))
            .collect()
    }

    #[test]
    fn begin_records_offset_inside_surface() {
        let mut drag = DragController::new();
        let rect = SurfaceRect::new(100.0, 50.0, 100.0, 100.0);
        assert!(drag.begin(1, PointerSample::mouse(130.0, 70.0), rect));
        let state = drag.state().copied().expect("drag active");
        assert_eq!(state.surface, 1);
        assert_eq!((state.offset_x, state.offset_y), (30.0, 20.0));
    }

    #[test]
    fn second_begin_is_ignored() {
        let mut drag = DragController::new();
        let rects = row_of_rects(3, 100.0);
        assert!(drag.begin(0, PointerSample::mouse(10.0, 10.0), rects[0]));
        assert!(!drag.begin(2, PointerSample::mouse(210.0, 10.0), rects[2]));
        assert_eq!(drag.dragged_surface(), Some(0));
    }

    #[test]
    fn update_reports_translation_from_start() {
        let mut drag = DragController::new();
        let rects = row_of_rects(2, 100.0);
        drag.begin(0, PointerSample::mouse(40.0, 40.0), rects[0]);
        let offset = drag.update(PointerSample::mouse(65.0, 10.0));
        assert_eq!(
            offset,
            Some(DragOffset {
                surface: 0,
                dx: 25.0,
                dy: -30.0
            })
        );
    }

    #[test]
    fn update_when_idle_is_none() {
        let drag = DragController::new();
        assert_eq!(drag.update(PointerSample::mouse(1.0, 1.0)), None);
    }

    #[test]
    fn release_over_other_surface_swaps() {
        let mut drag = DragController::new();
        let rects = row_of_rects(3, 100.0);
        drag.begin(0, PointerSample::mouse(50.0, 50.0), rects[0]);
        let release = drag.end(PointerSample::mouse(250.0, 50.0), &rects);
        assert_eq!(release, DragRelease::Swap { from: 0, to: 2 });
        assert!(!drag.is_dragging());
    }

    #[test]
    fn release_over_own_surface_cancels() {
        let mut drag = DragController::new();
        let rects = row_of_rects(3, 100.0);
        drag.begin(1, PointerSample::mouse(150.0, 50.0), rects[1]);
        let release = drag.end(PointerSample::mouse(160.0, 60.0), &rects);
        assert_eq!(release, DragRelease::Cancelled { surface: 1 });
    }

    #[test]
    fn duplicate_end_is_ignored() {
        let mut drag = DragController::new();
        let rects = row_of_rects(2, 100.0);
        drag.begin(0, PointerSample::mouse(50.0, 50.0), rects[0]);
        drag.end(PointerSample::mouse(500.0, 500.0), &rects);
        assert_eq!(
            drag.end(PointerSample::mouse(150.0, 50.0), &rects),
            DragRelease::Ignored
        );
    }

    #[test]
    fn touch_drag_ignores_other_fingers() {
        let mut drag = DragController::new();
        let rects = row_of_rects(2, 100.0);
        drag.begin(0, PointerSample::touch(50.0, 50.0, 7), rects[0]);
        assert_eq!(drag.update(PointerSample::touch(80.0, 50.0, 8)), None);
        assert_eq!(drag.update(PointerSample::mouse(80.0, 50.0)), None);
        assert_eq!(
            drag.end(PointerSample::touch(150.0, 50.0, 8), &rects),
            DragRelease::Ignored
        );
        assert_eq!(
            drag.end(PointerSample::touch(150.0, 50.0, 7), &rects),
            DragRelease::Swap { from: 0, to: 1 }
        );
    }

    #[test]
    fn resting_finger_does_not_release_the_drag() {
        let mut drag = DragController::new();
        let rects = row_of_rects(3, 100.0);
        // Finger 1 rests far off the grid while finger 2 lifts surface 0.
        assert!(drag.begin(0, PointerSample::touch(50.0, 50.0, 2), rects[0]));
        assert_eq!(
            drag.end(PointerSample::touch(900.0, 900.0, 1), &rects),
            DragRelease::Ignored
        );
        assert!(drag.is_dragging());
        assert_eq!(
            drag.end(PointerSample::touch(250.0, 50.0, 2), &rects),
            DragRelease::Swap { from: 0, to: 2 }
        );
        assert!(!drag.is_dragging());
    }

    #[test]
    fn shared_edge_hits_first_surface() {
        let rects = row_of_rects(3, 100.0);
        assert_eq!(find_drop_target(&rects, 2, 100.0, 10.0), Some(0));
        assert_eq!(find_drop_target(&rects, 0, 100.0, 10.0), Some(1));
        assert_eq!(find_drop_target(&rects, 0, 400.0, 10.0), None);
    }

    #[test]
    fn cancel_returns_lifted_surface() {
        let mut drag = DragController::new();
        let rects = row_of_rects(2, 100.0);
        drag.begin(1, PointerSample::mouse(150.0, 50.0), rects[1]);
        assert_eq!(drag.cancel(), Some(1));
        assert_eq!(drag.cancel(), None);
    }
}
