use rand::Rng;

use crate::drag::{DragController, DragOffset, DragRelease, PointerSample, SurfaceRect};
use crate::grid::{GridSize, GridWatcher};
use crate::mapping::{MappingError, TileMapping};

/// Outcome of a release as seen by the page: which surface to settle and
/// whether the mapping moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropResult {
    pub release: DragRelease,
    pub swapped: bool,
    pub solved: bool,
}

/// Grid, tile mapping and drag slot of one puzzle instance.
#[derive(Clone, Debug)]
pub struct PuzzleBoard {
    grid: GridWatcher,
    mapping: TileMapping,
    drag: DragController,
    rebuilds: u64,
}

impl PuzzleBoard {
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid: GridWatcher::new(grid),
            mapping: TileMapping::new(grid.total()),
            drag: DragController::new(),
            rebuilds: 1,
        }
    }

    pub fn grid(&self) -> GridSize {
        self.grid.current()
    }

    pub fn mapping(&self) -> &TileMapping {
        &self.mapping
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn is_solved(&self) -> bool {
        self.mapping.is_solved()
    }

    /// Applies a freshly sized grid. Returns `true` when the board was rebuilt;
    /// an unchanged size keeps the mapping and any drag in flight.
    pub fn apply_grid(&mut self, next: GridSize) -> bool {
        if self.grid.propose(next).is_none() {
            return false;
        }
        self.rebuild();
        true
    }

    /// Resets to the identity arrangement for the current grid.
    pub fn rebuild(&mut self) {
        self.drag.cancel();
        self.mapping.reset(self.grid.current().total());
        self.rebuilds += 1;
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.mapping.shuffle(rng);
        self.mapping.is_solved()
    }

    pub fn swap(&mut self, a: usize, b: usize) -> Result<bool, MappingError> {
        self.mapping.swap(a, b)
    }

    pub fn begin_drag(&mut self, surface: usize, pointer: PointerSample, rect: SurfaceRect) -> bool {
        if surface >= self.mapping.len() {
            return false;
        }
        self.drag.begin(surface, pointer, rect)
    }

    pub fn drag_move(&self, pointer: PointerSample) -> Option<DragOffset> {
        self.drag.update(pointer)
    }

    pub fn end_drag(&mut self, pointer: PointerSample, rects: &[SurfaceRect]) -> DropResult {
        let release = self.drag.end(pointer, rects);
        let swapped = match release {
            DragRelease::Swap { from, to } => self.mapping.swap(from, to).unwrap_or(false),
            _ => false,
        };
        DropResult {
            release,
            swapped,
            solved: self.mapping.is_solved(),
        }
    }

    pub fn cancel_drag(&mut self) -> Option<usize> {
        self.drag.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn unchanged_grid_does_not_rebuild() {
        let mut board = PuzzleBoard::new(GridSize::new(3, 5));
        let mut rng = StdRng::seed_from_u64(9);
        board.shuffle(&mut rng);
        let before = board.mapping().clone();
        assert!(!board.apply_grid(GridSize::new(3, 5)));
        assert_eq!(board.mapping(), &before);
        assert_eq!(board.rebuilds(), 1);
    }

    #[test]
    fn changed_grid_resets_mapping() {
        let mut board = PuzzleBoard::new(GridSize::new(3, 5));
        let mut rng = StdRng::seed_from_u64(9);
        board.shuffle(&mut rng);
        assert!(board.apply_grid(GridSize::new(2, 3)));
        assert_eq!(board.mapping().as_slice(), &[0, 1, 2, 3, 4, 5]);
        assert!(!board.mapping().has_been_shuffled());
        assert_eq!(board.rebuilds(), 2);
    }

    #[test]
    fn rebuild_drops_active_drag() {
        let mut board = PuzzleBoard::new(GridSize::new(2, 2));
        let rect = SurfaceRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(board.begin_drag(0, PointerSample::mouse(5.0, 5.0), rect));
        board.apply_grid(GridSize::new(2, 3));
        assert!(!board.drag().is_dragging());
    }

    #[test]
    fn begin_drag_rejects_unknown_surface() {
        let mut board = PuzzleBoard::new(GridSize::new(2, 2));
        let rect = SurfaceRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!board.begin_drag(4, PointerSample::mouse(5.0, 5.0), rect));
    }
}
