pub mod board;
pub mod drag;
pub mod geometry;
pub mod grid;
pub mod mapping;

pub use board::{DropResult, PuzzleBoard};
pub use drag::{
    find_drop_target, DragController, DragOffset, DragRelease, DragState, PointerKind,
    PointerSample, SurfaceRect,
};
pub use geometry::{surface_backing_size, FrameGeometry, GeometryCache, SourceRect};
pub use grid::{
    grid_for_viewport, GridMode, GridRules, GridSize, GridWatcher, FIXED_GRID, GRID_COLS_DEFAULT,
    GRID_COLS_MIN, GRID_ROWS_DEFAULT, GRID_ROWS_MIN, PIECE_SIZE_MAX_PX, PIECE_SIZE_MIN_PX,
};
pub use mapping::{is_permutation, MappingError, TileMapping};
