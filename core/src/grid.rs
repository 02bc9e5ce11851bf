#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub rows: u32,
    pub cols: u32,
}

impl GridSize {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    pub fn total(&self) -> usize {
        (self.rows as usize) * (self.cols as usize)
    }

    /// Row and column of a row-major grid position.
    pub fn cell_of(&self, position: usize) -> (u32, u32) {
        let cols = self.cols.max(1) as usize;
        ((position / cols) as u32, (position % cols) as u32)
    }
}

impl std::fmt::Display for GridSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

pub const FIXED_GRID: GridSize = GridSize::new(3, 5);

pub const PIECE_SIZE_MIN_PX: f32 = 200.0;
pub const PIECE_SIZE_MAX_PX: f32 = 300.0;
pub const GRID_COLS_DEFAULT: u32 = 5;
pub const GRID_ROWS_DEFAULT: u32 = 3;
pub const GRID_COLS_MIN: u32 = 3;
pub const GRID_ROWS_MIN: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridRules {
    pub min_piece_px: f32,
    pub max_piece_px: f32,
    pub default_cols: u32,
    pub default_rows: u32,
    pub min_cols: u32,
    pub min_rows: u32,
}

impl Default for GridRules {
    fn default() -> Self {
        Self {
            min_piece_px: PIECE_SIZE_MIN_PX,
            max_piece_px: PIECE_SIZE_MAX_PX,
            default_cols: GRID_COLS_DEFAULT,
            default_rows: GRID_ROWS_DEFAULT,
            min_cols: GRID_COLS_MIN,
            min_rows: GRID_ROWS_MIN,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GridMode {
    Fixed(GridSize),
    Viewport(GridRules),
}

impl Default for GridMode {
    fn default() -> Self {
        GridMode::Viewport(GridRules::default())
    }
}

impl GridMode {
    pub fn grid_for(&self, width: f32, height: f32) -> GridSize {
        match self {
            GridMode::Fixed(grid) => *grid,
            GridMode::Viewport(rules) => grid_for_viewport(width, height, rules),
        }
    }
}

fn axis_count(extent: f32, rules: &GridRules, preferred: u32, floor: u32) -> u32 {
    let extent = if extent.is_finite() { extent.max(0.0) } else { 0.0 };
    let min_piece = rules.min_piece_px.max(1.0);
    let max_piece = rules.max_piece_px.max(min_piece);
    let most = (extent / min_piece).floor() as u32;
    let fewest = (extent / max_piece).ceil() as u32;
    most.min(fewest.max(preferred)).max(floor)
}

/// Picks a grid whose tiles land near the piece size window for the viewport.
///
/// The preferred counts win whenever the viewport can hold them; the minimum
/// counts always win over the size window, so tiny viewports still get a
/// playable grid with undersized tiles.
pub fn grid_for_viewport(width: f32, height: f32, rules: &GridRules) -> GridSize {
    let cols = axis_count(width, rules, rules.default_cols, rules.min_cols.max(1));
    let rows = axis_count(height, rules, rules.default_rows, rules.min_rows.max(1));
    GridSize { rows, cols }
}

/// Remembers the active grid and reports only real changes.
#[derive(Clone, Copy, Debug)]
pub struct GridWatcher {
    current: GridSize,
}

impl GridWatcher {
    pub fn new(current: GridSize) -> Self {
        Self { current }
    }

    pub fn current(&self) -> GridSize {
        self.current
    }

    pub fn propose(&mut self, next: GridSize) -> Option<GridSize> {
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hd_viewport_widens_grid() {
        let grid = grid_for_viewport(1920.0, 1080.0, &GridRules::default());
        assert_eq!(grid, GridSize::new(4, 7));
    }

    #[test]
    fn laptop_viewport_prefers_five_by_three() {
        let grid = grid_for_viewport(1280.0, 720.0, &GridRules::default());
        assert_eq!(grid, GridSize::new(3, 5));
    }

    #[test]
    fn phone_viewport_clamps_to_minimums() {
        let grid = grid_for_viewport(390.0, 844.0, &GridRules::default());
        assert_eq!(grid.cols, GRID_COLS_MIN);
        assert_eq!(grid.rows, 3);
    }

    #[test]
    fn degenerate_viewport_yields_floors() {
        let rules = GridRules::default();
        assert_eq!(grid_for_viewport(0.0, 0.0, &rules), GridSize::new(2, 3));
        assert_eq!(grid_for_viewport(-5.0, f32::NAN, &rules), GridSize::new(2, 3));
    }

    #[test]
    fn fixed_mode_ignores_viewport() {
        let mode = GridMode::Fixed(FIXED_GRID);
        assert_eq!(mode.grid_for(100.0, 5000.0), FIXED_GRID);
        assert_eq!(FIXED_GRID.total(), 15);
    }

    #[test]
    fn cell_of_is_row_major() {
        let grid = GridSize::new(3, 5);
        assert_eq!(grid.cell_of(0), (0, 0));
        assert_eq!(grid.cell_of(4), (0, 4));
        assert_eq!(grid.cell_of(7), (1, 2));
        assert_eq!(grid.cell_of(14), (2, 4));
    }

    #[test]
    fn watcher_reports_only_changes() {
        let mut watcher = GridWatcher::new(GridSize::new(3, 5));
        assert_eq!(watcher.propose(GridSize::new(3, 5)), None);
        assert_eq!(watcher.propose(GridSize::new(4, 5)), Some(GridSize::new(4, 5)));
        assert_eq!(watcher.propose(GridSize::new(4, 5)), None);
        assert_eq!(watcher.current(), GridSize::new(4, 5));
    }
}
