use crate::grid::GridSize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Portion of the video a full-bleed `object-fit: cover` element would show,
/// split into equal tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameGeometry {
    pub offset_x: f64,
    pub offset_y: f64,
    pub visible_width: f64,
    pub visible_height: f64,
    pub tile_width: f64,
    pub tile_height: f64,
    pub grid: GridSize,
}

impl FrameGeometry {
    pub fn compute(
        video_width: u32,
        video_height: u32,
        viewport_width: f64,
        viewport_height: f64,
        grid: GridSize,
    ) -> Option<Self> {
        if video_width == 0 || video_height == 0 || grid.rows == 0 || grid.cols == 0 {
            return None;
        }
        if !(viewport_width > 0.0 && viewport_height > 0.0) {
            return None;
        }
        let video_w = video_width as f64;
        let video_h = video_height as f64;
        let viewport_aspect = viewport_width / viewport_height;
        let video_aspect = video_w / video_h;
        let (visible_width, visible_height, offset_x, offset_y) = if video_aspect > viewport_aspect {
            let visible_w = video_h * viewport_aspect;
            (visible_w, video_h, (video_w - visible_w) * 0.5, 0.0)
        } else {
            let visible_h = video_w / viewport_aspect;
            (video_w, visible_h, 0.0, (video_h - visible_h) * 0.5)
        };
        Some(Self {
            offset_x,
            offset_y,
            visible_width,
            visible_height,
            tile_width: visible_width / grid.cols as f64,
            tile_height: visible_height / grid.rows as f64,
            grid,
        })
    }

    pub fn source_rect(&self, position: usize) -> SourceRect {
        let (row, col) = self.grid.cell_of(position);
        SourceRect {
            x: self.offset_x + col as f64 * self.tile_width,
            y: self.offset_y + row as f64 * self.tile_height,
            width: self.tile_width,
            height: self.tile_height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct GeometryKey {
    video: (u32, u32),
    viewport: (f64, f64),
    grid: GridSize,
}

/// Keeps the last [`FrameGeometry`] until one of its inputs changes.
#[derive(Clone, Debug, Default)]
pub struct GeometryCache {
    key: Option<GeometryKey>,
    geometry: Option<FrameGeometry>,
    recomputes: u64,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        video: (u32, u32),
        viewport: (f64, f64),
        grid: GridSize,
    ) -> Option<FrameGeometry> {
        let key = GeometryKey {
            video,
            viewport,
            grid,
        };
        if self.key != Some(key) {
            self.key = Some(key);
            self.geometry = FrameGeometry::compute(video.0, video.1, viewport.0, viewport.1, grid);
            self.recomputes += 1;
        }
        self.geometry
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.geometry = None;
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}

/// Backing pixel size for each surface, once video metadata is known.
pub fn surface_backing_size(video_width: u32, video_height: u32, grid: GridSize) -> Option<(u32, u32)> {
    if video_width == 0 || video_height == 0 || grid.rows == 0 || grid.cols == 0 {
        return None;
    }
    Some((
        (video_width / grid.cols).max(1),
        (video_height / grid.rows).max(1),
    ))
}
