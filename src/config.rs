use namipazuru_core::{GridMode, GridRules, GridSize, FIXED_GRID};

pub(crate) const VIDEO_ID: &str = "video";
pub(crate) const GRID_CONTAINER_ID: &str = "gridContainer";
pub(crate) const AUDIO_ID: &str = "shoreAudio";
pub(crate) const HOVER_TRIGGER_ID: &str = "hoverTrigger";
pub(crate) const CONTROLS_ROOT_ID: &str = "controls-root";

pub(crate) const RESIZE_DEBOUNCE_MS: u32 = 250;
pub(crate) const ORIENTATION_DEBOUNCE_MS: u32 = 500;
pub(crate) const GRID_DIM_MAX: u32 = 12;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct WidgetConfig {
    pub(crate) grid_mode: GridMode,
    pub(crate) resize_debounce_ms: u32,
    pub(crate) orientation_debounce_ms: u32,
    pub(crate) haptics: bool,
    pub(crate) verbose: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            grid_mode: GridMode::default(),
            resize_debounce_ms: RESIZE_DEBOUNCE_MS,
            orientation_debounce_ms: ORIENTATION_DEBOUNCE_MS,
            haptics: true,
            verbose: false,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn parse_dim(value: &str) -> Option<u32> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|dim| (1..=GRID_DIM_MAX).contains(dim))
}

fn parse_px(value: &str) -> Option<f32> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|px| px.is_finite() && *px >= 1.0)
}

impl WidgetConfig {
    /// Builds a config from query pairs; unknown keys and bad values are skipped.
    pub(crate) fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        let mut fixed = false;
        let mut fixed_grid = FIXED_GRID;
        let mut rules = GridRules::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "grid" => match value {
                    "fixed" => fixed = true,
                    "auto" => fixed = false,
                    _ => {}
                },
                "rows" => {
                    if let Some(rows) = parse_dim(value) {
                        fixed_grid.rows = rows;
                        fixed = true;
                    }
                }
                "cols" => {
                    if let Some(cols) = parse_dim(value) {
                        fixed_grid.cols = cols;
                        fixed = true;
                    }
                }
                "min_piece" => {
                    if let Some(px) = parse_px(value) {
                        rules.min_piece_px = px;
                    }
                }
                "max_piece" => {
                    if let Some(px) = parse_px(value) {
                        rules.max_piece_px = px;
                    }
                }
                "resize_ms" => {
                    if let Ok(ms) = value.trim().parse::<u32>() {
                        config.resize_debounce_ms = ms;
                    }
                }
                "haptics" => {
                    if let Some(flag) = parse_flag(value) {
                        config.haptics = flag;
                    }
                }
                "debug" => {
                    if let Some(flag) = parse_flag(value) {
                        config.verbose = flag;
                    }
                }
                _ => {}
            }
        }
        if rules.max_piece_px < rules.min_piece_px {
            rules.max_piece_px = rules.min_piece_px;
        }
        config.grid_mode = if fixed {
            GridMode::Fixed(GridSize::new(fixed_grid.rows, fixed_grid.cols))
        } else {
            GridMode::Viewport(rules)
        };
        config
    }
}

pub(crate) fn load_widget_config() -> WidgetConfig {
    let Some(window) = web_sys::window() else {
        return WidgetConfig::default();
    };
    let search = window.location().search().unwrap_or_default();
    let Ok(params) = web_sys::UrlSearchParams::new_with_str(&search) else {
        return WidgetConfig::default();
    };
    let mut pairs = Vec::new();
    for key in [
        "grid",
        "rows",
        "cols",
        "min_piece",
        "max_piece",
        "resize_ms",
        "haptics",
        "debug",
    ] {
        if let Some(value) = params.get(key) {
            pairs.push((key, value));
        }
    }
    WidgetConfig::from_pairs(pairs)
}
