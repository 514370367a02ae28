use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::utils::Rect;

/// One manifest entry, in source-texture pixel space.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ManifestRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug)]
pub enum AtlasError {
    Manifest(String),
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::Manifest(message) => write!(f, "atlas manifest parse failed: {message}"),
        }
    }
}

impl std::error::Error for AtlasError {}

/// Named sub-rectangles within one texture.
///
/// Built wholesale from a JSON manifest; immutable afterwards except through
/// [`Atlas::add`]. Lookup misses degrade to the zero rect so a missing sprite
/// never takes a frame down.
#[derive(Debug, Default)]
pub struct Atlas {
    entries: HashMap<String, Rect>,
}

impl Atlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `{"name": {"x":..,"y":..,"width":..,"height":..}, ...}`.
    pub fn from_manifest(json: &str) -> Result<Self, AtlasError> {
        let raw: HashMap<String, ManifestRect> =
            serde_json::from_str(json).map_err(|e| AtlasError::Manifest(e.to_string()))?;
        let entries = raw
            .into_iter()
            .map(|(name, r)| (name, Rect::new(r.x, r.y, r.width, r.height)))
            .collect();
        Ok(Self { entries })
    }

    pub fn add(&mut self, name: impl Into<String>, rect: Rect) {
        self.entries.insert(name.into(), rect);
    }

    /// Missing names log an error and return the zero rect.
    pub fn get(&self, name: &str) -> Rect {
        match self.entries.get(name) {
            Some(rect) => *rect,
            None => {
                log::error!("atlas has no sprite named '{name}'");
                Rect::ZERO
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Derives a 9-patch for a named sprite. The border is the explicit
    /// argument when given, otherwise the trailing decimal digits of the
    /// name ("panel12" has border 12). Neither source yielding a number is
    /// logged and falls back to border 1.
    pub fn patch(&self, name: &str, border: Option<f32>) -> Result<Patch, PatchError> {
        let border = border.or_else(|| trailing_digits(name)).unwrap_or_else(|| {
            log::error!("no border given and no trailing digits in sprite name '{name}'");
            1.0
        });
        Patch::new(self.get(name), border)
    }
}

fn trailing_digits(name: &str) -> Option<f32> {
    let digits: String = name
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse::<f32>().ok()
}

#[derive(Debug)]
pub enum PatchError {
    BorderTooLarge {
        width: f32,
        height: f32,
        border: f32,
    },
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchError::BorderTooLarge {
                width,
                height,
                border,
            } => write!(
                f,
                "9-patch border {border} does not fit a {width}x{height} source rect"
            ),
        }
    }
}

impl std::error::Error for PatchError {}

/// A sprite decomposed into 9 regions: 4 fixed corners, 4 edges that stretch
/// along one axis, and a centre that stretches along both.
///
/// Cells are indexed `row * 3 + col` with row 0 the visual bottom strip;
/// source rects are in texel space (image rows top-down).
#[derive(Debug, Clone, Copy)]
pub struct Patch {
    border: f32,
    cells: [Rect; 9],
}

impl Patch {
    /// Rejects borders that leave less than one texel of stretchable middle.
    /// Clamping here would hide authoring bugs in content, so construction
    /// fails instead.
    pub fn new(src: Rect, border: f32) -> Result<Self, PatchError> {
        let (w, h) = (src.size.x, src.size.y);
        if w - 2.0 * border < 1.0 || h - 2.0 * border < 1.0 {
            return Err(PatchError::BorderTooLarge {
                width: w,
                height: h,
                border,
            });
        }

        let xs = [src.pos.x, src.pos.x + border, src.pos.x + w - border];
        let widths = [border, w - 2.0 * border, border];
        // Texel rows run top-down, so the visual bottom strip starts at
        // y + h - border.
        let ys = [src.pos.y + h - border, src.pos.y + border, src.pos.y];
        let heights = [border, h - 2.0 * border, border];

        let mut cells = [Rect::ZERO; 9];
        for row in 0..3 {
            for col in 0..3 {
                cells[row * 3 + col] = Rect::new(xs[col], ys[row], widths[col], heights[row]);
            }
        }

        Ok(Self { border, cells })
    }

    pub fn border(&self) -> f32 {
        self.border
    }

    pub fn cells(&self) -> &[Rect; 9] {
        &self.cells
    }

    /// `row` 0 is the visual bottom strip, `col` 0 the left column.
    pub fn cell(&self, col: usize, row: usize) -> Rect {
        self.cells[row * 3 + col]
    }
}
