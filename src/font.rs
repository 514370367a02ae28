use std::collections::HashMap;
use std::fmt;

use crate::utils::{Rect, Vec2};

#[derive(Debug)]
pub enum FontError {
    MissingCommon,
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::MissingCommon => write!(f, "font description has no 'common' record"),
        }
    }
}

impl std::error::Error for FontError {}

/// Metrics for one glyph of a bitmap font.
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Source rect in texel space.
    pub src: Rect,
    /// Render offset of the quad's bottom-left corner from the pen position
    /// on the baseline.
    pub offset: Vec2,
    pub advance: f32,
    kerning: HashMap<char, f32>,
}

impl Glyph {
    /// Kerning adjustment applied when `next` follows this glyph.
    /// Unlisted pairs are 0.
    pub fn kern(&self, next: char) -> f32 {
        self.kerning.get(&next).copied().unwrap_or(0.0)
    }
}

/// Bitmap font parsed from the line-oriented `key=value` font description
/// format (`info` / `common` / `char` / `kerning` records).
#[derive(Debug)]
pub struct Font {
    size: f32,
    line_height: f32,
    base: f32,
    glyphs: HashMap<char, Glyph>,
}

impl Font {
    pub fn parse(text: &str) -> Result<Self, FontError> {
        let mut size = 0.0;
        let mut common: Option<(f32, f32)> = None;
        let mut glyphs: HashMap<char, Glyph> = HashMap::new();
        let mut kernings: Vec<(char, char, f32)> = Vec::new();

        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            let Some(record) = tokens.next() else { continue };
            let fields = parse_fields(tokens);
            match record {
                "info" => {
                    size = field(&fields, "size").unwrap_or(0.0);
                }
                "common" => {
                    let line_height = field(&fields, "lineHeight");
                    let base = field(&fields, "base");
                    match (line_height, base) {
                        (Some(lh), Some(b)) => common = Some((lh, b)),
                        _ => log::warn!("font 'common' record missing lineHeight or base"),
                    }
                }
                "char" => {
                    let parsed = (|| {
                        let id = field(&fields, "id")? as u32;
                        let c = char::from_u32(id)?;
                        let x = field(&fields, "x")?;
                        let y = field(&fields, "y")?;
                        let width = field(&fields, "width")?;
                        let height = field(&fields, "height")?;
                        let xoffset = field(&fields, "xoffset")?;
                        let yoffset = field(&fields, "yoffset")?;
                        let advance = field(&fields, "xadvance")?;
                        Some((c, x, y, width, height, xoffset, yoffset, advance))
                    })();
                    match parsed {
                        Some(values) => insert_raw_glyph(&mut glyphs, values),
                        None => log::warn!("skipping malformed font 'char' record: {line}"),
                    }
                }
                "kerning" => {
                    let parsed = (|| {
                        let first = char::from_u32(field(&fields, "first")? as u32)?;
                        let second = char::from_u32(field(&fields, "second")? as u32)?;
                        let amount = field(&fields, "amount")?;
                        Some((first, second, amount))
                    })();
                    match parsed {
                        Some(pair) => kernings.push(pair),
                        None => log::warn!("skipping malformed font 'kerning' record: {line}"),
                    }
                }
                _ => {}
            }
        }

        let (line_height, base) = common.ok_or(FontError::MissingCommon)?;

        // The description's yoffset is top-down (distance from the line top
        // to the glyph top); render space is bottom-up with the quad placed
        // from its bottom-left corner, so the vertical offset from the
        // baseline is -yoffset + base - height.
        for glyph in glyphs.values_mut() {
            let yoffset = glyph.offset.y;
            glyph.offset.y = -yoffset + base - glyph.src.size.y;
        }

        for (first, second, amount) in kernings {
            match glyphs.get_mut(&first) {
                Some(glyph) => {
                    glyph.kerning.insert(second, amount);
                }
                None => log::warn!("kerning pair references unknown glyph {first:?}"),
            }
        }

        Ok(Self {
            size,
            line_height,
            base,
            glyphs,
        })
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    /// Shifts every glyph source rect, for fonts packed as a sub-image of a
    /// larger atlas texture.
    pub fn offset_by(&mut self, dx: f32, dy: f32) {
        for glyph in self.glyphs.values_mut() {
            glyph.src.pos.x += dx;
            glyph.src.pos.y += dy;
        }
    }

    /// Width of a single line, kerning included. Characters without metrics
    /// contribute nothing.
    pub fn measure(&self, text: &str) -> f32 {
        let mut width = 0.0;
        let mut prev: Option<&Glyph> = None;
        for c in text.chars() {
            let Some(glyph) = self.glyphs.get(&c) else {
                continue;
            };
            if let Some(p) = prev {
                width += p.kern(c);
            }
            width += glyph.advance;
            prev = Some(glyph);
        }
        width
    }

    /// Greedy word-wrap. Embedded newlines start a new line; a word wider
    /// than `width` gets a line of its own.
    pub fn wrap(&self, text: &str, width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                if line.is_empty() {
                    line = word.to_string();
                    continue;
                }
                let candidate = format!("{line} {word}");
                if self.measure(&candidate) <= width {
                    line = candidate;
                } else {
                    lines.push(std::mem::take(&mut line));
                    line = word.to_string();
                }
            }
            lines.push(line);
        }
        lines
    }
}

type CharRecord = (char, f32, f32, f32, f32, f32, f32, f32);

// Stores the raw record; the vertical offset still holds the top-down
// yoffset until Font::parse resolves it against the 'common' metrics.
fn insert_raw_glyph(glyphs: &mut HashMap<char, Glyph>, values: CharRecord) {
    let (c, x, y, width, height, xoffset, yoffset, advance) = values;
    glyphs.insert(
        c,
        Glyph {
            src: Rect::new(x, y, width, height),
            offset: Vec2::new(xoffset, yoffset),
            advance,
            kerning: HashMap::new(),
        },
    );
}

fn parse_fields<'a>(tokens: impl Iterator<Item = &'a str>) -> HashMap<&'a str, &'a str> {
    tokens
        .filter_map(|token| token.split_once('='))
        .collect()
}

fn field(fields: &HashMap<&str, &str>, key: &str) -> Option<f32> {
    fields.get(key).and_then(|v| v.parse::<f32>().ok())
}
