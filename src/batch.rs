use std::fmt;
use std::sync::Arc;

use crate::assets::TextureSlot;
use crate::atlas::Patch;
use crate::color::Color;
use crate::font::Font;
use crate::renderer::{DrawBindings, Drawable};
use crate::texture::Texture;
use crate::utils::{Rect, Vec2};

#[derive(Debug)]
pub enum BatchError {
    TextureNotReady,
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::TextureNotReady => write!(f, "batch texture is not loaded yet"),
        }
    }
}

impl std::error::Error for BatchError {}

const POSITION_FLOATS_PER_QUAD: usize = 12; // 2 triangles x 3 vertices x 2 floats
const UV_FLOATS_PER_QUAD: usize = 12;
const COLOR_BYTES_PER_QUAD: usize = 24; // 6 vertices x 4 bytes

struct Gpu {
    texture: Arc<Texture>,
    vertices: wgpu::Buffer,
    uvs: wgpu::Buffer,
    colors: wgpu::Buffer,
}

/// Fixed-capacity quad accumulator over three parallel arrays (positions,
/// UVs, colours), flushed in one draw call.
///
/// Writes at or past capacity are silently dropped: batch overflow is the
/// engine's backpressure mechanism, and callers size batches for their
/// worst-case draw count.
pub struct Batch {
    tex_size: Vec2,
    max: usize,
    n: usize,
    drawn: bool,
    positions: Vec<f32>,
    uvs: Vec<f32>,
    colors: Vec<u8>,
    gpu: Option<Gpu>,
}

impl Batch {
    /// CPU-only accumulator; drawing it is a logged no-op. Layout code and
    /// tests use this, render paths use [`Batch::for_texture`].
    pub fn new(texture_size: Vec2, max: usize) -> Self {
        Self {
            tex_size: texture_size,
            max,
            n: 0,
            drawn: false,
            positions: vec![0.0; max * POSITION_FLOATS_PER_QUAD],
            uvs: vec![0.0; max * UV_FLOATS_PER_QUAD],
            colors: vec![0; max * COLOR_BYTES_PER_QUAD],
            gpu: None,
        }
    }

    /// Accumulator with GPU buffers sized for `max` quads over the slot's
    /// texture. Fails when the texture has not finished loading.
    pub fn for_texture(
        device: &wgpu::Device,
        slot: &TextureSlot,
        max: usize,
    ) -> Result<Self, BatchError> {
        let texture = slot.get().cloned().ok_or(BatchError::TextureNotReady)?;

        let float_buffer = |label: &str, floats: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: (max * floats * std::mem::size_of::<f32>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let vertices = float_buffer("Batch Vertex Buffer", POSITION_FLOATS_PER_QUAD);
        let uvs = float_buffer("Batch UV Buffer", UV_FLOATS_PER_QUAD);
        let colors = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Batch Colour Buffer"),
            size: (max * COLOR_BYTES_PER_QUAD) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut batch = Batch::new(texture.size(), max);
        batch.gpu = Some(Gpu {
            texture,
            vertices,
            uvs,
            colors,
        });
        Ok(batch)
    }

    pub fn capacity(&self) -> usize {
        self.max
    }

    pub fn quads(&self) -> usize {
        self.n
    }

    /// Vertex count the next draw submits.
    pub fn vertex_count(&self) -> u32 {
        (self.n * 6) as u32
    }

    /// Live prefix of the position array: x,y pairs, 6 vertices per quad.
    pub fn position_data(&self) -> &[f32] {
        &self.positions[..self.n * POSITION_FLOATS_PER_QUAD]
    }

    /// Live prefix of the UV array, normalized to the backing texture.
    pub fn uv_data(&self) -> &[f32] {
        &self.uvs[..self.n * UV_FLOATS_PER_QUAD]
    }

    /// Live prefix of the colour array: RGBA bytes, 6 vertices per quad.
    pub fn color_data(&self) -> &[u8] {
        &self.colors[..self.n * COLOR_BYTES_PER_QUAD]
    }

    /// Resets the draw count. O(1); stale data past the count is never read
    /// because draws are bounded by `vertex_count()`.
    pub fn clear(&mut self) {
        self.n = 0;
        self.drawn = false;
    }

    /// The single fan-in primitive: writes one quad as two CCW triangles
    /// (BL, BR, TL / BR, TR, TL) into the next free slot. `src` is in texel
    /// space; a negative `src` extent samples the texture flipped.
    pub fn push_quad(
        &mut self,
        src: Rect,
        left: f32,
        bottom: f32,
        right: f32,
        top: f32,
        color: Color,
    ) {
        if self.n >= self.max {
            return; // deliberate backpressure: overflow draws never appear
        }

        let i = self.n * POSITION_FLOATS_PER_QUAD;
        self.positions[i..i + POSITION_FLOATS_PER_QUAD].copy_from_slice(&[
            left, bottom, // BL
            right, bottom, // BR
            left, top, // TL
            right, bottom, // BR
            right, top, // TR
            left, top, // TL
        ]);

        // Texel rows run top-down: the quad's bottom edge samples the far
        // row of the source rect.
        let u0 = src.pos.x / self.tex_size.x;
        let u1 = src.right() / self.tex_size.x;
        let v0 = src.pos.y / self.tex_size.y;
        let v1 = src.top() / self.tex_size.y;
        let i = self.n * UV_FLOATS_PER_QUAD;
        self.uvs[i..i + UV_FLOATS_PER_QUAD].copy_from_slice(&[
            u0, v1, // BL
            u1, v1, // BR
            u0, v0, // TL
            u1, v1, // BR
            u1, v0, // TR
            u0, v0, // TL
        ]);

        let i = self.n * COLOR_BYTES_PER_QUAD;
        for v in 0..6 {
            let at = i + v * 4;
            self.colors[at..at + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }

        self.n += 1;
    }

    /// Stretches `src` into `dst`.
    pub fn add(&mut self, src: Rect, dst: Rect, color: Color) {
        self.push_quad(src, dst.pos.x, dst.pos.y, dst.right(), dst.top(), color);
    }

    /// Stamps a `src`-sized quad centred on `center` (scale-free placement).
    pub fn add_at(&mut self, src: Rect, center: Vec2, color: Color) {
        let half_w = src.size.x.abs() * 0.5;
        let half_h = src.size.y.abs() * 0.5;
        self.push_quad(
            src,
            center.x - half_w,
            center.y - half_h,
            center.x + half_w,
            center.y + half_h,
            color,
        );
    }

    /// Expands a 9-patch into exactly 9 quads: corners keep their fixed
    /// `border` size, edges stretch along one axis, the centre fills the
    /// remainder. A `dst` smaller than twice the border on an axis produces
    /// overlapping geometry; that is the caller's error, not defended here.
    pub fn add_patch(&mut self, patch: &Patch, dst: Rect, color: Color) {
        let b = patch.border();
        let xs = [dst.pos.x, dst.pos.x + b, dst.right() - b];
        let widths = [b, dst.size.x - 2.0 * b, b];
        let ys = [dst.pos.y, dst.pos.y + b, dst.top() - b];
        let heights = [b, dst.size.y - 2.0 * b, b];

        for row in 0..3 {
            for col in 0..3 {
                self.push_quad(
                    patch.cell(col, row),
                    xs[col],
                    ys[row],
                    xs[col] + widths[col],
                    ys[row] + heights[row],
                    color,
                );
            }
        }
    }

    /// Lays out a glyph run left-to-right with the top of the first line at
    /// `origin`. `\n` resets the cursor and drops one line height. Kerning
    /// uses the previous glyph's table keyed by the current character.
    /// Characters without metrics are skipped without advancing, so an
    /// unsupported character costs its pixels, never the frame.
    pub fn add_text(&mut self, text: &str, origin: Vec2, font: &Font, color: Color) {
        let mut x = origin.x;
        let mut baseline = origin.y - font.base();
        let mut prev: Option<char> = None;

        for c in text.chars() {
            if c == '\n' {
                x = origin.x;
                baseline -= font.line_height();
                prev = None;
                continue;
            }
            let Some(glyph) = font.glyph(c) else {
                continue;
            };
            if let Some(p) = prev {
                if let Some(prev_glyph) = font.glyph(p) {
                    x += prev_glyph.kern(c);
                }
            }
            // Empty glyphs (space) advance without spending a quad.
            if glyph.src.size.x > 0.0 && glyph.src.size.y > 0.0 {
                let left = x + glyph.offset.x;
                let bottom = baseline + glyph.offset.y;
                self.push_quad(
                    glyph.src,
                    left,
                    bottom,
                    left + glyph.src.size.x,
                    bottom + glyph.src.size.y,
                    color,
                );
            }
            x += glyph.advance;
            prev = Some(c);
        }
    }
}

impl Drawable for Batch {
    fn predraw(&mut self, queue: &wgpu::Queue) -> u32 {
        let Some(gpu) = &self.gpu else {
            log::error!("batch drawn before its texture was ready");
            return 0;
        };
        if self.drawn {
            log::warn!("batch drawn twice without clear");
            return 0;
        }
        if self.n == 0 {
            return 0;
        }

        queue.write_buffer(
            &gpu.vertices,
            0,
            bytemuck::cast_slice(&self.positions[..self.n * POSITION_FLOATS_PER_QUAD]),
        );
        queue.write_buffer(
            &gpu.uvs,
            0,
            bytemuck::cast_slice(&self.uvs[..self.n * UV_FLOATS_PER_QUAD]),
        );
        queue.write_buffer(&gpu.colors, 0, &self.colors[..self.n * COLOR_BYTES_PER_QUAD]);

        self.drawn = true;
        self.vertex_count()
    }

    fn bindings(&self) -> Option<DrawBindings<'_>> {
        let gpu = self.gpu.as_ref()?;
        Some(DrawBindings {
            vertices: &gpu.vertices,
            uvs: Some(&gpu.uvs),
            colors: Some(&gpu.colors),
            texture: Some(gpu.texture.as_ref()),
        })
    }
}
