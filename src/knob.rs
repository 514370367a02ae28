use std::sync::Arc;

use crate::atlas::{Atlas, Patch};
use crate::audio::{AudioSink, Cue};
use crate::batch::Batch;
use crate::color::Color;
use crate::font::Font;
use crate::input::{Control, Input};
use crate::utils::{Rect, Vec2};

/// Result value a widget yields when activated. The first non-`None` signal
/// from any depth propagates unchanged to the root caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal(pub u32);

/// Explicit style value handed to fit/render calls. Patches are resolved
/// once at construction; a sprite that fails to resolve logs and leaves the
/// background undrawn instead of failing every frame.
pub struct Style {
    pub font: Arc<Font>,
    pub atlas: Arc<Atlas>,
    pub border: f32,
    pub text: Color,
    pub accent: Color,
    panel_patch: Option<Patch>,
    button_patch: Option<Patch>,
}

impl Style {
    pub fn new(
        font: Arc<Font>,
        atlas: Arc<Atlas>,
        panel_sprite: &str,
        button_sprite: &str,
    ) -> Self {
        let resolve = |name: &str| match atlas.patch(name, None) {
            Ok(patch) => Some(patch),
            Err(e) => {
                log::error!("style patch '{name}': {e}");
                None
            }
        };
        let panel_patch = resolve(panel_sprite);
        let button_patch = resolve(button_sprite);
        Self {
            font,
            atlas,
            border: 4.0,
            text: Color::WHITE,
            accent: Color::rgb(255, 220, 120),
            panel_patch,
            button_patch,
        }
    }

    pub fn panel_patch(&self) -> Option<&Patch> {
        self.panel_patch.as_ref()
    }

    pub fn button_patch(&self) -> Option<&Patch> {
        self.button_patch.as_ref()
    }
}

/// A widget node. The tree is built once per screen, fitted once (or again
/// after content changes), updated and rendered every frame.
///
/// Rendering before fitting is a programmer error and panics; content gaps
/// (missing sprites, missing glyphs) degrade with a log instead.
pub trait Knob {
    /// Top-down layout pass. `greedy` consumes all of `bounds`; otherwise
    /// the knob shrinks to content size anchored at the bottom of `bounds`.
    fn fit(&mut self, bounds: Rect, greedy: bool, style: &Style);

    /// Per-frame input step. Only the selected child of a container receives
    /// `selected = true`; at most one state-changing result happens per call.
    fn update(&mut self, input: &Input, audio: &mut dyn AudioSink, selected: bool)
        -> Option<Signal>;

    fn render(&self, batch: &mut Batch, style: &Style);

    /// Whether this knob (or any descendant path) can take the selection
    /// cursor.
    fn selectable(&self) -> bool {
        false
    }

    /// Fitted bounds. Panics before the first `fit`.
    fn bounds(&self) -> Rect;
}

/// Steps a selection cursor by the sign of `direction`, cyclically, skipping
/// non-selectable children. Every child is visited at most once, so a lone
/// selectable child terminates instead of spinning.
fn step_selection(children: &[Box<dyn Knob>], current: usize, direction: i32) -> usize {
    let len = children.len();
    if len == 0 {
        return current;
    }
    let step = if direction < 0 { len - 1 } else { 1 };
    let mut index = current;
    for _ in 0..len {
        index = (index + step) % len;
        if children[index].selectable() {
            return index;
        }
    }
    current
}

fn selectable_count(children: &[Box<dyn Knob>]) -> usize {
    children.iter().filter(|c| c.selectable()).count()
}

// Shared container step: navigation consumes the call; otherwise children
// run with only the selected one live, first signal wins.
fn update_children(
    children: &mut [Box<dyn Knob>],
    selection: usize,
    input: &Input,
    audio: &mut dyn AudioSink,
    selected: bool,
) -> Option<Signal> {
    for (i, child) in children.iter_mut().enumerate() {
        let signal = child.update(input, audio, selected && i == selection);
        if signal.is_some() {
            return signal;
        }
    }
    None
}

/// Vertical stacking container. The interior is the bounds shrunk by the
/// style border; children fit non-greedy against the remaining interior,
/// anchor to its floor, and the floor rises by each child's consumed height.
/// The stack grows upward, so listing order runs bottom-to-top.
pub struct Panel {
    children: Vec<Box<dyn Knob>>,
    selection: usize,
    bounds: Option<Rect>,
}

impl Panel {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            selection: 0,
            bounds: None,
        }
    }

    pub fn with(mut self, child: impl Knob + 'static) -> Self {
        self.add(child);
        self
    }

    pub fn add(&mut self, child: impl Knob + 'static) {
        self.children.push(Box::new(child));
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn set_selection(&mut self, index: usize) {
        self.selection = index;
    }

    pub fn increment_selection(&mut self, direction: i32) {
        self.selection = step_selection(&self.children, self.selection, direction);
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Knob for Panel {
    fn fit(&mut self, bounds: Rect, greedy: bool, style: &Style) {
        let mut remaining = bounds.shrink(style.border);
        let mut consumed = 0.0;
        for child in &mut self.children {
            child.fit(remaining, false, style);
            let used = child.bounds().size.y;
            remaining.pos.y += used;
            remaining.size.y -= used;
            consumed += used;
        }
        self.bounds = Some(if greedy {
            bounds
        } else {
            Rect::new(
                bounds.pos.x,
                bounds.pos.y,
                bounds.size.x,
                consumed + 2.0 * style.border,
            )
        });
        // Land the cursor on a selectable child if the current one is not.
        if !self
            .children
            .get(self.selection)
            .map_or(false, |c| c.selectable())
        {
            self.increment_selection(1);
        }
    }

    fn update(
        &mut self,
        input: &Input,
        audio: &mut dyn AudioSink,
        selected: bool,
    ) -> Option<Signal> {
        // Vertical navigation, only when there is somewhere to go; a single
        // selectable child keeps directional input flowing down to it.
        if selected && selectable_count(&self.children) > 1 {
            if input.just_pressed(Control::Up) {
                self.increment_selection(1);
                audio.play(Cue::Tap);
                return None;
            }
            if input.just_pressed(Control::Down) {
                self.increment_selection(-1);
                audio.play(Cue::Tap);
                return None;
            }
        }
        update_children(&mut self.children, self.selection, input, audio, selected)
    }

    fn render(&self, batch: &mut Batch, style: &Style) {
        let bounds = self.bounds.expect("panel rendered before fit");
        if let Some(patch) = style.panel_patch() {
            batch.add_patch(patch, bounds, Color::WHITE);
        }
        for child in &self.children {
            child.render(batch, style);
        }
    }

    fn selectable(&self) -> bool {
        self.children.iter().any(|c| c.selectable())
    }

    fn bounds(&self) -> Rect {
        self.bounds.expect("panel measured before fit")
    }
}

/// Horizontal container. Width is divided evenly among children — not
/// content-proportional — and the non-greedy height is the tallest child.
pub struct HBox {
    children: Vec<Box<dyn Knob>>,
    selection: usize,
    bounds: Option<Rect>,
}

impl HBox {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            selection: 0,
            bounds: None,
        }
    }

    pub fn with(mut self, child: impl Knob + 'static) -> Self {
        self.add(child);
        self
    }

    pub fn add(&mut self, child: impl Knob + 'static) {
        self.children.push(Box::new(child));
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn set_selection(&mut self, index: usize) {
        self.selection = index;
    }

    pub fn increment_selection(&mut self, direction: i32) {
        self.selection = step_selection(&self.children, self.selection, direction);
    }
}

impl Default for HBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Knob for HBox {
    fn fit(&mut self, bounds: Rect, greedy: bool, style: &Style) {
        let count = self.children.len();
        let mut tallest = 0.0f32;
        if count > 0 {
            let column_width = bounds.size.x / count as f32;
            for (i, child) in self.children.iter_mut().enumerate() {
                let column = Rect::new(
                    bounds.pos.x + i as f32 * column_width,
                    bounds.pos.y,
                    column_width,
                    bounds.size.y,
                );
                child.fit(column, false, style);
                tallest = tallest.max(child.bounds().size.y);
            }
        }
        self.bounds = Some(if greedy {
            bounds
        } else {
            Rect::new(bounds.pos.x, bounds.pos.y, bounds.size.x, tallest)
        });
        if !self
            .children
            .get(self.selection)
            .map_or(false, |c| c.selectable())
        {
            self.increment_selection(1);
        }
    }

    fn update(
        &mut self,
        input: &Input,
        audio: &mut dyn AudioSink,
        selected: bool,
    ) -> Option<Signal> {
        if selected && selectable_count(&self.children) > 1 {
            if input.just_pressed(Control::Right) {
                self.increment_selection(1);
                audio.play(Cue::Tap);
                return None;
            }
            if input.just_pressed(Control::Left) {
                self.increment_selection(-1);
                audio.play(Cue::Tap);
                return None;
            }
        }
        update_children(&mut self.children, self.selection, input, audio, selected)
    }

    fn render(&self, batch: &mut Batch, style: &Style) {
        let _ = self.bounds.expect("hbox rendered before fit");
        for child in &self.children {
            child.render(batch, style);
        }
    }

    fn selectable(&self) -> bool {
        self.children.iter().any(|c| c.selectable())
    }

    fn bounds(&self) -> Rect {
        self.bounds.expect("hbox measured before fit")
    }
}

/// Word-wrapped text leaf. Consumes only the height its wrapped lines need,
/// anchored to the bottom of the bounds it is given; alignment within a
/// panel is a matter of stacking order.
pub struct Text {
    content: String,
    lines: Vec<String>,
    bounds: Option<Rect>,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            lines: Vec::new(),
            bounds: None,
        }
    }

    /// Changing content invalidates the fit; the knob must be fitted again
    /// before the next render.
    pub fn set_text(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.lines.clear();
        self.bounds = None;
    }

    pub fn text(&self) -> &str {
        &self.content
    }
}

impl Knob for Text {
    fn fit(&mut self, bounds: Rect, greedy: bool, style: &Style) {
        self.lines = style.font.wrap(&self.content, bounds.size.x);
        let height = self.lines.len() as f32 * style.font.line_height();
        self.bounds = Some(if greedy {
            bounds
        } else {
            Rect::new(bounds.pos.x, bounds.pos.y, bounds.size.x, height)
        });
    }

    fn update(
        &mut self,
        _input: &Input,
        _audio: &mut dyn AudioSink,
        _selected: bool,
    ) -> Option<Signal> {
        None
    }

    fn render(&self, batch: &mut Batch, style: &Style) {
        let bounds = self.bounds.expect("text rendered before fit");
        let mut origin = Vec2::new(bounds.pos.x, bounds.top());
        for line in &self.lines {
            batch.add_text(line, origin, &style.font, style.text);
            origin.y -= style.font.line_height();
        }
    }

    fn bounds(&self) -> Rect {
        self.bounds.expect("text measured before fit")
    }
}

/// Atlas sprite leaf, stamped at natural size from the bottom-left of its
/// bounds; greedy fit stretches it instead.
pub struct Pic {
    sprite: String,
    src: Rect,
    bounds: Option<Rect>,
}

impl Pic {
    pub fn new(sprite: impl Into<String>) -> Self {
        Self {
            sprite: sprite.into(),
            src: Rect::ZERO,
            bounds: None,
        }
    }
}

impl Knob for Pic {
    fn fit(&mut self, bounds: Rect, greedy: bool, style: &Style) {
        self.src = style.atlas.get(&self.sprite);
        self.bounds = Some(if greedy {
            bounds
        } else {
            Rect::new(bounds.pos.x, bounds.pos.y, self.src.size.x, self.src.size.y)
        });
    }

    fn update(
        &mut self,
        _input: &Input,
        _audio: &mut dyn AudioSink,
        _selected: bool,
    ) -> Option<Signal> {
        None
    }

    fn render(&self, batch: &mut Batch, style: &Style) {
        let bounds = self.bounds.expect("pic rendered before fit");
        batch.add(self.src, bounds, Color::WHITE);
    }

    fn bounds(&self) -> Rect {
        self.bounds.expect("pic measured before fit")
    }
}

/// A selectable widget wrapping one child, yielding its signal when
/// activated.
///
/// Activation is release-triggered: Accept pressed while selected arms the
/// button, Accept released while still selected fires it exactly once.
/// Losing selection disarms, so holding Accept across a selection change
/// never fires the previously selected button.
pub struct Button {
    child: Box<dyn Knob>,
    signal: Signal,
    armed: bool,
    highlighted: bool,
    bounds: Option<Rect>,
}

impl Button {
    pub fn new(child: impl Knob + 'static, signal: Signal) -> Self {
        Self {
            child: Box::new(child),
            signal,
            armed: false,
            highlighted: false,
            bounds: None,
        }
    }
}

impl Knob for Button {
    fn fit(&mut self, bounds: Rect, greedy: bool, style: &Style) {
        self.child.fit(bounds.shrink(style.border), false, style);
        self.bounds = Some(if greedy {
            bounds
        } else {
            self.child.bounds().grow(style.border)
        });
    }

    fn update(
        &mut self,
        input: &Input,
        audio: &mut dyn AudioSink,
        selected: bool,
    ) -> Option<Signal> {
        self.highlighted = selected;
        if !selected {
            self.armed = false;
            return self.child.update(input, audio, false);
        }
        if input.just_pressed(Control::Accept) {
            self.armed = true;
        }
        if self.armed && input.just_released(Control::Accept) {
            self.armed = false;
            audio.play(Cue::Accept);
            return Some(self.signal);
        }
        self.child.update(input, audio, false)
    }

    fn render(&self, batch: &mut Batch, style: &Style) {
        let bounds = self.bounds.expect("button rendered before fit");
        if let Some(patch) = style.button_patch() {
            let tint = if self.highlighted {
                style.accent
            } else {
                Color::WHITE
            };
            batch.add_patch(patch, bounds, tint);
        }
        self.child.render(batch, style);
    }

    fn selectable(&self) -> bool {
        true
    }

    fn bounds(&self) -> Rect {
        self.bounds.expect("button measured before fit")
    }
}

/// A menu of single-line rows, each carrying a signal. The row cursor wraps
/// modularly; rows render top-down with the selected row in the accent
/// colour. Activation follows the button semantics (release-triggered).
pub struct TextArray {
    rows: Vec<(String, Signal)>,
    selection: usize,
    armed: bool,
    highlighted: bool,
    bounds: Option<Rect>,
}

impl TextArray {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            selection: 0,
            armed: false,
            highlighted: false,
            bounds: None,
        }
    }

    pub fn with(mut self, label: impl Into<String>, signal: Signal) -> Self {
        self.push(label, signal);
        self
    }

    pub fn push(&mut self, label: impl Into<String>, signal: Signal) {
        self.rows.push((label.into(), signal));
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn set_selection(&mut self, index: usize) {
        self.selection = index;
    }
}

impl Default for TextArray {
    fn default() -> Self {
        Self::new()
    }
}

impl Knob for TextArray {
    fn fit(&mut self, bounds: Rect, greedy: bool, style: &Style) {
        let height = self.rows.len() as f32 * style.font.line_height();
        self.bounds = Some(if greedy {
            bounds
        } else {
            Rect::new(bounds.pos.x, bounds.pos.y, bounds.size.x, height)
        });
    }

    fn update(
        &mut self,
        input: &Input,
        audio: &mut dyn AudioSink,
        selected: bool,
    ) -> Option<Signal> {
        self.highlighted = selected;
        if !selected || self.rows.is_empty() {
            self.armed = false;
            return None;
        }
        let len = self.rows.len();
        // Rows read top-down, so Up moves to the previous index.
        if input.just_pressed(Control::Up) {
            self.selection = (self.selection + len - 1) % len;
            audio.play(Cue::Tap);
            return None;
        }
        if input.just_pressed(Control::Down) {
            self.selection = (self.selection + 1) % len;
            audio.play(Cue::Tap);
            return None;
        }
        if input.just_pressed(Control::Accept) {
            self.armed = true;
        }
        if self.armed && input.just_released(Control::Accept) {
            self.armed = false;
            audio.play(Cue::Accept);
            return Some(self.rows[self.selection].1);
        }
        None
    }

    fn render(&self, batch: &mut Batch, style: &Style) {
        let bounds = self.bounds.expect("text array rendered before fit");
        let mut origin = Vec2::new(bounds.pos.x, bounds.top());
        for (i, (label, _)) in self.rows.iter().enumerate() {
            let color = if self.highlighted && i == self.selection {
                style.accent
            } else {
                style.text
            };
            batch.add_text(label, origin, &style.font, color);
            origin.y -= style.font.line_height();
        }
    }

    fn selectable(&self) -> bool {
        !self.rows.is_empty()
    }

    fn bounds(&self) -> Rect {
        self.bounds.expect("text array measured before fit")
    }
}
