use std::collections::{HashMap, HashSet};

/// The logical input surface the GUI layer sees. Raw keyboard/gamepad
/// capture and fusion live behind [`Bindings`]; widgets only ever ask about
/// these six controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Up,
    Down,
    Left,
    Right,
    Accept,
    Cancel,
}

/// One frame's raw device snapshot, produced by the platform layer: names of
/// held keys and gamepad buttons plus named axis values in -1..1.
#[derive(Debug, Default, Clone)]
pub struct RawFrame {
    pub keys: HashSet<String>,
    pub pad_buttons: HashSet<String>,
    pub axes: HashMap<String, f32>,
}

#[derive(Debug, Clone)]
struct AxisBinding {
    axis: String,
    negative: Control,
    positive: Control,
    deadzone: f32,
}

/// Maps raw key/button/axis names to logical controls. An axis past its
/// dead-zone counts as holding the corresponding direction, which is how
/// stick and d-pad input fuse into one surface.
#[derive(Debug, Default, Clone)]
pub struct Bindings {
    keys: HashMap<String, Control>,
    pad_buttons: HashMap<String, Control>,
    axes: Vec<AxisBinding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_key(&mut self, name: impl Into<String>, control: Control) {
        self.keys.insert(name.into(), control);
    }

    pub fn bind_pad_button(&mut self, name: impl Into<String>, control: Control) {
        self.pad_buttons.insert(name.into(), control);
    }

    pub fn bind_axis(
        &mut self,
        axis: impl Into<String>,
        negative: Control,
        positive: Control,
        deadzone: f32,
    ) {
        self.axes.push(AxisBinding {
            axis: axis.into(),
            negative,
            positive,
            deadzone,
        });
    }

    /// Arrow keys + Enter/Escape, d-pad + South/East, left stick.
    /// Key names are the Debug form of `winit::keyboard::Key`.
    pub fn standard() -> Self {
        let mut bindings = Self::new();
        bindings.bind_key("Named(ArrowUp)", Control::Up);
        bindings.bind_key("Named(ArrowDown)", Control::Down);
        bindings.bind_key("Named(ArrowLeft)", Control::Left);
        bindings.bind_key("Named(ArrowRight)", Control::Right);
        bindings.bind_key("Named(Enter)", Control::Accept);
        bindings.bind_key("Named(Escape)", Control::Cancel);
        bindings.bind_pad_button("DPadUp", Control::Up);
        bindings.bind_pad_button("DPadDown", Control::Down);
        bindings.bind_pad_button("DPadLeft", Control::Left);
        bindings.bind_pad_button("DPadRight", Control::Right);
        bindings.bind_pad_button("South", Control::Accept);
        bindings.bind_pad_button("East", Control::Cancel);
        bindings.bind_axis("LeftStickX", Control::Left, Control::Right, 0.5);
        bindings.bind_axis("LeftStickY", Control::Down, Control::Up, 0.5);
        bindings
    }

    fn resolve(&self, raw: &RawFrame) -> HashSet<Control> {
        let mut held = HashSet::new();
        for (name, control) in &self.keys {
            if raw.keys.contains(name) {
                held.insert(*control);
            }
        }
        for (name, control) in &self.pad_buttons {
            if raw.pad_buttons.contains(name) {
                held.insert(*control);
            }
        }
        for binding in &self.axes {
            let value = raw.axes.get(&binding.axis).copied().unwrap_or(0.0);
            if value <= -binding.deadzone {
                held.insert(binding.negative);
            } else if value >= binding.deadzone {
                held.insert(binding.positive);
            }
        }
        held
    }
}

/// Edge-detecting logical input state. `poll` once per frame; edges are the
/// difference against the previous frame's held set.
#[derive(Debug, Default, Clone)]
pub struct Input {
    held: HashSet<Control>,
    prev: HashSet<Control>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&mut self, raw: &RawFrame, bindings: &Bindings) {
        let current = bindings.resolve(raw);
        self.prev = std::mem::replace(&mut self.held, current);
    }

    pub fn held(&self, control: Control) -> bool {
        self.held.contains(&control)
    }

    pub fn just_pressed(&self, control: Control) -> bool {
        self.held.contains(&control) && !self.prev.contains(&control)
    }

    pub fn just_released(&self, control: Control) -> bool {
        !self.held.contains(&control) && self.prev.contains(&control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_key(key: &str) -> RawFrame {
        let mut raw = RawFrame::default();
        raw.keys.insert(key.to_string());
        raw
    }

    #[test]
    fn edge_detection_for_keys() {
        let bindings = Bindings::standard();
        let mut input = Input::new();

        input.poll(&frame_with_key("Named(Enter)"), &bindings);
        assert!(input.held(Control::Accept));
        assert!(input.just_pressed(Control::Accept));

        // Still held next frame: no longer just pressed.
        input.poll(&frame_with_key("Named(Enter)"), &bindings);
        assert!(input.held(Control::Accept));
        assert!(!input.just_pressed(Control::Accept));

        // Released.
        input.poll(&RawFrame::default(), &bindings);
        assert!(!input.held(Control::Accept));
        assert!(input.just_released(Control::Accept));
    }

    #[test]
    fn axis_past_deadzone_acts_as_direction() {
        let bindings = Bindings::standard();
        let mut input = Input::new();

        let mut raw = RawFrame::default();
        raw.axes.insert("LeftStickY".to_string(), 0.9);
        input.poll(&raw, &bindings);
        assert!(input.just_pressed(Control::Up));

        raw.axes.insert("LeftStickY".to_string(), 0.2);
        input.poll(&raw, &bindings);
        assert!(input.just_released(Control::Up));
    }

    #[test]
    fn pad_and_keyboard_fuse_into_one_control() {
        let bindings = Bindings::standard();
        let mut input = Input::new();

        let mut raw = RawFrame::default();
        raw.pad_buttons.insert("South".to_string());
        input.poll(&raw, &bindings);
        assert!(input.just_pressed(Control::Accept));

        // Switching devices while held is not an edge.
        let mut raw = frame_with_key("Named(Enter)");
        raw.pad_buttons.insert("South".to_string());
        input.poll(&raw, &bindings);
        assert!(input.held(Control::Accept));
        assert!(!input.just_pressed(Control::Accept));
    }
}
