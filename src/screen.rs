use crate::audio::AudioSink;
use crate::input::Input;
use crate::renderer::Renderer;

/// What a screen's update asks the stack to do next. An explicit tagged
/// result instead of coroutine-driven updates, so tearing a screen down
/// mid-frame has no suspended state to worry about.
pub enum Transition {
    Stay,
    Push(Box<dyn Screen>),
    Pop,
    Replace(Box<dyn Screen>),
}

/// One layer of the game: a title menu, the playfield, a pause dialog.
/// Only the top screen updates and draws.
pub trait Screen {
    fn enter(&mut self) {}
    fn exit(&mut self) {}

    fn update(&mut self, input: &Input, audio: &mut dyn AudioSink, dt: f32) -> Transition;

    fn draw(&mut self, renderer: &mut Renderer<'_>) -> Result<(), wgpu::SurfaceError>;
}

/// Stack of screens with push/pop/replace transitions driven by the top
/// screen's update result. An emptied stack ends the game loop.
pub struct ScreenStack {
    screens: Vec<Box<dyn Screen>>,
}

impl ScreenStack {
    pub fn new(mut root: Box<dyn Screen>) -> Self {
        root.enter();
        Self {
            screens: vec![root],
        }
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn update(&mut self, input: &Input, audio: &mut dyn AudioSink, dt: f32) {
        let Some(top) = self.screens.last_mut() else {
            return;
        };
        let transition = top.update(input, audio, dt);
        self.apply(transition);
    }

    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Stay => {}
            Transition::Push(mut screen) => {
                screen.enter();
                self.screens.push(screen);
            }
            Transition::Pop => {
                if let Some(mut screen) = self.screens.pop() {
                    screen.exit();
                }
            }
            Transition::Replace(mut screen) => {
                if let Some(mut old) = self.screens.pop() {
                    old.exit();
                }
                screen.enter();
                self.screens.push(screen);
            }
        }
    }

    pub fn draw(&mut self, renderer: &mut Renderer<'_>) -> Result<(), wgpu::SurfaceError> {
        match self.screens.last_mut() {
            Some(top) => top.draw(renderer),
            None => Ok(()),
        }
    }
}

/// Accumulator-based fixed timestep: updates run at a steady rate while the
/// draw rate floats with the display.
#[derive(Debug, Clone, Copy)]
pub struct FixedStep {
    pub step_seconds: f32,
    pub accumulator: f32,
}

impl FixedStep {
    pub fn new(step_seconds: f32) -> Self {
        Self {
            step_seconds,
            accumulator: 0.0,
        }
    }

    pub fn advance(&mut self, delta_seconds: f32, mut on_step: impl FnMut()) {
        self.accumulator += delta_seconds;
        while self.accumulator >= self.step_seconds {
            on_step();
            self.accumulator -= self.step_seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioSink, Cue};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct NullSink;
    impl AudioSink for NullSink {
        fn play(&mut self, _cue: Cue) {}
    }

    // Records lifecycle events and yields a scripted transition once.
    struct Scripted {
        name: &'static str,
        next: Option<Transition>,
        events: Rc<RefCell<Vec<String>>>,
    }

    impl Scripted {
        fn new(
            name: &'static str,
            next: Option<Transition>,
            events: Rc<RefCell<Vec<String>>>,
        ) -> Box<Self> {
            Box::new(Self { name, next, events })
        }
    }

    impl Screen for Scripted {
        fn enter(&mut self) {
            self.events.borrow_mut().push(format!("enter {}", self.name));
        }
        fn exit(&mut self) {
            self.events.borrow_mut().push(format!("exit {}", self.name));
        }
        fn update(&mut self, _input: &Input, _audio: &mut dyn AudioSink, _dt: f32) -> Transition {
            self.next.take().unwrap_or(Transition::Stay)
        }
        fn draw(&mut self, _renderer: &mut Renderer<'_>) -> Result<(), wgpu::SurfaceError> {
            Ok(())
        }
    }

    #[test]
    fn push_then_pop_restores_the_screen_below() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let dialog = Scripted::new("dialog", Some(Transition::Pop), events.clone());
        let root = Scripted::new("root", Some(Transition::Push(dialog)), events.clone());

        let mut stack = ScreenStack::new(root);
        let input = Input::new();
        let mut sink = NullSink;

        stack.update(&input, &mut sink, 0.016); // root pushes dialog
        assert_eq!(stack.len(), 2);
        stack.update(&input, &mut sink, 0.016); // dialog pops itself
        assert_eq!(stack.len(), 1);

        assert_eq!(
            *events.borrow(),
            vec!["enter root", "enter dialog", "exit dialog"]
        );
    }

    #[test]
    fn replace_swaps_the_top_screen() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let game = Scripted::new("game", None, events.clone());
        let title = Scripted::new("title", Some(Transition::Replace(game)), events.clone());

        let mut stack = ScreenStack::new(title);
        let input = Input::new();
        let mut sink = NullSink;

        stack.update(&input, &mut sink, 0.016);
        assert_eq!(stack.len(), 1);
        assert_eq!(
            *events.borrow(),
            vec!["enter title", "exit title", "enter game"]
        );
    }

    #[test]
    fn popping_the_last_screen_empties_the_stack() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let root = Scripted::new("root", Some(Transition::Pop), events.clone());
        let mut stack = ScreenStack::new(root);
        let input = Input::new();
        let mut sink = NullSink;

        stack.update(&input, &mut sink, 0.016);
        assert!(stack.is_empty());
        // Further updates are harmless no-ops.
        stack.update(&input, &mut sink, 0.016);
    }

    #[test]
    fn fixed_step_runs_whole_steps_and_banks_the_rest() {
        let mut step = FixedStep::new(0.01);
        let mut ticks = 0;
        step.advance(0.035, || ticks += 1);
        assert_eq!(ticks, 3);
        step.advance(0.005, || ticks += 1);
        assert_eq!(ticks, 4); // banked 0.005 + 0.005 reaches one step
    }
}
