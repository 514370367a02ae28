pub mod app;
pub mod assets;
pub mod atlas;
pub mod audio;
pub mod batch;
pub mod color;
pub mod font;
pub mod input;
pub mod knob;
pub mod renderer;
pub mod screen;
pub mod texture;
pub mod utils;

pub use app::{run, App, WindowConfig};
pub use assets::{Load, Slot, TextureSlot};
pub use atlas::{Atlas, AtlasError, Patch, PatchError};
pub use audio::{AudioSink, Cue, Mixer, SampleBank, SampleId};
pub use batch::{Batch, BatchError};
pub use color::Color;
pub use font::{Font, FontError, Glyph};
pub use input::{Bindings, Control, Input, RawFrame};
pub use knob::{Button, HBox, Knob, Panel, Pic, Signal, Style, Text, TextArray};
pub use renderer::{DrawBindings, Drawable, Renderer};
pub use screen::{FixedStep, Screen, ScreenStack, Transition};
pub use texture::{Texture, TextureError};
pub use utils::{FramePool, Rect, Temp, Vec2};
