#![allow(dead_code)]

use std::sync::Arc;

use ember2d::audio::{AudioSink, Cue};
use ember2d::{Atlas, Font, Style};

pub const FONT_DESC: &str = "\
info face=\"tiny\" size=16
common lineHeight=16 base=13 scaleW=128 scaleH=64 pages=1
char id=32 x=0 y=0 width=0 height=0 xoffset=0 yoffset=0 xadvance=4
char id=65 x=1 y=1 width=6 height=9 xoffset=0 yoffset=4 xadvance=7
char id=66 x=8 y=1 width=6 height=9 xoffset=0 yoffset=4 xadvance=7
char id=86 x=15 y=1 width=6 height=9 xoffset=1 yoffset=4 xadvance=7
kerning first=65 second=86 amount=-2
";

pub const MANIFEST: &str = r#"{
    "a": {"x": 1, "y": 2, "width": 3, "height": 4},
    "panel4": {"x": 0, "y": 16, "width": 16, "height": 16},
    "button2": {"x": 16, "y": 16, "width": 12, "height": 12},
    "icon": {"x": 32, "y": 16, "width": 8, "height": 8}
}"#;

pub fn test_font() -> Arc<Font> {
    Arc::new(Font::parse(FONT_DESC).expect("test font parses"))
}

pub fn test_atlas() -> Arc<Atlas> {
    Arc::new(Atlas::from_manifest(MANIFEST).expect("test manifest parses"))
}

pub fn test_style() -> Style {
    Style::new(test_font(), test_atlas(), "panel4", "button2")
}

/// Records every cue the GUI asks for.
#[derive(Default)]
pub struct RecordingSink {
    pub played: Vec<Cue>,
}

impl AudioSink for RecordingSink {
    fn play(&mut self, cue: Cue) {
        self.played.push(cue);
    }
}
