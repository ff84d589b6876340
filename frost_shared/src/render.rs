//! Rendering abstraction.
//!
//! This crate intentionally does not depend on a graphics backend.
//! [`Canvas`] is the 2-D immediate-mode surface a renderer draws into;
//! a browser build would forward it to a `CanvasRenderingContext2d`.

use serde::{Deserialize, Serialize};

use crate::color::{PlayerColor, Rgba};
use crate::math::{Rect, Vec2};
use crate::net::{GiftKind, MonsterKind, TreeSize};

/// Art the renderer may blit. Missing art falls back to primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpriteKey {
    Player(PlayerColor),
    Monster(MonsterKind),
    Tree(TreeSize),
    Flag,
    Gift(GiftKind),
    Snowball,
    BigSnowball,
    Fireball,
    LightOrb,
}

impl SpriteKey {
    /// Relative asset path, as the host would fetch it.
    pub fn path(&self) -> String {
        match self {
            SpriteKey::Player(color) => format!("sprites/players/{}.png", color.as_str()),
            SpriteKey::Monster(kind) => format!("sprites/monsters/{kind:?}.png").to_lowercase(),
            SpriteKey::Tree(size) => format!("sprites/trees/{size:?}.png").to_lowercase(),
            SpriteKey::Flag => "sprites/flag.png".to_string(),
            SpriteKey::Gift(kind) => format!("sprites/gifts/{kind:?}.png").to_lowercase(),
            SpriteKey::Snowball => "sprites/snowball.png".to_string(),
            SpriteKey::BigSnowball => "sprites/big_snowball.png".to_string(),
            SpriteKey::Fireball => "sprites/fireball.png".to_string(),
            SpriteKey::LightOrb => "sprites/light.png".to_string(),
        }
    }
}

/// A minimal 2-D drawing API.
///
/// Transform calls compose like a canvas context: `save`/`restore` bracket
/// any `translate`/`scale`/`rotate`/`set_alpha` changes.
pub trait Canvas {
    fn begin_frame(&mut self, width: f64, height: f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn scale(&mut self, sx: f64, sy: f64);
    fn rotate(&mut self, radians: f64);
    fn set_alpha(&mut self, alpha: f64);
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn stroke_rect(&mut self, rect: Rect, color: Rgba, line_width: f64);
    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Rgba);
    fn stroke_circle(&mut self, center: Vec2, radius: f64, color: Rgba, line_width: f64);
    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba, line_width: f64);
    fn text(&mut self, text: &str, at: Vec2, size: f64, color: Rgba);
    fn sprite(&mut self, key: SpriteKey, dest: Rect);
    fn end_frame(&mut self);
}

/// A no-op canvas useful for headless runs.
#[derive(Default)]
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn begin_frame(&mut self, _width: f64, _height: f64) {}
    fn save(&mut self) {}
    fn restore(&mut self) {}
    fn translate(&mut self, _x: f64, _y: f64) {}
    fn scale(&mut self, _sx: f64, _sy: f64) {}
    fn rotate(&mut self, _radians: f64) {}
    fn set_alpha(&mut self, _alpha: f64) {}
    fn fill_rect(&mut self, _rect: Rect, _color: Rgba) {}
    fn stroke_rect(&mut self, _rect: Rect, _color: Rgba, _line_width: f64) {}
    fn fill_circle(&mut self, _center: Vec2, _radius: f64, _color: Rgba) {}
    fn stroke_circle(&mut self, _center: Vec2, _radius: f64, _color: Rgba, _line_width: f64) {}
    fn line(&mut self, _from: Vec2, _to: Vec2, _color: Rgba, _line_width: f64) {}
    fn text(&mut self, _text: &str, _at: Vec2, _size: f64, _color: Rgba) {}
    fn sprite(&mut self, _key: SpriteKey, _dest: Rect) {}
    fn end_frame(&mut self) {}
}

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    BeginFrame { width: f64, height: f64 },
    Save,
    Restore,
    Translate { x: f64, y: f64 },
    Scale { sx: f64, sy: f64 },
    Rotate { radians: f64 },
    Alpha { alpha: f64 },
    FillRect { rect: Rect, color: Rgba },
    StrokeRect { rect: Rect, color: Rgba, line_width: f64 },
    FillCircle { center: Vec2, radius: f64, color: Rgba },
    StrokeCircle { center: Vec2, radius: f64, color: Rgba, line_width: f64 },
    Line { from: Vec2, to: Vec2, color: Rgba, line_width: f64 },
    Text { text: String, at: Vec2, size: f64, color: Rgba },
    Sprite { key: SpriteKey, dest: Rect },
    EndFrame,
}

/// Canvas that records every call; two frames are pixel-identical iff
/// their command lists are equal.
#[derive(Debug, Default, Clone)]
pub struct RecordingCanvas {
    commands: Vec<DrawCmd>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the canvas empty.
    pub fn take(&mut self) -> Vec<DrawCmd> {
        std::mem::take(&mut self.commands)
    }

    pub fn count(&self, pred: impl Fn(&DrawCmd) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// Save/restore pairs balance and the frame is bracketed.
    pub fn is_well_formed(&self) -> bool {
        let mut depth: i64 = 0;
        for cmd in &self.commands {
            match cmd {
                DrawCmd::Save => depth += 1,
                DrawCmd::Restore => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
            && matches!(self.commands.first(), Some(DrawCmd::BeginFrame { .. }))
            && matches!(self.commands.last(), Some(DrawCmd::EndFrame))
    }

    fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }
}

impl Canvas for RecordingCanvas {
    fn begin_frame(&mut self, width: f64, height: f64) {
        self.commands.clear();
        self.push(DrawCmd::BeginFrame { width, height });
    }

    fn save(&mut self) {
        self.push(DrawCmd::Save);
    }

    fn restore(&mut self) {
        self.push(DrawCmd::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.push(DrawCmd::Translate { x, y });
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.push(DrawCmd::Scale { sx, sy });
    }

    fn rotate(&mut self, radians: f64) {
        self.push(DrawCmd::Rotate { radians });
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.push(DrawCmd::Alpha { alpha });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.push(DrawCmd::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, line_width: f64) {
        self.push(DrawCmd::StrokeRect {
            rect,
            color,
            line_width,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Rgba) {
        self.push(DrawCmd::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f64, color: Rgba, line_width: f64) {
        self.push(DrawCmd::StrokeCircle {
            center,
            radius,
            color,
            line_width,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba, line_width: f64) {
        self.push(DrawCmd::Line {
            from,
            to,
            color,
            line_width,
        });
    }

    fn text(&mut self, text: &str, at: Vec2, size: f64, color: Rgba) {
        self.push(DrawCmd::Text {
            text: text.to_string(),
            at,
            size,
            color,
        });
    }

    fn sprite(&mut self, key: SpriteKey, dest: Rect) {
        self.push(DrawCmd::Sprite { key, dest });
    }

    fn end_frame(&mut self) {
        self.push(DrawCmd::EndFrame);
    }
}
