use super::transform::{Viewport, DEFAULT_VIEWPORT};
use crate::app::{Rect, Vec2};

pub type Color = [u8; 4];

pub const BLACK: Color = [0, 0, 0, 255];
pub const WHITE: Color = [255, 255, 255, 255];

/// Coordinate space of a draw command. World commands are shifted by the
/// camera; screen commands are in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    World,
    Screen,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    FillRect {
        rect: Rect,
        color: Color,
        space: Space,
    },
    OutlineRect {
        rect: Rect,
        color: Color,
        space: Space,
    },
    /// Whole image stretched into `rect`; `fallback` fills it when the
    /// image cannot be loaded.
    Image {
        key: String,
        rect: Rect,
        fallback: Color,
        space: Space,
    },
    /// Sub-rectangle `(x, y, w, h)` of a tileset image, always in world space.
    Tile {
        key: Option<String>,
        source: (u32, u32, u32, u32),
        rect: Rect,
        fallback: Color,
    },
    Text {
        text: String,
        position: Vec2,
        scale: u32,
        color: Color,
    },
}

/// Frame description produced by the active scene.
#[derive(Debug, Clone)]
pub struct DrawList {
    viewport: Viewport,
    camera_center: Vec2,
    screen_offset: Vec2,
    commands: Vec<DrawCommand>,
}

impl Default for DrawList {
    fn default() -> Self {
        Self::for_viewport(DEFAULT_VIEWPORT)
    }
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            viewport,
            camera_center: Vec2::ZERO,
            screen_offset: Vec2::ZERO,
            commands: Vec::new(),
        }
    }

    /// Window size the frame will be rasterized at; screen-space layout
    /// reads it.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Starts a new frame at `viewport`.
    pub fn begin(&mut self, viewport: Viewport) {
        self.reset();
        self.viewport = viewport;
    }

    pub fn reset(&mut self) {
        self.camera_center = Vec2::ZERO;
        self.screen_offset = Vec2::ZERO;
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn camera_center(&self) -> Vec2 {
        self.camera_center
    }

    pub fn set_camera_center(&mut self, center: Vec2) {
        self.camera_center = center;
    }

    pub fn screen_offset(&self) -> Vec2 {
        self.screen_offset
    }

    /// Shifts every command, used for screen shake.
    pub fn set_screen_offset(&mut self, offset: Vec2) {
        self.screen_offset = offset;
    }

    pub fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color, space: Space) {
        self.commands.push(DrawCommand::FillRect { rect, color, space });
    }

    pub fn outline_rect(&mut self, rect: Rect, color: Color, space: Space) {
        self.commands
            .push(DrawCommand::OutlineRect { rect, color, space });
    }

    pub fn image(&mut self, key: impl Into<String>, rect: Rect, fallback: Color, space: Space) {
        self.commands.push(DrawCommand::Image {
            key: key.into(),
            rect,
            fallback,
            space,
        });
    }

    pub fn tile(
        &mut self,
        key: Option<&str>,
        source: (u32, u32, u32, u32),
        rect: Rect,
        fallback: Color,
    ) {
        self.commands.push(DrawCommand::Tile {
            key: key.map(str::to_string),
            source,
            rect,
            fallback,
        });
    }

    pub fn text(&mut self, text: impl Into<String>, position: Vec2, scale: u32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.into(),
            position,
            scale,
            color,
        });
    }

    /// Text horizontally centered on `center_x`.
    pub fn text_centered(
        &mut self,
        text: impl Into<String>,
        center_x: f32,
        y: f32,
        scale: u32,
        color: Color,
    ) {
        let text = text.into();
        let width = super::font::text_width_px(&text, scale) as f32;
        self.text(text, Vec2::new(center_x - width * 0.5, y), scale, color);
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}
