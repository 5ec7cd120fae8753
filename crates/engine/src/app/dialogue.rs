use super::geometry::{Rect, Vec2};
use super::input::InputSnapshot;
use super::rendering::{Color, DrawList, Space, WHITE};

const BOX_MARGIN_PX: f32 = 50.0;
const BOX_BOTTOM_OFFSET_PX: f32 = 150.0;
const BOX_HEIGHT_PX: f32 = 100.0;
const TEXT_INSET_PX: f32 = 14.0;
const TEXT_SCALE: u32 = 3;
const HINT_SCALE: u32 = 2;
const BOX_COLOR: Color = [50, 50, 50, 235];
const HINT_COLOR: Color = [170, 170, 170, 255];

/// Line-at-a-time narration box along the bottom of the screen. Each
/// advance press moves to the next line; the box disappears after the last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueOverlay {
    lines: Vec<String>,
    index: usize,
}

impl DialogueOverlay {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines, index: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.lines.len()
    }

    pub fn current_line(&self) -> Option<&str> {
        self.lines.get(self.index).map(String::as_str)
    }

    pub fn handle_input(&mut self, input: &InputSnapshot) {
        if input.advance_pressed() && !self.is_finished() {
            self.index += 1;
        }
    }

    pub fn render(&self, frame: &mut DrawList) {
        let Some(line) = self.current_line() else {
            return;
        };
        let viewport = frame.viewport();
        let panel = Rect::new(
            BOX_MARGIN_PX,
            viewport.height as f32 - BOX_BOTTOM_OFFSET_PX,
            viewport.width as f32 - BOX_MARGIN_PX * 2.0,
            BOX_HEIGHT_PX,
        );
        frame.fill_rect(panel, BOX_COLOR, Space::Screen);
        frame.text(
            line,
            Vec2::new(panel.x + TEXT_INSET_PX, panel.y + TEXT_INSET_PX),
            TEXT_SCALE,
            WHITE,
        );
        frame.text(
            "SPACE",
            Vec2::new(panel.right() - 60.0, panel.bottom() - 20.0),
            HINT_SCALE,
            HINT_COLOR,
        );
    }
}
