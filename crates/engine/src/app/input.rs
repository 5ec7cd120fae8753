use super::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

const ACTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Per-tick view of the input devices. Held keys are levels; everything
/// named `*_pressed` is a rising edge visible for exactly one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
    confirm_pressed: bool,
    advance_pressed: bool,
    backspace_pressed: bool,
    typed_text: String,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        cursor_position_px: Option<Vec2>,
        left_click_pressed: bool,
        confirm_pressed: bool,
        advance_pressed: bool,
        backspace_pressed: bool,
        typed_text: String,
        window_size: (u32, u32),
    ) -> Self {
        Self {
            quit_requested,
            actions,
            cursor_position_px,
            left_click_pressed,
            confirm_pressed,
            advance_pressed,
            backspace_pressed,
            typed_text,
            window_width: window_size.0,
            window_height: window_size.1,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// Raw movement axes: right minus left, down minus up.
    pub fn movement_axes(&self) -> Vec2 {
        let axis = |positive: InputAction, negative: InputAction| {
            i8::from(self.is_down(positive)) - i8::from(self.is_down(negative))
        };
        Vec2 {
            x: f32::from(axis(InputAction::MoveRight, InputAction::MoveLeft)),
            y: f32::from(axis(InputAction::MoveDown, InputAction::MoveUp)),
        }
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }

    pub fn with_confirm_pressed(mut self, confirm_pressed: bool) -> Self {
        self.confirm_pressed = confirm_pressed;
        self
    }

    pub fn with_advance_pressed(mut self, advance_pressed: bool) -> Self {
        self.advance_pressed = advance_pressed;
        self
    }

    pub fn with_backspace_pressed(mut self, backspace_pressed: bool) -> Self {
        self.backspace_pressed = backspace_pressed;
        self
    }

    pub fn with_typed_text(mut self, typed_text: impl Into<String>) -> Self {
        self.typed_text = typed_text.into();
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    /// Cursor position of a left click issued this tick.
    pub fn clicked_at(&self) -> Option<Vec2> {
        if self.left_click_pressed {
            self.cursor_position_px
        } else {
            None
        }
    }

    pub fn confirm_pressed(&self) -> bool {
        self.confirm_pressed
    }

    pub fn advance_pressed(&self) -> bool {
        self.advance_pressed
    }

    pub fn backspace_pressed(&self) -> bool {
        self.backspace_pressed
    }

    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_axes_cancel_opposing_keys() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveRight, true)
            .with_action_down(InputAction::MoveDown, true);

        assert_eq!(snapshot.movement_axes(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn clicked_at_requires_press_edge() {
        let cursor = Some(Vec2::new(4.0, 9.0));
        let hovering = InputSnapshot::empty().with_cursor_position_px(cursor);
        let clicking = hovering.clone().with_left_click_pressed(true);

        assert_eq!(hovering.clicked_at(), None);
        assert_eq!(clicking.clicked_at(), cursor);
    }
}
