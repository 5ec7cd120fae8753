use engine::app::{Space, Viewport, WHITE};
use engine::{DrawList, InputSnapshot, Rect, Scene, SceneCommand, SceneContext, SceneError};
use tracing::info;

use super::{input_viewport, BACKDROP, HIGHLIGHT, PANEL};

const TITLE: &str = "BRAINSCAPE";
const BUTTON_WIDTH: f32 = 260.0;
const BUTTON_HEIGHT: f32 = 70.0;
const BUTTON_GAP: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuButton {
    Play,
    Exit,
}

impl MenuButton {
    const ALL: [MenuButton; 2] = [MenuButton::Play, MenuButton::Exit];

    fn label(self) -> &'static str {
        match self {
            MenuButton::Play => "PLAY",
            MenuButton::Exit => "EXIT",
        }
    }

    fn rect(self, viewport: Viewport) -> Rect {
        let row = match self {
            MenuButton::Play => 0.0,
            MenuButton::Exit => 1.0,
        };
        let center = viewport.center();
        Rect::new(
            center.x - BUTTON_WIDTH * 0.5,
            center.y + row * (BUTTON_HEIGHT + BUTTON_GAP),
            BUTTON_WIDTH,
            BUTTON_HEIGHT,
        )
    }
}

/// Title screen. Play hands the whole screen to the first hub.
pub(crate) struct MainMenuScene {
    play_target: String,
}

impl MainMenuScene {
    pub(crate) fn new(play_target: impl Into<String>) -> Self {
        Self {
            play_target: play_target.into(),
        }
    }

    fn pressed_button(input: &InputSnapshot) -> Option<MenuButton> {
        if input.confirm_pressed() {
            return Some(MenuButton::Play);
        }
        if input.quit_requested() {
            return Some(MenuButton::Exit);
        }
        let click = input.clicked_at()?;
        let viewport = input_viewport(input);
        MenuButton::ALL
            .into_iter()
            .find(|button| button.rect(viewport).contains_point(click))
    }
}

impl Scene for MainMenuScene {
    fn name(&self) -> &str {
        "main_menu"
    }

    fn update(
        &mut self,
        _dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut SceneContext,
    ) -> Result<SceneCommand, SceneError> {
        match Self::pressed_button(input) {
            Some(MenuButton::Play) => {
                info!(target_scene = %self.play_target, "menu_play");
                ctx.build_scene(&self.play_target).map(SceneCommand::Replace)
            }
            Some(MenuButton::Exit) => {
                info!("menu_exit");
                Ok(SceneCommand::Quit)
            }
            None => Ok(SceneCommand::None),
        }
    }

    fn render(&self, frame: &mut DrawList) {
        let viewport = frame.viewport();
        frame.clear(BACKDROP);
        let title_y = viewport.height as f32 * 0.2;
        frame.text_centered(TITLE, viewport.center().x, title_y, 12, HIGHLIGHT);
        for button in MenuButton::ALL {
            let rect = button.rect(viewport);
            frame.fill_rect(rect, PANEL, Space::Screen);
            frame.outline_rect(rect, WHITE, Space::Screen);
            frame.text_centered(button.label(), rect.center().x, rect.y + 20.0, 6, WHITE);
        }
    }
}
