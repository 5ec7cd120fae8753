use engine::app::{line_advance, WHITE};
use engine::{
    DrawList, InputSnapshot, Scene, SceneCommand, SceneContext, SceneError, SceneOutcome,
};
use tracing::info;

use super::{BACKDROP, HIGHLIGHT};

const SCROLL_SECONDS: f32 = 8.0;
const LINE_SCALE: u32 = 3;
const MUSIC: &str = "credits";

const LINES: &[&str] = &[
    "Congratulations! You have escaped BRAINSCAPE!",
    "",
    "CREDITS",
    "",
    "Library and Maze maps",
    "Player sprite and collisions",
    "",
    "MINIGAMES",
    "Jumble Mania",
    "Sequence Surge",
    "Map Maestros",
    "Maze Trazze",
    "Math Olympus",
    "",
    "Thanks for playing",
];

/// Rolls the credits once; Space skips to the end.
pub(crate) struct CreditsScene {
    elapsed: f32,
}

impl CreditsScene {
    pub(crate) fn new() -> Self {
        Self { elapsed: 0.0 }
    }

    fn progress(&self) -> f32 {
        (self.elapsed / SCROLL_SECONDS).clamp(0.0, 1.0)
    }
}

impl Scene for CreditsScene {
    fn name(&self) -> &str {
        "credits"
    }

    fn on_enter(&mut self, ctx: &mut SceneContext) {
        ctx.audio().play_music(MUSIC, false);
    }

    fn update(
        &mut self,
        dt_seconds: f32,
        input: &InputSnapshot,
        _ctx: &mut SceneContext,
    ) -> Result<SceneCommand, SceneError> {
        self.elapsed += dt_seconds;
        let skipped = input.advance_pressed();
        if skipped || self.elapsed >= SCROLL_SECONDS {
            info!(skipped, "credits_finished");
            return Ok(SceneCommand::Pop(SceneOutcome::Completed));
        }
        Ok(SceneCommand::None)
    }

    fn render(&self, frame: &mut DrawList) {
        let viewport = frame.viewport();
        let step = line_advance(LINE_SCALE) as f32 * 1.5;
        let block_height = LINES.len() as f32 * step;
        // Top of the block travels from the bottom edge to just above the top.
        let travel = viewport.height as f32 + block_height;
        let top = viewport.height as f32 - self.progress() * travel;

        frame.clear(BACKDROP);
        for (index, line) in LINES.iter().enumerate() {
            let color = if line.chars().all(|ch| !ch.is_lowercase()) {
                HIGHLIGHT
            } else {
                WHITE
            };
            frame.text_centered(
                *line,
                viewport.center().x,
                top + index as f32 * step,
                LINE_SCALE,
                color,
            );
        }
    }

    fn on_exit(&mut self, ctx: &mut SceneContext) {
        ctx.audio().stop_music();
    }
}
