use engine::app::WHITE;
use engine::{DrawList, InputSnapshot, Scene, SceneCommand, SceneContext, SceneError};
use tracing::info;

use super::{BACKDROP, HIGHLIGHT};

const STEPS: u32 = 3;
const STEP_SECONDS: f32 = 1.0;

/// "3, 2, 1" intro that hands its slot on the stack to `target`.
pub(crate) struct CountdownScene {
    name: String,
    title: String,
    target: String,
    elapsed: f32,
}

impl CountdownScene {
    pub(crate) fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            target: target.into(),
            elapsed: 0.0,
        }
    }

    fn current_number(&self) -> u32 {
        STEPS.saturating_sub((self.elapsed / STEP_SECONDS) as u32).max(1)
    }
}

impl Scene for CountdownScene {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(
        &mut self,
        dt_seconds: f32,
        _input: &InputSnapshot,
        ctx: &mut SceneContext,
    ) -> Result<SceneCommand, SceneError> {
        self.elapsed += dt_seconds;
        if self.elapsed < STEPS as f32 * STEP_SECONDS {
            return Ok(SceneCommand::None);
        }
        info!(scene = %self.name, target_scene = %self.target, "countdown_finished");
        ctx.build_scene(&self.target).map(SceneCommand::Replace)
    }

    fn render(&self, frame: &mut DrawList) {
        let center = frame.viewport().center();
        frame.clear(BACKDROP);
        frame.text_centered(self.title.as_str(), center.x, center.y - 200.0, 6, WHITE);
        frame.text_centered(
            self.current_number().to_string(),
            center.x,
            center.y - 60.0,
            24,
            HIGHLIGHT,
        );
    }
}
