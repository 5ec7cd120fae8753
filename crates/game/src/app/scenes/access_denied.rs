use engine::app::WHITE;
use engine::{
    DrawList, InputSnapshot, Scene, SceneCommand, SceneContext, SceneError, SceneOutcome,
};
use tracing::debug;

use super::{fit_scale, minigame_shake};
use crate::app::minigame::Shake;

pub(crate) const DENIED_MESSAGE: &str =
    "You are not allowed to enter this room yet. Find another way";
const DENIED_RED: [u8; 4] = [170, 20, 20, 255];
const DISPLAY_SECONDS: f32 = 3.0;
const SHAKE_SECONDS: f32 = 0.5;
const ERROR_SOUND: &str = "error";

/// Blocking red notice shown when the player walks into a locked room.
pub(crate) struct AccessDeniedScene {
    elapsed: f32,
    shake: Shake,
}

impl AccessDeniedScene {
    pub(crate) fn new() -> Self {
        Self::with_shake(minigame_shake())
    }

    pub(crate) fn with_shake(shake: Shake) -> Self {
        Self { elapsed: 0.0, shake }
    }
}

impl Scene for AccessDeniedScene {
    fn name(&self) -> &str {
        "access_denied"
    }

    fn on_enter(&mut self, ctx: &mut SceneContext) {
        ctx.audio().play_sound(ERROR_SOUND);
        self.shake.start(SHAKE_SECONDS);
    }

    fn update(
        &mut self,
        dt_seconds: f32,
        _input: &InputSnapshot,
        _ctx: &mut SceneContext,
    ) -> Result<SceneCommand, SceneError> {
        self.shake.tick(dt_seconds);
        self.elapsed += dt_seconds;
        if self.elapsed >= DISPLAY_SECONDS {
            debug!(elapsed = self.elapsed, "access_denied_dismissed");
            return Ok(SceneCommand::Pop(SceneOutcome::Completed));
        }
        Ok(SceneCommand::None)
    }

    fn render(&self, frame: &mut DrawList) {
        let viewport = frame.viewport();
        frame.clear(DENIED_RED);
        frame.set_screen_offset(self.shake.offset());
        let scale = fit_scale(DENIED_MESSAGE, viewport.width as f32 - 80.0, 4);
        frame.text_centered(
            DENIED_MESSAGE,
            viewport.center().x,
            viewport.center().y,
            scale,
            WHITE,
        );
    }
}
