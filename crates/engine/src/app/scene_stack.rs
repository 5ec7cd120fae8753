use tracing::{debug, info};

use super::input::InputSnapshot;
use super::rendering::DrawList;
use super::scene::{Scene, SceneCommand, SceneContext, SceneError, SceneOutcome};

/// Upper bound on nested scenes. The deepest real chain is
/// menu-replaced hub, maze, mini-game, modal.
pub const MAX_SCENE_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackStatus {
    /// The top scene kept running.
    Unchanged,
    /// The top scene changed; callers should stop simulating this frame.
    Transitioned,
    /// Every scene has exited.
    Finished,
}

/// Call/return scene nesting. Only the top scene updates and renders; the
/// scenes below are suspended with their state intact.
#[derive(Default)]
pub struct SceneStack {
    scenes: Vec<Box<dyn Scene>>,
}

impl SceneStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn top_name(&self) -> Option<&str> {
        self.scenes.last().map(|scene| scene.name())
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenes.iter().map(|scene| scene.name()).collect()
    }

    /// Enters the root scene.
    pub fn start(
        &mut self,
        scene: Box<dyn Scene>,
        ctx: &mut SceneContext,
    ) -> Result<(), SceneError> {
        self.push(scene, ctx)
    }

    /// Runs one update of the top scene and applies the command it returns.
    pub fn update(
        &mut self,
        dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut SceneContext,
    ) -> Result<StackStatus, SceneError> {
        let Some(top) = self.scenes.last_mut() else {
            return Ok(StackStatus::Finished);
        };
        let command = top.update(dt_seconds, input, ctx)?;
        let status = self.apply(command, ctx)?;
        if !ctx.is_running() {
            self.unwind(ctx);
            return Ok(StackStatus::Finished);
        }
        Ok(status)
    }

    pub fn render(&self, frame: &mut DrawList) {
        if let Some(top) = self.scenes.last() {
            top.render(frame);
        }
    }

    /// Raises the quit flag and exits every scene top-down. Suspended scenes
    /// are never resumed.
    pub fn shutdown(&mut self, ctx: &mut SceneContext) {
        ctx.request_quit();
        self.unwind(ctx);
    }

    fn apply(
        &mut self,
        command: SceneCommand,
        ctx: &mut SceneContext,
    ) -> Result<StackStatus, SceneError> {
        match command {
            SceneCommand::None => Ok(StackStatus::Unchanged),
            SceneCommand::Push(scene) => {
                self.push(scene, ctx)?;
                Ok(StackStatus::Transitioned)
            }
            SceneCommand::Replace(scene) => {
                if let Some(mut finished) = self.scenes.pop() {
                    info!(from = finished.name(), to = scene.name(), "scene_replaced");
                    finished.on_exit(ctx);
                }
                self.push(scene, ctx)?;
                Ok(StackStatus::Transitioned)
            }
            SceneCommand::Pop(outcome) => Ok(self.pop(outcome, ctx)),
            SceneCommand::Quit => {
                info!(
                    scene = self.top_name().unwrap_or_default(),
                    depth = self.depth(),
                    "scene_quit_requested"
                );
                self.shutdown(ctx);
                Ok(StackStatus::Finished)
            }
        }
    }

    fn push(
        &mut self,
        mut scene: Box<dyn Scene>,
        ctx: &mut SceneContext,
    ) -> Result<(), SceneError> {
        if self.scenes.len() >= MAX_SCENE_DEPTH {
            return Err(SceneError::NestingTooDeep {
                scene: scene.name().to_string(),
                max: MAX_SCENE_DEPTH,
            });
        }
        info!(
            scene = scene.name(),
            parent = self.top_name().unwrap_or("<root>"),
            depth = self.scenes.len() + 1,
            "scene_pushed"
        );
        ctx.scene_state_mut().set(scene.name());
        scene.on_enter(ctx);
        self.scenes.push(scene);
        Ok(())
    }

    fn pop(&mut self, outcome: SceneOutcome, ctx: &mut SceneContext) -> StackStatus {
        let Some(mut finished) = self.scenes.pop() else {
            return StackStatus::Finished;
        };
        finished.on_exit(ctx);
        info!(scene = finished.name(), ?outcome, depth = self.scenes.len(), "scene_popped");

        match self.scenes.last_mut() {
            Some(resumed) => {
                ctx.scene_state_mut().set(resumed.name());
                resumed.on_resume(outcome, ctx);
                StackStatus::Transitioned
            }
            None => {
                ctx.request_quit();
                StackStatus::Finished
            }
        }
    }

    fn unwind(&mut self, ctx: &mut SceneContext) {
        while let Some(mut scene) = self.scenes.pop() {
            debug!(scene = scene.name(), "scene_unwound");
            scene.on_exit(ctx);
        }
    }
}
