use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use super::audio::AudioSink;
use super::input::InputSnapshot;
use super::registry::{SceneFactory, SceneRegistry};
use super::rendering::DrawList;
use crate::map::{MapError, MapSource};

pub const INITIAL_SCENE: &str = "main_menu";

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene '{scene}' zone '{zone}' targets unregistered scene '{target}'")]
    MissingTarget {
        scene: String,
        zone: String,
        target: String,
    },
    #[error("scene id '{id}' is registered more than once")]
    DuplicateScene { id: String },
    #[error("no scene factory registered for '{id}'")]
    UnknownScene { id: String },
    #[error("scene '{scene}' declares zone '{zone}' more than once")]
    DuplicateZone { scene: String, zone: String },
    #[error("scene '{scene}' zone '{zone}' has a non-positive or non-finite area")]
    InvalidZoneArea { scene: String, zone: String },
    #[error("map '{map}' has no Player entity to spawn from")]
    MissingSpawn { map: String },
    #[error("scene '{scene}' is missing content '{key}'")]
    MissingContent { scene: String, key: String },
    #[error("scene nesting exceeded {max} levels while pushing '{scene}'")]
    NestingTooDeep { scene: String, max: usize },
    #[error(transparent)]
    Map(#[from] MapError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneOutcome {
    Completed,
    Won { score: u32 },
    Lost { score: u32 },
}

pub enum SceneCommand {
    None,
    /// Suspend the current scene and run `scene` on top of it.
    Push(Box<dyn Scene>),
    /// Swap the current scene for `scene`; the scene below is unaffected.
    Replace(Box<dyn Scene>),
    /// Finish the current scene and resume the one below with `outcome`.
    Pop(SceneOutcome),
    Quit,
}

impl fmt::Debug for SceneCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneCommand::None => f.write_str("None"),
            SceneCommand::Push(scene) => write!(f, "Push({})", scene.name()),
            SceneCommand::Replace(scene) => write!(f, "Replace({})", scene.name()),
            SceneCommand::Pop(outcome) => write!(f, "Pop({outcome:?})"),
            SceneCommand::Quit => f.write_str("Quit"),
        }
    }
}

pub trait Scene {
    fn name(&self) -> &str;
    fn on_enter(&mut self, _ctx: &mut SceneContext) {}
    fn update(
        &mut self,
        dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut SceneContext,
    ) -> Result<SceneCommand, SceneError>;
    /// Called when a scene pushed by this one has popped.
    fn on_resume(&mut self, _outcome: SceneOutcome, _ctx: &mut SceneContext) {}
    fn render(&self, frame: &mut DrawList);
    fn on_exit(&mut self, _ctx: &mut SceneContext) {}
}

/// Name of the scene that currently owns the screen. Observational only:
/// scenes write it on hand-off, the loop reads it for titles and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneState {
    active: String,
}

impl SceneState {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            active: initial.into(),
        }
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn set(&mut self, next: impl Into<String>) {
        let next = next.into();
        if next != self.active {
            debug!(from = %self.active, to = %next, "scene_state_changed");
            self.active = next;
        }
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(INITIAL_SCENE)
    }
}

/// Everything scenes share, passed by reference into every callback.
pub struct SceneContext {
    scene_state: SceneState,
    running: bool,
    visited: BTreeSet<String>,
    registry: Rc<SceneRegistry>,
    maps: Rc<dyn MapSource>,
    audio: Rc<dyn AudioSink>,
}

impl SceneContext {
    pub fn new(
        registry: SceneRegistry,
        maps: Rc<dyn MapSource>,
        audio: Rc<dyn AudioSink>,
    ) -> Self {
        Self {
            scene_state: SceneState::default(),
            running: true,
            visited: BTreeSet::new(),
            registry: Rc::new(registry),
            maps,
            audio,
        }
    }

    pub fn scene_state(&self) -> &SceneState {
        &self.scene_state
    }

    pub fn scene_state_mut(&mut self) -> &mut SceneState {
        &mut self.scene_state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        if self.running {
            debug!(scene = %self.scene_state.active(), "quit_flag_raised");
        }
        self.running = false;
    }

    pub fn mark_visited(&mut self, hub: &str, zone: &str) {
        self.visited.insert(visited_key(hub, zone));
    }

    pub fn is_visited(&self, hub: &str, zone: &str) -> bool {
        self.visited.contains(&visited_key(hub, zone))
    }

    pub fn visited(&self) -> impl Iterator<Item = &str> {
        self.visited.iter().map(String::as_str)
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn resolve_factory(&self, id: &str) -> Result<SceneFactory, SceneError> {
        self.registry.factory(id)
    }

    pub fn build_scene(&mut self, id: &str) -> Result<Box<dyn Scene>, SceneError> {
        let factory = self.resolve_factory(id)?;
        factory(self)
    }

    pub fn maps(&self) -> &dyn MapSource {
        self.maps.as_ref()
    }

    pub fn audio(&self) -> &dyn AudioSink {
        self.audio.as_ref()
    }
}

fn visited_key(hub: &str, zone: &str) -> String {
    format!("{hub}/{zone}")
}
