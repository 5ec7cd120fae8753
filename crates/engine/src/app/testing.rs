//! Scene doubles shared by the engine's unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::audio::RecordingAudio;
use super::geometry::{Rect, Vec2};
use super::input::InputSnapshot;
use super::registry::SceneRegistry;
use super::rendering::{DrawList, Space, WHITE};
use super::scene::{Scene, SceneCommand, SceneContext, SceneError, SceneOutcome};
use crate::map::{InMemoryMapSource, MapEntity, MapLayout, PLAYER_ENTITY};

pub(crate) type Journal = Rc<RefCell<Vec<String>>>;

pub(crate) fn test_context(registry: SceneRegistry) -> SceneContext {
    test_context_with(registry, InMemoryMapSource::default(), Rc::new(RecordingAudio::default()))
}

pub(crate) fn test_context_with(
    registry: SceneRegistry,
    maps: InMemoryMapSource,
    audio: Rc<RecordingAudio>,
) -> SceneContext {
    SceneContext::new(registry, Rc::new(maps), audio)
}

/// A 20x20 tile room of 32 px tiles with a wall ring and the player spawn at
/// (100, 100).
pub(crate) fn walled_room(name: &str) -> MapLayout {
    let size = 20.0 * 32.0;
    MapLayout {
        name: name.to_string(),
        width_tiles: 20,
        height_tiles: 20,
        tile_width: 32,
        tile_height: 32,
        walls: vec![
            Rect::new(0.0, 0.0, size, 32.0),
            Rect::new(0.0, size - 32.0, size, 32.0),
            Rect::new(0.0, 0.0, 32.0, size),
            Rect::new(size - 32.0, 0.0, 32.0, size),
        ],
        entities: vec![MapEntity {
            name: PLAYER_ENTITY.to_string(),
            position: Vec2::new(100.0, 100.0),
        }],
        ..MapLayout::default()
    }
}

/// Replays queued commands one per update, then idles. Every lifecycle call
/// is appended to the journal as `name:event`.
pub(crate) struct ScriptedScene {
    name: String,
    commands: VecDeque<SceneCommand>,
    journal: Journal,
}

impl ScriptedScene {
    pub(crate) fn idle(name: &str) -> Self {
        Self::new(name, Journal::default())
    }

    pub(crate) fn new(name: &str, journal: Journal) -> Self {
        Self {
            name: name.to_string(),
            commands: VecDeque::new(),
            journal,
        }
    }

    pub(crate) fn then(mut self, command: SceneCommand) -> Self {
        self.commands.push_back(command);
        self
    }

    fn log(&self, event: &str) {
        self.journal
            .borrow_mut()
            .push(format!("{}:{event}", self.name));
    }
}

impl Scene for ScriptedScene {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_enter(&mut self, _ctx: &mut SceneContext) {
        self.log("enter");
    }

    fn update(
        &mut self,
        _dt_seconds: f32,
        _input: &InputSnapshot,
        _ctx: &mut SceneContext,
    ) -> Result<SceneCommand, SceneError> {
        self.log("update");
        Ok(self.commands.pop_front().unwrap_or(SceneCommand::None))
    }

    fn on_resume(&mut self, outcome: SceneOutcome, _ctx: &mut SceneContext) {
        self.log(&format!("resume:{outcome:?}"));
    }

    fn render(&self, frame: &mut DrawList) {
        frame.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), WHITE, Space::Screen);
    }

    fn on_exit(&mut self, _ctx: &mut SceneContext) {
        self.log("exit");
    }
}

/// Registers a factory that builds a fresh `ScriptedScene` named `id`
/// sharing `journal`, queued with the commands `script` returns.
pub(crate) fn register_scripted<F>(
    registry: &mut SceneRegistry,
    id: &'static str,
    journal: &Journal,
    script: F,
) where
    F: Fn() -> Vec<SceneCommand> + 'static,
{
    let journal = Rc::clone(journal);
    registry
        .register(id, move |_ctx: &mut SceneContext| {
            let scene = script()
                .into_iter()
                .fold(ScriptedScene::new(id, Rc::clone(&journal)), ScriptedScene::then);
            Ok(Box::new(scene) as Box<dyn Scene>)
        })
        .expect("register scripted scene");
}

pub(crate) fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}
