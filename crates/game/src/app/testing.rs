//! Fixtures shared by the game's scene tests.

use std::rc::Rc;

use engine::app::RecordingAudio;
use engine::map::{InMemoryMapSource, MapEntity, MapLayout, PLAYER_ENTITY};
use engine::{
    DrawList, InputSnapshot, Scene, SceneCommand, SceneContext, SceneError, SceneRegistry, Vec2,
};

use super::catalog::GameCatalog;

pub(crate) fn test_context(registry: SceneRegistry) -> SceneContext {
    test_context_with_audio(registry, Rc::default())
}

pub(crate) fn test_context_with_audio(
    registry: SceneRegistry,
    audio: Rc<RecordingAudio>,
) -> SceneContext {
    SceneContext::new(registry, Rc::new(InMemoryMapSource::default()), audio)
}

pub(crate) fn test_context_with_maps(
    registry: SceneRegistry,
    maps: InMemoryMapSource,
) -> SceneContext {
    SceneContext::new(registry, Rc::new(maps), Rc::new(RecordingAudio::default()))
}

/// Wall-less 40x40 room of 32 px tiles with the spawn at (400, 600).
pub(crate) fn open_room(name: &str) -> MapLayout {
    MapLayout {
        name: name.to_string(),
        width_tiles: 40,
        height_tiles: 40,
        tile_width: 32,
        tile_height: 32,
        entities: vec![MapEntity {
            name: PLAYER_ENTITY.to_string(),
            position: Vec2::new(400.0, 600.0),
        }],
        ..MapLayout::default()
    }
}

const SAMPLE_HUBS: &str = r#"{
    "hubs": [
        {
            "id": "library",
            "map": "library",
            "zones": [
                { "id": "maze", "area": [100, 100, 20, 20], "target": "maze" },
                {
                    "id": "locked",
                    "area": [350, 300, 100, 100],
                    "target": "access_denied",
                    "policy": "reenter_fresh"
                }
            ]
        },
        {
            "id": "maze",
            "map": "maze",
            "zones": [
                { "id": "yellow", "area": [500, 550, 100, 100], "target": "math_olympus" },
                { "id": "green", "area": [100, 100, 100, 100], "target": "credits" },
                { "id": "blue", "area": [700, 100, 100, 100], "target": "map_maestros" },
                { "id": "purple", "area": [900, 900, 100, 100], "target": "sequence_surge" }
            ]
        }
    ]
}"#;

const SAMPLE_QUIZZES: &str = r#"{
    "decks": [
        {
            "id": "math_olympus",
            "title": "MATH OLYMPUS",
            "questions": [
                {
                    "prompt": "If 3x + 2 = 11, what is x?",
                    "options": ["3", "2", "5"],
                    "answer": 0
                },
                {
                    "prompt": "What is the LCM of 12 and 18?",
                    "options": ["24", "36", "72"],
                    "answer": 1
                }
            ]
        },
        {
            "id": "continent_match",
            "title": "MAP MAESTROS",
            "questions": [
                {
                    "prompt": "Kenya is in",
                    "options": ["Asia", "Africa", "Europe", "Oceania"],
                    "answer": 1
                }
            ]
        }
    ]
}"#;

pub(crate) fn sample_catalog() -> GameCatalog {
    GameCatalog::from_json(SAMPLE_HUBS, SAMPLE_QUIZZES).expect("sample catalog")
}

/// Scene that never does anything; stands in for registry targets.
struct IdleScene {
    name: String,
}

impl Scene for IdleScene {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(
        &mut self,
        _dt_seconds: f32,
        _input: &InputSnapshot,
        _ctx: &mut SceneContext,
    ) -> Result<SceneCommand, SceneError> {
        Ok(SceneCommand::None)
    }

    fn render(&self, _frame: &mut DrawList) {}
}

pub(crate) fn idle_scene_registry(ids: &[&str]) -> SceneRegistry {
    let mut registry = SceneRegistry::default();
    for id in ids {
        let name = id.to_string();
        registry
            .register(*id, move |_ctx: &mut SceneContext| {
                Ok(Box::new(IdleScene { name: name.clone() }) as Box<dyn Scene>)
            })
            .expect("register idle scene");
    }
    registry
}

/// Ticks `scene` with empty input until it returns a command. Returns the
/// simulated time including the final tick.
pub(crate) fn run_until_command<S: Scene + ?Sized>(
    scene: &mut S,
    ctx: &mut SceneContext,
    dt_seconds: f32,
    max_ticks: usize,
) -> (f32, SceneCommand) {
    for tick in 0..max_ticks {
        let command = scene
            .update(dt_seconds, &InputSnapshot::empty(), ctx)
            .expect("scene update");
        if !matches!(command, SceneCommand::None) {
            return ((tick + 1) as f32 * dt_seconds, command);
        }
    }
    panic!("{} produced no command within {max_ticks} ticks", scene.name());
}
