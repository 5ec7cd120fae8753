mod audio;
mod collision;
mod dialogue;
mod geometry;
mod hub;
mod input;
mod loop_runner;
mod metrics;
mod player;
mod registry;
#[cfg(feature = "audio")]
mod rodio_audio;
mod rendering;
mod scene;
mod scene_stack;
mod trigger;

#[cfg(test)]
pub(crate) mod testing;

pub use audio::{
    resolve_audio_path, sink_or_log, AudioError, AudioEvent, AudioSink, LogAudio, RecordingAudio,
    AUDIO_EXTENSIONS,
};
pub use collision::resolve as resolve_collision;
pub use dialogue::DialogueOverlay;
pub use geometry::{Rect, Vec2};
pub use hub::{HubDef, HubScene, ZoneDef};
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use player::{Facing, Player};
pub use registry::{SceneFactory, SceneRegistry};
#[cfg(feature = "audio")]
pub use rodio_audio::RodioAudio;
pub use rendering::{
    glyph_advance, line_advance, rasterize, screen_to_world, text_width_px, world_to_screen,
    Color, DrawCommand, DrawList, Renderer, Space, SpriteCache, SpriteImage, SpriteLookup,
    Viewport, BLACK, DEFAULT_VIEWPORT, GLYPH_HEIGHT, GLYPH_WIDTH, WHITE,
};
pub use scene::{
    Scene, SceneCommand, SceneContext, SceneError, SceneOutcome, SceneState, INITIAL_SCENE,
};
pub use scene_stack::{SceneStack, StackStatus, MAX_SCENE_DEPTH};
pub use trigger::{TriggerPolicy, TriggerZone};
