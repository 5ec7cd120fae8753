use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{debug, info};

use super::dialogue::DialogueOverlay;
use super::geometry::Rect;
use super::input::InputSnapshot;
use super::player::Player;
use super::rendering::{Color, DrawList, Space, BLACK};
use super::scene::{Scene, SceneCommand, SceneContext, SceneError, SceneOutcome};
use super::trigger::{TriggerPolicy, TriggerZone};
use crate::map::MapLayout;

/// Visited-set entry recording that a hub's intro dialogue has been shown.
const INTRO_SEEN_MARKER: &str = "@intro";

const WALL_COLOR: Color = [28, 24, 36, 255];
const FLOOR_COLORS: [Color; 4] = [
    [92, 74, 58, 255],
    [84, 68, 54, 255],
    [78, 88, 70, 255],
    [70, 80, 64, 255],
];
const DEFAULT_ZONE_COLOR: Color = [230, 230, 230, 90];
const PLAYER_FALLBACK_COLOR: Color = [70, 140, 230, 255];

/// One row of a hub's trigger table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneDef {
    pub id: String,
    pub area: Rect,
    pub target: String,
    #[serde(default)]
    pub policy: TriggerPolicy,
    #[serde(default)]
    pub color: Option<Color>,
}

/// Data describing one explorable map and what its zones launch.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubDef {
    pub id: String,
    pub map: String,
    #[serde(default)]
    pub music: Option<String>,
    #[serde(default)]
    pub intro_dialogue: Vec<String>,
    pub zones: Vec<ZoneDef>,
}

/// Generic hub: a player walking a map with a table of trigger zones.
pub struct HubScene {
    id: String,
    layout: MapLayout,
    player: Player,
    zones: Vec<TriggerZone>,
    zone_colors: Vec<Color>,
    music: Option<String>,
    dialogue: Option<DialogueOverlay>,
    pending_reentry: bool,
}

impl HubScene {
    /// Loads the map and resolves every zone target against the registry.
    /// Zones of this hub already consumed in an earlier instance start
    /// disarmed.
    pub fn build(def: &HubDef, ctx: &mut SceneContext) -> Result<Self, SceneError> {
        let layout = ctx.maps().load(&def.map)?;
        let spawn = layout.spawn_point().ok_or_else(|| SceneError::MissingSpawn {
            map: def.map.clone(),
        })?;

        let mut seen = BTreeSet::new();
        let mut zones = Vec::with_capacity(def.zones.len());
        let mut zone_colors = Vec::with_capacity(def.zones.len());
        for zone in &def.zones {
            if !seen.insert(zone.id.as_str()) {
                return Err(SceneError::DuplicateZone {
                    scene: def.id.clone(),
                    zone: zone.id.clone(),
                });
            }
            if !zone.area.is_valid() {
                return Err(SceneError::InvalidZoneArea {
                    scene: def.id.clone(),
                    zone: zone.id.clone(),
                });
            }
            let factory = ctx.resolve_factory(&zone.target).map_err(|_| {
                SceneError::MissingTarget {
                    scene: def.id.clone(),
                    zone: zone.id.clone(),
                    target: zone.target.clone(),
                }
            })?;

            let mut trigger =
                TriggerZone::new(&zone.id, zone.area, &zone.target, factory, zone.policy);
            if zone.policy == TriggerPolicy::Consume && ctx.is_visited(&def.id, &zone.id) {
                debug!(hub = %def.id, zone = %zone.id, "zone_already_visited");
                trigger.disarm();
            }
            zones.push(trigger);
            zone_colors.push(zone.color.unwrap_or(DEFAULT_ZONE_COLOR));
        }

        let dialogue = if def.intro_dialogue.is_empty()
            || ctx.is_visited(&def.id, INTRO_SEEN_MARKER)
        {
            None
        } else {
            ctx.mark_visited(&def.id, INTRO_SEEN_MARKER);
            Some(DialogueOverlay::new(def.intro_dialogue.clone()))
        };

        info!(
            hub = %def.id,
            map = %def.map,
            walls = layout.walls.len(),
            zones = zones.len(),
            armed = zones.iter().filter(|zone| zone.is_armed()).count(),
            "hub_built"
        );

        Ok(Self {
            id: def.id.clone(),
            player: Player::spawn_at(spawn),
            layout,
            zones,
            zone_colors,
            music: def.music.clone(),
            dialogue,
            pending_reentry: false,
        })
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn zones(&self) -> &[TriggerZone] {
        &self.zones
    }

    pub fn armed_zone_ids(&self) -> Vec<&str> {
        self.zones
            .iter()
            .filter(|zone| zone.is_armed())
            .map(TriggerZone::id)
            .collect()
    }

    pub fn dialogue(&self) -> Option<&DialogueOverlay> {
        self.dialogue.as_ref().filter(|dialogue| !dialogue.is_finished())
    }

    pub fn is_reentry_pending(&self) -> bool {
        self.pending_reentry
    }

    fn start_music(&self, ctx: &SceneContext) {
        if let Some(music) = &self.music {
            ctx.audio().play_music(music, true);
        }
    }

    /// First armed zone, in table order, that the player now overlaps.
    fn fire_zone(&mut self, ctx: &mut SceneContext) -> Result<SceneCommand, SceneError> {
        let hitbox = self.player.hitbox();
        let Some(index) = self.zones.iter_mut().position(|zone| zone.try_fire(&hitbox)) else {
            return Ok(SceneCommand::None);
        };
        let zone = &self.zones[index];
        match zone.policy() {
            TriggerPolicy::Consume => ctx.mark_visited(&self.id, zone.id()),
            TriggerPolicy::ReenterFresh => self.pending_reentry = true,
        }
        let target = zone.target().clone();
        let scene = target(ctx)?;
        Ok(SceneCommand::Push(scene))
    }
}

impl Scene for HubScene {
    fn name(&self) -> &str {
        &self.id
    }

    fn on_enter(&mut self, ctx: &mut SceneContext) {
        self.start_music(ctx);
    }

    fn update(
        &mut self,
        dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut SceneContext,
    ) -> Result<SceneCommand, SceneError> {
        if self.pending_reentry {
            self.pending_reentry = false;
            info!(hub = %self.id, "hub_reentered_fresh");
            return ctx.build_scene(&self.id).map(SceneCommand::Replace);
        }

        if let Some(dialogue) = self.dialogue.as_mut() {
            dialogue.handle_input(input);
        }
        self.player.tick(input, dt_seconds, &self.layout.walls);
        self.fire_zone(ctx)
    }

    fn on_resume(&mut self, outcome: SceneOutcome, ctx: &mut SceneContext) {
        debug!(hub = %self.id, ?outcome, armed = ?self.armed_zone_ids(), "hub_resumed");
        self.start_music(ctx);
    }

    fn render(&self, frame: &mut DrawList) {
        frame.clear(BLACK);
        frame.set_camera_center(self.player.hitbox().center());

        for tile in &self.layout.ground {
            let rect = self.layout.tile_rect(tile);
            let fallback = FLOOR_COLORS[(tile.gid as usize) % FLOOR_COLORS.len()];
            let tileset = self.layout.tileset_for(tile.gid);
            let image = tileset
                .and_then(|set| Some((set.image_key.as_deref()?, set.source_rect(tile.gid)?)));
            match image {
                Some((key, source)) => frame.tile(Some(key), source, rect, fallback),
                None => frame.fill_rect(rect, fallback, Space::World),
            }
        }
        for wall in &self.layout.walls {
            frame.fill_rect(*wall, WALL_COLOR, Space::World);
        }
        for (zone, color) in self.zones.iter().zip(&self.zone_colors) {
            if zone.is_armed() {
                frame.fill_rect(zone.area(), *color, Space::World);
            }
        }

        frame.image(
            self.player.facing().sprite_key(),
            self.player.sprite_rect(),
            PLAYER_FALLBACK_COLOR,
            Space::World,
        );

        if let Some(dialogue) = self.dialogue() {
            dialogue.render(frame);
        }
    }

    fn on_exit(&mut self, ctx: &mut SceneContext) {
        if self.music.is_some() {
            ctx.audio().stop_music();
        }
    }
}
