use std::fmt;

use serde::Deserialize;
use tracing::info;

use super::geometry::Rect;
use super::registry::SceneFactory;

/// What happens to the hub once a zone's target scene finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// The zone stays disarmed and the hub resumes where it was.
    #[default]
    Consume,
    /// The hub is rebuilt from scratch after the target pops. Used for
    /// locked doors that should keep working.
    ReenterFresh,
}

pub struct TriggerZone {
    id: String,
    area: Rect,
    armed: bool,
    target_id: String,
    target: SceneFactory,
    policy: TriggerPolicy,
}

impl TriggerZone {
    pub fn new(
        id: impl Into<String>,
        area: Rect,
        target_id: impl Into<String>,
        target: SceneFactory,
        policy: TriggerPolicy,
    ) -> Self {
        Self {
            id: id.into(),
            area,
            armed: true,
            target_id: target_id.into(),
            target,
            policy,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn target(&self) -> &SceneFactory {
        &self.target
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.policy
    }

    /// Disarms the zone when `hitbox` overlaps it. Returns true exactly once
    /// per zone.
    pub fn try_fire(&mut self, hitbox: &Rect) -> bool {
        if !self.armed || !self.area.overlaps(hitbox) {
            return false;
        }
        self.armed = false;
        info!(zone = %self.id, target = %self.target_id, policy = ?self.policy, "trigger_fired");
        true
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl fmt::Debug for TriggerZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerZone")
            .field("id", &self.id)
            .field("area", &self.area)
            .field("armed", &self.armed)
            .field("target_id", &self.target_id)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::app::testing::ScriptedScene;
    use crate::app::{Scene, SceneContext};

    fn zone(area: Rect) -> TriggerZone {
        let factory: SceneFactory = Rc::new(|_ctx: &mut SceneContext| {
            Ok(Box::new(ScriptedScene::idle("target")) as Box<dyn Scene>)
        });
        TriggerZone::new("door", area, "target", factory, TriggerPolicy::Consume)
    }

    #[test]
    fn fires_once_while_overlap_persists() {
        let mut zone = zone(Rect::new(200.0, 200.0, 50.0, 50.0));
        let hitbox = Rect::new(210.0, 210.0, 20.0, 20.0);

        assert!(zone.try_fire(&hitbox));
        assert!(!zone.is_armed());
        assert!(!zone.try_fire(&hitbox));
    }

    #[test]
    fn touching_edge_does_not_fire() {
        let mut zone = zone(Rect::new(200.0, 200.0, 50.0, 50.0));
        assert!(!zone.try_fire(&Rect::new(180.0, 200.0, 20.0, 20.0)));
        assert!(zone.is_armed());
    }

    #[test]
    fn policy_parses_from_snake_case() {
        let policy: TriggerPolicy = serde_json::from_str("\"reenter_fresh\"").expect("policy");
        assert_eq!(policy, TriggerPolicy::ReenterFresh);
    }
}
