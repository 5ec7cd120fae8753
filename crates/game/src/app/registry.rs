use engine::{HubDef, HubScene, Scene, SceneContext, SceneError, SceneRegistry};

use super::catalog::GameCatalog;
use super::scenes::{
    AccessDeniedScene, CountdownScene, CreditsScene, MainMenuScene, QuizScene, SequenceScene,
};

pub(crate) const MAIN_MENU: &str = "main_menu";
pub(crate) const LIBRARY: &str = "library";
pub(crate) const ACCESS_DENIED: &str = "access_denied";
pub(crate) const CREDITS: &str = "credits";
pub(crate) const MAP_MAESTROS: &str = "map_maestros";
pub(crate) const CONTINENT_MATCH: &str = "continent_match";
pub(crate) const SEQUENCE_SURGE: &str = "sequence_surge";

type BoxedScene = Result<Box<dyn Scene>, SceneError>;

/// Every scene id the game can reach. Hubs and quizzes come from the
/// catalog; the rest are fixed. Catalog ids that collide with a fixed scene
/// fail here.
pub(crate) fn build_registry(catalog: &GameCatalog) -> Result<SceneRegistry, SceneError> {
    let mut registry = SceneRegistry::default();

    registry.register(MAIN_MENU, |_ctx: &mut SceneContext| -> BoxedScene {
        Ok(Box::new(MainMenuScene::new(LIBRARY)))
    })?;
    registry.register(ACCESS_DENIED, |_ctx: &mut SceneContext| -> BoxedScene {
        Ok(Box::new(AccessDeniedScene::new()))
    })?;
    registry.register(CREDITS, |_ctx: &mut SceneContext| -> BoxedScene {
        Ok(Box::new(CreditsScene::new()))
    })?;
    registry.register(MAP_MAESTROS, |_ctx: &mut SceneContext| -> BoxedScene {
        Ok(Box::new(CountdownScene::new(
            MAP_MAESTROS,
            "MAP MAESTROS",
            CONTINENT_MATCH,
        )))
    })?;
    registry.register(SEQUENCE_SURGE, |_ctx: &mut SceneContext| -> BoxedScene {
        Ok(Box::new(SequenceScene::new()))
    })?;

    for hub in catalog.hubs() {
        let def = hub.clone();
        registry.register(hub.id.clone(), move |ctx: &mut SceneContext| -> BoxedScene {
            Ok(Box::new(HubScene::build(&def, ctx)?))
        })?;
    }
    for deck in catalog.quizzes() {
        let deck = deck.clone();
        registry.register(deck.id.clone(), move |_ctx: &mut SceneContext| -> BoxedScene {
            Ok(Box::new(QuizScene::new(&deck)))
        })?;
    }

    Ok(registry)
}

/// Fails on the first hub zone whose target has no registered scene.
pub(crate) fn check_hub_targets(
    registry: &SceneRegistry,
    hubs: &[HubDef],
) -> Result<(), SceneError> {
    for hub in hubs {
        if let Some(zone) = hub.zones.iter().find(|zone| !registry.contains(&zone.target)) {
            return Err(SceneError::MissingTarget {
                scene: hub.id.clone(),
                zone: zone.id.clone(),
                target: zone.target.clone(),
            });
        }
    }
    Ok(())
}
