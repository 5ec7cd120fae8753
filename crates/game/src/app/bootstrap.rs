use std::rc::Rc;

#[cfg(not(feature = "audio"))]
use engine::app::LogAudio;
use engine::{
    resolve_app_paths, AppPaths, AudioSink, LoopConfig, MapError, MapSource, SceneContext,
    SceneError, StartupError, TmxMapSource,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::catalog::{CatalogError, GameCatalog};
use super::registry::{build_registry, check_hub_targets};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) paths: AppPaths,
    pub(crate) context: SceneContext,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("hub '{hub}' cannot load its map: {source}")]
    HubMap {
        hub: String,
        #[source]
        source: MapError,
    },
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== BrainScape Startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "app_paths_resolved");

    let catalog = GameCatalog::load(&paths.assets_dir)?;
    let maps = TmxMapSource::new(paths.maps_dir.clone());
    preflight_maps(&catalog, &maps)?;

    let registry = build_registry(&catalog)?;
    check_hub_targets(&registry, catalog.hubs())?;
    info!(
        scenes = registry.ids().count(),
        hubs = catalog.hubs().len(),
        quizzes = catalog.quiz_count(),
        "scene_registry_ready"
    );

    let audio = open_audio(&paths);
    let context = SceneContext::new(registry, Rc::new(maps), audio);
    Ok(AppWiring {
        config: LoopConfig::default(),
        paths,
        context,
    })
}

/// Every hub map must parse before the window opens, so a broken map is a
/// startup failure rather than a crash on first entry.
fn preflight_maps(catalog: &GameCatalog, maps: &dyn MapSource) -> Result<(), BootstrapError> {
    for hub in catalog.hubs() {
        let layout = maps.load(&hub.map).map_err(|source| BootstrapError::HubMap {
            hub: hub.id.clone(),
            source,
        })?;
        if layout.spawn_point().is_none() {
            return Err(SceneError::MissingSpawn {
                map: hub.map.clone(),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(feature = "audio")]
fn open_audio(paths: &AppPaths) -> Rc<dyn AudioSink> {
    let opened = engine::app::RodioAudio::open(paths.audio_dir.clone())
        .map(|sink| Rc::new(sink) as Rc<dyn AudioSink>);
    engine::app::sink_or_log(opened)
}

#[cfg(not(feature = "audio"))]
fn open_audio(_paths: &AppPaths) -> Rc<dyn AudioSink> {
    info!("audio_backend_disabled");
    Rc::new(LogAudio)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use engine::map::InMemoryMapSource;

    use super::*;
    use crate::app::testing::{open_room, sample_catalog};

    fn repo_assets() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("assets")
    }

    #[test]
    fn preflight_accepts_maps_with_spawns() {
        let catalog = sample_catalog();
        let maps = InMemoryMapSource::default()
            .with_map(open_room("library"))
            .with_map(open_room("maze"));
        assert!(preflight_maps(&catalog, &maps).is_ok());
    }

    #[test]
    fn preflight_reports_missing_map_by_hub() {
        let catalog = sample_catalog();
        let maps = InMemoryMapSource::default().with_map(open_room("library"));
        let error = preflight_maps(&catalog, &maps).expect_err("maze map is missing");
        assert!(matches!(error, BootstrapError::HubMap { hub, .. } if hub == "maze"));
    }

    #[test]
    fn shipped_assets_pass_startup_checks() {
        let assets = repo_assets();
        let catalog = GameCatalog::load(&assets).expect("catalog");
        let maps = TmxMapSource::new(assets.join("maps"));
        preflight_maps(&catalog, &maps).expect("maps");

        let registry = build_registry(&catalog).expect("registry");
        check_hub_targets(&registry, catalog.hubs()).expect("targets");
    }
}
