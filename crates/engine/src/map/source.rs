use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use super::layout::MapLayout;
use super::tmx::parse_tmx;
use super::MapError;
use crate::asset_keys::validate_asset_key;

/// Supplies map layouts by name (`library`, `maze`).
pub trait MapSource {
    fn load(&self, name: &str) -> Result<MapLayout, MapError>;
}

/// Reads `{maps_dir}/{name}.tmx` on every call. External tilesets resolve
/// relative to the map file.
#[derive(Debug, Clone)]
pub struct TmxMapSource {
    maps_dir: PathBuf,
}

impl TmxMapSource {
    pub fn new(maps_dir: impl Into<PathBuf>) -> Self {
        Self {
            maps_dir: maps_dir.into(),
        }
    }

    pub fn maps_dir(&self) -> &Path {
        &self.maps_dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, MapError> {
        validate_asset_key(name).map_err(|_| MapError::UnknownMap {
            map: name.to_string(),
        })?;
        Ok(self.maps_dir.join(format!("{name}.tmx")))
    }
}

impl MapSource for TmxMapSource {
    fn load(&self, name: &str) -> Result<MapLayout, MapError> {
        let path = self.path_for(name)?;
        let text = read_map_file(&path, name)?;
        let base_dir = path.parent().unwrap_or(&self.maps_dir).to_path_buf();

        let layout = parse_tmx(name, &text, |source| {
            let tileset_path = base_dir.join(source);
            fs::read_to_string(&tileset_path).map_err(|source| MapError::Read {
                path: tileset_path.clone(),
                source,
            })
        })?;

        info!(
            map = name,
            path = %path.display(),
            tiles = layout.ground.len(),
            walls = layout.walls.len(),
            entities = layout.entities.len(),
            "map_loaded"
        );
        Ok(layout)
    }
}

fn read_map_file(path: &Path, name: &str) -> Result<String, MapError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            MapError::UnknownMap {
                map: name.to_string(),
            }
        } else {
            MapError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryMapSource {
    maps: BTreeMap<String, MapLayout>,
}

impl InMemoryMapSource {
    pub fn with_map(mut self, layout: MapLayout) -> Self {
        self.insert(layout);
        self
    }

    pub fn insert(&mut self, layout: MapLayout) {
        self.maps.insert(layout.name.clone(), layout);
    }
}

impl MapSource for InMemoryMapSource {
    fn load(&self, name: &str) -> Result<MapLayout, MapError> {
        self.maps
            .get(name)
            .cloned()
            .ok_or_else(|| MapError::UnknownMap {
                map: name.to_string(),
            })
    }
}
