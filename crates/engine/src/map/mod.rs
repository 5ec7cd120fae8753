mod layout;
mod source;
mod tmx;

use std::path::PathBuf;

use thiserror::Error;

pub use layout::{
    MapEntity, MapLayout, TilePlacement, Tileset, ENTITIES_LAYER, GROUND_LAYER, PLAYER_ENTITY,
    WALLS_LAYER,
};
pub use source::{InMemoryMapSource, MapSource, TmxMapSource};
pub use tmx::parse_tmx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("no map named '{map}' is available")]
    UnknownMap { map: String },
    #[error("failed to read map file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("map '{map}' is not well-formed XML: {source}")]
    Xml {
        map: String,
        #[source]
        source: roxmltree::Error,
    },
    #[error("map '{map}' root element must be <{expected}>")]
    InvalidRoot { map: String, expected: &'static str },
    #[error(
        "map '{map}' <{element}> is missing attribute '{attribute}' (line {}, column {})",
        location.line,
        location.column
    )]
    MissingAttribute {
        map: String,
        element: &'static str,
        attribute: &'static str,
        location: SourceLocation,
    },
    #[error(
        "map '{map}' <{element}> attribute '{attribute}' has invalid value '{value}' \
         (line {}, column {})",
        location.line,
        location.column
    )]
    InvalidAttribute {
        map: String,
        element: &'static str,
        attribute: &'static str,
        value: String,
        location: SourceLocation,
    },
    #[error("map '{map}' has no layer named '{layer}'")]
    MissingLayer { map: String, layer: &'static str },
    #[error("map '{map}' layer '{layer}' uses unsupported encoding '{encoding}'; save it as CSV")]
    UnsupportedEncoding {
        map: String,
        layer: String,
        encoding: String,
    },
    #[error("map '{map}' layer '{layer}' tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch {
        map: String,
        layer: String,
        expected: usize,
        actual: usize,
    },
}
