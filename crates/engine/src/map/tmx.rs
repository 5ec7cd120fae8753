use roxmltree::{Document, Node};
use tracing::warn;

use super::layout::{
    MapEntity, MapLayout, TilePlacement, Tileset, ENTITIES_LAYER, GROUND_LAYER, WALLS_LAYER,
};
use super::{MapError, SourceLocation};
use crate::app::{Rect, Vec2};
use crate::asset_keys::key_from_file_stem;

/// Tiled stores flip and rotation flags in the top bits of every gid.
const GID_MASK: u32 = 0x0FFF_FFFF;
const TILESET_KEY_PREFIX: &str = "tiles";

struct XmlCtx<'a, 'input> {
    map: &'a str,
    doc: &'a Document<'input>,
}

impl XmlCtx<'_, '_> {
    fn location(&self, node: Node<'_, '_>) -> SourceLocation {
        let pos = self.doc.text_pos_at(node.range().start);
        SourceLocation {
            line: pos.row,
            column: pos.col,
        }
    }

    fn required<'n>(
        &self,
        node: Node<'n, '_>,
        element: &'static str,
        attribute: &'static str,
    ) -> Result<&'n str, MapError> {
        node.attribute(attribute)
            .ok_or_else(|| MapError::MissingAttribute {
                map: self.map.to_string(),
                element,
                attribute,
                location: self.location(node),
            })
    }

    fn invalid(
        &self,
        node: Node<'_, '_>,
        element: &'static str,
        attribute: &'static str,
        value: &str,
    ) -> MapError {
        MapError::InvalidAttribute {
            map: self.map.to_string(),
            element,
            attribute,
            value: value.to_string(),
            location: self.location(node),
        }
    }

    fn required_u32(
        &self,
        node: Node<'_, '_>,
        element: &'static str,
        attribute: &'static str,
    ) -> Result<u32, MapError> {
        let raw = self.required(node, element, attribute)?;
        raw.trim()
            .parse::<u32>()
            .map_err(|_| self.invalid(node, element, attribute, raw))
    }

    fn optional_u32(
        &self,
        node: Node<'_, '_>,
        element: &'static str,
        attribute: &'static str,
    ) -> Result<Option<u32>, MapError> {
        match node.attribute(attribute) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map(Some)
                .map_err(|_| self.invalid(node, element, attribute, raw)),
        }
    }

    fn f32_or(
        &self,
        node: Node<'_, '_>,
        element: &'static str,
        attribute: &'static str,
        default: Option<f32>,
    ) -> Result<f32, MapError> {
        let raw = match (node.attribute(attribute), default) {
            (Some(raw), _) => raw,
            (None, Some(default)) => return Ok(default),
            (None, None) => return Err(self.missing(node, element, attribute)),
        };
        match raw.trim().parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(self.invalid(node, element, attribute, raw)),
        }
    }

    fn missing(
        &self,
        node: Node<'_, '_>,
        element: &'static str,
        attribute: &'static str,
    ) -> MapError {
        MapError::MissingAttribute {
            map: self.map.to_string(),
            element,
            attribute,
            location: self.location(node),
        }
    }
}

fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == tag)
}

fn find_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'static str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    elements(node, tag).find(|child| child.attribute("name") == Some(name))
}

/// Parses a Tiled `.tmx` document. `load_external` receives the `source` of
/// every external tileset and must return the `.tsx` text.
pub fn parse_tmx<F>(map_name: &str, text: &str, mut load_external: F) -> Result<MapLayout, MapError>
where
    F: FnMut(&str) -> Result<String, MapError>,
{
    let doc = Document::parse(text).map_err(|source| MapError::Xml {
        map: map_name.to_string(),
        source,
    })?;
    let ctx = XmlCtx {
        map: map_name,
        doc: &doc,
    };
    let root = doc.root_element();
    if root.tag_name().name() != "map" {
        return Err(MapError::InvalidRoot {
            map: map_name.to_string(),
            expected: "map",
        });
    }

    let width_tiles = ctx.required_u32(root, "map", "width")?;
    let height_tiles = ctx.required_u32(root, "map", "height")?;
    let tile_width = ctx.required_u32(root, "map", "tilewidth")?;
    let tile_height = ctx.required_u32(root, "map", "tileheight")?;

    let mut tilesets = Vec::new();
    for node in elements(root, "tileset") {
        let first_gid = ctx.required_u32(node, "tileset", "firstgid")?;
        let tileset = match node.attribute("source") {
            Some(source) => {
                let external_text = load_external(source)?;
                let external_doc =
                    Document::parse(&external_text).map_err(|err| MapError::Xml {
                        map: format!("{map_name}:{source}"),
                        source: err,
                    })?;
                let external_name = format!("{map_name}:{source}");
                let external_ctx = XmlCtx {
                    map: &external_name,
                    doc: &external_doc,
                };
                let external_root = external_doc.root_element();
                if external_root.tag_name().name() != "tileset" {
                    return Err(MapError::InvalidRoot {
                        map: external_name.clone(),
                        expected: "tileset",
                    });
                }
                parse_tileset(&external_ctx, external_root, first_gid)?
            }
            None => parse_tileset(&ctx, node, first_gid)?,
        };
        tilesets.push(tileset);
    }

    let ground_layer =
        find_named(root, "layer", GROUND_LAYER).ok_or_else(|| MapError::MissingLayer {
            map: map_name.to_string(),
            layer: GROUND_LAYER,
        })?;
    let ground = parse_tile_layer(&ctx, ground_layer, width_tiles, height_tiles)?;

    let walls_group =
        find_named(root, "objectgroup", WALLS_LAYER).ok_or_else(|| MapError::MissingLayer {
            map: map_name.to_string(),
            layer: WALLS_LAYER,
        })?;
    let mut walls = Vec::new();
    for object in elements(walls_group, "object") {
        let rect = parse_object_rect(&ctx, object)?;
        if rect.is_valid() {
            walls.push(rect);
        } else {
            warn!(
                map = map_name,
                line = ctx.location(object).line,
                "wall_object_without_area_skipped"
            );
        }
    }

    let mut entities = Vec::new();
    if let Some(group) = find_named(root, "objectgroup", ENTITIES_LAYER) {
        for object in elements(group, "object") {
            let Some(name) = object.attribute("name") else {
                continue;
            };
            entities.push(MapEntity {
                name: name.to_string(),
                position: Vec2::new(
                    ctx.f32_or(object, "object", "x", None)?,
                    ctx.f32_or(object, "object", "y", None)?,
                ),
            });
        }
    }

    Ok(MapLayout {
        name: map_name.to_string(),
        width_tiles,
        height_tiles,
        tile_width,
        tile_height,
        tilesets,
        ground,
        walls,
        entities,
    })
}

fn parse_tileset(
    ctx: &XmlCtx<'_, '_>,
    node: Node<'_, '_>,
    first_gid: u32,
) -> Result<Tileset, MapError> {
    let tile_width = ctx.required_u32(node, "tileset", "tilewidth")?;
    let tile_height = ctx.required_u32(node, "tileset", "tileheight")?;
    let tile_count = ctx.optional_u32(node, "tileset", "tilecount")?.unwrap_or(0);
    let image = elements(node, "image").next();

    let mut columns = ctx.optional_u32(node, "tileset", "columns")?.unwrap_or(0);
    let mut image_key = None;
    if let Some(image) = image {
        let source = ctx.required(image, "image", "source")?;
        image_key = key_from_file_stem(TILESET_KEY_PREFIX, source);
        if image_key.is_none() {
            warn!(map = ctx.map, source, "tileset_image_name_not_usable_as_key");
        }
        if columns == 0 && tile_width > 0 {
            columns = ctx.optional_u32(image, "image", "width")?.unwrap_or(0) / tile_width;
        }
    }

    Ok(Tileset {
        first_gid,
        tile_count,
        columns,
        tile_width,
        tile_height,
        image_key,
    })
}

fn parse_tile_layer(
    ctx: &XmlCtx<'_, '_>,
    layer: Node<'_, '_>,
    map_width: u32,
    map_height: u32,
) -> Result<Vec<TilePlacement>, MapError> {
    let layer_name = layer.attribute("name").unwrap_or_default().to_string();
    let width = ctx.optional_u32(layer, "layer", "width")?.unwrap_or(map_width);
    let height = ctx.optional_u32(layer, "layer", "height")?.unwrap_or(map_height);
    let data = elements(layer, "data")
        .next()
        .ok_or_else(|| ctx.missing(layer, "layer", "data"))?;

    let gids: Vec<u32> = match data.attribute("encoding") {
        Some("csv") => {
            let text = data.text().unwrap_or_default();
            text.split(',')
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .map(|cell| {
                    cell.parse::<u32>()
                        .map_err(|_| ctx.invalid(data, "data", "csv", cell))
                })
                .collect::<Result<_, _>>()?
        }
        None => elements(data, "tile")
            .map(|tile| ctx.optional_u32(tile, "tile", "gid").map(Option::unwrap_or_default))
            .collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(MapError::UnsupportedEncoding {
                map: ctx.map.to_string(),
                layer: layer_name,
                encoding: other.to_string(),
            })
        }
    };

    let expected = (width as usize) * (height as usize);
    if gids.len() != expected {
        return Err(MapError::TileCountMismatch {
            map: ctx.map.to_string(),
            layer: layer_name,
            expected,
            actual: gids.len(),
        });
    }

    Ok(gids
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let gid = raw & GID_MASK;
            (gid != 0).then(|| TilePlacement {
                column: index as u32 % width.max(1),
                row: index as u32 / width.max(1),
                gid,
            })
        })
        .collect())
}

fn parse_object_rect(ctx: &XmlCtx<'_, '_>, object: Node<'_, '_>) -> Result<Rect, MapError> {
    Ok(Rect::new(
        ctx.f32_or(object, "object", "x", None)?,
        ctx.f32_or(object, "object", "y", None)?,
        ctx.f32_or(object, "object", "width", Some(0.0))?,
        ctx.f32_or(object, "object", "height", Some(0.0))?,
    ))
}
