use crate::app::{Rect, Vec2};

pub const GROUND_LAYER: &str = "Ground";
pub const WALLS_LAYER: &str = "Walls";
pub const ENTITIES_LAYER: &str = "Entities";
pub const PLAYER_ENTITY: &str = "Player";

/// One non-empty cell of the ground layer. `gid` has the flip flags removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    pub column: u32,
    pub row: u32,
    pub gid: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tileset {
    pub first_gid: u32,
    pub tile_count: u32,
    pub columns: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Sprite key of the tileset image, when the tileset has one.
    pub image_key: Option<String>,
}

impl Tileset {
    pub fn contains(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid - self.first_gid < self.tile_count.max(1)
    }

    /// Pixel rectangle of `gid` inside the tileset image.
    pub fn source_rect(&self, gid: u32) -> Option<(u32, u32, u32, u32)> {
        if !self.contains(gid) || self.columns == 0 {
            return None;
        }
        let local = gid - self.first_gid;
        Some((
            (local % self.columns) * self.tile_width,
            (local / self.columns) * self.tile_height,
            self.tile_width,
            self.tile_height,
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntity {
    pub name: String,
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapLayout {
    pub name: String,
    pub width_tiles: u32,
    pub height_tiles: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tilesets: Vec<Tileset>,
    pub ground: Vec<TilePlacement>,
    pub walls: Vec<Rect>,
    pub entities: Vec<MapEntity>,
}

impl MapLayout {
    pub fn spawn_point(&self) -> Option<Vec2> {
        self.entities
            .iter()
            .find(|entity| entity.name == PLAYER_ENTITY)
            .map(|entity| entity.position)
    }

    pub fn tile_rect(&self, tile: &TilePlacement) -> Rect {
        Rect::new(
            (tile.column * self.tile_width) as f32,
            (tile.row * self.tile_height) as f32,
            self.tile_width as f32,
            self.tile_height as f32,
        )
    }

    pub fn tileset_for(&self, gid: u32) -> Option<&Tileset> {
        // Tiled orders tilesets by first_gid; the owner is the last one at or
        // below the gid.
        self.tilesets
            .iter()
            .filter(|tileset| tileset.first_gid <= gid)
            .max_by_key(|tileset| tileset.first_gid)
    }

    pub fn pixel_size(&self) -> (f32, f32) {
        (
            (self.width_tiles * self.tile_width) as f32,
            (self.height_tiles * self.tile_height) as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_with_tilesets() -> MapLayout {
        MapLayout {
            name: "test".to_string(),
            width_tiles: 4,
            height_tiles: 3,
            tile_width: 64,
            tile_height: 64,
            tilesets: vec![
                Tileset {
                    first_gid: 1,
                    tile_count: 6,
                    columns: 3,
                    tile_width: 64,
                    tile_height: 64,
                    image_key: Some("tiles/floor".to_string()),
                },
                Tileset {
                    first_gid: 7,
                    tile_count: 2,
                    columns: 2,
                    tile_width: 64,
                    tile_height: 64,
                    image_key: None,
                },
            ],
            entities: vec![MapEntity {
                name: PLAYER_ENTITY.to_string(),
                position: Vec2::new(96.0, 32.0),
            }],
            ..MapLayout::default()
        }
    }

    #[test]
    fn tileset_lookup_picks_highest_first_gid_not_above() {
        let layout = layout_with_tilesets();
        assert_eq!(layout.tileset_for(6).map(|t| t.first_gid), Some(1));
        assert_eq!(layout.tileset_for(7).map(|t| t.first_gid), Some(7));
        assert!(layout.tileset_for(0).is_none());
    }

    #[test]
    fn source_rect_walks_rows_by_column_count() {
        let layout = layout_with_tilesets();
        let floor = &layout.tilesets[0];
        assert_eq!(floor.source_rect(1), Some((0, 0, 64, 64)));
        assert_eq!(floor.source_rect(5), Some((64, 64, 64, 64)));
        assert_eq!(floor.source_rect(7), None);
    }

    #[test]
    fn spawn_point_and_tile_rect() {
        let layout = layout_with_tilesets();
        assert_eq!(layout.spawn_point(), Some(Vec2::new(96.0, 32.0)));
        let rect = layout.tile_rect(&TilePlacement {
            column: 2,
            row: 1,
            gid: 1,
        });
        assert_eq!(rect, Rect::new(128.0, 64.0, 64.0, 64.0));
        assert_eq!(layout.pixel_size(), (256.0, 192.0));
    }
}
