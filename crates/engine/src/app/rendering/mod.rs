mod draw_list;
mod font;
mod rasterizer;
mod renderer;
mod transform;

pub use draw_list::{Color, DrawCommand, DrawList, Space, BLACK, WHITE};
pub use font::{glyph_advance, line_advance, text_width_px, GLYPH_HEIGHT, GLYPH_WIDTH};
pub use rasterizer::{rasterize, SpriteImage, SpriteLookup};
pub use renderer::{Renderer, SpriteCache};
pub use transform::{screen_to_world, world_to_screen, Viewport, DEFAULT_VIEWPORT};
