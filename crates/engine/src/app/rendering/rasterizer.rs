use std::collections::HashMap;

use super::draw_list::{Color, DrawCommand, DrawList, Space};
use super::font::draw_text;
use super::transform::{world_to_screen, Viewport};
use crate::app::{Rect, Vec2};

const OUTLINE_THICKNESS_PX: i32 = 2;

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl SpriteImage {
    fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba.len() >= self.width as usize * self.height as usize * 4
    }
}

pub trait SpriteLookup {
    fn sprite(&mut self, key: &str) -> Option<&SpriteImage>;
}

/// Lookup over preloaded images; used headless and in tests.
impl SpriteLookup for HashMap<String, SpriteImage> {
    fn sprite(&mut self, key: &str) -> Option<&SpriteImage> {
        self.get(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenRect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

/// Writes `list` into an RGBA8 frame of `width * height` pixels.
pub fn rasterize(
    frame: &mut [u8],
    width: u32,
    height: u32,
    list: &DrawList,
    sprites: &mut dyn SpriteLookup,
) {
    if width == 0 || height == 0 {
        return;
    }
    let viewport = Viewport { width, height };
    let camera = list.camera_center();
    let offset = list.screen_offset();
    let project = |rect: &Rect, space: Space| -> ScreenRect {
        let origin = match space {
            Space::World => world_to_screen(Vec2::new(rect.x, rect.y), camera, viewport),
            Space::Screen => Vec2::new(rect.x, rect.y),
        };
        ScreenRect {
            x: (origin.x + offset.x).round() as i32,
            y: (origin.y + offset.y).round() as i32,
            width: rect.width.round() as i32,
            height: rect.height.round() as i32,
        }
    };

    for command in list.commands() {
        match command {
            DrawCommand::Clear(color) => {
                for pixel in frame.chunks_exact_mut(4) {
                    pixel.copy_from_slice(color);
                }
            }
            DrawCommand::FillRect { rect, color, space } => {
                let r = project(rect, *space);
                fill_rect_clipped(frame, width, height, r.x, r.y, r.width, r.height, *color);
            }
            DrawCommand::OutlineRect { rect, color, space } => {
                let r = project(rect, *space);
                draw_outline(frame, width, height, r, *color);
            }
            DrawCommand::Image {
                key,
                rect,
                fallback,
                space,
            } => {
                let r = project(rect, *space);
                if !intersects_frame(r, width, height) {
                    continue;
                }
                match sprites.sprite(key) {
                    Some(sprite) if sprite.is_consistent() => {
                        let source = (0, 0, sprite.width, sprite.height);
                        blit_scaled(frame, width, height, r, sprite, source);
                    }
                    _ => fill_rect_clipped(
                        frame, width, height, r.x, r.y, r.width, r.height, *fallback,
                    ),
                }
            }
            DrawCommand::Tile {
                key,
                source,
                rect,
                fallback,
            } => {
                let r = project(rect, Space::World);
                if !intersects_frame(r, width, height) {
                    continue;
                }
                let sprite = key.as_deref().and_then(|key| sprites.sprite(key));
                match sprite {
                    Some(sprite) if sprite.is_consistent() && source_fits(sprite, *source) => {
                        blit_scaled(frame, width, height, r, sprite, *source);
                    }
                    _ => fill_rect_clipped(
                        frame, width, height, r.x, r.y, r.width, r.height, *fallback,
                    ),
                }
            }
            DrawCommand::Text {
                text,
                position,
                scale,
                color,
            } => {
                let origin = (
                    (position.x + offset.x).round() as i32,
                    (position.y + offset.y).round() as i32,
                );
                draw_text(frame, width, height, origin, text, *scale, *color);
            }
        }
    }
}

fn intersects_frame(rect: ScreenRect, width: u32, height: u32) -> bool {
    rect.width > 0
        && rect.height > 0
        && rect.x < width as i32
        && rect.y < height as i32
        && rect.x + rect.width > 0
        && rect.y + rect.height > 0
}

fn source_fits(sprite: &SpriteImage, (x, y, w, h): (u32, u32, u32, u32)) -> bool {
    w > 0 && h > 0 && x + w <= sprite.width && y + h <= sprite.height
}

fn draw_outline(frame: &mut [u8], width: u32, height: u32, r: ScreenRect, color: Color) {
    let t = OUTLINE_THICKNESS_PX.min(r.width).min(r.height);
    if t <= 0 {
        return;
    }
    fill_rect_clipped(frame, width, height, r.x, r.y, r.width, t, color);
    fill_rect_clipped(frame, width, height, r.x, r.y + r.height - t, r.width, t, color);
    fill_rect_clipped(frame, width, height, r.x, r.y, t, r.height, color);
    fill_rect_clipped(frame, width, height, r.x + r.width - t, r.y, t, r.height, color);
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn fill_rect_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: Color,
) {
    let start_x = x.max(0);
    let start_y = y.max(0);
    let end_x = x.saturating_add(rect_width).min(width as i32);
    let end_y = y.saturating_add(rect_height).min(height as i32);
    if end_x <= start_x || end_y <= start_y {
        return;
    }
    for py in start_y..end_y {
        for px in start_x..end_x {
            write_pixel(frame, width as usize, px as usize, py as usize, color);
        }
    }
}

fn blit_scaled(
    frame: &mut [u8],
    width: u32,
    height: u32,
    dest: ScreenRect,
    sprite: &SpriteImage,
    (src_x, src_y, src_w, src_h): (u32, u32, u32, u32),
) {
    let draw_left = dest.x.max(0);
    let draw_top = dest.y.max(0);
    let draw_right = (dest.x + dest.width).min(width as i32);
    let draw_bottom = (dest.y + dest.height).min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }
    let scale_x = src_w as f32 / dest.width as f32;
    let scale_y = src_h as f32 / dest.height as f32;
    let sprite_width = sprite.width as usize;

    for out_y in draw_top..draw_bottom {
        let local_y = (((out_y - dest.y) as f32) * scale_y).floor() as u32;
        let sy = (src_y + local_y.min(src_h - 1)) as usize;
        for out_x in draw_left..draw_right {
            let local_x = (((out_x - dest.x) as f32) * scale_x).floor() as u32;
            let sx = (src_x + local_x.min(src_w - 1)) as usize;
            let offset = (sy * sprite_width + sx) * 4;
            let texel = [
                sprite.rgba[offset],
                sprite.rgba[offset + 1],
                sprite.rgba[offset + 2],
                sprite.rgba[offset + 3],
            ];
            write_pixel(frame, width as usize, out_x as usize, out_y as usize, texel);
        }
    }
}

/// Alpha-blends `color` over the existing pixel; fully transparent colors
/// leave the frame untouched.
fn write_pixel(frame: &mut [u8], width: usize, x: usize, y: usize, color: Color) {
    let Some(start) = y
        .checked_mul(width)
        .and_then(|row| row.checked_add(x))
        .and_then(|index| index.checked_mul(4))
    else {
        return;
    };
    let Some(pixel) = frame.get_mut(start..start + 4) else {
        return;
    };
    match color[3] {
        0 => {}
        255 => pixel.copy_from_slice(&color),
        alpha => {
            let a = alpha as u16;
            for channel in 0..3 {
                let src = color[channel] as u16;
                let dst = pixel[channel] as u16;
                pixel[channel] = ((src * a + dst * (255 - a)) / 255) as u8;
            }
            pixel[3] = 255;
        }
    }
}
