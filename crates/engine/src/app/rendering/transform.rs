use crate::app::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

pub const DEFAULT_VIEWPORT: Viewport = Viewport {
    width: 1280,
    height: 720,
};

impl Viewport {
    pub fn center(self) -> Vec2 {
        Vec2::new(self.width as f32 * 0.5, self.height as f32 * 0.5)
    }
}

/// World pixels to window pixels with the camera centered on `camera_center`.
/// Both spaces grow downward, so this is a pure translation.
pub fn world_to_screen(world: Vec2, camera_center: Vec2, viewport: Viewport) -> Vec2 {
    let center = viewport.center();
    Vec2::new(
        world.x - camera_center.x + center.x,
        world.y - camera_center.y + center.y,
    )
}

pub fn screen_to_world(screen: Vec2, camera_center: Vec2, viewport: Viewport) -> Vec2 {
    let center = viewport.center();
    Vec2::new(
        screen.x + camera_center.x - center.x,
        screen.y + camera_center.y - center.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800,
        height: 600,
    };

    #[test]
    fn camera_center_maps_to_viewport_center() {
        let camera = Vec2::new(1460.0, 1539.0);
        assert_eq!(
            world_to_screen(camera, camera, VIEWPORT),
            Vec2::new(400.0, 300.0)
        );
    }

    #[test]
    fn offsets_are_preserved_and_invertible() {
        let camera = Vec2::new(10.0, -5.0);
        let screen = world_to_screen(Vec2::new(22.0, 5.0), camera, VIEWPORT);
        assert_eq!(screen, Vec2::new(412.0, 310.0));
        assert_eq!(screen_to_world(screen, camera, VIEWPORT), Vec2::new(22.0, 5.0));
    }
}
