use super::collision::resolve;
use super::geometry::{Rect, Vec2};
use super::input::InputSnapshot;

pub const PLAYER_SPRITE_SIZE_PX: f32 = 35.0;
pub const PLAYER_HITBOX_INSET_PX: f32 = 1.0;
pub const PLAYER_SPEED_PX_PER_SECOND: f32 = 300.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn sprite_key(self) -> &'static str {
        match self {
            Facing::Up => "player/up",
            Facing::Down => "player/down",
            Facing::Left => "player/left",
            Facing::Right => "player/right",
        }
    }

    /// Vertical wins over horizontal; a zero direction keeps `previous`.
    fn from_direction(direction: Vec2, previous: Facing) -> Facing {
        if direction.y < 0.0 {
            Facing::Up
        } else if direction.y > 0.0 {
            Facing::Down
        } else if direction.x < 0.0 {
            Facing::Left
        } else if direction.x > 0.0 {
            Facing::Right
        } else {
            previous
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    position: Vec2,
    hitbox: Rect,
    sprite_size: Vec2,
    direction: Vec2,
    speed: f32,
    facing: Facing,
}

impl Player {
    /// Player centered on a map spawn point, using the stock sprite size and
    /// speed.
    pub fn spawn_at(spawn: Vec2) -> Self {
        let sprite = Rect::from_center(spawn, PLAYER_SPRITE_SIZE_PX, PLAYER_SPRITE_SIZE_PX);
        Self::new(
            sprite.inflated(-PLAYER_HITBOX_INSET_PX, -PLAYER_HITBOX_INSET_PX),
            Vec2::new(PLAYER_SPRITE_SIZE_PX, PLAYER_SPRITE_SIZE_PX),
            PLAYER_SPEED_PX_PER_SECOND,
        )
    }

    pub fn new(hitbox: Rect, sprite_size: Vec2, speed: f32) -> Self {
        Self {
            position: hitbox.center(),
            hitbox,
            sprite_size,
            direction: Vec2::ZERO,
            speed,
            facing: Facing::default(),
        }
    }

    pub fn tick(&mut self, input: &InputSnapshot, dt_seconds: f32, obstacles: &[Rect]) {
        self.direction = input.movement_axes().normalized_or_zero();
        let delta_move = self.direction.scaled(self.speed * dt_seconds);
        self.hitbox = resolve(self.hitbox, delta_move, obstacles);
        self.position = self.hitbox.center();
        self.facing = Facing::from_direction(self.direction, self.facing);
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn hitbox(&self) -> Rect {
        self.hitbox
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Visual bounds, centered on the hitbox.
    pub fn sprite_rect(&self) -> Rect {
        Rect::from_center(self.position, self.sprite_size.x, self.sprite_size.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::InputAction;

    fn held(actions: &[InputAction]) -> InputSnapshot {
        actions.iter().fold(InputSnapshot::empty(), |snapshot, action| {
            snapshot.with_action_down(*action, true)
        })
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 0.001,
            "actual={actual} expected={expected}"
        );
    }

    #[test]
    fn spawn_centers_inset_hitbox_on_spawn_point() {
        let player = Player::spawn_at(Vec2::new(200.0, 120.0));

        assert_eq!(player.hitbox().width, 34.0);
        assert_eq!(player.hitbox().height, 34.0);
        assert_eq!(player.position(), Vec2::new(200.0, 120.0));
        assert_eq!(player.sprite_rect().width, 35.0);
        assert_eq!(player.speed(), 300.0);
    }

    #[test]
    fn diagonal_input_is_normalized_before_scaling() {
        let mut player = Player::new(
            Rect::new(0.0, 0.0, 20.0, 20.0),
            Vec2::new(20.0, 20.0),
            300.0,
        );
        player.tick(
            &held(&[InputAction::MoveRight, InputAction::MoveDown]),
            0.1,
            &[],
        );

        assert_close(player.direction().x, 0.707);
        assert_close(player.direction().y, 0.707);
        assert_close(player.hitbox().x, 21.213);
        assert_close(player.hitbox().y, 21.213);
    }

    #[test]
    fn cardinal_move_covers_speed_times_dt() {
        let mut player = Player::new(
            Rect::new(0.0, 0.0, 20.0, 20.0),
            Vec2::new(20.0, 20.0),
            300.0,
        );
        player.tick(&held(&[InputAction::MoveLeft]), 0.5, &[]);

        assert_close(player.hitbox().x, -150.0);
        assert_eq!(player.facing(), Facing::Left);
    }

    #[test]
    fn tick_resolves_against_obstacles_and_recenters() {
        let mut player = Player::new(
            Rect::new(100.0, 100.0, 20.0, 20.0),
            Vec2::new(22.0, 22.0),
            300.0,
        );
        let wall = Rect::new(125.0, 0.0, 10.0, 400.0);
        player.tick(&held(&[InputAction::MoveRight]), 0.1, &[wall]);

        assert_eq!(player.hitbox().right(), 125.0);
        assert_eq!(player.position(), player.hitbox().center());
        assert_eq!(player.sprite_rect().center(), player.hitbox().center());
    }

    #[test]
    fn facing_prefers_vertical_and_persists_when_idle() {
        let mut player = Player::spawn_at(Vec2::new(0.0, 0.0));

        player.tick(&held(&[InputAction::MoveUp, InputAction::MoveRight]), 0.016, &[]);
        assert_eq!(player.facing(), Facing::Up);

        player.tick(&held(&[InputAction::MoveRight]), 0.016, &[]);
        assert_eq!(player.facing(), Facing::Right);

        player.tick(&InputSnapshot::empty(), 0.016, &[]);
        assert_eq!(player.facing(), Facing::Right);
        assert_eq!(player.direction(), Vec2::ZERO);
    }

    #[test]
    fn zero_input_is_a_steady_state() {
        let mut player = Player::spawn_at(Vec2::new(64.0, 64.0));
        let before = player.clone();
        player.tick(&InputSnapshot::empty(), 0.25, &[]);

        assert_eq!(player, before);
    }
}
