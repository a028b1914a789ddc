use super::collision::{Body, EntityId, EntityKind};
use super::Layout;
use crate::engine::{Point, Rect, Size};
use crate::params::Params;
use crate::sprite::ship::Ship;
use std::rc::Rc;

/// Under this distance from its target the ship counts as parked
const ARRIVED: f32 = 0.5;

/// The ship: where it is, where the pointer wants it, how many lives are left
/// and which sprite it shows. `sprite_locked` keeps movement from overriding
/// scripted sprites (intro, damage, death).
pub struct Player {
    pub id: EntityId,
    pub(super) position: Point,
    target: Point,
    size: Size,
    lives: u32,
    max_lives: u32,
    ship: Ship,
    sprite_locked: bool,
}

impl Player {
    /// Starts below the screen, the intro slides it up to the spawn point
    pub fn new(id: EntityId, params: Rc<Params>, layout: &Layout) -> Self {
        let position = Point::new(
            layout.spawn.x,
            layout.height + layout.player_size.height / 2.0 + params.intro.player_start_offset,
        );
        Player {
            id,
            position,
            target: position,
            size: layout.player_size,
            lives: params.player.lives,
            max_lives: params.player.lives,
            ship: Ship::new(params),
            sprite_locked: false,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_lives == 0 {
            return 0.0;
        }
        (self.lives as f32 / self.max_lives as f32).clamp(0.0, 1.0)
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.size)
    }

    pub fn top(&self) -> f32 {
        self.position.y - self.size.height / 2.0
    }

    /// Where player bullets leave the ship
    pub fn nose(&self) -> Point {
        Point::new(self.position.x, self.top())
    }

    pub fn body(&self) -> Body {
        Body {
            id: self.id,
            kind: EntityKind::Player,
            rect: self.rect(),
        }
    }

    pub fn is_sprite_locked(&self) -> bool {
        self.sprite_locked
    }

    pub fn lock_sprite(&mut self) {
        self.sprite_locked = true;
    }

    /// Hands the sprite back to movement, coming back from damage shows idle
    pub fn unlock_sprite(&mut self) {
        self.sprite_locked = false;
        self.ship.recover();
    }

    /// Pointer or finger position, clamped to the movement zone
    pub fn aim(&mut self, point: Point, layout: &Layout) {
        self.target = clamp_point(point, layout);
    }

    /// Stops the ship where it is
    pub fn freeze(&mut self) {
        self.target = self.position;
    }

    /// Places the ship directly, used by the intro script
    pub fn place(&mut self, point: Point) {
        self.position = point;
        self.target = point;
    }

    /// Moves toward the target at `speed` px/s without overshooting, returns
    /// whether the ship is still travelling
    pub fn steer(&mut self, dt: f32, speed: f32, layout: &Layout) -> bool {
        let distance = self.position.distance_to(self.target);
        let step = speed * dt;
        let moving = distance > ARRIVED;
        if moving {
            if distance <= step {
                self.position = self.target;
            } else {
                self.position.x += (self.target.x - self.position.x) / distance * step;
                self.position.y += (self.target.y - self.position.y) / distance * step;
            }
        }
        self.position = clamp_point(self.position, layout);
        if !self.sprite_locked {
            if moving {
                self.ship.start_moving();
            } else {
                self.ship.stop();
            }
        }
        moving
    }

    /// Removes one life, or all of them for a lethal hit, and returns what is
    /// left
    pub fn take_hit(&mut self, lethal: bool) -> u32 {
        self.lives = if lethal {
            0
        } else {
            self.lives.saturating_sub(1)
        };
        self.lives
    }

    pub fn animate(&mut self, dt: f32) {
        self.ship.update(dt);
    }

    pub fn show_damage(&mut self) {
        self.ship.hit();
    }

    pub fn show_death(&mut self) {
        self.ship.destroy();
    }

    /// Victory pose
    pub fn settle(&mut self) {
        self.ship.settle();
    }
}

fn clamp_point(point: Point, layout: &Layout) -> Point {
    Point::new(
        point.x.clamp(layout.move_min.x, layout.move_max.x),
        point.y.clamp(layout.move_min.y, layout.move_max.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn player() -> (Player, Layout) {
        let params = Rc::new(Params::default());
        let layout = Layout::new(&params);
        let mut player = Player::new(1, params, &layout);
        player.place(layout.spawn);
        (player, layout)
    }

    #[test]
    fn aim_is_clamped_to_the_bottom_zone() {
        let (mut player, layout) = player();
        player.aim(Point::new(-50.0, 0.0), &layout);
        assert_relative_eq!(player.target().x, 20.0);
        // 667 - 0 - 20 - 6 = 641, 641 - 66.7
        assert_relative_eq!(player.target().y, 574.3, epsilon = 1e-3);

        player.aim(Point::new(1000.0, 1000.0), &layout);
        assert_relative_eq!(player.target().x, 355.0);
        assert_relative_eq!(player.target().y, 641.0);
    }

    #[test]
    fn steering_never_overshoots() {
        let (mut player, layout) = player();
        player.aim(Point::new(player.position().x + 3.0, player.position().y), &layout);
        let goal = player.target();
        assert!(player.steer(1.0 / 60.0, 300.0, &layout));
        assert_eq!(player.position(), goal);
        assert!(!player.steer(1.0 / 60.0, 300.0, &layout));
        assert_eq!(player.ship().state_name(), "idle");
    }

    #[test]
    fn moving_switches_the_sprite_unless_locked() {
        let (mut player, layout) = player();
        player.aim(Point::new(0.0, player.position().y), &layout);
        player.steer(1.0 / 60.0, 300.0, &layout);
        assert_eq!(player.ship().state_name(), "moving");

        player.lock_sprite();
        player.show_damage();
        player.steer(1.0 / 60.0, 300.0, &layout);
        assert_eq!(player.ship().state_name(), "damage");
    }

    #[test]
    fn lives_bottom_out_at_zero() {
        let (mut player, _) = player();
        assert_eq!(player.take_hit(false), 4);
        assert_eq!(player.take_hit(true), 0);
        assert_eq!(player.take_hit(false), 0);
        assert_relative_eq!(player.health_ratio(), 0.0);
    }
}
