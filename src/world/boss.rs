use super::collision::{Body, EntityId, EntityKind};
use crate::engine::{Point, Rect, Size};
use crate::params::{BossParams, SheetParams};
use crate::sprite::{Animation, Clip};

/// The oversized invader of the final phase, `position` is its centre
#[derive(Debug, Clone)]
pub struct Boss {
    pub id: EntityId,
    pub position: Point,
    pub animation: Animation,
    size: Size,
    hp: u32,
    max_hp: u32,
    direction: f32,
    /// seconds spent sweeping, drives the bob
    time: f32,
    base_y: f32,
}

impl Boss {
    /// Enters from above the screen, `base_y` is where it settles
    pub fn spawn(
        id: EntityId,
        params: &BossParams,
        sheet: &SheetParams,
        size: Size,
        width: f32,
        base_y: f32,
    ) -> Self {
        Boss {
            id,
            position: Point::new(width / 2.0, -120.0),
            animation: Animation::new(Clip::from_sheet(sheet, true)),
            size,
            hp: params.hp,
            max_hp: params.hp,
            direction: 1.0,
            time: 0.0,
            base_y,
        }
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        (self.hp as f32 / self.max_hp as f32).clamp(0.0, 1.0)
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.size)
    }

    pub fn body(&self) -> Body {
        Body {
            id: self.id,
            kind: EntityKind::Boss,
            rect: self.rect(),
        }
    }

    /// Drops toward `base_y`, true on the frame it gets there
    pub fn slide_in(&mut self, dt: f32, speed: f32) -> bool {
        self.position.y += speed * dt;
        if self.position.y >= self.base_y {
            self.position.y = self.base_y;
            return true;
        }
        false
    }

    /// Side to side between the padded bounds, bobbing around `base_y`
    pub fn sweep(&mut self, dt: f32, params: &BossParams, width: f32) {
        self.time += dt;
        let half_width = self.size.width / 2.0;
        let left = params.sweep_padding + half_width;
        let right = width - params.sweep_padding - half_width;

        self.position.y = self.base_y + (self.time * params.bob_speed).sin() * params.bob_amp;
        self.position.x += params.speed * self.direction * dt;
        if self.position.x <= left {
            self.position.x = left;
            self.direction = 1.0;
        } else if self.position.x >= right {
            self.position.x = right;
            self.direction = -1.0;
        }
    }

    /// One point of damage, true when this hit finished it off
    pub fn take_hit(&mut self) -> bool {
        self.hp = self.hp.saturating_sub(1);
        self.hp == 0
    }

    /// Where the fan of shots leaves the boss
    pub fn muzzle(&self) -> Point {
        Point::new(self.position.x, self.position.y + 18.0)
    }
}

/// Unit directions of a boss volley, spread evenly over `spread_angle_deg`
/// and centred on straight down
pub fn fan_directions(params: &BossParams) -> Vec<Point> {
    let count = params.spread_count.max(1);
    (0..count)
        .map(|index| {
            let t = if count == 1 {
                0.5
            } else {
                index as f32 / (count - 1) as f32
            };
            let angle = ((t - 0.5) * params.spread_angle_deg).to_radians();
            Point::new(angle.sin(), angle.cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;
    use approx::assert_relative_eq;

    fn boss() -> Boss {
        let params = Params::default();
        Boss::spawn(
            1,
            &params.boss,
            &params.enemy.sprite_sheet,
            Size::new(96.0, 96.0),
            375.0,
            146.74,
        )
    }

    #[test]
    fn slides_in_to_its_base() {
        let mut boss = boss();
        assert!(!boss.slide_in(0.5, 220.0));
        assert!(boss.slide_in(1.0, 220.0));
        assert_relative_eq!(boss.position.y, 146.74);
    }

    #[test]
    fn sweep_reverses_at_the_padded_bounds() {
        let params = BossParams::default();
        let mut boss = boss();
        boss.position.x = 300.0;
        boss.sweep(1.0, &params, 375.0);
        // 375 - 22 - 48
        assert_relative_eq!(boss.position.x, 305.0);
        assert_eq!(boss.direction(), -1.0);
    }

    #[test]
    fn hp_never_goes_below_zero() {
        let mut boss = boss();
        for _ in 0..29 {
            assert!(!boss.take_hit());
        }
        assert!(boss.take_hit());
        assert!(boss.take_hit());
        assert_eq!(boss.hp(), 0);
    }

    #[test]
    fn fan_is_symmetric_around_down() {
        let directions = fan_directions(&BossParams::default());
        assert_eq!(directions.len(), 3);
        assert_relative_eq!(directions[1].x, 0.0);
        assert_relative_eq!(directions[1].y, 1.0);
        assert_relative_eq!(directions[0].x, -directions[2].x);
        assert_relative_eq!(directions[0].x, (-27.5f32).to_radians().sin());

        let single = fan_directions(&BossParams {
            spread_count: 1,
            ..BossParams::default()
        });
        assert_relative_eq!(single[0].x, 0.0);
    }
}
