use super::collision::{Body, EntityId, EntityKind};
use crate::engine::{Point, Rect, Size};
use crate::sprite::{Animation, Clip};

/// Straight-line projectile, `velocity` in px per second
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: EntityId,
    pub kind: EntityKind,
    pub rect: Rect,
    pub velocity: Point,
    pub alive: bool,
}

impl Bullet {
    pub fn new(id: EntityId, kind: EntityKind, rect: Rect, velocity: Point) -> Self {
        Bullet {
            id,
            kind,
            rect,
            velocity,
            alive: true,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.rect.position.x += self.velocity.x * dt;
        self.rect.position.y += self.velocity.y * dt;
    }

    pub fn is_offscreen(&self, width: f32, height: f32) -> bool {
        self.rect.right() < 0.0
            || self.rect.left() > width
            || self.rect.bottom() < 0.0
            || self.rect.top() > height
    }

    pub fn body(&self) -> Body {
        Body {
            id: self.id,
            kind: self.kind,
            rect: self.rect,
        }
    }
}

/// One-shot explosion left behind by a destroyed enemy or boss
/// Removes itself after `lifetime`, whether or not the clip has finished.
#[derive(Debug, Clone)]
pub struct Explosion {
    pub rect: Rect,
    pub animation: Animation,
    remaining: f32,
}

impl Explosion {
    /// Lifetime is the clip length plus a 50 ms margin
    pub fn new(rect: Rect, clip: Clip) -> Self {
        Explosion {
            rect,
            animation: Animation::new(clip),
            remaining: Explosion::lifetime_for(&clip),
        }
    }

    pub fn lifetime_for(clip: &Clip) -> f32 {
        clip.duration() + 0.05
    }

    pub fn centered(center: Point, size: Size, clip: Clip) -> Self {
        Explosion::new(Rect::from_center(center, size), clip)
    }

    pub fn update(&mut self, dt: f32) {
        self.animation.update(dt);
        self.remaining -= dt;
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullets_leave_the_screen() {
        let mut bullet = Bullet::new(
            1,
            EntityKind::PlayerBullet,
            Rect::new(Point::new(10.0, 5.0), Size::new(6.0, 12.0)),
            Point::new(0.0, -500.0),
        );
        assert!(!bullet.is_offscreen(375.0, 667.0));
        bullet.update(0.1);
        assert!(bullet.is_offscreen(375.0, 667.0));
    }

    #[test]
    fn explosions_outlive_their_clip_slightly() {
        let clip = Clip::new(3, 14.0, false);
        let mut explosion = Explosion::new(Rect::default(), clip);
        explosion.update(clip.duration());
        assert!(!explosion.is_expired());
        explosion.update(0.06);
        assert!(explosion.is_expired());
    }
}
