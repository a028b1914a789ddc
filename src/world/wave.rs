use super::collision::{Body, EntityId, EntityKind};
use super::IdSource;
use crate::engine::{Point, Rect, Size};
use crate::params::{pick, EnemyParams};
use crate::sprite::{Animation, Clip};
use rand::seq::IteratorRandom;
use rand::Rng;

/// One invader, `position` is its top left corner
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EntityId,
    pub position: Point,
    pub animation: Animation,
    slide_target_y: f32,
    alive: bool,
}

impl Enemy {
    pub fn rect(&self, size: f32) -> Rect {
        Rect::new(self.position, Size::new(size, size))
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum March {
    Moved,
    /// an invader reached the ship's line
    Overrun,
}

/// The phase 1 formation, moving as one block
/// - `direction` : +1 right, -1 left
/// - `pending_drop` : set on an edge reversal, applied once on the next march
#[derive(Debug, Clone)]
pub struct Wave {
    enemies: Vec<Enemy>,
    size: f32,
    direction: f32,
    pending_drop: bool,
}

impl Wave {
    pub fn empty(size: f32) -> Self {
        Wave {
            enemies: Vec::new(),
            size,
            direction: 1.0,
            pending_drop: false,
        }
    }

    /// Rows x cols grid, spawned above the screen with a little vertical
    /// scatter so the formation doesn't arrive as one flat line
    pub fn spawn<R: Rng + ?Sized>(params: &EnemyParams, ids: &mut IdSource, rng: &mut R) -> Self {
        let sheet = &params.sprite_sheet;
        let clip = Clip::from_sheet(sheet, true);
        let variance = sheet.anim_speed_variance;
        let mut enemies = Vec::with_capacity(params.rows * params.cols);
        for row in 0..params.rows {
            for col in 0..params.cols {
                let scatter = pick(rng, [0.0, 40.0]);
                let animation = Animation::new(clip)
                    .with_delay(pick(rng, sheet.anim_start_delay_range), 0)
                    .with_speed_factor(1.0 + pick(rng, [-variance, variance]));
                enemies.push(Enemy {
                    id: ids.next_id(),
                    position: Point::new(
                        col as f32 * params.spacing + 30.0,
                        -(60.0 + row as f32 * 26.0 + scatter),
                    ),
                    animation,
                    slide_target_y: row as f32 * params.spacing + params.start_y,
                    alive: true,
                });
            }
        }
        Wave {
            enemies,
            ..Wave::empty(params.size)
        }
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|enemy| enemy.alive)
    }

    pub fn live_count(&self) -> usize {
        self.enemies().count()
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn has_pending_drop(&self) -> bool {
        self.pending_drop
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Slides every invader down to its formation row, true once all are there
    pub fn slide_in(&mut self, dt: f32, speed: f32) -> bool {
        let mut all_arrived = true;
        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.alive) {
            if enemy.position.y < enemy.slide_target_y {
                enemy.position.y = (enemy.position.y + speed * dt).min(enemy.slide_target_y);
                all_arrived = false;
            }
        }
        all_arrived
    }

    /// One marching step: apply a queued drop, shift sideways, then check the
    /// edges and the ship line. Reversal only counts for the edge the wave is
    /// heading to, so a wave still touching the edge it just left is ignored.
    pub fn march(&mut self, dt: f32, params: &EnemyParams, width: f32, player_top: f32) -> March {
        let drop = if self.pending_drop {
            params.drop_distance
        } else {
            0.0
        };
        self.pending_drop = false;
        let step = params.speed * self.direction * dt;
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;

        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.alive) {
            enemy.position.y += drop;
            enemy.position.x += step;
            min_x = min_x.min(enemy.position.x);
            max_x = max_x.max(enemy.position.x + self.size);
            if enemy.position.y + self.size >= player_top {
                return March::Overrun;
            }
        }

        let reached_left = self.direction < 0.0 && min_x <= params.horizontal_padding;
        let reached_right = self.direction > 0.0 && max_x >= width - params.horizontal_padding;
        if reached_left || reached_right {
            self.direction = -self.direction;
            self.pending_drop = true;
        }
        March::Moved
    }

    pub fn animate(&mut self, dt: f32) {
        for enemy in self.enemies.iter_mut() {
            enemy.animation.update(dt);
        }
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.enemies.iter().any(|enemy| enemy.id == id && enemy.alive)
    }

    /// Marks the enemy dead and hands back where it was, `None` when it
    /// was already gone
    pub fn kill(&mut self, id: EntityId) -> Option<Point> {
        let enemy = self
            .enemies
            .iter_mut()
            .find(|enemy| enemy.id == id && enemy.alive)?;
        enemy.alive = false;
        Some(enemy.position)
    }

    pub fn remove_dead(&mut self) {
        self.enemies.retain(|enemy| enemy.alive);
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
        self.pending_drop = false;
    }

    pub fn random_shooter<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Point> {
        self.enemies()
            .choose(rng)
            .map(|enemy| enemy.position)
    }

    pub fn bodies(&self) -> impl Iterator<Item = Body> + '_ {
        self.enemies().map(move |enemy| Body {
            id: enemy.id,
            kind: EntityKind::Enemy,
            rect: enemy.rect(self.size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spawn(rows: usize, cols: usize) -> (Wave, EnemyParams) {
        let params = EnemyParams {
            rows,
            cols,
            ..EnemyParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let wave = Wave::spawn(&params, &mut IdSource::default(), &mut rng);
        (wave, params)
    }

    #[test]
    fn spawns_above_the_screen_in_a_grid() {
        let (wave, _) = spawn(4, 8);
        assert_eq!(wave.live_count(), 32);
        assert!(wave.enemies().all(|enemy| enemy.position.y < 0.0));
        let xs: Vec<f32> = wave.enemies().take(3).map(|enemy| enemy.position.x).collect();
        assert_eq!(xs, vec![30.0, 70.0, 110.0]);
    }

    #[test]
    fn slide_in_stops_on_the_formation_rows() {
        let (mut wave, params) = spawn(2, 2);
        let mut arrived = false;
        for _ in 0..200 {
            if wave.slide_in(1.0 / 60.0, params.intro_slide_speed) {
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        let ys: Vec<f32> = wave.enemies().map(|enemy| enemy.position.y).collect();
        assert_eq!(ys, vec![60.0, 60.0, 100.0, 100.0]);
    }

    #[test]
    fn killing_twice_counts_once() {
        let (mut wave, _) = spawn(1, 2);
        let id = wave.enemies().next().map(|enemy| enemy.id).unwrap();
        assert!(wave.kill(id).is_some());
        assert!(wave.kill(id).is_none());
        assert_eq!(wave.live_count(), 1);
    }

    #[test]
    fn overrun_is_reported() {
        let (mut wave, params) = spawn(1, 1);
        assert_eq!(wave.march(0.0, &params, 375.0, -100.0), March::Overrun);
    }
}
