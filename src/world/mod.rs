// Simulation of one run, free of any web API so it can be driven from tests
// ┌──────────────┬───────────────────────────────────────────────────────┐
// │ mod.rs       │ World: owns every entity, runs one tick               │
// │ phase.rs     │ Phase machine + scripted intro steps                  │
// │ player.rs    │ ship movement, lives, sprite lock                     │
// │ wave.rs      │ phase 1 invader formation                             │
// │ boss.rs      │ boss sweep / bob / volley                             │
// │ bullet.rs    │ projectiles + explosion effects                       │
// │ collision.rs │ entity kinds, contact table, contact start tracking   │
// │ scheduler.rs │ scoped one-shot tasks + repeating cadences            │
// └──────────────┴───────────────────────────────────────────────────────┘
pub mod boss;
pub mod bullet;
pub mod collision;
pub mod phase;
pub mod player;
pub mod scheduler;
pub mod wave;

use self::boss::{fan_directions, Boss};
use self::bullet::{Bullet, Explosion};
use self::collision::{Body, Contact, ContactTracker, EntityId, EntityKind};
use self::phase::{Intro, IntroStep, Phase};
use self::player::Player;
use self::scheduler::{Cadence, Scheduler, Scope, Task};
use self::wave::{March, Wave};
use crate::background::Background;
use crate::engine::{Point, Rect, Size};
use crate::params::{Params, SoundParams, SoundTable};
use crate::sprite::{Animation, Clip};
use crate::ui::{Banner, HealthBar};
use rand::rngs::StdRng;
use std::rc::Rc;

/// Screen geometry derived once from the parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub earth_scale: f32,
    pub earth_height: f32,
    /// bottom of the star band, the earth (when shown) sits below it
    pub star_max_y: f32,
    pub player_size: Size,
    pub spawn: Point,
    pub move_min: Point,
    pub move_max: Point,
    pub enemy_scale: f32,
    pub boss_size: Size,
}

impl Layout {
    pub fn new(params: &Params) -> Self {
        let width = params.canvas.width;
        let height = params.canvas.height;
        let background = &params.background;
        let (earth_scale, earth_height) = if background.show_earth && background.earth.width > 0.0 {
            let scale = width / background.earth.width;
            (scale, background.earth.height * scale)
        } else {
            (1.0, 0.0)
        };

        let idle = &params.player.sprite_sheets.idle;
        let player_scale = if idle.frame_width > 0.0 {
            params.player.width / idle.frame_width
        } else {
            1.0
        };
        let player_size = Size::new(idle.frame_width, idle.frame_height).scaled(player_scale);
        let half = Size::new(player_size.width / 2.0, player_size.height / 2.0);

        let movement = &params.player.movement;
        let max_y = height - earth_height - half.height - movement.bottom_pad_px;
        let min_y = half.height.max(max_y - height * movement.zone_height_frac);

        let sheet = &params.enemy.sprite_sheet;
        let enemy_scale = if sheet.frame_width > 0.0 {
            params.enemy.size / sheet.frame_width
        } else {
            1.0
        };
        let boss_size = Size::new(sheet.frame_width, sheet.frame_height)
            .scaled(enemy_scale * params.boss.scale_multiplier);

        Layout {
            width,
            height,
            earth_scale,
            earth_height,
            star_max_y: (height - earth_height).max(0.0),
            player_size,
            spawn: Point::new(width / 2.0, height - (params.player.spawn_offset + half.height)),
            move_min: Point::new(half.width, min_y.min(max_y)),
            move_max: Point::new((width - half.width).max(half.width), max_y),
            enemy_scale,
            boss_size,
        }
    }

    pub fn screen(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Hands out entity ids, never reused within a run
#[derive(Debug, Default)]
pub struct IdSource(EntityId);

impl IdSource {
    pub fn next_id(&mut self) -> EntityId {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sfx {
    ShipFire,
    ShipDamage,
    ShipDeath,
    EnemyFire,
    EnemyDeath,
}

impl Sfx {
    pub fn params<'a>(&self, sounds: &'a SoundTable) -> &'a SoundParams {
        match self {
            Sfx::ShipFire => &sounds.ship_fire,
            Sfx::ShipDamage => &sounds.ship_damage,
            Sfx::ShipDeath => &sounds.ship_death,
            Sfx::EnemyFire => &sounds.enemy_fire,
            Sfx::EnemyDeath => &sounds.enemy_death,
        }
    }
}

/// Side effects the host has to carry out after a tick
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FrameEvent {
    Sound(Sfx),
    StopMusic,
    PhaseChanged(Phase),
}

pub struct World {
    params: Rc<Params>,
    layout: Layout,
    rng: StdRng,
    ids: IdSource,
    phase: Phase,
    intro: Intro,
    player: Player,
    wave: Wave,
    boss: Option<Boss>,
    /// the cutscene boss reuses the march clip
    intro_animation: Animation,
    bullets: Vec<Bullet>,
    explosions: Vec<Explosion>,
    background: Background,
    scheduler: Scheduler,
    auto_fire: Cadence,
    enemy_fire: Cadence,
    boss_fire: Cadence,
    contacts: ContactTracker,
    player_bar: HealthBar,
    boss_bar: HealthBar,
    banner: Option<Banner>,
    events: Vec<FrameEvent>,
}

impl World {
    pub fn new(params: Rc<Params>, mut rng: StdRng) -> Self {
        let layout = Layout::new(&params);
        let mut ids = IdSource::default();
        let player = Player::new(ids.next_id(), params.clone(), &layout);
        let background = Background::new(params.clone(), &layout, &mut rng);
        let march = Clip::from_sheet(&params.enemy.sprite_sheet, true);
        let mut world = World {
            layout: layout.clone(),
            rng,
            ids,
            phase: Phase::Intro,
            intro: Intro::default(),
            player,
            wave: Wave::empty(params.enemy.size),
            boss: None,
            intro_animation: Animation::new(march),
            bullets: Vec::new(),
            explosions: Vec::new(),
            background,
            scheduler: Scheduler::default(),
            auto_fire: Cadence::every(if params.player.auto_fire_shots_per_second > 0.0 {
                1.0 / params.player.auto_fire_shots_per_second
            } else {
                0.0
            }),
            enemy_fire: Cadence::every(params.enemy_fire.interval),
            boss_fire: Cadence::every(params.boss.shoot_interval),
            contacts: ContactTracker::default(),
            player_bar: HealthBar::for_player(layout.player_size),
            boss_bar: HealthBar::for_boss(layout.width),
            banner: None,
            events: Vec::new(),
            params,
        };
        world.player.lock_sprite();
        world.sync_ui();
        world
    }

    // ==================== Accessors ====================
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// A finished run only takes restart input once its banner is up
    pub fn accepts_restart(&self) -> bool {
        self.is_over() && self.banner.is_some()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn wave(&self) -> &Wave {
        &self.wave
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    /// Centre of the cutscene boss and its animation, while it is on stage
    pub fn intro_boss(&self) -> Option<(Point, &Animation)> {
        self.intro.boss.map(|center| (center, &self.intro_animation))
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn player_bar(&self) -> &HealthBar {
        &self.player_bar
    }

    pub fn boss_bar(&self) -> &HealthBar {
        &self.boss_bar
    }

    pub fn banner(&self) -> Option<Banner> {
        self.banner
    }

    pub fn drain_events(&mut self) -> Vec<FrameEvent> {
        std::mem::take(&mut self.events)
    }

    // ==================== Input ====================
    /// Pointer / finger position. Ignored during the intro, while the ship
    /// recovers from a hit and once the run is over.
    pub fn aim(&mut self, point: Point) {
        if self.phase == Phase::Intro || self.is_over() || self.player.is_sprite_locked() {
            return;
        }
        self.player.aim(point, &self.layout);
    }

    /// Debug shortcut, only honoured from phase 1
    pub fn skip_to_boss(&mut self) {
        self.start_boss_phase();
    }

    // ==================== Tick ====================
    /// One frame: due tasks, repeating fire, the active phase, moving
    /// entities, background, then contacts
    pub fn tick(&mut self, dt: f32) {
        for task in self.scheduler.advance(dt) {
            self.run_task(task);
        }
        self.fire(dt);
        self.update_phase(dt);
        self.update_entities(dt);
        let offset = self.parallax_offset();
        let active = !self.is_over();
        self.background.update(dt, offset, active, &mut self.rng);
        self.resolve_collisions();
        self.sync_ui();
    }

    fn parallax_offset(&self) -> Point {
        let position = self.player.position();
        Point::new(
            position.x - self.layout.width / 2.0,
            position.y - self.layout.spawn.y,
        )
    }

    fn emit(&mut self, event: FrameEvent) {
        self.events.push(event);
    }

    /// Validated phase change, false when the move isn't allowed from the
    /// current phase
    fn enter(&mut self, next: Phase) -> bool {
        if !self.phase.can_advance_to(next) {
            return false;
        }
        self.scheduler.cancel_phase(self.phase);
        if next.is_terminal() {
            self.scheduler.cancel_run();
            self.emit(FrameEvent::StopMusic);
        }
        self.phase = next;
        self.emit(FrameEvent::PhaseChanged(next));
        true
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::RecoverFromHit => self.player.unlock_sprite(),
            Task::ShowGameOver => self.banner = Some(Banner::GameOver),
            Task::ShowVictory => self.banner = Some(Banner::Victory),
        }
    }

    fn fire(&mut self, dt: f32) {
        for _ in 0..self.auto_fire.tick(dt) {
            self.fire_player_bullet();
        }
        for _ in 0..self.enemy_fire.tick(dt) {
            self.fire_enemy_bullet();
        }
        for _ in 0..self.boss_fire.tick(dt) {
            self.fire_boss_volley();
        }
    }

    fn fire_player_bullet(&mut self) {
        if !self.phase.is_combat() {
            return;
        }
        let sprite = &self.params.player.bullet_sprite;
        let size = Size::new(sprite.width, sprite.height).scaled(sprite.scale);
        let rect = Rect::from_center(self.player.nose(), size);
        let velocity = Point::new(0.0, -self.params.player.bullet_speed);
        let id = self.ids.next_id();
        self.bullets
            .push(Bullet::new(id, EntityKind::PlayerBullet, rect, velocity));
        self.emit(FrameEvent::Sound(Sfx::ShipFire));
    }

    fn fire_enemy_bullet(&mut self) {
        if self.phase != Phase::Phase1 {
            return;
        }
        let Some(shooter) = self.wave.random_shooter(&mut self.rng) else {
            return;
        };
        let size = self.wave.size();
        let rect = Rect::new(
            Point::new(shooter.x + size / 2.0 - 2.0, shooter.y + size),
            Size::new(4.0, 12.0),
        );
        let velocity = Point::new(0.0, self.params.enemy_fire.bullet_speed);
        let id = self.ids.next_id();
        self.bullets
            .push(Bullet::new(id, EntityKind::EnemyBullet, rect, velocity));
        self.emit(FrameEvent::Sound(Sfx::EnemyFire));
    }

    fn fire_boss_volley(&mut self) {
        if self.phase != Phase::Boss {
            return;
        }
        let Some(muzzle) = self.boss.as_ref().map(Boss::muzzle) else {
            return;
        };
        self.emit(FrameEvent::Sound(Sfx::EnemyFire));
        let speed = self.params.boss.bullet_speed;
        for direction in fan_directions(&self.params.boss) {
            let id = self.ids.next_id();
            let rect = Rect::from_center(muzzle, Size::new(5.0, 14.0));
            let velocity = Point::new(direction.x * speed, direction.y * speed);
            self.bullets
                .push(Bullet::new(id, EntityKind::BossBullet, rect, velocity));
        }
    }

    fn update_phase(&mut self, dt: f32) {
        match self.phase {
            Phase::Intro => self.update_intro(dt),
            Phase::Phase1Intro => {
                self.steer_player(dt);
                let speed = self.params.enemy.intro_slide_speed;
                if self.wave.live_count() == 0 || self.wave.slide_in(dt, speed) {
                    self.enter(Phase::Phase1);
                }
            }
            Phase::Phase1 => {
                self.steer_player(dt);
                if self.wave.live_count() == 0 {
                    self.start_boss_phase();
                    return;
                }
                let march = self.wave.march(
                    dt,
                    &self.params.enemy,
                    self.layout.width,
                    self.player.top(),
                );
                if march == March::Overrun {
                    self.handle_player_hit(true);
                }
            }
            Phase::BossIntro => {
                self.steer_player(dt);
                let speed = self.params.boss.intro_slide_speed;
                let arrived = self
                    .boss
                    .as_mut()
                    .map_or(false, |boss| boss.slide_in(dt, speed));
                if arrived {
                    self.enter(Phase::Boss);
                }
            }
            Phase::Boss => {
                self.steer_player(dt);
                if let Some(boss) = self.boss.as_mut() {
                    boss.sweep(dt, &self.params.boss, self.layout.width);
                }
            }
            Phase::Win | Phase::GameOver => {}
        }
    }

    fn steer_player(&mut self, dt: f32) {
        self.player
            .steer(dt, self.params.player.speed, &self.layout);
    }

    /// Scripted opening, steps may chain within a single frame
    fn update_intro(&mut self, dt: f32) {
        let intro = &self.params.intro;
        let spawn = self.layout.spawn;
        self.player.lock_sprite();
        self.intro.elapsed += dt;

        if self.intro.step == IntroStep::SlideIn {
            let y = (self.player.position().y - intro.player_slide_speed * dt).max(spawn.y);
            self.player.place(Point::new(spawn.x, y));
            if y <= spawn.y + 0.5 {
                self.player.place(spawn);
                self.intro.advance(IntroStep::Arrival);
            }
        }

        if self.intro.step == IntroStep::Arrival {
            let rest_y = self.layout.height * intro.boss_y_frac;
            let center = self
                .intro
                .boss
                .get_or_insert(Point::new(self.layout.width / 2.0, intro.boss_start_y));
            center.y = (center.y + intro.boss_slide_in_speed * dt).min(rest_y);
            if center.y >= rest_y && self.intro.elapsed >= intro.arrival_hold {
                self.player.place(spawn);
                self.intro.advance(IntroStep::Beat);
            }
        }

        if self.intro.step == IntroStep::Beat {
            self.player.freeze();
            if self.intro.elapsed >= intro.beat {
                self.intro.advance(IntroStep::SlideOut);
            }
        }

        if self.intro.step == IntroStep::SlideOut {
            let exit_y = intro.boss_exit_y;
            let gone = match self.intro.boss.as_mut() {
                Some(center) => {
                    center.y -= intro.boss_slide_out_speed * dt;
                    center.y < exit_y
                }
                None => true,
            };
            if gone {
                self.start_phase1();
            }
        }
    }

    fn start_phase1(&mut self) {
        if !self.enter(Phase::Phase1Intro) {
            return;
        }
        self.intro.boss = None;
        self.intro.advance(IntroStep::Done);
        self.player.unlock_sprite();
        self.wave = Wave::spawn(&self.params.enemy, &mut self.ids, &mut self.rng);
    }

    /// Wave cleared (or skipped): purge what's left of phase 1 and bring the
    /// boss in from above. A no-op outside phase 1, so simultaneous kills
    /// trigger it once.
    fn start_boss_phase(&mut self) {
        if self.phase != Phase::Phase1 || !self.enter(Phase::BossIntro) {
            return;
        }
        self.wave.clear();
        self.explosions.clear();
        self.bullets.retain(|bullet| {
            !matches!(bullet.kind, EntityKind::EnemyBullet | EntityKind::BossBullet)
        });
        let id = self.ids.next_id();
        self.boss = Some(Boss::spawn(
            id,
            &self.params.boss,
            &self.params.enemy.sprite_sheet,
            self.layout.boss_size,
            self.layout.width,
            self.layout.height * self.params.boss.y_frac,
        ));
    }

    fn update_entities(&mut self, dt: f32) {
        self.player.animate(dt);
        self.wave.animate(dt);
        if let Some(boss) = self.boss.as_mut() {
            boss.animation.update(dt);
        }
        if self.intro.boss.is_some() {
            self.intro_animation.update(dt);
        }
        let (width, height) = (self.layout.width, self.layout.height);
        for bullet in self.bullets.iter_mut() {
            bullet.update(dt);
        }
        self.bullets
            .retain(|bullet| bullet.alive && !bullet.is_offscreen(width, height));
        for explosion in self.explosions.iter_mut() {
            explosion.update(dt);
        }
        self.explosions.retain(|explosion| !explosion.is_expired());
    }

    // ==================== Damage ====================
    /// Ignored once the run is over. A lethal hit (or the last life) plays
    /// the death clip and ends the run, anything else flashes the damage clip
    /// and freezes the ship until it recovers.
    fn handle_player_hit(&mut self, lethal: bool) {
        if self.is_over() {
            return;
        }
        self.player.lock_sprite();
        let lives = self.player.take_hit(lethal);
        let sheets = &self.params.player.sprite_sheets;

        if lives == 0 {
            let death = Clip::from_sheet(&sheets.death, false).duration();
            self.emit(FrameEvent::Sound(Sfx::ShipDeath));
            self.player.show_death();
            self.enter(Phase::GameOver);
            self.scheduler
                .after(death + 0.05, Scope::Phase(Phase::GameOver), Task::ShowGameOver);
            return;
        }

        let recovery = self
            .params
            .player
            .hit_recovery_delay
            .max(Clip::from_sheet(&sheets.damage, false).duration());
        self.player.freeze();
        self.emit(FrameEvent::Sound(Sfx::ShipDamage));
        self.player.show_damage();
        // a second hit restarts the recovery
        self.scheduler.cancel(Task::RecoverFromHit);
        self.scheduler
            .after(recovery, Scope::Run, Task::RecoverFromHit);
    }

    fn destroy_enemy(&mut self, bullet: EntityId, enemy: EntityId) {
        self.kill_bullet(bullet);
        let Some(position) = self.wave.kill(enemy) else {
            return;
        };
        self.emit(FrameEvent::Sound(Sfx::EnemyDeath));
        let size = self.wave.size();
        let clip = Clip::from_sheet(&self.params.enemy.death_sprite_sheet, false);
        self.explosions.push(Explosion::new(
            Rect::new(position, Size::new(size, size)),
            clip,
        ));
        if self.wave.live_count() == 0 {
            self.start_boss_phase();
        }
    }

    fn damage_boss(&mut self, bullet: EntityId) {
        if self.phase != Phase::Boss {
            return;
        }
        if self.boss.is_none() {
            return;
        }
        self.kill_bullet(bullet);
        let Some(boss) = self.boss.as_mut() else {
            return;
        };
        if !boss.take_hit() {
            return;
        }

        let center = boss.position;
        self.boss = None;
        self.emit(FrameEvent::Sound(Sfx::EnemyDeath));
        self.bullets
            .retain(|bullet| bullet.kind != EntityKind::BossBullet);
        let clip = Clip::from_sheet(&self.params.enemy.death_sprite_sheet, false);
        self.explosions
            .push(Explosion::centered(center, self.layout.boss_size, clip));
        self.enter(Phase::Win);
        self.player.lock_sprite();
        self.player.settle();
        self.scheduler.after(
            Explosion::lifetime_for(&clip),
            Scope::Phase(Phase::Win),
            Task::ShowVictory,
        );
    }

    fn kill_bullet(&mut self, id: EntityId) {
        if let Some(bullet) = self.bullets.iter_mut().find(|bullet| bullet.id == id) {
            bullet.alive = false;
        }
    }

    // ==================== Collisions ====================
    fn bodies(&self) -> Vec<Body> {
        let mut bodies = vec![self.player.body()];
        bodies.extend(self.wave.bodies());
        bodies.extend(self.boss.as_ref().map(Boss::body));
        bodies.extend(
            self.bullets
                .iter()
                .filter(|bullet| bullet.alive)
                .map(Bullet::body),
        );
        bodies
    }

    fn is_alive(&self, (kind, id): (EntityKind, EntityId)) -> bool {
        match kind {
            EntityKind::Player => true,
            EntityKind::Enemy => self.wave.is_alive(id),
            EntityKind::Boss => self.boss.as_ref().map_or(false, |boss| boss.id == id),
            EntityKind::PlayerBullet | EntityKind::EnemyBullet | EntityKind::BossBullet => self
                .bullets
                .iter()
                .any(|bullet| bullet.id == id && bullet.alive),
        }
    }

    fn resolve_collisions(&mut self) {
        let bodies = self.bodies();
        for contact in self.contacts.begin_contacts(&bodies) {
            self.resolve(contact);
        }
        self.bullets.retain(|bullet| bullet.alive);
        self.wave.remove_dead();
    }

    /// Earlier contacts of the same frame may already have removed one side,
    /// those contacts are dropped
    fn resolve(&mut self, contact: Contact) {
        if !self.is_alive(contact.actor) || !self.is_alive(contact.target) {
            return;
        }
        let (actor, actor_id) = contact.actor;
        let (target, target_id) = contact.target;
        match (actor, target) {
            (EntityKind::PlayerBullet, EntityKind::Enemy) => {
                self.destroy_enemy(actor_id, target_id)
            }
            (EntityKind::PlayerBullet, EntityKind::Boss) => self.damage_boss(actor_id),
            (EntityKind::Enemy, EntityKind::Player) => self.handle_player_hit(false),
            (EntityKind::EnemyBullet, EntityKind::Player)
            | (EntityKind::BossBullet, EntityKind::Player) => {
                self.kill_bullet(actor_id);
                self.handle_player_hit(false);
            }
            (EntityKind::PlayerBullet, EntityKind::EnemyBullet) => {
                self.kill_bullet(actor_id);
                self.kill_bullet(target_id);
            }
            _ => {}
        }
    }

    /// Keeps the bars in step with the state they show
    fn sync_ui(&mut self) {
        let position = self.player.position();
        self.player_bar.set_center(Point::new(
            position.x,
            position.y + HealthBar::player_offset(self.layout.player_size),
        ));
        self.player_bar.set_ratio(self.player.health_ratio());
        self.player_bar.set_hidden(self.is_over());

        let show_boss = matches!(self.phase, Phase::BossIntro | Phase::Boss);
        match self.boss.as_ref() {
            Some(boss) if show_boss => {
                self.boss_bar.set_hidden(false);
                self.boss_bar.set_ratio(boss.health_ratio());
                self.boss_bar
                    .set_label(format!("{} / {}", boss.hp(), boss.max_hp()));
            }
            _ => self.boss_bar.set_hidden(true),
        }
    }
}

#[cfg(test)]
mod tests;
