use crate::assets::{self, Assets, BrowserLoader};
use crate::background::{Drawable, StarLook};
use crate::debug::{self, DebugCommand};
use crate::engine::input::{InputState, KEY_RESTART};
use crate::engine::{Game, Point, Rect, Renderer, Rgb, Size, Sound, SpriteSheet, FRAME_SECONDS};
use crate::params::Params;
use crate::world::collision::EntityKind;
use crate::world::{FrameEvent, World};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::rc::Rc;
use web_sys::HtmlImageElement;

/// Architecture
/// +-----------+  input   +---------------+  tick    +-------------+
/// | GameLoop  |--------->| SpaceInvaders |--------->| World       |
/// | 60 Hz     |          | update/draw   |<---------| (no web)    |
/// +-----------+          +---------------+  events  +-------------+
///
/// 1. initialize() loads the asset manifest, then builds a World
/// 2. update() : hotkeys, aim, World::tick, drained events become sounds
/// 3. draw() : background, entities, bars, banner
pub enum SpaceInvaders {
    /// Parameters are known, assets are not loaded yet
    /// Transition to `Loaded` once initialization is complete
    Loading(Rc<Params>),

    /// Running scene
    Loaded(Invaders),
}

impl SpaceInvaders {
    pub fn new(params: Rc<Params>) -> Self {
        SpaceInvaders::Loading(params)
    }
}

#[async_trait(?Send)]
impl Game for SpaceInvaders {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            SpaceInvaders::Loading(params) => {
                let loader = BrowserLoader {
                    screen: Size::new(params.canvas.width, params.canvas.height),
                };
                let manifest = assets::manifest(params);
                let assets = assets::load_assets(&loader, &manifest).await?;
                log!("loaded {} assets", assets.len());
                Ok(Box::new(SpaceInvaders::Loaded(Invaders::new(
                    params.clone(),
                    Media::from(assets),
                ))))
            }
            SpaceInvaders::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, input: &InputState) {
        if let SpaceInvaders::Loaded(invaders) = self {
            invaders.update(input);
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let SpaceInvaders::Loaded(invaders) = self {
            invaders.draw(renderer);
        }
    }
}

/// Loaded assets, looked up by the names the parameters give them
pub struct Media {
    images: HashMap<String, HtmlImageElement>,
    sheets: HashMap<String, SpriteSheet>,
    sounds: HashMap<String, Sound>,
}

impl From<Assets<HtmlImageElement, Sound>> for Media {
    fn from(assets: Assets<HtmlImageElement, Sound>) -> Self {
        Media {
            images: assets.images,
            sheets: assets
                .sheets
                .into_iter()
                .map(|(name, sheet)| {
                    (name, SpriteSheet::new(sheet.image, sheet.columns, sheet.rows))
                })
                .collect(),
            sounds: assets.sounds,
        }
    }
}

pub struct Invaders {
    params: Rc<Params>,
    world: World,
    media: Media,
    /// browsers only allow audio after a user gesture
    music_started: bool,
}

impl Invaders {
    fn new(params: Rc<Params>, media: Media) -> Self {
        Invaders {
            world: World::new(params.clone(), StdRng::from_entropy()),
            params,
            media,
            music_started: false,
        }
    }

    fn update(&mut self, input: &InputState) {
        match debug::command(&self.params.debug, input) {
            Some(DebugCommand::Restart) => self.restart(),
            Some(DebugCommand::SkipToBoss) => self.world.skip_to_boss(),
            None => {}
        }
        if self.world.accepts_restart() && (input.was_pressed(KEY_RESTART) || input.pressed()) {
            self.restart();
        }
        if input.pressed() && !self.music_started {
            self.start_music();
        }

        if let Some(point) = input.aim() {
            self.world.aim(point);
        }
        self.world.tick(FRAME_SECONDS);
        for event in self.world.drain_events() {
            self.handle(event);
        }
    }

    /// A fresh World drops every entity and pending task of the old run
    fn restart(&mut self) {
        log!("restart");
        self.stop_music();
        self.world = World::new(self.params.clone(), StdRng::from_entropy());
    }

    fn handle(&mut self, event: FrameEvent) {
        match event {
            FrameEvent::Sound(sfx) => {
                let sound = sfx.params(&self.params.sounds);
                if let Some(element) = self.media.sounds.get(&sound.name) {
                    if let Err(err) = element.play(sound.volume) {
                        error!("[game.rs::handle] {:#?}", err);
                    }
                }
            }
            FrameEvent::StopMusic => self.stop_music(),
            FrameEvent::PhaseChanged(phase) => log!("phase -> {}", phase),
        }
    }

    fn start_music(&mut self) {
        self.music_started = true;
        let music = &self.params.music;
        if let Some(element) = self.media.sounds.get(&music.name) {
            if let Err(err) = element.play_looping(music.volume) {
                error!("[game.rs::start_music] {:#?}", err);
            }
        }
    }

    fn stop_music(&mut self) {
        self.music_started = false;
        if let Some(element) = self.media.sounds.get(&self.params.music.name) {
            if let Err(err) = element.stop() {
                error!("[game.rs::stop_music] {:#?}", err);
            }
        }
    }

    fn draw_sheet(
        &self,
        renderer: &Renderer,
        name: &str,
        frame: u32,
        destination: &Rect,
        alpha: f32,
    ) {
        if let Some(sheet) = self.media.sheets.get(name) {
            sheet.draw(renderer, frame, destination, alpha);
        }
    }

    fn draw(&self, renderer: &Renderer) {
        let screen = Rect::new(Point::default(), self.world.layout().screen());
        renderer.clear(&screen);
        renderer.fill_rect(&screen, self.params.canvas.background, 1.0);

        // Draw order matters : background -> entities -> ui
        self.draw_background(renderer);
        self.draw_enemies(renderer);
        self.draw_bullets(renderer);

        let explosions = &self.params.enemy.death_sprite_sheet.name;
        for explosion in self.world.explosions() {
            let frame = explosion.animation.frame();
            self.draw_sheet(renderer, explosions, frame, &explosion.rect, 1.0);
        }

        let player = self.world.player();
        let ship = player.ship();
        self.draw_sheet(renderer, ship.sheet_name(), ship.frame(), &player.rect(), 1.0);

        self.world.player_bar().draw(renderer);
        self.world.boss_bar().draw(renderer);
        if let Some(banner) = self.world.banner() {
            banner.draw(renderer, self.world.layout().screen());
        }

        #[cfg(debug_assertions)]
        debug::draw_hitboxes(&self.world, renderer);
    }

    fn draw_background(&self, renderer: &Renderer) {
        for drawable in self.world.background().drawables() {
            match drawable {
                Drawable::Decor(decor) => {
                    if let Some(image) = self.media.images.get(&decor.name) {
                        let destination = Rect::from_center(decor.position, decor.size);
                        renderer.draw_image(image, &whole(image), &destination, 1.0);
                    }
                }
                Drawable::Star(star) => match &star.look {
                    StarLook::Square { size, color } => renderer.fill_rect(
                        &Rect::from_center(star.position, Size::new(*size, *size)),
                        *color,
                        star.opacity,
                    ),
                    StarLook::Sprite {
                        sheet,
                        animation,
                        scale,
                    } => {
                        if let Some(sprite) = self.media.sheets.get(sheet) {
                            let size = sprite.frame_size().scaled(*scale);
                            let destination = Rect::from_center(star.position, size);
                            sprite.draw(renderer, animation.frame(), &destination, star.opacity);
                        }
                    }
                },
            }
        }
    }

    fn draw_enemies(&self, renderer: &Renderer) {
        let march = &self.params.enemy.sprite_sheet.name;
        let wave = self.world.wave();
        for enemy in wave.enemies() {
            let destination = enemy.rect(wave.size());
            self.draw_sheet(renderer, march, enemy.animation.frame(), &destination, 1.0);
        }
        if let Some(boss) = self.world.boss() {
            self.draw_sheet(renderer, march, boss.animation.frame(), &boss.rect(), 1.0);
        }
        if let Some((center, animation)) = self.world.intro_boss() {
            let destination = Rect::from_center(center, self.world.layout().boss_size);
            self.draw_sheet(renderer, march, animation.frame(), &destination, 1.0);
        }
    }

    fn draw_bullets(&self, renderer: &Renderer) {
        let sprite = &self.params.player.bullet_sprite;
        for bullet in self.world.bullets() {
            match bullet.kind {
                EntityKind::PlayerBullet => match self.media.images.get(&sprite.name) {
                    Some(image) => renderer.draw_image(image, &whole(image), &bullet.rect, 1.0),
                    None => renderer.fill_rect(&bullet.rect, Rgb(255, 255, 255), 1.0),
                },
                EntityKind::EnemyBullet => renderer.fill_rect(&bullet.rect, Rgb(255, 165, 0), 1.0),
                EntityKind::BossBullet => renderer.fill_rect(&bullet.rect, Rgb(255, 60, 60), 1.0),
                _ => {}
            }
        }
    }
}

/// Source rect covering the entire image
fn whole(image: &HtmlImageElement) -> Rect {
    Rect::new(
        Point::default(),
        Size::new(image.natural_width() as f32, image.natural_height() as f32),
    )
}
