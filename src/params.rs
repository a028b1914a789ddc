//! Every tunable of the game in one immutable tree.
//!
//! `Params::default()` is the shipped tuning. The page may hand a partial
//! override object to `main_js_with_params`; missing fields keep their
//! defaults. Sprite sheet entries are leaf records, override them whole.
//!
//! Asset paths are relative to the page ("static-bg.png", no leading "/").

use crate::engine::Rgb;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// `[min, max]`
pub type Range2 = [f32; 2];

/// Uniform draw from `[min, max)`, a collapsed or inverted range yields `min`
pub fn pick<R: Rng + ?Sized>(rng: &mut R, range: Range2) -> f32 {
    let [min, max] = range;
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StarColor {
    Blue,
    Green,
    Purple,
    Yellow,
}

impl StarColor {
    pub const ALL: [StarColor; 4] = [
        StarColor::Blue,
        StarColor::Green,
        StarColor::Purple,
        StarColor::Yellow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StarColor::Blue => "blue",
            StarColor::Green => "green",
            StarColor::Purple => "purple",
            StarColor::Yellow => "yellow",
        }
    }

    /// Tint of the plain square stars of that colour
    pub fn tint(&self) -> Rgb {
        match self {
            StarColor::Blue => Rgb(90, 175, 255),
            StarColor::Green => Rgb(130, 255, 190),
            StarColor::Purple => Rgb(205, 140, 255),
            StarColor::Yellow => Rgb(255, 235, 150),
        }
    }
}

/// "twinkling-star" + Blue -> "twinkling-star-blue"
pub fn star_sprite_name(prefix: &str, color: StarColor) -> String {
    format!("{}-{}", prefix, color.name())
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Params {
    pub debug: DebugParams,
    pub canvas: CanvasParams,
    pub music: SoundParams,
    pub sounds: SoundTable,
    pub background: BackgroundParams,
    pub player: PlayerParams,
    pub enemy: EnemyParams,
    pub enemy_fire: EnemyFireParams,
    pub boss: BossParams,
    pub intro: IntroParams,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            debug: DebugParams::default(),
            canvas: CanvasParams::default(),
            music: SoundParams::new("bgm-track-1", "musics/track-1.mp3", 0.35),
            sounds: SoundTable::default(),
            background: BackgroundParams::default(),
            player: PlayerParams::default(),
            enemy: EnemyParams::default(),
            enemy_fire: EnemyFireParams::default(),
            boss: BossParams::default(),
            intro: IntroParams::default(),
        }
    }
}

/// Only honoured in debug builds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebugParams {
    pub phase_switch: bool,
    pub hitboxes: bool,
}

impl Default for DebugParams {
    fn default() -> Self {
        DebugParams {
            phase_switch: true,
            hitboxes: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasParams {
    pub width: f32,
    pub height: f32,
    pub background: Rgb,
}

impl Default for CanvasParams {
    fn default() -> Self {
        CanvasParams {
            width: 375.0,
            height: 667.0,
            // #222034
            background: Rgb(34, 32, 52),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SoundParams {
    pub name: String,
    pub url: String,
    pub volume: f32,
}

impl SoundParams {
    fn new(name: &str, url: &str, volume: f32) -> Self {
        SoundParams {
            name: name.to_string(),
            url: url.to_string(),
            volume,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SoundTable {
    pub ship_fire: SoundParams,
    pub ship_damage: SoundParams,
    pub ship_death: SoundParams,
    pub enemy_fire: SoundParams,
    pub enemy_death: SoundParams,
}

impl Default for SoundTable {
    fn default() -> Self {
        SoundTable {
            ship_fire: SoundParams::new("sfx-ship-fire", "sounds/ship-fire.wav", 0.6),
            ship_damage: SoundParams::new("sfx-ship-damage", "sounds/ship-damage.wav", 0.7),
            ship_death: SoundParams::new("sfx-ship-death", "sounds/ship-death.wav", 0.8),
            enemy_fire: SoundParams::new("sfx-enemy-fire", "sounds/enemy-fire.wav", 0.55),
            enemy_death: SoundParams::new("sfx-enemy-death", "sounds/enemy-death.wav", 0.65),
        }
    }
}

impl SoundTable {
    pub fn all(&self) -> [&SoundParams; 5] {
        [
            &self.ship_fire,
            &self.ship_damage,
            &self.ship_death,
            &self.enemy_fire,
            &self.enemy_death,
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageParams {
    pub name: String,
    pub url: String,
    pub width: f32,
    pub height: f32,
}

impl ImageParams {
    fn new(name: &str, url: &str, width: f32, height: f32) -> Self {
        ImageParams {
            name: name.to_string(),
            url: url.to_string(),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundParams {
    pub show_earth: bool,
    pub parallax: ParallaxParams,
    pub static_bg: ImageParams,
    pub earth: ImageParams,
    pub moon: ImageParams,
    pub stars: StarParams,
}

impl Default for BackgroundParams {
    fn default() -> Self {
        BackgroundParams {
            show_earth: false,
            parallax: ParallaxParams::default(),
            static_bg: ImageParams::new("static-bg", "static-bg.png", 256.0, 640.0),
            earth: ImageParams::new("earth", "earth.png", 256.0, 44.0),
            moon: ImageParams::new("moon", "moon-tile.png", 64.0, 64.0),
            stars: StarParams::default(),
        }
    }
}

/// Screen-space parallax factors, stars wrap, moon and earth only shift
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParallaxParams {
    pub static_bg: f32,
    pub moon: f32,
    /// vertical factor of the moon, relative to the ship spawn Y
    pub moon_y: f32,
    pub earth: f32,
    pub wrap_margin: f32,
    pub stars: StarParallax,
}

impl Default for ParallaxParams {
    fn default() -> Self {
        ParallaxParams {
            static_bg: 0.0,
            moon: 0.25,
            moon_y: 0.18,
            earth: 0.12,
            wrap_margin: 80.0,
            stars: StarParallax::default(),
        }
    }
}

/// Distant layers, they should move far less than the moon
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StarParallax {
    #[serde(rename = "static")]
    pub fixed: f32,
    pub animated: f32,
    pub exploding: f32,
    pub shooting: f32,
}

impl Default for StarParallax {
    fn default() -> Self {
        StarParallax {
            fixed: 0.02,
            animated: 0.025,
            exploding: 0.03,
            shooting: 0.03,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimatedStarParams {
    pub file_prefix: String,
    pub frame_size: f32,
    pub frames: u32,
    pub anim_name: String,
    pub speed: f32,
    pub speed_variance: f32,
}

impl AnimatedStarParams {
    fn new(
        file_prefix: &str,
        frame_size: f32,
        anim_name: &str,
        speed: f32,
        speed_variance: f32,
    ) -> Self {
        AnimatedStarParams {
            file_prefix: file_prefix.to_string(),
            frame_size,
            frames: 24,
            anim_name: anim_name.to_string(),
            speed,
            speed_variance,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShootingStarParams {
    pub name: String,
    pub url: String,
    pub frame_width: f32,
    pub frame_height: f32,
    pub frames: u32,
    pub anim_name: String,
    pub speed: f32,
    pub travel_time_range: Range2,
}

impl Default for ShootingStarParams {
    fn default() -> Self {
        ShootingStarParams {
            name: "shooting-star".to_string(),
            url: "Shooting-star.png".to_string(),
            frame_width: 36.0,
            frame_height: 33.0,
            frames: 8,
            anim_name: "shoot".to_string(),
            speed: 14.0,
            travel_time_range: [0.65, 1.1],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StarParams {
    pub colors: Vec<StarColor>,
    pub twinkling: AnimatedStarParams,
    pub pulsing: AnimatedStarParams,
    pub exploding: AnimatedStarParams,
    pub shooting: ShootingStarParams,
    pub twinkling_star_count: usize,
    pub pulsing_star_count: usize,
    pub static_star_count: usize,
    pub star_scale: f32,
    pub grid_cell_size_px: f32,
    pub static_star_size_range: Range2,
    pub animated_star_start_delay_range: Range2,
    pub shooting_star_interval_range: Range2,
    pub exploding_star_interval_range: Range2,
}

impl Default for StarParams {
    fn default() -> Self {
        StarParams {
            colors: StarColor::ALL.to_vec(),
            twinkling: AnimatedStarParams::new("twinkling-star", 9.0, "twinkle", 8.0, 0.35),
            pulsing: AnimatedStarParams::new("pulsing-star", 9.0, "pulse", 6.0, 0.3),
            exploding: AnimatedStarParams::new("exploding-star", 15.0, "explode", 18.0, 0.25),
            shooting: ShootingStarParams::default(),
            twinkling_star_count: 6,
            pulsing_star_count: 6,
            static_star_count: 90,
            star_scale: 2.0,
            grid_cell_size_px: 64.0,
            static_star_size_range: [1.0, 2.0],
            animated_star_start_delay_range: [0.0, 2.25],
            shooting_star_interval_range: [1.2, 3.2],
            exploding_star_interval_range: [0.9, 2.0],
        }
    }
}

/// One sprite sheet and the single named clip it plays
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetParams {
    pub name: String,
    pub url: String,
    pub slice_x: u32,
    pub slice_y: u32,
    pub frames: u32,
    pub frame_width: f32,
    pub frame_height: f32,
    pub anim_name: String,
    pub anim_speed: f32,
    /// random playback start delay per instance
    pub anim_start_delay_range: Range2,
    /// per instance speed factor is drawn from `1 ± variance`
    pub anim_speed_variance: f32,
}

impl SheetParams {
    fn strip(
        name: &str,
        url: &str,
        frames: u32,
        frame_size: f32,
        anim_name: &str,
        anim_speed: f32,
    ) -> Self {
        SheetParams {
            name: name.to_string(),
            url: url.to_string(),
            slice_x: frames,
            slice_y: 1,
            frames,
            frame_width: frame_size,
            frame_height: frame_size,
            anim_name: anim_name.to_string(),
            anim_speed,
            anim_start_delay_range: [0.0, 0.0],
            anim_speed_variance: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerSheets {
    pub idle: SheetParams,
    pub moving: SheetParams,
    /// non-lethal hit
    pub damage: SheetParams,
    /// lethal hit
    pub death: SheetParams,
}

impl Default for PlayerSheets {
    fn default() -> Self {
        PlayerSheets {
            idle: SheetParams::strip("playerIdle", "ship-idle.png", 4, 40.0, "idle", 8.0),
            moving: SheetParams::strip("playerMoving", "ship-moving.png", 4, 40.0, "moving", 8.0),
            damage: SheetParams::strip("playerDamage", "ship-damage.png", 4, 40.0, "damage", 12.0),
            death: SheetParams::strip("playerDeath", "ship-death.png", 4, 40.0, "death", 12.0),
        }
    }
}

impl PlayerSheets {
    pub fn all(&self) -> [&SheetParams; 4] {
        [&self.idle, &self.moving, &self.damage, &self.death]
    }
}

/// Pointer-follow steering is limited to a band at the bottom of the screen
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MovementParams {
    pub zone_height_frac: f32,
    pub bottom_pad_px: f32,
}

impl Default for MovementParams {
    fn default() -> Self {
        MovementParams {
            zone_height_frac: 0.1,
            bottom_pad_px: 6.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BulletSpriteParams {
    pub name: String,
    pub url: String,
    pub scale: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for BulletSpriteParams {
    fn default() -> Self {
        BulletSpriteParams {
            name: "playerBullet".to_string(),
            url: "player-bullet.png".to_string(),
            scale: 1.0,
            width: 6.0,
            height: 12.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerParams {
    pub width: f32,
    pub height: f32,
    /// px per second toward the pointer
    pub speed: f32,
    pub movement: MovementParams,
    /// 0 disables auto-fire
    pub auto_fire_shots_per_second: f32,
    pub bullet_speed: f32,
    pub bullet_sprite: BulletSpriteParams,
    pub lives: u32,
    pub spawn_offset: f32,
    /// lower bound of the post-hit recovery, the damage clip may be longer
    pub hit_recovery_delay: f32,
    pub sprite_sheets: PlayerSheets,
}

impl Default for PlayerParams {
    fn default() -> Self {
        PlayerParams {
            width: 40.0,
            height: 40.0,
            speed: 300.0,
            movement: MovementParams::default(),
            auto_fire_shots_per_second: 2.0,
            bullet_speed: 500.0,
            bullet_sprite: BulletSpriteParams::default(),
            lives: 5,
            spawn_offset: 40.0,
            hit_recovery_delay: 0.5,
            sprite_sheets: PlayerSheets::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnemyParams {
    pub rows: usize,
    pub cols: usize,
    pub spacing: f32,
    pub start_y: f32,
    pub intro_slide_speed: f32,
    pub size: f32,
    pub drop_distance: f32,
    pub horizontal_padding: f32,
    pub speed: f32,
    pub sprite_sheet: SheetParams,
    pub death_sprite_sheet: SheetParams,
}

impl Default for EnemyParams {
    fn default() -> Self {
        let mut march =
            SheetParams::strip("alienFleet", "alien-1-idle.png", 24, 32.0, "march", 12.0);
        march.anim_start_delay_range = [0.0, 0.8];
        march.anim_speed_variance = 0.25;
        EnemyParams {
            rows: 4,
            cols: 8,
            spacing: 40.0,
            start_y: 60.0,
            intro_slide_speed: 260.0,
            size: 24.0,
            drop_distance: 15.0,
            horizontal_padding: 20.0,
            speed: 50.0,
            sprite_sheet: march,
            death_sprite_sheet: SheetParams::strip(
                "alienDeath",
                "alien-1-death.png",
                3,
                32.0,
                "death",
                14.0,
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnemyFireParams {
    pub interval: f32,
    pub bullet_speed: f32,
}

impl Default for EnemyFireParams {
    fn default() -> Self {
        EnemyFireParams {
            interval: 1.5,
            bullet_speed: 250.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BossParams {
    pub hp: u32,
    /// the boss is the regular enemy sheet, scaled up
    pub scale_multiplier: f32,
    pub intro_slide_speed: f32,
    pub speed: f32,
    pub y_frac: f32,
    pub sweep_padding: f32,
    pub bob_amp: f32,
    pub bob_speed: f32,
    pub shoot_interval: f32,
    pub bullet_speed: f32,
    pub spread_count: u32,
    pub spread_angle_deg: f32,
}

impl Default for BossParams {
    fn default() -> Self {
        BossParams {
            hp: 30,
            scale_multiplier: 4.0,
            intro_slide_speed: 220.0,
            speed: 85.0,
            y_frac: 0.22,
            sweep_padding: 22.0,
            bob_amp: 6.0,
            bob_speed: 2.1,
            shoot_interval: 1.5,
            bullet_speed: 260.0,
            spread_count: 3,
            spread_angle_deg: 55.0,
        }
    }
}

/// Opening cutscene timeline
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntroParams {
    pub player_slide_speed: f32,
    /// how far below the screen the ship starts
    pub player_start_offset: f32,
    pub boss_start_y: f32,
    pub boss_slide_in_speed: f32,
    pub boss_y_frac: f32,
    /// seconds into the arrival step before the beat may start
    pub arrival_hold: f32,
    pub beat: f32,
    pub boss_slide_out_speed: f32,
    pub boss_exit_y: f32,
}

impl Default for IntroParams {
    fn default() -> Self {
        IntroParams {
            player_slide_speed: 320.0,
            player_start_offset: 80.0,
            boss_start_y: -140.0,
            boss_slide_in_speed: 220.0,
            boss_y_frac: 0.22,
            arrival_hold: 0.9,
            beat: 1.0,
            boss_slide_out_speed: 260.0,
            boss_exit_y: -200.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_survives_empty_ranges() {
        use rand::{rngs::StdRng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pick(&mut rng, [0.0, 0.0]), 0.0);
        assert_eq!(pick(&mut rng, [2.0, 1.0]), 2.0);
        let value = pick(&mut rng, [1.2, 3.2]);
        assert!((1.2..3.2).contains(&value));
    }

    #[test]
    fn star_names_combine_prefix_and_color() {
        assert_eq!(
            star_sprite_name("pulsing-star", StarColor::Purple),
            "pulsing-star-purple"
        );
    }

    #[test]
    fn defaults_match_the_shipped_tuning() {
        let params = Params::default();
        assert_eq!(params.canvas.width, 375.0);
        assert_eq!(params.enemy.rows * params.enemy.cols, 32);
        assert_eq!(params.boss.hp, 30);
        assert_eq!(params.player.lives, 5);
        assert_eq!(params.background.stars.colors.len(), 4);
        assert_eq!(params.enemy.sprite_sheet.anim_name, "march");
        assert_eq!(params.music.url, "musics/track-1.mp3");
    }
}
