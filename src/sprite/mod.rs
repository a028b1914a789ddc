// Sprite animation building blocks
// ┌────────────────┬──────────────────────────────────────────────────────┐
// │ mod.rs         │ Clip / Animation clocks + SpriteState marker trait   │
// │ state.rs       │ ShipState<S> typestates, only legal moves compile    │
// │ ship.rs        │ ShipStateMachine + Ship, the runtime facing wrapper  │
// └────────────────┴──────────────────────────────────────────────────────┘
pub mod ship;
pub mod state;

use crate::params::{PlayerSheets, SheetParams};

/// Playback description of one named animation in a sprite sheet
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Clip {
    pub frames: u32,
    /// frames per second
    pub speed: f32,
    pub looping: bool,
}

impl Clip {
    pub fn new(frames: u32, speed: f32, looping: bool) -> Self {
        Clip {
            frames: frames.max(1),
            speed,
            looping,
        }
    }

    pub fn from_sheet(sheet: &SheetParams, looping: bool) -> Self {
        Clip::new(sheet.frames, sheet.anim_speed, looping)
    }

    /// Seconds for one pass through the clip, speeds under 1 fps count as 1
    pub fn duration(&self) -> f32 {
        self.frames as f32 / self.speed.max(1.0)
    }
}

/// Frame clock for a single sprite instance
/// - `delay` : seconds before playback starts, `held_frame` shows meanwhile
/// - `speed_factor` : per instance multiplier so copies never run in lock-step
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Animation {
    clip: Clip,
    elapsed: f32,
    delay: f32,
    speed_factor: f32,
    held_frame: u32,
}

impl Animation {
    pub fn new(clip: Clip) -> Self {
        Animation {
            clip,
            elapsed: 0.0,
            delay: 0.0,
            speed_factor: 1.0,
            held_frame: 0,
        }
    }

    pub fn with_delay(mut self, delay: f32, held_frame: u32) -> Self {
        self.delay = delay.max(0.0);
        self.held_frame = held_frame % self.clip.frames;
        self
    }

    pub fn with_speed_factor(mut self, speed_factor: f32) -> Self {
        self.speed_factor = speed_factor.max(0.0);
        self
    }

    pub fn update(&mut self, dt: f32) {
        if self.delay > 0.0 {
            self.delay -= dt;
            if self.delay < 0.0 {
                // carry the overshoot into playback
                self.elapsed += -self.delay;
                self.delay = 0.0;
            }
            return;
        }
        self.elapsed += dt;
    }

    pub fn frame(&self) -> u32 {
        if self.delay > 0.0 {
            return self.held_frame;
        }
        let played = (self.elapsed * self.clip.speed * self.speed_factor).floor() as u32;
        if self.clip.looping {
            played % self.clip.frames
        } else {
            played.min(self.clip.frames - 1)
        }
    }

    pub fn is_finished(&self) -> bool {
        !self.clip.looping
            && self.delay <= 0.0
            && self.elapsed * self.clip.speed * self.speed_factor >= self.clip.frames as f32
    }
}

/// Marker types for the ship's sprite states, each one knows which sheet it
/// plays and whether it loops
pub trait SpriteState {
    fn name() -> &'static str;
    fn sheet(sheets: &PlayerSheets) -> &SheetParams;
    fn looping() -> bool;

    fn clip(sheets: &PlayerSheets) -> Clip {
        Clip::from_sheet(Self::sheet(sheets), Self::looping())
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Idle;
#[derive(Debug, Copy, Clone)]
pub struct Moving;
#[derive(Debug, Copy, Clone)]
pub struct Damage;
#[derive(Debug, Copy, Clone)]
pub struct Death;

impl SpriteState for Idle {
    fn name() -> &'static str {
        "idle"
    }
    fn sheet(sheets: &PlayerSheets) -> &SheetParams {
        &sheets.idle
    }
    fn looping() -> bool {
        true
    }
}

impl SpriteState for Moving {
    fn name() -> &'static str {
        "moving"
    }
    fn sheet(sheets: &PlayerSheets) -> &SheetParams {
        &sheets.moving
    }
    fn looping() -> bool {
        true
    }
}

impl SpriteState for Damage {
    fn name() -> &'static str {
        "damage"
    }
    fn sheet(sheets: &PlayerSheets) -> &SheetParams {
        &sheets.damage
    }
    fn looping() -> bool {
        false
    }
}

impl SpriteState for Death {
    fn name() -> &'static str {
        "death"
    }
    fn sheet(sheets: &PlayerSheets) -> &SheetParams {
        &sheets.death
    }
    fn looping() -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn clip_duration_clamps_slow_speeds() {
        assert_relative_eq!(Clip::new(4, 12.0, false).duration(), 4.0 / 12.0);
        assert_relative_eq!(Clip::new(3, 0.5, false).duration(), 3.0);
    }

    #[test]
    fn looping_animation_wraps() {
        let mut animation = Animation::new(Clip::new(4, 8.0, true));
        animation.update(0.5);
        assert_eq!(animation.frame(), 0);
        animation.update(0.125);
        assert_eq!(animation.frame(), 1);
        assert!(!animation.is_finished());
    }

    #[test]
    fn one_shot_animation_holds_last_frame() {
        let mut animation = Animation::new(Clip::new(3, 14.0, false));
        animation.update(1.0);
        assert_eq!(animation.frame(), 2);
        assert!(animation.is_finished());
    }

    #[test]
    fn delayed_animation_shows_held_frame_then_carries_overshoot() {
        let mut animation = Animation::new(Clip::new(24, 10.0, true)).with_delay(0.5, 7);
        animation.update(0.25);
        assert_eq!(animation.frame(), 7);
        animation.update(0.4);
        // 0.15s into playback at 10 fps
        assert_eq!(animation.frame(), 1);
    }

    #[test]
    fn speed_factor_scales_playback() {
        let mut animation = Animation::new(Clip::new(10, 10.0, true)).with_speed_factor(2.0);
        animation.update(0.25);
        assert_eq!(animation.frame(), 5);
    }
}
