//! Developer shortcuts, compiled into every build but only honoured in debug
//! builds with `debug.phaseSwitch` on.
//! - `1` : restart the run
//! - `2` : jump from phase 1 straight to the boss
use crate::engine::input::{InputState, KEY_DEBUG_BOSS, KEY_DEBUG_RESTART};
use crate::params::DebugParams;
#[cfg(debug_assertions)]
use crate::engine::{DebugDraw, Renderer};
#[cfg(debug_assertions)]
use crate::world::World;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DebugCommand {
    Restart,
    SkipToBoss,
}

pub fn command(params: &DebugParams, input: &InputState) -> Option<DebugCommand> {
    command_for_build(cfg!(debug_assertions), params, input)
}

fn command_for_build(
    debug_build: bool,
    params: &DebugParams,
    input: &InputState,
) -> Option<DebugCommand> {
    if !debug_build || !params.phase_switch {
        return None;
    }
    if input.was_pressed(KEY_DEBUG_RESTART) {
        Some(DebugCommand::Restart)
    } else if input.was_pressed(KEY_DEBUG_BOSS) {
        Some(DebugCommand::SkipToBoss)
    } else {
        None
    }
}

/// Outlines every collision box
#[cfg(debug_assertions)]
pub fn draw_hitboxes(world: &World, renderer: &Renderer) {
    if !world.params().debug.hitboxes {
        return;
    }
    world.player().rect().draw_debug(renderer);
    let size = world.wave().size();
    for enemy in world.wave().enemies() {
        enemy.rect(size).draw_debug(renderer);
    }
    if let Some(boss) = world.boss() {
        boss.rect().draw_debug(renderer);
    }
    for bullet in world.bullets() {
        bullet.rect.draw_debug(renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::InputEvent;

    fn pressed(code: &str) -> InputState {
        let mut input = InputState::default();
        input.apply(InputEvent::KeyDown(code.to_string()));
        input
    }

    #[test]
    fn hotkeys_map_to_commands() {
        let params = DebugParams::default();
        assert_eq!(
            command_for_build(true, &params, &pressed(KEY_DEBUG_RESTART)),
            Some(DebugCommand::Restart)
        );
        assert_eq!(
            command_for_build(true, &params, &pressed(KEY_DEBUG_BOSS)),
            Some(DebugCommand::SkipToBoss)
        );
        assert_eq!(command_for_build(true, &params, &pressed("KeyX")), None);
    }

    #[test]
    fn hotkeys_need_a_debug_build_and_the_switch() {
        let mut params = DebugParams::default();
        let input = pressed(KEY_DEBUG_BOSS);
        assert_eq!(command_for_build(false, &params, &input), None);
        params.phase_switch = false;
        assert_eq!(command_for_build(true, &params, &input), None);
    }
}
