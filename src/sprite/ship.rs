use crate::params::Params;
use crate::sprite::state::{ShipContext, ShipState};
use crate::sprite::{self, SpriteState};
use std::rc::Rc;

/// ┌──────────────── State Transition Flow ──────────────────┐
/// │  From State       →  Event    →  To State               │
/// ├─────────────────────────────────────────────────────────┤
/// │  Idle             →  Move     →  Moving                 │
/// │  Moving           →  Stop     →  Idle                   │
/// │  Idle/Moving      →  Hit      →  Damage                 │
/// │  Damage           →  Hit      →  Damage (replay)        │
/// │  Damage           →  Recover  →  Idle                   │
/// │  Idle/Moving/Dmg  →  Destroy  →  Death                  │
/// │  Moving/Damage    →  Settle   →  Idle (victory pose)    │
/// │  -------             ------                             │
/// │  any              →  Update   →  same state, clock runs │
/// └─────────────────────────────────────────────────────────┘
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Event {
    Move,
    Stop,
    Hit,
    Recover,
    Destroy,
    Settle,
    Update(f32),
}

#[derive(Debug, Copy, Clone)]
enum ShipStateMachine {
    Idle(ShipState<sprite::Idle>),
    Moving(ShipState<sprite::Moving>),
    Damage(ShipState<sprite::Damage>),
    Death(ShipState<sprite::Death>),
}

impl From<ShipState<sprite::Idle>> for ShipStateMachine {
    fn from(state: ShipState<sprite::Idle>) -> Self {
        ShipStateMachine::Idle(state)
    }
}

impl From<ShipState<sprite::Moving>> for ShipStateMachine {
    fn from(state: ShipState<sprite::Moving>) -> Self {
        ShipStateMachine::Moving(state)
    }
}

impl From<ShipState<sprite::Damage>> for ShipStateMachine {
    fn from(state: ShipState<sprite::Damage>) -> Self {
        ShipStateMachine::Damage(state)
    }
}

impl From<ShipState<sprite::Death>> for ShipStateMachine {
    fn from(state: ShipState<sprite::Death>) -> Self {
        ShipStateMachine::Death(state)
    }
}

impl ShipStateMachine {
    // consumes the old state, the previous value can't be observed after a
    // transition
    fn transition(self, event: Event, params: &Params) -> Self {
        use ShipStateMachine::*;
        let sheets = &params.player.sprite_sheets;
        match (self, event) {
            (Idle(state), Event::Move) => state.start_moving(sprite::Moving::clip(sheets)).into(),
            (Moving(state), Event::Stop) => state.stop(sprite::Idle::clip(sheets)).into(),
            (Idle(state), Event::Hit) => state.hit(sprite::Damage::clip(sheets)).into(),
            (Moving(state), Event::Hit) => state.hit(sprite::Damage::clip(sheets)).into(),
            (Damage(state), Event::Hit) => state.hit(sprite::Damage::clip(sheets)).into(),
            (Damage(state), Event::Recover) => state.recover(sprite::Idle::clip(sheets)).into(),
            (Idle(state), Event::Destroy) => state.destroy(sprite::Death::clip(sheets)).into(),
            (Moving(state), Event::Destroy) => state.destroy(sprite::Death::clip(sheets)).into(),
            (Damage(state), Event::Destroy) => state.destroy(sprite::Death::clip(sheets)).into(),
            (Moving(state), Event::Settle) => state.settle(sprite::Idle::clip(sheets)).into(),
            (Damage(state), Event::Settle) => state.settle(sprite::Idle::clip(sheets)).into(),
            (Idle(state), Event::Update(dt)) => state.update(dt).into(),
            (Moving(state), Event::Update(dt)) => state.update(dt).into(),
            (Damage(state), Event::Update(dt)) => state.update(dt).into(),
            (Death(state), Event::Update(dt)) => state.update(dt).into(),
            // everything else is not a legal move from the current state
            // (moving while dead, recovering while idle ...), keep it
            _ => self,
        }
    }

    fn context(&self) -> &ShipContext {
        use ShipStateMachine::*;
        match self {
            Idle(state) => state.context(),
            Moving(state) => state.context(),
            Damage(state) => state.context(),
            Death(state) => state.context(),
        }
    }

    fn name(&self) -> &'static str {
        use ShipStateMachine::*;
        match self {
            Idle(_) => sprite::Idle::name(),
            Moving(_) => sprite::Moving::name(),
            Damage(_) => sprite::Damage::name(),
            Death(_) => sprite::Death::name(),
        }
    }
}

/// The player ship's sprite : which sheet plays and at which frame
pub struct Ship {
    state: ShipStateMachine,
    params: Rc<Params>,
}

impl Ship {
    pub fn new(params: Rc<Params>) -> Self {
        let clip = sprite::Idle::clip(&params.player.sprite_sheets);
        Ship {
            state: ShipStateMachine::Idle(ShipState::new(clip)),
            params,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.transition(Event::Update(dt));
    }

    pub fn start_moving(&mut self) {
        self.transition(Event::Move);
    }

    pub fn stop(&mut self) {
        self.transition(Event::Stop);
    }

    pub fn hit(&mut self) {
        self.transition(Event::Hit);
    }

    pub fn recover(&mut self) {
        self.transition(Event::Recover);
    }

    pub fn destroy(&mut self) {
        self.transition(Event::Destroy);
    }

    pub fn settle(&mut self) {
        self.transition(Event::Settle);
    }

    fn transition(&mut self, event: Event) {
        self.state = self.state.transition(event, &self.params);
    }

    /// "idle" | "moving" | "damage" | "death"
    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn frame(&self) -> u32 {
        self.state.context().frame()
    }

    pub fn sheet_name(&self) -> &str {
        let sheets = &self.params.player.sprite_sheets;
        match self.state {
            ShipStateMachine::Idle(_) => &sprite::Idle::sheet(sheets).name,
            ShipStateMachine::Moving(_) => &sprite::Moving::sheet(sheets).name,
            ShipStateMachine::Damage(_) => &sprite::Damage::sheet(sheets).name,
            ShipStateMachine::Death(_) => &sprite::Death::sheet(sheets).name,
        }
    }

    #[cfg(test)]
    pub fn is_destroyed(&self) -> bool {
        matches!(self.state, ShipStateMachine::Death(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship() -> Ship {
        Ship::new(Rc::new(Params::default()))
    }

    #[test]
    fn starts_idle_on_the_idle_sheet() {
        let ship = ship();
        assert_eq!(ship.state_name(), "idle");
        assert_eq!(ship.sheet_name(), "playerIdle");
    }

    #[test]
    fn moving_and_stopping() {
        let mut ship = ship();
        ship.start_moving();
        assert_eq!(ship.state_name(), "moving");
        ship.stop();
        assert_eq!(ship.state_name(), "idle");
    }

    #[test]
    fn damage_ignores_movement_until_recovered() {
        let mut ship = ship();
        ship.hit();
        ship.start_moving();
        ship.stop();
        assert_eq!(ship.state_name(), "damage");
        ship.recover();
        assert_eq!(ship.state_name(), "idle");
    }

    #[test]
    fn death_is_final() {
        let mut ship = ship();
        ship.start_moving();
        ship.destroy();
        ship.recover();
        ship.hit();
        ship.settle();
        ship.start_moving();
        assert!(ship.is_destroyed());
        assert_eq!(ship.sheet_name(), "playerDeath");
    }

    #[test]
    fn transition_restarts_the_clip() {
        let mut ship = ship();
        ship.update(0.2);
        assert_ne!(ship.frame(), 0);
        ship.hit();
        assert_eq!(ship.frame(), 0);
        // one-shot damage clip holds its last frame
        ship.update(5.0);
        assert_eq!(ship.frame(), 3);
    }
}
