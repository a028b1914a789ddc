/// All code relating to individual ship states lives behind this module and
/// makes illegal states unrepresentable: a transition only exists as a method
/// on the state it may start from.
/// - PUBLIC  : ShipState and ShipContext
/// - PRIVATE : their fields
///
/// It doesn't know about ShipStateMachine, the machine only picks which of
/// these methods an event maps to.
use crate::sprite::{self, Animation, Clip};

#[derive(Debug, Copy, Clone)]
/// Shared data for every state : the frame clock of the current sheet
pub struct ShipContext {
    animation: Animation,
}

impl ShipContext {
    fn new(clip: Clip) -> Self {
        ShipContext {
            animation: Animation::new(clip),
        }
    }

    fn update(mut self, dt: f32) -> Self {
        self.animation.update(dt);
        self
    }

    /// Every state has its own sheet, so a transition restarts the clock on
    /// frame 0 of the new clip
    fn on_state_transition(self, clip: Clip) -> Self {
        ShipContext::new(clip)
    }

    pub fn frame(&self) -> u32 {
        self.animation.frame()
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }
}

#[derive(Debug, Copy, Clone)]
pub struct ShipState<S> {
    context: ShipContext,
    // phantom-style marker, only used to pick the impl block at compile time
    _state: S,
}

/// generic methods shared between all states
impl<S> ShipState<S> {
    pub fn context(&self) -> &ShipContext {
        &self.context
    }
}

impl ShipState<sprite::Idle> {
    pub fn new(clip: Clip) -> Self {
        ShipState {
            context: ShipContext::new(clip),
            _state: sprite::Idle,
        }
    }

    pub fn update(mut self, dt: f32) -> Self {
        self.context = self.context.update(dt);
        self
    }

    pub fn start_moving(self, clip: Clip) -> ShipState<sprite::Moving> {
        ShipState {
            context: self.context.on_state_transition(clip),
            _state: sprite::Moving,
        }
    }

    pub fn hit(self, clip: Clip) -> ShipState<sprite::Damage> {
        ShipState {
            context: self.context.on_state_transition(clip),
            _state: sprite::Damage,
        }
    }

    pub fn destroy(self, clip: Clip) -> ShipState<sprite::Death> {
        ShipState {
            context: self.context.on_state_transition(clip),
            _state: sprite::Death,
        }
    }
}

impl ShipState<sprite::Moving> {
    pub fn update(mut self, dt: f32) -> Self {
        self.context = self.context.update(dt);
        self
    }

    pub fn stop(self, clip: Clip) -> ShipState<sprite::Idle> {
        ShipState {
            context: self.context.on_state_transition(clip),
            _state: sprite::Idle,
        }
    }

    pub fn hit(self, clip: Clip) -> ShipState<sprite::Damage> {
        ShipState {
            context: self.context.on_state_transition(clip),
            _state: sprite::Damage,
        }
    }

    pub fn destroy(self, clip: Clip) -> ShipState<sprite::Death> {
        ShipState {
            context: self.context.on_state_transition(clip),
            _state: sprite::Death,
        }
    }

    pub fn settle(self, clip: Clip) -> ShipState<sprite::Idle> {
        self.stop(clip)
    }
}

impl ShipState<sprite::Damage> {
    /// The damage clip is one-shot and holds its last frame, leaving this
    /// state is driven by the recovery timer, not by the clip ending
    pub fn update(mut self, dt: f32) -> Self {
        self.context = self.context.update(dt);
        self
    }

    /// Hit again while still flashing, replay from the start
    pub fn hit(self, clip: Clip) -> ShipState<sprite::Damage> {
        ShipState {
            context: self.context.on_state_transition(clip),
            _state: sprite::Damage,
        }
    }

    pub fn recover(self, clip: Clip) -> ShipState<sprite::Idle> {
        ShipState {
            context: self.context.on_state_transition(clip),
            _state: sprite::Idle,
        }
    }

    pub fn destroy(self, clip: Clip) -> ShipState<sprite::Death> {
        ShipState {
            context: self.context.on_state_transition(clip),
            _state: sprite::Death,
        }
    }

    pub fn settle(self, clip: Clip) -> ShipState<sprite::Idle> {
        self.recover(clip)
    }
}

impl ShipState<sprite::Death> {
    pub fn update(mut self, dt: f32) -> Self {
        self.context = self.context.update(dt);
        self
    }
}
