use std::fmt;

/// ┌──────────────────── Phase Transition Flow ─────────────────────┐
/// │  From           →  Trigger                  →  To              │
/// ├────────────────────────────────────────────────────────────────┤
/// │  Intro          →  cutscene boss left       →  Phase1Intro     │
/// │  Phase1Intro    →  every enemy in formation →  Phase1          │
/// │  Phase1         →  last enemy destroyed     →  BossIntro       │
/// │  BossIntro      →  boss at its resting Y    →  Boss            │
/// │  Boss           →  boss hp reaches 0        →  Win             │
/// │  any non-final  →  lives reach 0            →  GameOver        │
/// └────────────────────────────────────────────────────────────────┘
/// Win and GameOver are final, only a restart (a new World) leaves them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    Intro,
    Phase1Intro,
    Phase1,
    BossIntro,
    Boss,
    Win,
    GameOver,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Win | Phase::GameOver)
    }

    pub fn can_advance_to(&self, next: Phase) -> bool {
        use Phase::*;
        match (self, next) {
            (Intro, Phase1Intro)
            | (Phase1Intro, Phase1)
            | (Phase1, BossIntro)
            | (BossIntro, Boss)
            | (Boss, Win) => true,
            (from, GameOver) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Player auto-fire only lands during the combat phases
    pub fn is_combat(&self) -> bool {
        matches!(self, Phase::Phase1 | Phase::Boss)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Phase::Intro => "intro",
            Phase::Phase1Intro => "phase1Intro",
            Phase::Phase1 => "phase1",
            Phase::BossIntro => "bossIntro",
            Phase::Boss => "boss",
            Phase::Win => "win",
            Phase::GameOver => "gameOver",
        };
        write!(f, "{}", name)
    }
}

/// Steps of the scripted opening, each one with its own local clock
/// - SlideIn   : ship rises from below the screen to its spawn point
/// - Arrival   : cutscene boss drops in, the ship holds still
/// - Beat      : short pause, the boss "calls its minions"
/// - SlideOut  : boss leaves through the top, then the wave starts
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IntroStep {
    SlideIn,
    Arrival,
    Beat,
    SlideOut,
    Done,
}

#[derive(Debug, Clone)]
pub struct Intro {
    pub step: IntroStep,
    /// seconds since the current step started
    pub elapsed: f32,
    /// centre of the cutscene boss, only present while it is on stage
    pub boss: Option<crate::engine::Point>,
}

impl Default for Intro {
    fn default() -> Self {
        Intro {
            step: IntroStep::SlideIn,
            elapsed: 0.0,
            boss: None,
        }
    }
}

impl Intro {
    pub fn advance(&mut self, step: IntroStep) {
        self.step = step;
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_only_move_forward() {
        assert!(Phase::Intro.can_advance_to(Phase::Phase1Intro));
        assert!(Phase::Boss.can_advance_to(Phase::Win));
        assert!(!Phase::Phase1.can_advance_to(Phase::Phase1Intro));
        assert!(!Phase::Intro.can_advance_to(Phase::Boss));
        assert!(!Phase::Phase1.can_advance_to(Phase::Phase1));
    }

    #[test]
    fn game_over_is_reachable_from_every_running_phase() {
        for phase in [
            Phase::Intro,
            Phase::Phase1Intro,
            Phase::Phase1,
            Phase::BossIntro,
            Phase::Boss,
        ] {
            assert!(phase.can_advance_to(Phase::GameOver), "{}", phase);
        }
        assert!(!Phase::Win.can_advance_to(Phase::GameOver));
        assert!(!Phase::GameOver.can_advance_to(Phase::GameOver));
    }
}
