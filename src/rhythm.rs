//! Step cadence and travel direction.
//!
//! The creature moves by alternating left and right steps. Alternation commits
//! a travel direction (left→right is forward, right→left is backward); stepping
//! the same side twice is penalized; pausing longer than the reset timeout
//! forgets both the direction and the last side.

use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepSide {
    Left,
    Right,
}

impl StepSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelDirection {
    Backward,
    #[default]
    Undecided,
    Forward,
}

impl TravelDirection {
    /// -1, 0 or +1.
    pub fn sign(self) -> f32 {
        match self {
            Self::Backward => -1.0,
            Self::Undecided => 0.0,
            Self::Forward => 1.0,
        }
    }

    pub fn is_decided(self) -> bool {
        self != Self::Undecided
    }

    /// The direction committed by stepping `side` right after `previous`.
    fn from_alternation(previous: StepSide, side: StepSide) -> Self {
        match (previous, side) {
            (StepSide::Left, StepSide::Right) => Self::Forward,
            (StepSide::Right, StepSide::Left) => Self::Backward,
            _ => Self::Undecided,
        }
    }
}

/// When an undecided direction gets committed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitPolicy {
    /// Only an alternating pair of steps commits a direction.
    #[default]
    RequireAlternation,
    /// The first step from idle commits as if it completed an alternation:
    /// right goes forward, left goes backward.
    CommitOnFirstStep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RhythmPhase {
    Idle,
    DirectionPending,
    DirectionLocked,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmConfig {
    /// Propulsion power of a well-formed step.
    pub step_power: f32,
    /// Seconds between steps after which the rhythm resets.
    pub reset_timeout: f64,
    /// Fraction of `step_power` granted to a repeated step on the same side.
    pub repeat_penalty: f32,
    pub commit_policy: CommitPolicy,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            step_power: 5.0,
            reset_timeout: 0.2,
            repeat_penalty: 0.3,
            commit_policy: CommitPolicy::RequireAlternation,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RhythmState {
    pub last_side: Option<StepSide>,
    /// Timestamp of the last step in seconds, `None` if idle since reset.
    pub last_step_at: Option<f64>,
    pub direction: TravelDirection,
}

impl RhythmState {
    pub fn phase(&self) -> RhythmPhase {
        match (self.direction.is_decided(), self.last_side) {
            (true, _) => RhythmPhase::DirectionLocked,
            (false, Some(_)) => RhythmPhase::DirectionPending,
            (false, None) => RhythmPhase::Idle,
        }
    }
}

/// A request to push the creature, resolved against the scene at the next physics tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropulsionRequest {
    pub direction: TravelDirection,
    pub power: f32,
}

/// What a single step did to the rhythm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    pub side: StepSide,
    /// Same side as the previous step.
    pub repeated: bool,
    /// The rhythm timed out before this step was processed.
    pub reset: bool,
    /// This step committed the travel direction.
    pub committed: bool,
    /// Present whenever a direction is decided.
    pub propulsion: Option<PropulsionRequest>,
}

/// Turns step events into a travel direction and propulsion requests.
#[derive(Clone, Debug, Default)]
pub struct RhythmArbiter {
    config: RhythmConfig,
    state: RhythmState,
}

impl RhythmArbiter {
    pub fn new(config: RhythmConfig) -> Self {
        Self {
            config,
            state: RhythmState::default(),
        }
    }

    pub fn config(&self) -> &RhythmConfig {
        &self.config
    }

    pub fn state(&self) -> &RhythmState {
        &self.state
    }

    pub fn phase(&self) -> RhythmPhase {
        self.state.phase()
    }

    fn timed_out(&self, now: f64) -> bool {
        self.state
            .last_step_at
            .is_some_and(|at| now - at > self.config.reset_timeout)
    }

    /// Whether the last step is recent enough to keep the rhythm alive.
    pub fn is_active(&self, now: f64) -> bool {
        self.state.last_step_at.is_some() && !self.timed_out(now)
    }

    /// Resets to idle if the rhythm timed out. Returns whether it did.
    pub fn refresh(&mut self, now: f64) -> bool {
        if !self.timed_out(now) {
            return false;
        }
        self.state = RhythmState::default();
        true
    }

    /// Processes a step on `side` at time `now` (seconds).
    pub fn step(&mut self, side: StepSide, now: f64) -> StepOutcome {
        let reset = self.refresh(now);
        let repeated = self.state.last_side == Some(side);
        let mut committed = false;

        if !repeated && !self.state.direction.is_decided() {
            let direction = match (self.state.last_side, self.config.commit_policy) {
                (Some(previous), _) => TravelDirection::from_alternation(previous, side),
                (None, CommitPolicy::CommitOnFirstStep) => {
                    TravelDirection::from_alternation(side.opposite(), side)
                }
                (None, CommitPolicy::RequireAlternation) => TravelDirection::Undecided,
            };
            if direction.is_decided() {
                debug!("rhythm committed {direction:?} on {side:?} step");
                self.state.direction = direction;
                committed = true;
            }
        }

        let propulsion = self.state.direction.is_decided().then(|| {
            let power = if repeated {
                self.config.step_power * self.config.repeat_penalty
            } else {
                self.config.step_power
            };
            PropulsionRequest {
                direction: self.state.direction,
                power,
            }
        });

        self.state.last_side = Some(side);
        self.state.last_step_at = Some(now);

        StepOutcome {
            side,
            repeated,
            reset,
            committed,
            propulsion,
        }
    }
}
