//! Cosmetic limb motion triggered by steps and bites.
//!
//! Presentation layers receive fire-and-forget calls through [`CosmeticSink`].
//! The rigs in this module are a ready-made sink: each limb holds at most one
//! [`SwingTask`], and retriggering a limb replaces its task instead of queueing.

use crate::rhythm::StepSide;
use glam::FloatExt;
use serde::{Deserialize, Serialize};

/// Receiver of cosmetic triggers. Implementations own their timing and must not block.
pub trait CosmeticSink {
    fn play_step(&mut self, side: StepSide);
    fn play_bite(&mut self);
}

/// Discards every trigger.
impl CosmeticSink for () {
    fn play_step(&mut self, _side: StepSide) {}

    fn play_bite(&mut self) {}
}

impl<T: CosmeticSink> CosmeticSink for [T] {
    fn play_step(&mut self, side: StepSide) {
        for sink in self.iter_mut() {
            sink.play_step(side);
        }
    }

    fn play_bite(&mut self) {
        for sink in self.iter_mut() {
            sink.play_bite();
        }
    }
}

impl<A: CosmeticSink, B: CosmeticSink> CosmeticSink for (A, B) {
    fn play_step(&mut self, side: StepSide) {
        self.0.play_step(side);
        self.1.play_step(side);
    }

    fn play_bite(&mut self) {
        self.0.play_bite();
        self.1.play_bite();
    }
}

/// Shape of a swing-out-and-return motion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwingProfile {
    /// Peak offset from rest, in radians.
    pub angle: f32,
    /// Progress per second of the outward phase.
    pub out_rate: f32,
    /// Progress per second of the return phase.
    pub return_rate: f32,
}

impl SwingProfile {
    pub fn step() -> Self {
        Self {
            angle: 30.0f32.to_radians(),
            out_rate: 20.0,
            return_rate: 10.0,
        }
    }

    pub fn bite() -> Self {
        Self {
            angle: 45.0f32.to_radians(),
            out_rate: 20.0,
            return_rate: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwingPhase {
    Out,
    Return,
    Done,
}

/// A single in-flight limb swing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwingTask {
    profile: SwingProfile,
    /// +1 or -1 so mirrored limbs swing symmetrically.
    sign: f32,
    phase: SwingPhase,
    t: f32,
}

impl SwingTask {
    pub fn new(profile: SwingProfile, sign: f32) -> Self {
        Self {
            profile,
            sign,
            phase: SwingPhase::Out,
            t: 0.0,
        }
    }

    pub fn phase(&self) -> SwingPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SwingPhase::Done
    }

    /// Advances by `dt` seconds and returns the limb's offset from rest.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let peak = self.profile.angle * self.sign;
        match self.phase {
            SwingPhase::Out => {
                self.t = (self.t + dt * self.profile.out_rate).min(1.0);
                let offset = 0.0f32.lerp(peak, self.t);
                if self.t >= 1.0 {
                    self.phase = SwingPhase::Return;
                    self.t = 0.0;
                }
                offset
            }
            SwingPhase::Return => {
                self.t = (self.t + dt * self.profile.return_rate).min(1.0);
                if self.t >= 1.0 {
                    self.phase = SwingPhase::Done;
                    return 0.0;
                }
                peak.lerp(0.0, self.t)
            }
            SwingPhase::Done => 0.0,
        }
    }
}

/// One animated limb: a rest angle plus an optional in-flight swing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LimbSlot {
    pub rest: f32,
    offset: f32,
    task: Option<SwingTask>,
}

impl LimbSlot {
    pub fn new(rest: f32) -> Self {
        Self {
            rest,
            ..Self::default()
        }
    }

    /// Starts a swing, cancelling any swing already in flight.
    pub fn trigger(&mut self, task: SwingTask) {
        self.task = Some(task);
    }

    pub fn is_animating(&self) -> bool {
        self.task.is_some()
    }

    pub fn tick(&mut self, dt: f32) {
        self.offset = match self.task.as_mut() {
            Some(task) => task.advance(dt),
            None => 0.0,
        };
        if self.task.is_some_and(|t| t.is_finished()) {
            self.task = None;
        }
    }

    /// Current limb angle.
    pub fn angle(&self) -> f32 {
        self.rest + self.offset
    }
}

/// A left/right pair of legs that kick on steps.
#[derive(Clone, Debug, PartialEq)]
pub struct LegRig {
    pub left: LimbSlot,
    pub right: LimbSlot,
    pub swing: SwingProfile,
}

impl Default for LegRig {
    fn default() -> Self {
        Self {
            left: LimbSlot::default(),
            right: LimbSlot::default(),
            swing: SwingProfile::step(),
        }
    }
}

impl LegRig {
    pub fn tick(&mut self, dt: f32) {
        self.left.tick(dt);
        self.right.tick(dt);
    }
}

impl CosmeticSink for LegRig {
    fn play_step(&mut self, side: StepSide) {
        match side {
            StepSide::Left => self.left.trigger(SwingTask::new(self.swing, 1.0)),
            StepSide::Right => self.right.trigger(SwingTask::new(self.swing, -1.0)),
        }
    }

    fn play_bite(&mut self) {}
}

/// Two mirrored jaws that snap open and closed on a bite.
#[derive(Clone, Debug, PartialEq)]
pub struct MouthRig {
    pub left: LimbSlot,
    pub right: LimbSlot,
    pub bite: SwingProfile,
}

impl Default for MouthRig {
    fn default() -> Self {
        Self {
            left: LimbSlot::default(),
            right: LimbSlot::default(),
            bite: SwingProfile::bite(),
        }
    }
}

impl MouthRig {
    pub fn tick(&mut self, dt: f32) {
        self.left.tick(dt);
        self.right.tick(dt);
    }
}

impl CosmeticSink for MouthRig {
    fn play_step(&mut self, _side: StepSide) {}

    fn play_bite(&mut self) {
        self.left.trigger(SwingTask::new(self.bite, 1.0));
        self.right.trigger(SwingTask::new(self.bite, -1.0));
    }
}
