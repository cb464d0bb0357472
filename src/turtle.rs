//! Turtle state and operations for body-plan interpretation.

use crate::body::{AngleLimits, JointRole, SegmentId};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Configuration for the next joint to be created.
///
/// This acts as a "pen style" for physics. When the turtle spawns a new segment
/// after an existing one, it uses these settings to link them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveJointConfig {
    /// Chain edge or auxiliary link.
    pub role: JointRole,

    /// Angle limits of the link.
    pub limits: Option<AngleLimits>,

    /// Whether the linked segments collide with each other.
    pub collide_connected: bool,
}

impl Default for ActiveJointConfig {
    fn default() -> Self {
        Self {
            role: JointRole::ChainEdge,
            limits: None,
            collide_connected: false,
        }
    }
}

/// The state of the body-plan turtle.
///
/// The turtle walks from head to tail, so each spawned segment lands behind
/// the previous one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanTurtleState {
    /// Current world-space position of the "cursor".
    pub position: Vec2,

    /// Direction the creature faces, in radians. The turtle walks the opposite way.
    pub heading: f32,

    /// The segment the turtle is currently "standing on".
    /// If this is Some(id), the NEXT spawned segment will be linked to this one.
    pub current_segment: Option<SegmentId>,

    /// Configuration for the next joint creation.
    pub joint_config: ActiveJointConfig,

    /// Current default width for segments (can be modified by `!`).
    pub width: f32,
}

impl Default for PlanTurtleState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            heading: 0.0,
            current_segment: None,
            joint_config: ActiveJointConfig::default(),
            width: 0.4,
        }
    }
}

impl PlanTurtleState {
    /// Unit vector the creature faces.
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Unit vector the turtle advances along (towards the tail).
    pub fn trail(&self) -> Vec2 {
        -self.forward()
    }

    /// Turns the heading counter-clockwise by `angle` radians.
    pub fn turn(&mut self, angle: f32) {
        self.heading += angle;
    }

    /// Advances the cursor `distance` along the trail.
    pub fn advance(&mut self, distance: f32) {
        self.position += self.trail() * distance;
    }
}

/// What a spawned segment is to the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Head,
    Body,
    Tail,
}

/// Operations that can be performed by the body-plan turtle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlanOp {
    // --- Spatial Navigation ---
    /// Move along the trail without spawning (`f`). Params: `(distance)`.
    Move,
    /// Turn by the angle param, in degrees, times this sign (`+`/`-`).
    Turn(f32),

    // --- Segments ---
    /// Spawn a segment. Params: `(length, width)`.
    Spawn(SegmentKind),

    // --- Configuration ---
    /// Set the role of subsequent links (`J` chain edge, `Ja` auxiliary).
    SetJointRole(JointRole),
    /// Set joint limits. Params: `(min, max)` in radians.
    SetJointLimits,
    /// Toggle collision between linked segments (`Jc`).
    ToggleCollision,
    /// Set the default width for subsequent segments (`!`).
    SetWidth,

    // --- Flow Control ---
    /// Save the full turtle state onto the stack (`[`).
    Push,
    /// Restore the most recently pushed turtle state (`]`).
    Pop,
    /// No-op; symbol has no registered meaning.
    Ignore,
}
