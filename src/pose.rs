//! Steering-driven pose.
//!
//! [`AimTracker`] smooths the raw steering angle coming from input.
//! [`PoseFrame`] turns the smoothed angle into a bend target for every joint of
//! the chain, and [`PoseDriver`] writes the resulting motor commands to the
//! scene each physics tick.
//!
//! Only upward steering bends the body. At or below the neutral angle the
//! driver actively straightens the chain with a boosted gain so it relaxes
//! faster than it curls.

use crate::body::{JointId, JointMotor};
use crate::scene::PhysicsScene;
use bevy_math::StableInterpolate;
use glam::{FloatExt, Vec2};
use log::trace;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Smallest signed rotation taking `current` to `target`, in `(-π, π]`.
pub fn shortest_angle_delta(current: f32, target: f32) -> f32 {
    let delta = (target - current).rem_euclid(TAU);
    if delta > PI { delta - TAU } else { delta }
}

/// Steering angle from `pivot` towards a world-space `point`.
///
/// Returns `None` when the point is too close to the pivot to define a direction.
pub fn aim_angle_towards(pivot: Vec2, point: Vec2) -> Option<f32> {
    let dir = point - pivot;
    if dir.length_squared() < 1e-4 {
        return None;
    }
    Some(dir.to_angle())
}

/// How far `angle` has risen above neutral, normalized to `[0, 1]` at `max_aim`.
pub fn lift_ratio(angle: f32, max_aim: f32) -> f32 {
    if max_aim <= 0.0 {
        return 0.0;
    }
    f32::inverse_lerp(0.0, max_aim, angle).clamp(0.0, 1.0)
}

/// Steering range and smoothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AimConfig {
    pub min_aim: f32,
    pub max_aim: f32,
    /// Exponential follow rate (1/s) of the smoothed angle towards its target.
    pub follow_rate: f32,
}

impl Default for AimConfig {
    fn default() -> Self {
        Self {
            min_aim: -60.0f32.to_radians(),
            max_aim: 60.0f32.to_radians(),
            follow_rate: 20.0,
        }
    }
}

/// Smoothed steering angle and its lift ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AimState {
    pub angle: f32,
    pub up01: f32,
}

impl AimState {
    /// Whether the aim is above neutral.
    pub fn engaged(&self) -> bool {
        self.angle > 0.0
    }
}

/// Smooths raw steering targets into an [`AimState`].
#[derive(Clone, Debug)]
pub struct AimTracker {
    config: AimConfig,
    angle: f32,
}

impl AimTracker {
    pub fn new(config: AimConfig) -> Self {
        Self { config, angle: 0.0 }
    }

    pub fn config(&self) -> &AimConfig {
        &self.config
    }

    /// Moves the smoothed angle towards `raw_target` over `dt` seconds.
    ///
    /// Convergence depends only on elapsed time, not on how often this is called.
    pub fn advance(&mut self, raw_target: f32, dt: f32) -> AimState {
        let (lo, hi) = if self.config.min_aim <= self.config.max_aim {
            (self.config.min_aim, self.config.max_aim)
        } else {
            (self.config.max_aim, self.config.min_aim)
        };
        let target = raw_target.clamp(lo, hi);
        if dt > 0.0 {
            self.angle
                .smooth_nudge(&target, self.config.follow_rate.max(0.0), dt);
        }
        self.angle = self.angle.clamp(lo, hi);
        self.state()
    }

    /// Jumps straight to `angle` (clamped), skipping the smoothing.
    pub fn snap(&mut self, angle: f32) -> AimState {
        self.angle = angle.clamp(
            self.config.min_aim.min(self.config.max_aim),
            self.config.max_aim.max(self.config.min_aim),
        );
        self.state()
    }

    pub fn state(&self) -> AimState {
        AimState {
            angle: self.angle,
            up01: lift_ratio(self.angle, self.config.max_aim),
        }
    }
}

/// Bend and motor tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Bend target of the first joint at full lift.
    pub max_bend: f32,
    /// Per-joint decay of the bend target towards the tail, in `[0, 1]`.
    pub falloff: f32,
    /// Gain multiplier while relaxing.
    pub relax_boost: f32,
    /// Proportional gain from angle error to motor speed.
    pub gain: f32,
    pub max_motor_speed: f32,
    /// Motor torque while holding a bend.
    pub engage_torque: f32,
    /// Motor torque while straightening.
    pub relax_torque: f32,
    /// Lift ratios below this relax the pose.
    pub relax_threshold: f32,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            max_bend: 35.0f32.to_radians(),
            falloff: 0.75,
            relax_boost: 1.5,
            gain: 10.0,
            max_motor_speed: 240.0f32.to_radians(),
            engage_torque: 250.0,
            relax_torque: 120.0,
            relax_threshold: 0.05,
        }
    }
}

/// The per-tick control regime shared by all joints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseFrame {
    /// Bend target of the first joint.
    pub target_base: f32,
    pub torque: f32,
    pub boost: f32,
    pub falloff: f32,
}

impl PoseFrame {
    pub fn from_aim(config: &PoseConfig, aim: AimState) -> Self {
        let falloff = config.falloff.clamp(0.0, 1.0);
        if !aim.engaged() || aim.up01 < config.relax_threshold {
            Self {
                target_base: 0.0,
                torque: config.relax_torque,
                boost: config.relax_boost,
                falloff,
            }
        } else {
            Self {
                target_base: aim.up01 * config.max_bend,
                torque: config.engage_torque,
                boost: 1.0,
                falloff,
            }
        }
    }

    pub fn is_relaxed(&self) -> bool {
        self.target_base == 0.0
    }

    /// Bend target of joint `index`, counted from the head.
    pub fn target(&self, index: usize) -> f32 {
        let exponent = i32::try_from(index).unwrap_or(i32::MAX);
        self.target_base * self.falloff.powi(exponent)
    }

    /// Motor command steering joint `index` from `current_angle` towards its target.
    pub fn command(&self, config: &PoseConfig, index: usize, current_angle: f32) -> JointMotor {
        let error = shortest_angle_delta(current_angle, self.target(index));
        let limit = config.max_motor_speed.abs();
        JointMotor {
            speed: (-error * config.gain * self.boost).clamp(-limit, limit),
            max_torque: self.torque,
        }
    }
}

/// Writes pose motor commands to the chain's joints.
#[derive(Clone, Debug, Default)]
pub struct PoseDriver {
    config: PoseConfig,
}

impl PoseDriver {
    pub fn new(config: PoseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PoseConfig {
        &self.config
    }

    /// Drives `joints` (head first) towards the pose implied by `aim`.
    ///
    /// Joints the scene no longer knows are skipped. Returns how many were driven.
    pub fn drive<S>(&self, scene: &mut S, joints: &[JointId], aim: AimState) -> usize
    where
        S: PhysicsScene + ?Sized,
    {
        let frame = PoseFrame::from_aim(&self.config, aim);
        trace!(
            "pose frame: angle={:.3} up01={:.3} base={:.3} torque={}",
            aim.angle, aim.up01, frame.target_base, frame.torque
        );

        let mut driven = 0;
        for (index, &joint) in joints.iter().enumerate() {
            let Some(current) = scene.joint_angle(joint) else {
                continue;
            };
            if scene.set_motor(joint, frame.command(&self.config, index, current)) {
                driven += 1;
            }
        }
        driven
    }
}
