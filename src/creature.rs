//! The assembled creature.
//!
//! [`Creature`] wires chain topology, profile distribution, pose and rhythm
//! together and enforces the two update cadences: input-rate calls
//! (`set_aim_target`, `look_at`, `step`, `bite`, `request_growth`) only record
//! intent, and [`Creature::fixed_update`] applies everything at the physics
//! tick boundary.

use crate::body::SegmentId;
use crate::chain::{Chain, ChainTopology};
use crate::config::CreatureConfig;
use crate::cosmetic::CosmeticSink;
use crate::pose::{AimState, AimTracker, PoseDriver, aim_angle_towards};
use crate::profile::{ProfileConfig, redistribute};
use crate::propulsion::Propulsion;
use crate::rhythm::{PropulsionRequest, RhythmArbiter, RhythmState, StepOutcome, StepSide};
use crate::scene::PhysicsScene;
use glam::Vec2;
use log::{debug, warn};

/// What one physics tick did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Segments grown at the start of the tick.
    pub grown: Vec<SegmentId>,
    pub joints_driven: usize,
    pub impulses_applied: usize,
    pub aim: AimState,
}

pub struct Creature {
    topology: ChainTopology,
    profile: ProfileConfig,
    aim: AimTracker,
    pose: PoseDriver,
    rhythm: RhythmArbiter,
    propulsion: Propulsion,

    aim_target: f32,
    pending_propulsion: Vec<PropulsionRequest>,
    pending_growth: usize,
}

impl Creature {
    /// Discovers the chain between `head` and `tail`, repairs a missing tail
    /// link and distributes physical profiles.
    pub fn spawn<S>(scene: &mut S, config: CreatureConfig, head: SegmentId, tail: SegmentId) -> Self
    where
        S: PhysicsScene + ?Sized,
    {
        let CreatureConfig {
            chain,
            profile,
            aim,
            pose,
            rhythm,
            propulsion,
        } = config;

        let mut topology = ChainTopology::build(scene, chain, head, tail);
        if let Err(err) = topology.ensure_connected(scene) {
            warn!("creature spawned without a connected chain: {err}");
        }

        let creature = Self {
            topology,
            profile,
            aim: AimTracker::new(aim),
            pose: PoseDriver::new(pose),
            rhythm: RhythmArbiter::new(rhythm),
            propulsion: Propulsion::new(propulsion),
            aim_target: 0.0,
            pending_propulsion: Vec::new(),
            pending_growth: 0,
        };
        creature.apply_profile(scene);
        debug!(
            "creature spawned with {} segments",
            creature.topology.chain().len()
        );
        creature
    }

    fn apply_profile<S>(&self, scene: &mut S)
    where
        S: PhysicsScene + ?Sized,
    {
        if self.profile.enabled {
            redistribute(
                scene,
                self.topology.chain(),
                &self.profile.head,
                &self.profile.tail,
            );
        }
    }

    pub fn chain(&self) -> &Chain {
        self.topology.chain()
    }

    pub fn topology(&self) -> &ChainTopology {
        &self.topology
    }

    pub fn aim(&self) -> AimState {
        self.aim.state()
    }

    pub fn aim_target(&self) -> f32 {
        self.aim_target
    }

    pub fn rhythm(&self) -> &RhythmState {
        self.rhythm.state()
    }

    /// Number of propulsion requests waiting for the next tick.
    pub fn pending_propulsion(&self) -> usize {
        self.pending_propulsion.len()
    }

    /// Sets the raw steering target, in radians. Clamped and smoothed at the next tick.
    pub fn set_aim_target(&mut self, angle: f32) {
        self.aim_target = angle;
    }

    /// Aims from the head towards a world-space point.
    ///
    /// Returns false (target unchanged) when the point sits on the head.
    pub fn look_at<S>(&mut self, scene: &S, point: Vec2) -> bool
    where
        S: PhysicsScene + ?Sized,
    {
        let Some(pivot) = scene.position(self.chain().head()) else {
            return false;
        };
        match aim_angle_towards(pivot, point) {
            Some(angle) => {
                self.aim_target = angle;
                true
            }
            None => false,
        }
    }

    /// Records a step at time `now` (seconds) and notifies `sink`.
    ///
    /// Any resulting propulsion is applied at the next [`fixed_update`](Self::fixed_update).
    pub fn step<C>(&mut self, side: StepSide, now: f64, sink: &mut C) -> StepOutcome
    where
        C: CosmeticSink + ?Sized,
    {
        let outcome = self.rhythm.step(side, now);
        if let Some(request) = outcome.propulsion {
            self.pending_propulsion.push(request);
        }
        sink.play_step(side);
        outcome
    }

    pub fn bite<C>(&mut self, sink: &mut C)
    where
        C: CosmeticSink + ?Sized,
    {
        sink.play_bite();
    }

    /// Asks for one more segment. Grown at the start of the next tick.
    pub fn request_growth(&mut self) {
        self.pending_growth += 1;
    }

    /// Resets the rhythm if the step cadence lapsed. Returns whether it did.
    pub fn refresh(&mut self, now: f64) -> bool {
        self.rhythm.refresh(now)
    }

    pub fn is_rhythm_active(&self, now: f64) -> bool {
        self.rhythm.is_active(now)
    }

    /// Runs one physics tick of `dt` seconds.
    ///
    /// Order: pending growth (chain mutation), aim smoothing, pose motors, propulsion.
    pub fn fixed_update<S>(&mut self, scene: &mut S, dt: f32) -> TickReport
    where
        S: PhysicsScene + ?Sized,
    {
        let mut report = TickReport::default();

        for _ in 0..std::mem::take(&mut self.pending_growth) {
            match self.topology.add_segment(scene) {
                Ok(segment) => report.grown.push(segment),
                Err(err) => warn!("growth skipped: {err}"),
            }
        }
        if !report.grown.is_empty() {
            self.apply_profile(scene);
        }

        let aim = self.aim.advance(self.aim_target, dt);
        report.aim = aim;

        let joints = self.topology.chain_edges(scene);
        report.joints_driven = self.pose.drive(scene, &joints, aim);

        let requests = std::mem::take(&mut self.pending_propulsion);
        if !requests.is_empty() {
            report.impulses_applied =
                self.propulsion
                    .apply(scene, self.topology.chain(), &requests, aim.up01);
        }

        report
    }
}
