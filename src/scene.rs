//! The physics-engine boundary.
//!
//! [`PhysicsScene`] is everything the controller reads from and writes to the
//! host engine. The engine owns segments and joints and integrates forces; the
//! controller only addresses them through [`SegmentId`] and [`JointId`] handles.
//!
//! [`SceneGraph`] is an engine-agnostic, in-memory implementation. It performs
//! no integration beyond turning impulses into velocity changes, which makes it
//! suitable for headless use and for tests.

use crate::body::{
    JointDefinition, JointId, JointMotor, PhysicalProfile, Segment, SegmentId, SegmentPrefab,
};
use crate::pose::shortest_angle_delta;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The host physics engine as seen by the creature controller.
pub trait PhysicsScene {
    /// Whether `segment` exists and carries a physical body.
    fn has_body(&self, segment: SegmentId) -> bool;

    /// World-space position of a segment.
    fn position(&self, segment: SegmentId) -> Option<Vec2>;

    /// World-space rotation of a segment, in radians.
    fn rotation(&self, segment: SegmentId) -> Option<f32>;

    /// All joints owned by `segment`, in creation order.
    fn joints_of(&self, segment: SegmentId) -> Vec<JointId>;

    fn joint(&self, joint: JointId) -> Option<JointDefinition>;

    /// Current angle of `joint` (connected body relative to owner), in radians.
    fn joint_angle(&self, joint: JointId) -> Option<f32>;

    /// Instantiates `prefab`. The returned object may lack a body if the prefab has none.
    fn spawn(&mut self, prefab: &SegmentPrefab, position: Vec2, rotation: f32) -> SegmentId;

    fn despawn(&mut self, segment: SegmentId) -> bool;

    /// Adds a joint. Returns `None` if the engine rejects it (e.g. unknown owner).
    fn create_joint(&mut self, joint: JointDefinition) -> Option<JointId>;

    fn remove_joint(&mut self, joint: JointId) -> bool;

    fn set_profile(&mut self, segment: SegmentId, profile: PhysicalProfile) -> bool;

    /// Enables the joint's motor and sets its command.
    fn set_motor(&mut self, joint: JointId, motor: JointMotor) -> bool;

    /// Applies an instantaneous impulse at the segment's center of mass.
    fn apply_impulse(&mut self, segment: SegmentId, impulse: Vec2) -> bool;
}

/// In-memory scene of segments and joints.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneGraph {
    pub segments: BTreeMap<SegmentId, Segment>,
    pub joints: BTreeMap<JointId, JointDefinition>,

    /// Impulses applied since the last [`take_impulses`](Self::take_impulses).
    pub impulses: Vec<(SegmentId, Vec2)>,

    next_segment: SegmentId,
    next_joint: JointId,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_segment(&mut self, segment: Segment) -> SegmentId {
        let id = self.next_segment;
        self.next_segment += 1;
        self.segments.insert(id, segment);
        id
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.get_mut(&id)
    }

    pub fn profile(&self, id: SegmentId) -> Option<PhysicalProfile> {
        self.segments.get(&id)?.body.map(|b| b.profile)
    }

    pub fn set_rotation(&mut self, id: SegmentId, rotation: f32) {
        if let Some(segment) = self.segments.get_mut(&id) {
            segment.rotation = rotation;
        }
    }

    /// Drains the impulse log.
    pub fn take_impulses(&mut self) -> Vec<(SegmentId, Vec2)> {
        std::mem::take(&mut self.impulses)
    }

    /// Joints whose `connected` body is `target`, across all owners.
    pub fn joints_into(&self, target: SegmentId) -> Vec<JointId> {
        self.joints
            .iter()
            .filter(|(_, j)| j.connected == Some(target))
            .map(|(&id, _)| id)
            .collect()
    }
}

impl PhysicsScene for SceneGraph {
    fn has_body(&self, segment: SegmentId) -> bool {
        self.segments
            .get(&segment)
            .is_some_and(|s| s.body.is_some())
    }

    fn position(&self, segment: SegmentId) -> Option<Vec2> {
        self.segments.get(&segment).map(|s| s.position)
    }

    fn rotation(&self, segment: SegmentId) -> Option<f32> {
        self.segments.get(&segment).map(|s| s.rotation)
    }

    fn joints_of(&self, segment: SegmentId) -> Vec<JointId> {
        self.joints
            .iter()
            .filter(|(_, j)| j.owner == segment)
            .map(|(&id, _)| id)
            .collect()
    }

    fn joint(&self, joint: JointId) -> Option<JointDefinition> {
        self.joints.get(&joint).copied()
    }

    fn joint_angle(&self, joint: JointId) -> Option<f32> {
        let j = self.joints.get(&joint)?;
        let owner = self.segments.get(&j.owner)?;
        let connected = self.segments.get(&j.connected?)?;
        Some(shortest_angle_delta(owner.rotation, connected.rotation))
    }

    fn spawn(&mut self, prefab: &SegmentPrefab, position: Vec2, rotation: f32) -> SegmentId {
        self.insert_segment(prefab.instantiate(position, rotation))
    }

    fn despawn(&mut self, segment: SegmentId) -> bool {
        if self.segments.remove(&segment).is_none() {
            return false;
        }
        // Joints owned by the despawned object go with it.
        self.joints.retain(|_, j| j.owner != segment);
        true
    }

    fn create_joint(&mut self, joint: JointDefinition) -> Option<JointId> {
        if !self.segments.contains_key(&joint.owner) {
            return None;
        }
        let id = self.next_joint;
        self.next_joint += 1;
        self.joints.insert(id, joint);
        Some(id)
    }

    fn remove_joint(&mut self, joint: JointId) -> bool {
        self.joints.remove(&joint).is_some()
    }

    fn set_profile(&mut self, segment: SegmentId, profile: PhysicalProfile) -> bool {
        match self.segments.get_mut(&segment).and_then(|s| s.body.as_mut()) {
            Some(body) => {
                body.profile = profile;
                true
            }
            None => false,
        }
    }

    fn set_motor(&mut self, joint: JointId, motor: JointMotor) -> bool {
        match self.joints.get_mut(&joint) {
            Some(j) => {
                j.motor = Some(motor);
                true
            }
            None => false,
        }
    }

    fn apply_impulse(&mut self, segment: SegmentId, impulse: Vec2) -> bool {
        let Some(body) = self.segments.get_mut(&segment).and_then(|s| s.body.as_mut()) else {
            return false;
        };
        if body.profile.mass > 0.0 {
            body.linear_velocity += impulse / body.profile.mass;
        }
        self.impulses.push((segment, impulse));
        true
    }
}
