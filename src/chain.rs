//! Chain topology: discovering the ordered segment list from the scene's joints
//! and growing it at runtime.
//!
//! The chain is never declared up front. [`trace_chain`] walks chain-edge joints
//! from the head until it meets the tail, and [`ChainTopology`] keeps the
//! result current as the creature grows. Traversal is read-only; every scene
//! mutation goes through [`ChainTopology::ensure_connected`] or
//! [`ChainTopology::add_segment`].

use crate::body::{AngleLimits, JointDefinition, JointId, JointRole, SegmentId, SegmentPrefab};
use crate::error::ChainError;
use crate::scene::PhysicsScene;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Upper bound on edges followed by a single traversal.
pub const MAX_CHAIN_HOPS: usize = 128;

/// Keeps inserted segments off the exact endpoints of the span they split.
const MIN_INSERTION_OFFSET: f32 = 0.05;

/// Settings applied to every chain-edge joint the topology manager creates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointSettings {
    /// Angle limits; `None` leaves the joint unlimited.
    pub limits: Option<AngleLimits>,
    pub collide_connected: bool,
}

impl Default for JointSettings {
    fn default() -> Self {
        Self {
            limits: Some(AngleLimits::new(
                -90.0f32.to_radians(),
                90.0f32.to_radians(),
            )),
            collide_connected: false,
        }
    }
}

impl JointSettings {
    /// A chain edge from `owner` to `connected` carrying these settings.
    pub fn edge(&self, owner: SegmentId, connected: SegmentId) -> JointDefinition {
        JointDefinition {
            limits: self.limits,
            collide_connected: self.collide_connected,
            ..JointDefinition::chain_edge(owner, connected)
        }
    }
}

/// Configuration for chain maintenance and growth.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub joints: JointSettings,

    /// Template for grown segments. Growth is disabled while this is `None`.
    pub prefab: Option<SegmentPrefab>,

    /// Where a grown segment lands between the last body and the tail (0..1, 0.5 = midpoint).
    pub insertion_offset: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            joints: JointSettings::default(),
            prefab: Some(SegmentPrefab::default()),
            insertion_offset: 0.5,
        }
    }
}

/// The ordered body: `[head, mids.., tail]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    head: SegmentId,
    tail: SegmentId,
    mids: Vec<SegmentId>,
}

impl Chain {
    /// A chain with no middle segments.
    pub fn new(head: SegmentId, tail: SegmentId) -> Self {
        Self {
            head,
            tail,
            mids: Vec::new(),
        }
    }

    pub fn head(&self) -> SegmentId {
        self.head
    }

    pub fn tail(&self) -> SegmentId {
        self.tail
    }

    pub fn mids(&self) -> &[SegmentId] {
        &self.mids
    }

    /// Number of segments including head and tail.
    pub fn len(&self) -> usize {
        self.mids.len() + 2
    }

    /// Always false: a chain holds at least its head and tail.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Segments in order from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = SegmentId> + '_ {
        std::iter::once(self.head)
            .chain(self.mids.iter().copied())
            .chain(std::iter::once(self.tail))
    }

    /// The last middle segment, or the head when there are none.
    pub fn last_before_tail(&self) -> SegmentId {
        self.mids.last().copied().unwrap_or(self.head)
    }

    pub fn contains(&self, segment: SegmentId) -> bool {
        self.segments().any(|s| s == segment)
    }
}

/// Why a traversal stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraversalStop {
    ReachedTail,
    /// The last segment has no chain edge with a target.
    DeadEnd,
    /// The next segment was already visited.
    Cycle(SegmentId),
    /// The next segment exists only as a visual object, or not at all.
    MissingBody(SegmentId),
    /// [`MAX_CHAIN_HOPS`] edges were followed without meeting the tail.
    HopLimit,
    /// Head or tail has no physical body.
    MissingEndpoints,
}

/// Result of walking the scene from head towards tail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Traversal {
    /// Everything discovered, possibly partial.
    pub chain: Chain,
    pub stop: TraversalStop,
    /// Number of edges followed.
    pub hops: usize,
}

impl Traversal {
    pub fn reached_tail(&self) -> bool {
        self.stop == TraversalStop::ReachedTail
    }
}

/// The chain edge leaving `segment` and the segment it points to.
///
/// Only [`JointRole::ChainEdge`] joints with a target qualify. If a segment
/// carries more than one, the earliest created wins.
pub fn chain_edge<S>(scene: &S, segment: SegmentId) -> Option<(JointId, SegmentId)>
where
    S: PhysicsScene + ?Sized,
{
    let mut candidates = scene.joints_of(segment).into_iter().filter_map(|id| {
        let joint = scene.joint(id)?;
        if joint.role != JointRole::ChainEdge {
            return None;
        }
        Some((id, joint.connected?))
    });

    let first = candidates.next()?;
    if candidates.next().is_some() {
        warn!(
            "segment {segment} carries several chain edges; following joint {} to {}",
            first.0, first.1
        );
    }
    Some(first)
}

/// Chain edges on `owner` that point at `target`.
pub fn edges_between<S>(scene: &S, owner: SegmentId, target: SegmentId) -> Vec<JointId>
where
    S: PhysicsScene + ?Sized,
{
    scene
        .joints_of(owner)
        .into_iter()
        .filter(|&id| scene.joint(id).is_some_and(|j| j.is_edge_to(target)))
        .collect()
}

/// Walks chain edges from `head` until `tail`, a repeated segment, a dead end,
/// or the hop limit. Never mutates the scene.
pub fn trace_chain<S>(scene: &S, head: SegmentId, tail: SegmentId) -> Traversal
where
    S: PhysicsScene + ?Sized,
{
    let mut chain = Chain::new(head, tail);
    let mut hops = 0;

    if !scene.has_body(head) || !scene.has_body(tail) {
        return Traversal {
            chain,
            stop: TraversalStop::MissingEndpoints,
            hops,
        };
    }
    if head == tail {
        return Traversal {
            chain,
            stop: TraversalStop::ReachedTail,
            hops,
        };
    }

    let mut visited = HashSet::from([head]);
    let mut current = head;

    let stop = loop {
        if hops >= MAX_CHAIN_HOPS {
            break TraversalStop::HopLimit;
        }
        let Some((_, next)) = chain_edge(scene, current) else {
            break TraversalStop::DeadEnd;
        };
        hops += 1;

        if next == tail {
            break TraversalStop::ReachedTail;
        }
        if !visited.insert(next) {
            break TraversalStop::Cycle(next);
        }
        if !scene.has_body(next) {
            break TraversalStop::MissingBody(next);
        }

        chain.mids.push(next);
        current = next;
    };

    Traversal { chain, stop, hops }
}

/// Owns the creature's [`Chain`] and is the only thing that mutates it.
#[derive(Clone, Debug)]
pub struct ChainTopology {
    config: ChainConfig,
    chain: Chain,
}

impl ChainTopology {
    /// Discovers the chain between `head` and `tail` from the joints already in the scene.
    pub fn build<S>(scene: &S, config: ChainConfig, head: SegmentId, tail: SegmentId) -> Self
    where
        S: PhysicsScene + ?Sized,
    {
        let mut topology = Self {
            config,
            chain: Chain::new(head, tail),
        };
        topology.rebuild(scene);
        topology
    }

    /// Re-discovers the middle segments. A malformed graph leaves a partial chain.
    pub fn rebuild<S>(&mut self, scene: &S) -> TraversalStop
    where
        S: PhysicsScene + ?Sized,
    {
        let traversal = trace_chain(scene, self.chain.head, self.chain.tail);
        match traversal.stop {
            TraversalStop::ReachedTail | TraversalStop::DeadEnd => {}
            TraversalStop::MissingEndpoints => {
                warn!("chain has no physical head or tail; keeping it empty")
            }
            stop => warn!(
                "chain traversal stopped early ({stop:?}) after {} hops",
                traversal.hops
            ),
        }
        debug!(
            "chain rebuilt: {} mid segments, stop={:?}",
            traversal.chain.mids.len(),
            traversal.stop
        );
        self.chain = traversal.chain;
        traversal.stop
    }

    /// Links the last discovered segment to the tail if the tail is unreachable.
    ///
    /// Returns the created joint, or `None` when nothing was needed. Calling this
    /// repeatedly creates at most one joint.
    pub fn ensure_connected<S>(&mut self, scene: &mut S) -> Result<Option<JointId>, ChainError>
    where
        S: PhysicsScene + ?Sized,
    {
        match self.rebuild(scene) {
            TraversalStop::MissingEndpoints => return Err(ChainError::MissingEndpoints),
            TraversalStop::ReachedTail => return Ok(None),
            _ => {}
        }

        let last = self.chain.last_before_tail();
        let tail = self.chain.tail;
        if !edges_between(scene, last, tail).is_empty() {
            return Ok(None);
        }

        let joint = scene
            .create_joint(self.config.joints.edge(last, tail))
            .ok_or(ChainError::JointRejected {
                owner: last,
                connected: tail,
            })?;
        debug!("connected segment {last} to tail {tail} with joint {joint}");
        Ok(Some(joint))
    }

    /// Inserts a new segment between the last body and the tail.
    ///
    /// The stale edge into the tail is replaced by two new edges through the
    /// new segment. On error nothing in the scene or the chain has changed.
    pub fn add_segment<S>(&mut self, scene: &mut S) -> Result<SegmentId, ChainError>
    where
        S: PhysicsScene + ?Sized,
    {
        let prefab = self.config.prefab.as_ref().ok_or(ChainError::MissingPrefab)?;
        let (head, tail) = (self.chain.head, self.chain.tail);
        if !scene.has_body(head) || !scene.has_body(tail) {
            return Err(ChainError::MissingEndpoints);
        }

        let last = self.chain.last_before_tail();
        let from = scene
            .position(last)
            .ok_or(ChainError::SegmentNotFound(last))?;
        let to = scene
            .position(tail)
            .ok_or(ChainError::SegmentNotFound(tail))?;
        let offset = self
            .config
            .insertion_offset
            .clamp(MIN_INSERTION_OFFSET, 1.0 - MIN_INSERTION_OFFSET);
        let rotation = scene.rotation(last).unwrap_or_default();

        let segment = scene.spawn(prefab, from.lerp(to, offset), rotation);
        if !scene.has_body(segment) {
            scene.despawn(segment);
            return Err(ChainError::NoPhysicalBody(segment));
        }

        let settings = &self.config.joints;
        let Some(inbound) = scene.create_joint(settings.edge(last, segment)) else {
            scene.despawn(segment);
            return Err(ChainError::JointRejected {
                owner: last,
                connected: segment,
            });
        };
        if scene.create_joint(settings.edge(segment, tail)).is_none() {
            scene.remove_joint(inbound);
            scene.despawn(segment);
            return Err(ChainError::JointRejected {
                owner: segment,
                connected: tail,
            });
        }

        for stale in edges_between(scene, last, tail) {
            scene.remove_joint(stale);
        }

        self.chain.mids.push(segment);
        debug!(
            "grew segment {segment} between {last} and tail {tail}; chain length {}",
            self.chain.len()
        );
        Ok(segment)
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn last_before_tail(&self) -> SegmentId {
        self.chain.last_before_tail()
    }

    /// The chain-edge joint between each consecutive pair of segments, head first.
    /// Stops at the first pair without such a joint, so a joint's index is its
    /// distance from the head.
    pub fn chain_edges<S>(&self, scene: &S) -> Vec<JointId>
    where
        S: PhysicsScene + ?Sized,
    {
        let segments: Vec<SegmentId> = self.chain.segments().collect();
        segments
            .windows(2)
            .map_while(|pair| edges_between(scene, pair[0], pair[1]).first().copied())
            .collect()
    }
}
