//! Resolution of propulsion requests into per-segment impulses.

use crate::body::SegmentId;
use crate::chain::Chain;
use crate::rhythm::PropulsionRequest;
use crate::scene::PhysicsScene;
use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weights summing below this fall back to an equal split.
const MIN_WEIGHT_SUM: f32 = 1e-4;

/// A segment of the chain that can receive propulsion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrivePoint {
    Head,
    Tail,
    /// The middle segment at this index, counted from the head.
    Mid(usize),
}

impl DrivePoint {
    pub fn resolve(self, chain: &Chain) -> Option<SegmentId> {
        match self {
            Self::Head => Some(chain.head()),
            Self::Tail => Some(chain.tail()),
            Self::Mid(i) => chain.mids().get(i).copied(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriveWeight {
    pub point: DrivePoint,
    /// Relative share. Negative weights count as zero.
    pub weight: f32,
}

impl DriveWeight {
    pub const fn new(point: DrivePoint, weight: f32) -> Self {
        Self { point, weight }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropulsionConfig {
    /// Where the push lands. An empty list drives head and tail equally.
    pub drive: Vec<DriveWeight>,
    /// Upward push per unit of lift ratio.
    pub lift_strength: f32,
    /// Cap on the upward component.
    pub max_lift: f32,
    /// Extra push along the world X axis in the travel direction.
    pub forward_assist: f32,
}

impl Default for PropulsionConfig {
    fn default() -> Self {
        Self {
            drive: vec![
                DriveWeight::new(DrivePoint::Head, 0.6),
                DriveWeight::new(DrivePoint::Tail, 0.4),
            ],
            lift_strength: 0.6,
            max_lift: 0.7,
            forward_assist: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Propulsion {
    config: PropulsionConfig,
}

impl Propulsion {
    pub fn new(config: PropulsionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PropulsionConfig {
        &self.config
    }

    /// Normalized shares per drive segment.
    fn shares(&self, chain: &Chain) -> Vec<(SegmentId, f32)> {
        let fallback = [
            DriveWeight::new(DrivePoint::Head, 1.0),
            DriveWeight::new(DrivePoint::Tail, 1.0),
        ];
        let drive = if self.config.drive.is_empty() {
            &fallback[..]
        } else {
            &self.config.drive[..]
        };

        let resolved: Vec<(SegmentId, f32)> = drive
            .iter()
            .filter_map(|d| Some((d.point.resolve(chain)?, d.weight.max(0.0))))
            .collect();
        if resolved.is_empty() {
            return resolved;
        }

        let sum: f32 = resolved.iter().map(|(_, w)| w).sum();
        if sum < MIN_WEIGHT_SUM {
            let equal = 1.0 / resolved.len() as f32;
            return resolved.into_iter().map(|(s, _)| (s, equal)).collect();
        }
        resolved.into_iter().map(|(s, w)| (s, w / sum)).collect()
    }

    /// Total impulse for `request` given the head's rotation and the current lift ratio.
    pub fn total_impulse(&self, request: PropulsionRequest, heading: f32, up01: f32) -> Vec2 {
        let sign = request.direction.sign();
        let lift = (up01.clamp(0.0, 1.0) * self.config.lift_strength).min(self.config.max_lift);
        let push = (Vec2::from_angle(heading) * sign + Vec2::Y * lift.max(0.0)).normalize_or_zero();
        push * request.power + Vec2::X * sign * self.config.forward_assist
    }

    /// Per-segment impulses for all `requests`, summed per segment.
    ///
    /// Empty when the chain's head or tail has no body or no request has a direction.
    pub fn impulses<S>(
        &self,
        scene: &S,
        chain: &Chain,
        requests: &[PropulsionRequest],
        up01: f32,
    ) -> Vec<(SegmentId, Vec2)>
    where
        S: PhysicsScene + ?Sized,
    {
        if !scene.has_body(chain.head()) || !scene.has_body(chain.tail()) {
            return Vec::new();
        }
        let heading = scene.rotation(chain.head()).unwrap_or_default();

        let total: Vec2 = requests
            .iter()
            .filter(|r| r.direction.is_decided())
            .map(|&r| self.total_impulse(r, heading, up01))
            .sum();
        if total == Vec2::ZERO {
            return Vec::new();
        }

        let mut per_segment: BTreeMap<SegmentId, Vec2> = BTreeMap::new();
        for (segment, share) in self.shares(chain) {
            *per_segment.entry(segment).or_default() += total * share;
        }
        per_segment.into_iter().collect()
    }

    /// Applies `requests` to the scene as one impulse per drive segment.
    /// Returns the number of impulses applied.
    pub fn apply<S>(
        &self,
        scene: &mut S,
        chain: &Chain,
        requests: &[PropulsionRequest],
        up01: f32,
    ) -> usize
    where
        S: PhysicsScene + ?Sized,
    {
        let impulses = self.impulses(scene, chain, requests, up01);
        let applied = impulses
            .iter()
            .filter(|&&(segment, impulse)| scene.apply_impulse(segment, impulse))
            .count();
        if applied > 0 {
            debug!(
                "applied propulsion from {} step(s) to {applied} segment(s)",
                requests.len()
            );
        }
        applied
    }
}
