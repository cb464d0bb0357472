//! Distribution of mass and damping along the chain.

use crate::body::PhysicalProfile;
use crate::chain::Chain;
use crate::scene::PhysicsScene;
use log::debug;
use serde::{Deserialize, Serialize};

/// Head and tail physical profiles. Segments in between are interpolated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Redistribute on spawn and after every growth.
    pub enabled: bool,
    pub head: PhysicalProfile,
    pub tail: PhysicalProfile,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            head: PhysicalProfile::new(1.5, 0.5, 0.5),
            tail: PhysicalProfile::new(5.0, 3.5, 3.5),
        }
    }
}

/// Profile for the segment at `index` of `count`, or `None` if `count < 2`
/// or `index` is out of range. The endpoints return `head` and `tail` exactly.
pub fn profile_at(
    head: &PhysicalProfile,
    tail: &PhysicalProfile,
    index: usize,
    count: usize,
) -> Option<PhysicalProfile> {
    if count < 2 || index >= count {
        return None;
    }
    let last = count - 1;
    Some(match index {
        0 => *head,
        i if i == last => *tail,
        i => head.lerp(tail, i as f32 / last as f32),
    })
}

/// Writes interpolated profiles to every segment of `chain` that still has a body.
///
/// Returns the number of segments written. Nothing is written when the head
/// or tail has no body.
pub fn redistribute<S>(
    scene: &mut S,
    chain: &Chain,
    head: &PhysicalProfile,
    tail: &PhysicalProfile,
) -> usize
where
    S: PhysicsScene + ?Sized,
{
    if !scene.has_body(chain.head()) || !scene.has_body(chain.tail()) {
        debug!("skipping profile redistribution: chain endpoint has no body");
        return 0;
    }
    let present: Vec<_> = chain.segments().filter(|&s| scene.has_body(s)).collect();
    let count = present.len();

    let mut written = 0;
    for (index, &segment) in present.iter().enumerate() {
        if let Some(profile) = profile_at(head, tail, index, count)
            && scene.set_profile(segment, profile)
        {
            written += 1;
        }
    }
    debug!("redistributed physical profile over {written} of {count} segments");
    written
}
