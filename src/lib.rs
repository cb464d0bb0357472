//! # symbios-crawler
//!
//! Engine-agnostic procedural locomotion for articulated crawler creatures.
//!
//! A creature is a chain of rigid segments linked by rotational joints. Its
//! shape and motion are not authored: the chain is discovered from the joints
//! present in a physics scene, its mass is spread from head to tail, a single
//! steering angle bends it through joint motors, and alternating left/right
//! steps push it along. The crate only computes these control signals; a host
//! engine behind [`PhysicsScene`] integrates them.
//!
//! Initial bodies can be laid out from [Symbios](https://crates.io/crates/symbios)
//! L-System strings with [`BodyPlanInterpreter`].

pub mod body;
pub mod body_plan;
pub mod chain;
pub mod config;
pub mod cosmetic;
pub mod creature;
pub mod error;
pub mod pose;
pub mod profile;
pub mod propulsion;
pub mod rhythm;
pub mod scene;
pub mod turtle;

pub use body::*;
pub use body_plan::*;
pub use chain::*;
pub use config::*;
pub use cosmetic::*;
pub use creature::*;
pub use error::*;
pub use pose::*;
pub use profile::*;
pub use propulsion::*;
pub use rhythm::*;
pub use scene::*;
pub use turtle::*;
