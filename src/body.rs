use bevy_heavy::ComputeMassProperties2d as _;
use bevy_math::primitives::{Capsule2d, Circle, Rectangle};
use glam::{FloatExt, Vec2};
use serde::{Deserialize, Serialize};

/// A unique identifier for a body segment (rigid body) in a scene.
pub type SegmentId = u32;

/// A unique identifier for a joint in a scene.
/// Joint IDs are handed out in creation order.
pub type JointId = u32;

/// Mass and damping constants of a single segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProfile {
    /// Mass in kg.
    pub mass: f32,
    /// Linear velocity damping.
    pub linear_damping: f32,
    /// Angular velocity damping.
    pub angular_damping: f32,
}

impl PhysicalProfile {
    pub const fn new(mass: f32, linear_damping: f32, angular_damping: f32) -> Self {
        Self {
            mass,
            linear_damping,
            angular_damping,
        }
    }

    /// Linearly interpolates every field towards `other`.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            mass: self.mass.lerp(other.mass, t),
            linear_damping: self.linear_damping.lerp(other.linear_damping, t),
            angular_damping: self.angular_damping.lerp(other.angular_damping, t),
        }
    }
}

impl Default for PhysicalProfile {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.05)
    }
}

/// The simulated part of a segment. A scene object without one cannot join a chain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub profile: PhysicalProfile,
    /// Angular inertia around the body's center of mass.
    pub angular_inertia: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
}

impl RigidBody {
    /// A body at rest with the given profile.
    pub fn at_rest(profile: PhysicalProfile, angular_inertia: f32) -> Self {
        Self {
            profile,
            angular_inertia,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
        }
    }
}

/// A scene object that may take part in the creature's chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,

    /// `None` for purely visual objects.
    pub body: Option<RigidBody>,

    /// World-space position of the segment's center.
    pub position: Vec2,

    /// World-space rotation in radians (counter-clockwise).
    pub rotation: f32,
}

impl Segment {
    /// A segment at `position` with a default body.
    pub fn new(name: impl Into<String>, position: Vec2) -> Self {
        Self {
            name: name.into(),
            body: Some(RigidBody::at_rest(PhysicalProfile::default(), 1.0)),
            position,
            rotation: 0.0,
        }
    }

    /// A scene object with no physical body.
    pub fn visual(name: impl Into<String>, position: Vec2) -> Self {
        Self {
            name: name.into(),
            body: None,
            position,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Supported collision shapes for segments, in the segment's local frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapePrimitive {
    /// A rectangle defined by half-extents (x, y).
    Rectangle(Vec2),
    /// A circle defined by radius.
    Circle(f32),
    /// A capsule defined by radius and the length of its straight section (aligned along Y).
    Capsule { radius: f32, length: f32 },
}

/// A type-erased wrapper over the `bevy_math` primitives backing [`ShapePrimitive`].
#[derive(Clone, Copy, Debug)]
pub enum BevyPrimitive {
    Rectangle(Rectangle),
    Circle(Circle),
    Capsule(Capsule2d),
}

impl BevyPrimitive {
    pub fn mass(&self, density: f32) -> f32 {
        match self {
            Self::Rectangle(s) => s.mass(density),
            Self::Circle(s) => s.mass(density),
            Self::Capsule(s) => s.mass(density),
        }
    }

    /// Angular inertia for a body of unit mass.
    pub fn unit_angular_inertia(&self) -> f32 {
        match self {
            Self::Rectangle(s) => s.unit_angular_inertia(),
            Self::Circle(s) => s.unit_angular_inertia(),
            Self::Capsule(s) => s.unit_angular_inertia(),
        }
    }
}

impl ShapePrimitive {
    /// Convert to the corresponding `bevy_math` primitive for mass-property computation.
    pub fn to_bevy_primitive(self) -> BevyPrimitive {
        match self {
            Self::Rectangle(half_size) => BevyPrimitive::Rectangle(Rectangle { half_size }),
            Self::Circle(r) => BevyPrimitive::Circle(Circle::new(r)),
            Self::Capsule { radius, length } => {
                BevyPrimitive::Capsule(Capsule2d::new(radius, length))
            }
        }
    }
}

/// Template for segments instantiated at runtime (growth).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SegmentPrefab {
    pub name: String,

    /// Collision shape. A prefab without one spawns an object with no physical body.
    pub shape: Option<ShapePrimitive>,

    /// Density in kg/m² used to derive the initial mass.
    pub density: f32,
}

impl Default for SegmentPrefab {
    fn default() -> Self {
        Self {
            name: "Body".to_string(),
            shape: Some(ShapePrimitive::Capsule {
                radius: 0.2,
                length: 0.3,
            }),
            density: 1.0,
        }
    }
}

impl SegmentPrefab {
    /// The body a freshly spawned instance starts with, at rest.
    ///
    /// Mass and inertia come from the shape via `bevy_heavy`; the chain's
    /// profile distribution overwrites mass and damping afterwards.
    pub fn body(&self) -> Option<RigidBody> {
        let shape = self.shape?.to_bevy_primitive();
        let mass = shape.mass(self.density);
        let profile = PhysicalProfile {
            mass,
            ..PhysicalProfile::default()
        };
        Some(RigidBody::at_rest(profile, shape.unit_angular_inertia() * mass))
    }

    /// Creates a scene segment from this prefab.
    pub fn instantiate(&self, position: Vec2, rotation: f32) -> Segment {
        Segment {
            name: self.name.clone(),
            body: self.body(),
            position,
            rotation,
        }
    }
}

/// What a joint means to the creature's chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointRole {
    /// Links its owner to the next segment towards the tail.
    #[default]
    ChainEdge,
    /// Any other constraint (attachments, props). Ignored by chain traversal.
    Auxiliary,
}

/// Angle range of a rotational joint, in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleLimits {
    pub min: f32,
    pub max: f32,
}

impl AngleLimits {
    /// Builds limits, swapping the bounds if they arrive inverted.
    pub fn new(a: f32, b: f32) -> Self {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        Self { min, max }
    }
}

/// Velocity motor of a rotational joint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointMotor {
    /// Target angular speed in rad/s.
    pub speed: f32,
    /// Maximum torque the motor can apply.
    pub max_torque: f32,
}

/// A rotational constraint owned by one segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointDefinition {
    /// The segment carrying the joint (the one closer to the head for chain edges).
    pub owner: SegmentId,

    /// The downstream segment, if any.
    pub connected: Option<SegmentId>,

    pub role: JointRole,

    pub limits: Option<AngleLimits>,

    /// Whether the two connected bodies collide with each other.
    pub collide_connected: bool,

    /// Motor command, `None` while the motor is disabled.
    pub motor: Option<JointMotor>,
}

impl JointDefinition {
    /// A chain edge from `owner` to `connected` with no limits and no motor.
    pub fn chain_edge(owner: SegmentId, connected: SegmentId) -> Self {
        Self {
            owner,
            connected: Some(connected),
            role: JointRole::ChainEdge,
            limits: None,
            collide_connected: false,
            motor: None,
        }
    }

    /// An auxiliary joint; chain traversal never follows it.
    pub fn auxiliary(owner: SegmentId, connected: Option<SegmentId>) -> Self {
        Self {
            role: JointRole::Auxiliary,
            connected,
            ..Self::chain_edge(owner, owner)
        }
    }

    pub fn with_limits(mut self, limits: Option<AngleLimits>) -> Self {
        self.limits = limits;
        self
    }

    /// Whether this joint is a chain edge pointing at `target`.
    pub fn is_edge_to(&self, target: SegmentId) -> bool {
        self.role == JointRole::ChainEdge && self.connected == Some(target)
    }
}
