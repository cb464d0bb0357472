//! Interpreter that converts an L-System symbol sequence into a pre-placed creature.
//!
//! The entry point is [`BodyPlanInterpreter`]. Configure it with a [`BodyPlanConfig`],
//! register symbol-to-operation mappings via [`BodyPlanInterpreter::set_op`] or
//! [`BodyPlanInterpreter::populate_standard_symbols`], then call
//! [`BodyPlanInterpreter::build_into`] with a [`symbios::SymbiosState`] and a scene.
//!
//! The resulting segments and chain-edge joints are exactly what
//! [`ChainTopology`](crate::chain::ChainTopology) discovers at spawn time.

use crate::body::{
    AngleLimits, JointDefinition, JointId, JointRole, SegmentId, SegmentPrefab, ShapePrimitive,
};
use crate::chain::JointSettings;
use crate::scene::PhysicsScene;
use crate::turtle::{ActiveJointConfig, PlanOp, PlanTurtleState, SegmentKind};
use glam::Vec2;
use log::debug;
use symbios::{SymbiosState, SymbolTable};

/// Configuration for body-plan interpretation.
#[derive(Clone, Debug)]
pub struct BodyPlanConfig {
    /// Default segment length along the body if no parameter is provided.
    pub default_length: f32,
    /// Default segment width.
    pub default_width: f32,
    /// Density (kg/m²) for the initial segment mass.
    pub default_density: f32,
    /// Default turn angle (in radians) for `+`/`-`.
    pub default_angle: f32,
    /// Settings for links before any `Jl`/`Jc` symbol changes them.
    pub joints: JointSettings,
    /// Where the head is placed.
    pub origin: Vec2,
    /// Direction the head faces, in radians.
    pub heading: f32,
    /// Maximum stack depth for push/pop operations.
    pub max_stack_depth: usize,
}

impl Default for BodyPlanConfig {
    fn default() -> Self {
        Self {
            default_length: 0.6,
            default_width: 0.4,
            default_density: 1.0,
            default_angle: 15.0f32.to_radians(),
            joints: JointSettings::default(),
            origin: Vec2::ZERO,
            heading: 0.0,
            max_stack_depth: 1024,
        }
    }
}

/// Handles of everything a body plan placed in the scene.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacedBody {
    /// The first `H` segment.
    pub head: Option<SegmentId>,
    /// The last `T` segment.
    pub tail: Option<SegmentId>,
    /// Every spawned segment, in spawn order.
    pub segments: Vec<SegmentId>,
    pub joints: Vec<JointId>,
}

/// Interprets L-System output to place a creature's segments in a scene.
pub struct BodyPlanInterpreter {
    op_map: Vec<PlanOp>,
    config: BodyPlanConfig,
}

impl BodyPlanInterpreter {
    /// Creates a new interpreter with the given configuration and an empty symbol map.
    pub fn new(config: BodyPlanConfig) -> Self {
        Self {
            op_map: Vec::new(),
            config,
        }
    }

    /// Replaces the entire symbol-to-operation map in one step (builder pattern).
    ///
    /// `map` is indexed by symbol ID as returned by [`symbios::SymbolTable`].
    /// Any ID that falls outside the slice is treated as [`PlanOp::Ignore`].
    pub fn with_map(mut self, map: Vec<PlanOp>) -> Self {
        self.op_map = map;
        self
    }

    /// Assigns a single [`PlanOp`] to a symbol ID, growing the map as needed.
    pub fn set_op(&mut self, sym_id: u16, op: PlanOp) {
        let idx = sym_id as usize;
        if idx >= self.op_map.len() {
            self.op_map.resize(idx + 1, PlanOp::Ignore);
        }
        self.op_map[idx] = op;
    }

    /// Registers the conventional mappings for every standard symbol present in `interner`.
    pub fn populate_standard_symbols(&mut self, interner: &SymbolTable) {
        let mappings = [
            // Spatial
            ("f", PlanOp::Move),
            ("+", PlanOp::Turn(1.0)),
            ("-", PlanOp::Turn(-1.0)),
            // Segments
            ("H", PlanOp::Spawn(SegmentKind::Head)),
            ("B", PlanOp::Spawn(SegmentKind::Body)),
            ("T", PlanOp::Spawn(SegmentKind::Tail)),
            // Config
            ("!", PlanOp::SetWidth),
            ("J", PlanOp::SetJointRole(JointRole::ChainEdge)),
            ("Ja", PlanOp::SetJointRole(JointRole::Auxiliary)),
            ("Jl", PlanOp::SetJointLimits),
            ("Jc", PlanOp::ToggleCollision),
            // Flow
            ("[", PlanOp::Push),
            ("]", PlanOp::Pop),
        ];

        for (sym, op) in mappings {
            if let Some(id) = interner.resolve_id(sym) {
                self.set_op(id, op);
            }
        }
    }

    /// Walks every symbol in `state` and spawns the described segments into `scene`.
    ///
    /// Each spawned segment is centered half its length behind the cursor and
    /// linked to the segment the turtle stood on, after which the cursor moves
    /// to the segment's far end.
    pub fn build_into<S>(&self, state: &SymbiosState, scene: &mut S) -> PlacedBody
    where
        S: PhysicsScene + ?Sized,
    {
        let mut placed = PlacedBody::default();
        let mut turtle = PlanTurtleState {
            position: self.config.origin,
            heading: self.config.heading,
            width: self.config.default_width,
            joint_config: ActiveJointConfig {
                role: JointRole::ChainEdge,
                limits: self.config.joints.limits,
                collide_connected: self.config.joints.collide_connected,
            },
            ..Default::default()
        };
        let mut stack = Vec::new();
        // Pushes refused at the depth limit; their pops are ignored too.
        let mut dropped_pushes = 0usize;
        let mut body_count = 0usize;

        for i in 0..state.len() {
            let view = match state.get_view(i) {
                Some(v) => v,
                None => break,
            };

            let op = self
                .op_map
                .get(view.sym as usize)
                .unwrap_or(&PlanOp::Ignore);

            let p = |idx: usize, def: f32| -> f32 {
                view.params.get(idx).map(|&x| x as f32).unwrap_or(def)
            };

            match op {
                PlanOp::Move => turtle.advance(p(0, self.config.default_length)),
                PlanOp::Turn(s) => {
                    turtle.turn(p(0, self.config.default_angle.to_degrees()).to_radians() * s)
                }

                PlanOp::Spawn(kind) => {
                    let length = p(0, self.config.default_length).abs();
                    let width = p(1, turtle.width).abs();
                    let name = match kind {
                        SegmentKind::Head => "Head".to_string(),
                        SegmentKind::Tail => "Tail".to_string(),
                        SegmentKind::Body => {
                            body_count += 1;
                            format!("Body{body_count}")
                        }
                    };
                    let prefab = SegmentPrefab {
                        name,
                        shape: Some(ShapePrimitive::Rectangle(Vec2::new(
                            length / 2.0,
                            width / 2.0,
                        ))),
                        density: self.config.default_density,
                    };

                    let center = turtle.position + turtle.trail() * (length / 2.0);
                    let id = scene.spawn(&prefab, center, turtle.heading);
                    placed.segments.push(id);

                    if let Some(parent) = turtle.current_segment {
                        let joint = JointDefinition {
                            owner: parent,
                            connected: Some(id),
                            role: turtle.joint_config.role,
                            limits: turtle.joint_config.limits,
                            collide_connected: turtle.joint_config.collide_connected,
                            motor: None,
                        };
                        if let Some(joint_id) = scene.create_joint(joint) {
                            placed.joints.push(joint_id);
                        }
                    }

                    match kind {
                        SegmentKind::Head => {
                            placed.head.get_or_insert(id);
                        }
                        SegmentKind::Tail => placed.tail = Some(id),
                        SegmentKind::Body => {}
                    }

                    turtle.advance(length);
                    turtle.current_segment = Some(id);
                }

                PlanOp::SetJointRole(role) => turtle.joint_config.role = *role,
                PlanOp::SetJointLimits => {
                    let (min, max) = turtle
                        .joint_config
                        .limits
                        .map(|l| (l.min, l.max))
                        .unwrap_or((-std::f32::consts::PI, std::f32::consts::PI));
                    turtle.joint_config.limits = Some(AngleLimits::new(p(0, min), p(1, max)));
                }
                PlanOp::ToggleCollision => {
                    turtle.joint_config.collide_connected = !turtle.joint_config.collide_connected
                }
                PlanOp::SetWidth => turtle.width = p(0, turtle.width),

                PlanOp::Push => {
                    if stack.len() < self.config.max_stack_depth {
                        stack.push(turtle.clone());
                    } else {
                        dropped_pushes += 1;
                    }
                }
                PlanOp::Pop => {
                    if dropped_pushes > 0 {
                        dropped_pushes -= 1;
                    } else if let Some(state) = stack.pop() {
                        turtle = state;
                    }
                }
                PlanOp::Ignore => {}
            }
        }

        debug!(
            "body plan placed {} segments and {} joints",
            placed.segments.len(),
            placed.joints.len()
        );
        placed
    }
}
