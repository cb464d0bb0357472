// tests/chain_topology.rs
use glam::Vec2;
use symbios_crawler::{
    ChainConfig, ChainError, ChainTopology, JointDefinition, JointRole, MAX_CHAIN_HOPS,
    PhysicsScene, SceneGraph, Segment, SegmentId, SegmentPrefab, TraversalStop, chain_edge,
    edges_between, trace_chain,
};

/// Head at the origin, `mids` segments trailing along -X, then the tail.
/// Every consecutive pair is linked by a chain edge.
fn linear_scene(mids: usize) -> (SceneGraph, SegmentId, Vec<SegmentId>, SegmentId) {
    let mut scene = SceneGraph::new();
    let head = scene.insert_segment(Segment::new("Head", Vec2::ZERO));
    let mut prev = head;
    let mut ids = Vec::new();
    for i in 0..mids {
        let id = scene.insert_segment(Segment::new(
            format!("Body{}", i + 1),
            Vec2::new(-(i as f32 + 1.0), 0.0),
        ));
        scene
            .create_joint(JointDefinition::chain_edge(prev, id))
            .unwrap();
        ids.push(id);
        prev = id;
    }
    let tail = scene.insert_segment(Segment::new("Tail", Vec2::new(-(mids as f32 + 1.0), 0.0)));
    scene
        .create_joint(JointDefinition::chain_edge(prev, tail))
        .unwrap();
    (scene, head, ids, tail)
}

#[test]
fn test_trace_collects_mids_in_order() {
    let (scene, head, mids, tail) = linear_scene(3);

    let traversal = trace_chain(&scene, head, tail);

    assert!(traversal.reached_tail());
    assert_eq!(traversal.chain.mids(), mids.as_slice());
    assert_eq!(traversal.hops, 4);
    assert_eq!(traversal.chain.last_before_tail(), mids[2]);
}

#[test]
fn test_trace_stops_on_cycle_and_keeps_partial_chain() {
    let mut scene = SceneGraph::new();
    let head = scene.insert_segment(Segment::new("Head", Vec2::ZERO));
    let a = scene.insert_segment(Segment::new("A", Vec2::new(-1.0, 0.0)));
    let b = scene.insert_segment(Segment::new("B", Vec2::new(-2.0, 0.0)));
    let tail = scene.insert_segment(Segment::new("Tail", Vec2::new(-3.0, 0.0)));
    scene.create_joint(JointDefinition::chain_edge(head, a));
    scene.create_joint(JointDefinition::chain_edge(a, b));
    scene.create_joint(JointDefinition::chain_edge(b, a));

    let traversal = trace_chain(&scene, head, tail);

    assert_eq!(traversal.stop, TraversalStop::Cycle(a));
    assert_eq!(traversal.chain.mids(), &[a, b]);
}

#[test]
fn test_trace_is_bounded_by_hop_limit() {
    let mut scene = SceneGraph::new();
    let head = scene.insert_segment(Segment::new("Head", Vec2::ZERO));
    let tail = scene.insert_segment(Segment::new("Tail", Vec2::new(1.0, 0.0)));
    let mut prev = head;
    for i in 0..200 {
        let id = scene.insert_segment(Segment::new(format!("Body{i}"), Vec2::ZERO));
        scene.create_joint(JointDefinition::chain_edge(prev, id));
        prev = id;
    }

    let traversal = trace_chain(&scene, head, tail);

    assert_eq!(traversal.stop, TraversalStop::HopLimit);
    assert_eq!(traversal.hops, MAX_CHAIN_HOPS);
    let mut seen = std::collections::HashSet::new();
    assert!(traversal.chain.mids().iter().all(|s| seen.insert(*s)));
    assert!(!traversal.chain.mids().contains(&head));
}

#[test]
fn test_trace_stops_at_bodiless_segment() {
    let mut scene = SceneGraph::new();
    let head = scene.insert_segment(Segment::new("Head", Vec2::ZERO));
    let prop = scene.insert_segment(Segment::visual("Prop", Vec2::new(-1.0, 0.0)));
    let tail = scene.insert_segment(Segment::new("Tail", Vec2::new(-2.0, 0.0)));
    scene.create_joint(JointDefinition::chain_edge(head, prop));
    scene.create_joint(JointDefinition::chain_edge(prop, tail));

    let traversal = trace_chain(&scene, head, tail);

    assert_eq!(traversal.stop, TraversalStop::MissingBody(prop));
    assert!(traversal.chain.mids().is_empty());
}

#[test]
fn test_auxiliary_joints_are_not_followed() {
    let mut scene = SceneGraph::new();
    let head = scene.insert_segment(Segment::new("Head", Vec2::ZERO));
    let antenna = scene.insert_segment(Segment::new("Antenna", Vec2::new(0.5, 0.5)));
    let mid = scene.insert_segment(Segment::new("Body1", Vec2::new(-1.0, 0.0)));
    let tail = scene.insert_segment(Segment::new("Tail", Vec2::new(-2.0, 0.0)));
    // Created first, so a first-match scan would pick it.
    scene.create_joint(JointDefinition::auxiliary(head, Some(antenna)));
    scene.create_joint(JointDefinition::chain_edge(head, mid));
    scene.create_joint(JointDefinition::chain_edge(mid, tail));

    let traversal = trace_chain(&scene, head, tail);

    assert!(traversal.reached_tail());
    assert_eq!(traversal.chain.mids(), &[mid]);
}

#[test]
fn test_dangling_chain_edge_is_skipped() {
    let (mut scene, head, mids, tail) = linear_scene(1);
    let mut dangling = JointDefinition::chain_edge(head, head);
    dangling.connected = None;
    scene.create_joint(dangling);

    let traversal = trace_chain(&scene, head, tail);

    assert!(traversal.reached_tail());
    assert_eq!(traversal.chain.mids(), mids.as_slice());
}

#[test]
fn test_earliest_chain_edge_wins_when_ambiguous() {
    let (mut scene, head, mids, _tail) = linear_scene(1);
    let stray = scene.insert_segment(Segment::new("Stray", Vec2::new(0.0, 3.0)));
    scene.create_joint(JointDefinition::chain_edge(head, stray));

    let (_, next) = chain_edge(&scene, head).unwrap();

    assert_eq!(next, mids[0]);
}

#[test]
fn test_ensure_connected_is_idempotent() {
    let mut scene = SceneGraph::new();
    let head = scene.insert_segment(Segment::new("Head", Vec2::ZERO));
    let mid = scene.insert_segment(Segment::new("Body1", Vec2::new(-1.0, 0.0)));
    let tail = scene.insert_segment(Segment::new("Tail", Vec2::new(-2.0, 0.0)));
    scene.create_joint(JointDefinition::chain_edge(head, mid));

    let mut topology = ChainTopology::build(&scene, ChainConfig::default(), head, tail);
    let joints_before = scene.joints.len();

    let first = topology.ensure_connected(&mut scene).unwrap();
    let second = topology.ensure_connected(&mut scene).unwrap();

    assert!(first.is_some());
    assert_eq!(second, None);
    assert_eq!(scene.joints.len(), joints_before + 1);
    assert_eq!(edges_between(&scene, mid, tail).len(), 1);
    assert!(trace_chain(&scene, head, tail).reached_tail());

    let created = scene.joint(first.unwrap()).unwrap();
    assert_eq!(created.limits, ChainConfig::default().joints.limits);
    assert!(!created.collide_connected);
}

#[test]
fn test_ensure_connected_on_connected_chain_does_nothing() {
    let (mut scene, head, _, tail) = linear_scene(2);
    let mut topology = ChainTopology::build(&scene, ChainConfig::default(), head, tail);
    let joints_before = scene.joints.len();

    assert_eq!(topology.ensure_connected(&mut scene), Ok(None));
    assert_eq!(scene.joints.len(), joints_before);
}

#[test]
fn test_ensure_connected_without_tail_body_fails_cleanly() {
    let mut scene = SceneGraph::new();
    let head = scene.insert_segment(Segment::new("Head", Vec2::ZERO));
    let tail = scene.insert_segment(Segment::visual("Tail", Vec2::new(-1.0, 0.0)));
    let mut topology = ChainTopology::build(&scene, ChainConfig::default(), head, tail);

    assert_eq!(
        topology.ensure_connected(&mut scene),
        Err(ChainError::MissingEndpoints)
    );
    assert!(scene.joints.is_empty());
}

#[test]
fn test_add_segment_inserts_between_last_body_and_tail() {
    let (mut scene, head, mids, tail) = linear_scene(1);
    let last = mids[0];
    // An unrelated constraint into the tail must survive growth.
    let aux = scene
        .create_joint(JointDefinition::auxiliary(last, Some(tail)))
        .unwrap();
    let stale = edges_between(&scene, last, tail)[0];
    let before: Vec<_> = scene.joints.keys().copied().collect();

    let mut topology = ChainTopology::build(&scene, ChainConfig::default(), head, tail);
    let new = topology.add_segment(&mut scene).unwrap();

    assert_eq!(topology.chain().mids(), &[last, new]);
    assert_eq!(topology.last_before_tail(), new);

    let pos = scene.position(new).unwrap();
    let from = scene.position(last).unwrap();
    let to = scene.position(tail).unwrap();
    assert!(pos.x < from.x && pos.x > to.x);
    assert_eq!(pos, from.lerp(to, 0.5));

    assert_eq!(edges_between(&scene, last, new).len(), 1);
    assert_eq!(edges_between(&scene, new, tail).len(), 1);
    assert!(edges_between(&scene, last, tail).is_empty());
    for id in before {
        if id != stale {
            assert!(scene.joint(id).is_some(), "joint {id} was destroyed");
        }
    }
    assert_eq!(scene.joint(aux).unwrap().role, JointRole::Auxiliary);
    assert!(trace_chain(&scene, head, tail).reached_tail());
}

#[test]
fn test_add_segment_twice_keeps_growing_towards_tail() {
    let (mut scene, head, _, tail) = linear_scene(0);
    let mut topology = ChainTopology::build(&scene, ChainConfig::default(), head, tail);
    assert_eq!(topology.last_before_tail(), head);

    let first = topology.add_segment(&mut scene).unwrap();
    let second = topology.add_segment(&mut scene).unwrap();

    assert_eq!(topology.chain().mids(), &[first, second]);
    assert_eq!(topology.chain_edges(&scene).len(), 3);

    let rediscovered = trace_chain(&scene, head, tail);
    assert_eq!(rediscovered.chain, *topology.chain());
}

#[test]
fn test_add_segment_without_prefab_is_noop() {
    let (mut scene, head, _, tail) = linear_scene(1);
    let config = ChainConfig {
        prefab: None,
        ..ChainConfig::default()
    };
    let mut topology = ChainTopology::build(&scene, config, head, tail);
    let segments = scene.segments.len();
    let joints = scene.joints.len();

    assert_eq!(
        topology.add_segment(&mut scene),
        Err(ChainError::MissingPrefab)
    );
    assert_eq!(scene.segments.len(), segments);
    assert_eq!(scene.joints.len(), joints);
    assert_eq!(topology.chain().mids().len(), 1);
}

#[test]
fn test_add_segment_with_bodiless_prefab_is_noop() {
    let (mut scene, head, _, tail) = linear_scene(1);
    let config = ChainConfig {
        prefab: Some(SegmentPrefab {
            name: "Decal".to_string(),
            shape: None,
            density: 1.0,
        }),
        ..ChainConfig::default()
    };
    let mut topology = ChainTopology::build(&scene, config, head, tail);
    let segments = scene.segments.len();
    let joints = scene.joints.len();

    let result = topology.add_segment(&mut scene);

    assert!(matches!(result, Err(ChainError::NoPhysicalBody(_))));
    assert_eq!(scene.segments.len(), segments);
    assert_eq!(scene.joints.len(), joints);
    assert!(trace_chain(&scene, head, tail).reached_tail());
}

#[test]
fn test_grown_segment_takes_mass_from_prefab_shape() {
    let (mut scene, head, _, tail) = linear_scene(0);
    let mut topology = ChainTopology::build(&scene, ChainConfig::default(), head, tail);

    let new = topology.add_segment(&mut scene).unwrap();

    let body = scene.segment(new).unwrap().body.unwrap();
    assert!(body.profile.mass > 0.0);
    assert!(body.angular_inertia > 0.0);
    assert_eq!(body.linear_velocity, Vec2::ZERO);
}

#[test]
fn test_chain_edges_stop_at_first_gap() {
    let (mut scene, head, mids, tail) = linear_scene(3);
    let topology = ChainTopology::build(&scene, ChainConfig::default(), head, tail);
    assert_eq!(topology.chain_edges(&scene).len(), 4);

    let gap = edges_between(&scene, mids[0], mids[1])[0];
    scene.remove_joint(gap);

    // Later joints keep their distance from the head, so they are not listed.
    let edges = topology.chain_edges(&scene);
    assert_eq!(edges, edges_between(&scene, head, mids[0]));
}
