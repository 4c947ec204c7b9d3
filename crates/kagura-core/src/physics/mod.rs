//! Physics body registry.
//!
//! Host-owned rigid-body simulation, driven once per frame from the logic
//! module through the reverse-direction bridge. Creation and query only;
//! bodies live for the session. Ids are assigned sequentially starting at 1
//! (0 is reserved as "invalid"), and each simulation body is tagged with its
//! id so begun contacts can be reported in id terms.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use crossbeam_channel::{unbounded, Receiver, Sender};
use kagura_module_api::{CollisionEvent, Vec2, INVALID_BODY_ID};
use rapier2d::geometry::CollisionEvent as RapierCollisionEvent;
use rapier2d::prelude::*;

/// Simulation advances in fixed steps regardless of frame rate, so runs are
/// reproducible across hot-reload round trips.
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
const SOLVER_ITERATIONS: usize = 4;

const GRAVITY_Y: f32 = -9.8;
const BOX_DENSITY: f32 = 1.0;
const BOX_FRICTION: f32 = 0.3;

struct CollisionChannel {
    send: Sender<(ColliderHandle, ColliderHandle)>,
}

impl EventHandler for CollisionChannel {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: RapierCollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let RapierCollisionEvent::Started(a, b, _) = event {
            let _ = self.send.send((a, b));
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    registry: HashMap<u64, RigidBodyHandle>,
    next_body_id: u64,

    collision_events: Vec<CollisionEvent>,
    contact_send: Sender<(ColliderHandle, ColliderHandle)>,
    contact_recv: Receiver<(ColliderHandle, ColliderHandle)>,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = FIXED_TIMESTEP;
        if let Some(iterations) = NonZeroUsize::new(SOLVER_ITERATIONS) {
            integration_parameters.num_solver_iterations = iterations;
        }

        let (contact_send, contact_recv) = unbounded();

        Self {
            gravity: vector![0.0, GRAVITY_Y],
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            registry: HashMap::new(),
            next_body_id: 1,
            collision_events: Vec::new(),
            contact_send,
            contact_recv,
        }
    }

    /// Creates a dynamic box body centered at (x, y) with full extents
    /// (width, height) and returns its id.
    pub fn create_dynamic_box(&mut self, x: f32, y: f32, width: f32, height: f32) -> u64 {
        let id = self.take_body_id();
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![x, y])
            .user_data(id as u128)
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(width * 0.5, height * 0.5)
            .density(BOX_DENSITY)
            .friction(BOX_FRICTION)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.registry.insert(id, handle);
        log::debug!(target: "physics", "body {id}: dynamic box at ({x}, {y}) size {width}x{height}");
        id
    }

    /// Creates a static box body. Same id discipline as the dynamic variant.
    pub fn create_static_box(&mut self, x: f32, y: f32, width: f32, height: f32) -> u64 {
        let id = self.take_body_id();
        let body = RigidBodyBuilder::fixed()
            .translation(vector![x, y])
            .user_data(id as u128)
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(width * 0.5, height * 0.5)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.registry.insert(id, handle);
        log::debug!(target: "physics", "body {id}: static box at ({x}, {y}) size {width}x{height}");
        id
    }

    /// Current position of a body, if the id is known.
    pub fn body_position(&self, id: u64) -> Option<Vec2> {
        let handle = self.registry.get(&id)?;
        let body = self.bodies.get(*handle)?;
        let t = body.translation();
        Some(Vec2::new(t.x, t.y))
    }

    /// Advances the simulation by one fixed step. The collision-event buffer
    /// from the previous step is cleared before stepping, then repopulated
    /// with contacts begun during this step.
    pub fn step(&mut self) {
        self.collision_events.clear();

        let collector = CollisionChannel {
            send: self.contact_send.clone(),
        };
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &collector,
        );

        while let Ok((a, b)) = self.contact_recv.try_recv() {
            let body_a = self.collider_body_id(a);
            let body_b = self.collider_body_id(b);
            // Pairs involving an untagged body are dropped, never reported
            // with a zero id.
            if body_a != INVALID_BODY_ID && body_b != INVALID_BODY_ID {
                self.collision_events.push(CollisionEvent { body_a, body_b });
            }
        }
    }

    /// Contacts begun during the most recent [`step`](Self::step). Valid
    /// until the next step clears them.
    #[inline]
    pub fn collision_events(&self) -> &[CollisionEvent] {
        &self.collision_events
    }

    #[inline]
    pub fn body_count(&self) -> usize {
        self.registry.len()
    }

    fn take_body_id(&mut self) -> u64 {
        let id = self.next_body_id;
        self.next_body_id += 1;
        id
    }

    fn collider_body_id(&self, collider: ColliderHandle) -> u64 {
        let Some(collider) = self.colliders.get(collider) else {
            return INVALID_BODY_ID;
        };
        let Some(parent) = collider.parent() else {
            return INVALID_BODY_ID;
        };
        let Some(body) = self.bodies.get(parent) else {
            return INVALID_BODY_ID;
        };
        body.user_data as u64
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
