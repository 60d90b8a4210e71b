//! Boundary to the physics engine. The environment only needs three
//! services from it: a downward ground probe, a character controller move
//! and a body integration step that reports contacts.

use volleyball_shared::types::{RegionTag, Team};
use volleyball_shared::vec3::Vec3;

use crate::scene::Scene;

/// Dynamic body driven by velocity changes (the agents).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RigidBody {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Degrees, 0 faces +z
    pub yaw: f64,
}

/// Kinematic body moved by displacement (the avatar).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CharacterBody {
    pub position: Vec3,
    pub yaw: f64,
}

/// Bodies the ball can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyId {
    BlueAgent,
    PurpleAgent,
    Avatar,
}

impl BodyId {
    /// Team credited with a hit by this body. Only learning agents claim
    /// hits; the avatar deflects the ball without becoming last hitter.
    pub fn team(self) -> Option<Team> {
        match self {
            BodyId::BlueAgent => Some(Team::Blue),
            BodyId::PurpleAgent => Some(Team::Purple),
            BodyId::Avatar => None,
        }
    }
}

/// Ball overlapping a trigger volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Overlap {
    pub region: usize,
    pub tag: RegionTag,
}

/// What the ball is touching after a step. These are current states;
/// the caller turns them into entry edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contacts {
    pub ball_touches: Vec<BodyId>,
    pub overlaps: Vec<Overlap>,
}

pub trait PhysicsWorld {
    /// Cast a ray straight down from `origin`. True if a walkable surface
    /// is hit within `max_distance`.
    fn probe_ground(&self, origin: Vec3, max_distance: f64) -> bool;

    /// Move a character by `delta`, resolving collisions. Returns whether it
    /// ended the move standing on something.
    fn move_character(&mut self, body: &mut CharacterBody, delta: Vec3, dt: f64) -> bool;

    /// Integrate the agents and the ball over `dt`.
    fn step(&mut self, scene: &mut Scene, dt: f64) -> Contacts;
}
