use volleyball_shared::types::Team;
use volleyball_shared::vec3::Vec3;

use crate::agent::Agent;
use crate::avatar::PlayerAvatar;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ball {
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl Ball {
    /// Teleport and come to rest.
    pub fn place(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }
}

/// Everything the simulation tick mutates.
#[derive(Debug, Clone)]
pub struct Scene {
    pub blue: Agent,
    pub purple: Option<Agent>,
    pub avatar: Option<PlayerAvatar>,
    pub ball: Ball,
}

impl Scene {
    pub fn agent(&self, team: Team) -> Option<&Agent> {
        match team {
            Team::Blue => Some(&self.blue),
            Team::Purple => self.purple.as_ref(),
            Team::Unassigned => None,
        }
    }

    pub fn agent_mut(&mut self, team: Team) -> Option<&mut Agent> {
        match team {
            Team::Blue => Some(&mut self.blue),
            Team::Purple => self.purple.as_mut(),
            Team::Unassigned => None,
        }
    }

    /// Present agents, blue first.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        std::iter::once(&self.blue).chain(self.purple.as_ref())
    }

    pub fn agents_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        std::iter::once(&mut self.blue).chain(self.purple.as_mut())
    }
}
