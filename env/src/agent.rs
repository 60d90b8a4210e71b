//! Learning agent: discrete action decoding, rigid-body motion and the
//! observation vector.

use volleyball_shared::config::AgentSettings;
use volleyball_shared::types::{JumpPhase, Team};
use volleyball_shared::vec3::{
    forward_from_yaw, length, move_towards, normalize_or_zero, right_from_yaw, Vec3,
};

use crate::episode::EpisodeSignal;
use crate::error::{EnvError, Result};
use crate::physics::{BodyId, PhysicsWorld, RigidBody};
use crate::scene::Ball;

pub const OBSERVATION_SIZE: usize = 11;

/// Within this distance below the jump apex the agent counts as hanging.
const APEX_BAND: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForwardAction {
    #[default]
    None,
    Forward,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotateAction {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrafeAction {
    #[default]
    None,
    Left,
    Right,
}

/// One decision per simulation tick. The default does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionVector {
    pub forward: ForwardAction,
    pub rotate: RotateAction,
    pub strafe: StrafeAction,
    pub jump: bool,
}

impl ActionVector {
    /// Choices per branch: forward, rotate, strafe, jump.
    pub const BRANCH_SIZES: [i32; 4] = [3, 3, 3, 2];

    /// Decode the raw discrete branches a learner emits.
    pub fn from_branches(branches: &[i32]) -> Result<Self> {
        if branches.len() != Self::BRANCH_SIZES.len() {
            return Err(EnvError::ActionArity(branches.len()));
        }
        for (branch, (&value, &size)) in branches.iter().zip(&Self::BRANCH_SIZES).enumerate() {
            if !(0..size).contains(&value) {
                return Err(EnvError::InvalidAction { branch, value });
            }
        }

        let forward = match branches[0] {
            1 => ForwardAction::Forward,
            2 => ForwardAction::Back,
            _ => ForwardAction::None,
        };
        let rotate = match branches[1] {
            1 => RotateAction::Left,
            2 => RotateAction::Right,
            _ => RotateAction::None,
        };
        let strafe = match branches[2] {
            1 => StrafeAction::Left,
            2 => StrafeAction::Right,
            _ => StrafeAction::None,
        };
        Ok(Self {
            forward,
            rotate,
            strafe,
            jump: branches[3] == 1,
        })
    }

    pub fn to_branches(self) -> [i32; 4] {
        let forward = match self.forward {
            ForwardAction::None => 0,
            ForwardAction::Forward => 1,
            ForwardAction::Back => 2,
        };
        let rotate = match self.rotate {
            RotateAction::None => 0,
            RotateAction::Left => 1,
            RotateAction::Right => 2,
        };
        let strafe = match self.strafe {
            StrafeAction::None => 0,
            StrafeAction::Left => 1,
            StrafeAction::Right => 2,
        };
        [forward, rotate, strafe, self.jump as i32]
    }
}

/// Policy input. Layout:
/// `[yaw, dir_x, dir_y, dir_z, dist, vel_x, vel_y, vel_z, ball_vy, ball_vz, ball_vx]`
/// with x/z of the ball direction and ball velocity mirrored by team sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation(pub [f64; OBSERVATION_SIZE]);

impl Observation {
    /// Rebuild from a wire vector. `None` on a length mismatch.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let array: [f64; OBSERVATION_SIZE] = values.try_into().ok()?;
        Some(Self(array))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Yaw as the y component of its quaternion
    pub fn yaw(&self) -> f64 {
        self.0[0]
    }

    /// Team-relative unit direction to the ball
    pub fn ball_direction(&self) -> Vec3 {
        Vec3::new(self.0[1], self.0[2], self.0[3])
    }

    pub fn ball_distance(&self) -> f64 {
        self.0[4]
    }
}

#[derive(Debug, Clone)]
pub struct Agent {
    team: Team,
    sign: f64,
    pub body: RigidBody,
    jump_timer: f64,
    jump_start: Vec3,
    grounded: bool,
    pub episode: EpisodeSignal,
}

impl Agent {
    pub fn new(team: Team) -> Result<Self> {
        let sign = team.sign().ok_or(EnvError::UnassignedAgent(team))?;
        Ok(Self {
            team,
            sign,
            body: RigidBody::default(),
            jump_timer: 0.0,
            jump_start: Vec3::ZERO,
            grounded: false,
            episode: EpisodeSignal::default(),
        })
    }

    pub fn team(&self) -> Team {
        self.team
    }

    /// -1 for blue, +1 for purple
    pub fn sign(&self) -> f64 {
        self.sign
    }

    pub fn body_id(&self) -> BodyId {
        match self.team {
            Team::Blue => BodyId::BlueAgent,
            _ => BodyId::PurpleAgent,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn jump_timer(&self) -> f64 {
        self.jump_timer
    }

    /// Probe below the body centre and remember the result for this tick.
    pub fn update_grounded<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &W,
        settings: &AgentSettings,
    ) -> bool {
        self.grounded = world.probe_ground(self.body.position, settings.ground_probe_length());
        self.grounded
    }

    /// Apply one tick of action. Call `update_grounded` first.
    pub fn resolve_action(&mut self, action: ActionVector, dt: f64, settings: &AgentSettings) {
        let move_scale = if self.grounded {
            1.0
        } else {
            settings.airborne_move_factor
        };
        let forward = forward_from_yaw(self.body.yaw);
        let right = right_from_yaw(self.body.yaw);

        let mut dir = Vec3::ZERO;
        match action.forward {
            ForwardAction::Forward => dir += forward * move_scale,
            ForwardAction::Back => dir += forward * (-move_scale * settings.speed_reduction_factor),
            ForwardAction::None => {}
        }
        match action.strafe {
            StrafeAction::Left => dir += right * (-move_scale * settings.speed_reduction_factor),
            StrafeAction::Right => dir += right * (move_scale * settings.speed_reduction_factor),
            StrafeAction::None => {}
        }

        if action.jump && self.grounded && self.jump_timer <= 0.0 {
            self.jump_timer = settings.jump_duration;
            self.jump_start = self.body.position;
        }

        let turn = settings.turn_rate_deg * dt;
        match action.rotate {
            RotateAction::Left => self.body.yaw -= turn,
            RotateAction::Right => self.body.yaw += turn,
            RotateAction::None => {}
        }

        let push = dir * (self.sign * settings.agent_run_speed);
        self.body.velocity += push;

        if self.jump_timer > 0.0 {
            let pos = self.body.position;
            let target = Vec3::new(pos.x, self.jump_start.y + settings.agent_jump_height, pos.z)
                + dir * self.sign;
            self.steer_towards(target, dt, settings);
        } else if !self.grounded {
            self.body.velocity.y -= settings.falling_force * dt;
        }

        if self.jump_timer > 0.0 {
            self.jump_timer -= dt;
        }
    }

    fn steer_towards(&mut self, target: Vec3, dt: f64, settings: &AgentSettings) {
        let velocity_target = (target - self.body.position) * (dt * settings.agent_jump_velocity);
        if !velocity_target.is_finite() {
            tracing::warn!(team = ?self.team, "non-finite jump steering target, skipping");
            return;
        }
        self.body.velocity = move_towards(
            self.body.velocity,
            velocity_target,
            settings.agent_jump_velocity_max_change,
        );
    }

    pub fn collect_observations(&self, ball: &Ball) -> Observation {
        let pos = self.body.position;
        let to_ball = Vec3::new(
            (ball.position.x - pos.x) * self.sign,
            ball.position.y - pos.y,
            (ball.position.z - pos.z) * self.sign,
        );
        let dir = normalize_or_zero(to_ball);
        let vel = self.body.velocity;
        let bv = ball.velocity;
        Observation([
            (self.body.yaw.to_radians() * 0.5).sin(),
            dir.x,
            dir.y,
            dir.z,
            length(to_ball),
            vel.x,
            vel.y,
            vel.z,
            bv.y,
            bv.z * self.sign,
            bv.x * self.sign,
        ])
    }

    pub fn jump_phase(&self, settings: &AgentSettings) -> JumpPhase {
        if self.jump_timer > 0.0 {
            let apex = self.jump_start.y + settings.agent_jump_height;
            if self.body.position.y < apex - APEX_BAND {
                JumpPhase::Rising
            } else {
                JumpPhase::ApexHold
            }
        } else if !self.grounded {
            JumpPhase::Falling
        } else {
            JumpPhase::Idle
        }
    }

    /// Place the agent for a new episode. The reward accumulator is kept.
    pub fn reset_pose(&mut self, position: Vec3, yaw: f64) {
        self.body = RigidBody {
            position,
            velocity: Vec3::ZERO,
            yaw,
        };
        self.jump_timer = 0.0;
        self.jump_start = position;
        self.grounded = false;
    }
}
