use volleyball_shared::config::LocomotionConfig;
use volleyball_shared::types::JumpPhase;
use volleyball_shared::vec3::Vec3;

use crate::input::InputSnapshot;
use crate::locomotion::Locomotion;
use crate::physics::{CharacterBody, PhysicsWorld};
use crate::scheduler::{DeferredTask, Scheduler};

/// Human-controlled character on the purple side, moved through the
/// character controller rather than by forces.
#[derive(Debug, Clone)]
pub struct PlayerAvatar {
    pub body: CharacterBody,
    pub locomotion: Locomotion,
    grounded: bool,
}

impl PlayerAvatar {
    pub fn new(config: LocomotionConfig) -> Self {
        Self {
            body: CharacterBody::default(),
            locomotion: Locomotion::new(config),
            grounded: false,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn jump_phase(&self) -> JumpPhase {
        self.locomotion.phase
    }

    /// Simulation tick: move, then integrate gravity, then maybe jump.
    pub fn fixed_update<W: PhysicsWorld + ?Sized>(
        &mut self,
        input: &InputSnapshot,
        world: &mut W,
        dt: f64,
        scheduler: &mut Scheduler<DeferredTask>,
    ) {
        self.locomotion.apply_input(input);
        let delta = self.locomotion.displacement(dt);
        self.grounded = world.move_character(&mut self.body, delta, dt);
        self.locomotion.handle_gravity(self.grounded, dt, scheduler);
        self.locomotion.handle_jump(self.grounded, scheduler);
    }

    /// Render tick: facing and animation flags only.
    pub fn render_update(&mut self) {
        if let Some(yaw) = self.locomotion.handle_rotation(self.body.yaw) {
            self.body.yaw = yaw;
        }
        self.locomotion.handle_animation();
    }

    pub fn reset(&mut self, position: Vec3, yaw: f64, scheduler: &mut Scheduler<DeferredTask>) {
        self.body = CharacterBody { position, yaw };
        self.locomotion.reset(scheduler);
        self.grounded = false;
    }
}
