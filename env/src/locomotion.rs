//! Character-controller locomotion: input intent, gravity integration and
//! combo-jump arcs.
//!
//! The same model drives both the single-jump and the combo-jump avatar;
//! a single-jump profile is just a table whose tiers are identical.

use volleyball_shared::config::LocomotionConfig;
use volleyball_shared::types::JumpPhase;
use volleyball_shared::vec3::{forward_from_yaw, slerp, try_normalize, yaw_from_direction, Vec3};

use crate::input::{InputEdge, InputSnapshot};
use crate::scheduler::{DeferredTask, Scheduler, TimerId};

/// Highest combo index. Lookups past it clamp.
pub const MAX_COMBO_TIER: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpTier {
    pub initial_velocity: f64,
    pub gravity: f64,
}

impl JumpTier {
    /// Tier reaching `height` after `time_to_apex` seconds under constant gravity.
    pub fn from_apex(height: f64, time_to_apex: f64) -> Self {
        Self {
            initial_velocity: 2.0 * height / time_to_apex,
            gravity: -2.0 * height / (time_to_apex * time_to_apex),
        }
    }
}

/// Jump arcs indexed by combo count. Index 0 is the arc used when no jump
/// has been made in the current window.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpProfile {
    tiers: [JumpTier; MAX_COMBO_TIER + 1],
}

impl JumpProfile {
    pub fn from_config(config: &LocomotionConfig) -> Self {
        let time_to_apex = config.max_jump_time / 2.0;
        let tiers = std::array::from_fn(|k| {
            JumpTier::from_apex(
                config.max_jump_height + config.tier_extra_height[k],
                time_to_apex * config.tier_time_scale[k],
            )
        });
        Self { tiers }
    }

    /// Every tier identical: jumps never escalate.
    pub fn single(height: f64, time_to_apex: f64) -> Self {
        Self {
            tiers: [JumpTier::from_apex(height, time_to_apex); MAX_COMBO_TIER + 1],
        }
    }

    pub fn tier(&self, combo: usize) -> JumpTier {
        self.tiers[combo.min(MAX_COMBO_TIER)]
    }
}

impl Default for JumpProfile {
    fn default() -> Self {
        Self::from_config(&LocomotionConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct Locomotion {
    config: LocomotionConfig,
    profile: JumpProfile,
    /// Horizontal intent in x/z, vertical velocity in y
    pub movement: Vec3,
    pub movement_pressed: bool,
    pub jump_pressed: bool,
    /// Set by a jump, cleared once the button is released on the ground
    pub is_jumping: bool,
    /// Set by a jump, cleared on landing
    pub jump_animating: bool,
    /// Render-side running flag
    pub running: bool,
    pub phase: JumpPhase,
    combo: usize,
    combo_timer: Option<TimerId>,
}

impl Locomotion {
    pub fn new(config: LocomotionConfig) -> Self {
        let profile = JumpProfile::from_config(&config);
        Self::with_profile(config, profile)
    }

    pub fn with_profile(config: LocomotionConfig, profile: JumpProfile) -> Self {
        Self {
            config,
            profile,
            movement: Vec3::ZERO,
            movement_pressed: false,
            jump_pressed: false,
            is_jumping: false,
            jump_animating: false,
            running: false,
            phase: JumpPhase::Idle,
            combo: 0,
            combo_timer: None,
        }
    }

    pub fn combo(&self) -> usize {
        self.combo
    }

    pub fn profile(&self) -> &JumpProfile {
        &self.profile
    }

    pub fn combo_timer_pending(&self) -> bool {
        self.combo_timer.is_some()
    }

    /// Latch this tick's input. Without an edge the previous intent stays.
    pub fn apply_input(&mut self, input: &InputSnapshot) {
        self.jump_pressed = input.jump;
        let factor = match input.edge {
            Some(InputEdge::Started) | Some(InputEdge::Canceled) => self.config.run_factor,
            Some(InputEdge::Performed) => self.config.run_diag_factor,
            None => return,
        };
        let (x, z) = input.axis;
        self.movement.x = x * factor;
        self.movement.z = z * factor;
        self.movement_pressed = x != 0.0 || z != 0.0;
    }

    /// Displacement handed to the character controller this tick.
    pub fn displacement(&self, dt: f64) -> Vec3 {
        self.movement * (self.config.move_speed_scale * dt)
    }

    /// Integrate vertical velocity. Landing from a jump restarts the combo
    /// window.
    pub fn handle_gravity(
        &mut self,
        grounded: bool,
        dt: f64,
        scheduler: &mut Scheduler<DeferredTask>,
    ) {
        if grounded {
            if self.jump_animating {
                self.jump_animating = false;
                self.restart_combo_timer(scheduler);
            }
            self.movement.y = self.config.grounded_gravity;
            self.phase = JumpPhase::Idle;
            return;
        }

        let tier = self.profile.tier(self.combo);
        let previous = self.movement.y;
        let falling = previous <= 0.0 || !self.jump_pressed;
        if falling {
            let next = previous + tier.gravity * self.config.fall_multiplier * dt;
            self.movement.y = ((previous + next) * 0.5).max(self.config.terminal_velocity);
            self.phase = JumpPhase::Falling;
        } else {
            let next = previous + tier.gravity * dt;
            self.movement.y = (previous + next) * 0.5;
            self.phase = JumpPhase::Rising;
        }
    }

    /// Start a jump if allowed. Returns true when one started.
    pub fn handle_jump(&mut self, grounded: bool, scheduler: &mut Scheduler<DeferredTask>) -> bool {
        if !self.is_jumping && grounded && self.jump_pressed {
            if let Some(id) = self.combo_timer.take() {
                scheduler.cancel(id);
            }
            self.is_jumping = true;
            self.jump_animating = true;
            self.combo = (self.combo + 1).min(MAX_COMBO_TIER);
            self.movement.y = self.profile.tier(self.combo).initial_velocity * 0.5;
            self.phase = JumpPhase::Rising;
            return true;
        }
        if self.is_jumping && grounded && !self.jump_pressed {
            self.is_jumping = false;
        }
        false
    }

    /// Combo window elapsed without a new jump.
    pub fn reset_combo(&mut self) {
        self.combo = 0;
        self.combo_timer = None;
    }

    /// Back to rest, dropping any pending combo window.
    pub fn reset(&mut self, scheduler: &mut Scheduler<DeferredTask>) {
        if let Some(id) = self.combo_timer.take() {
            scheduler.cancel(id);
        }
        *self = Self::with_profile(self.config.clone(), self.profile.clone());
    }

    /// Render tick: blend facing toward the movement intent. Returns the
    /// new yaw, or None when there is nothing to face.
    pub fn handle_rotation(&self, yaw_deg: f64) -> Option<f64> {
        if !self.movement_pressed {
            return None;
        }
        let target = try_normalize(Vec3::new(self.movement.x, 0.0, self.movement.z))?;
        let blend = self.config.rotation_factor_per_frame.clamp(0.0, 1.0);
        let facing = slerp(forward_from_yaw(yaw_deg), target, blend, Vec3::UP);
        yaw_from_direction(facing)
    }

    /// Render tick: running flag follows the movement button.
    pub fn handle_animation(&mut self) {
        if self.movement_pressed != self.running {
            self.running = self.movement_pressed;
        }
    }

    fn restart_combo_timer(&mut self, scheduler: &mut Scheduler<DeferredTask>) {
        if let Some(id) = self.combo_timer.take() {
            scheduler.cancel(id);
        }
        self.combo_timer =
            Some(scheduler.schedule(self.config.combo_reset_delay, DeferredTask::ResetJumpCombo));
    }
}
