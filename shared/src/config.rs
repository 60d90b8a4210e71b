/// Rigid-body agent tuning.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSettings {
    /// Velocity change per tick at full forward input
    pub agent_run_speed: f64,
    /// Apex height above the jump start
    pub agent_jump_height: f64,
    /// Gain toward the jump target
    pub agent_jump_velocity: f64,
    /// Max velocity change per tick while steering a jump
    pub agent_jump_velocity_max_change: f64,
    /// Slows backward and strafe movement
    pub speed_reduction_factor: f64,
    /// Movement scale while airborne
    pub airborne_move_factor: f64,
    /// Downward acceleration after the jump timer runs out
    pub falling_force: f64,
    /// Seconds of steered ascent per jump
    pub jump_duration: f64,
    /// Turn rate in degrees per second
    pub turn_rate_deg: f64,
    /// Distance from body centre to feet
    pub ground_probe_distance: f64,
    pub ground_probe_tolerance: f64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            agent_run_speed: 2.0,
            agent_jump_height: 3.0,
            agent_jump_velocity: 800.0,
            agent_jump_velocity_max_change: 10.0,
            speed_reduction_factor: 0.8,
            airborne_move_factor: 0.5,
            falling_force: 200.0,
            jump_duration: 0.2,
            turn_rate_deg: 200.0,
            ground_probe_distance: 0.75,
            ground_probe_tolerance: 0.1,
        }
    }
}

impl AgentSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !self.agent_run_speed.is_finite() || self.agent_run_speed < 0.0 {
            return Err("agent_run_speed must be finite and >= 0".to_string());
        }
        if !self.agent_jump_velocity_max_change.is_finite()
            || self.agent_jump_velocity_max_change <= 0.0
        {
            return Err("agent_jump_velocity_max_change must be finite and > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.speed_reduction_factor) {
            return Err("speed_reduction_factor must be within [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.airborne_move_factor) {
            return Err("airborne_move_factor must be within [0, 1]".to_string());
        }
        if !self.jump_duration.is_finite() || self.jump_duration <= 0.0 {
            return Err("jump_duration must be finite and > 0".to_string());
        }
        if self.ground_probe_distance <= 0.0 || self.ground_probe_tolerance < 0.0 {
            return Err("ground probe distance must be > 0 and tolerance >= 0".to_string());
        }
        Ok(())
    }

    pub fn ground_probe_length(&self) -> f64 {
        self.ground_probe_distance + self.ground_probe_tolerance
    }
}

/// Character-controller locomotion tuning.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocomotionConfig {
    /// Scale for axis-aligned input ("started"/"canceled" edges)
    pub run_factor: f64,
    /// Scale for continuous/diagonal input ("performed" edge)
    pub run_diag_factor: f64,
    /// Vertical velocity held while grounded
    pub grounded_gravity: f64,
    /// Extra gravity while falling
    pub fall_multiplier: f64,
    /// Lowest allowed vertical velocity
    pub terminal_velocity: f64,
    /// Seconds after landing before the combo counter resets
    pub combo_reset_delay: f64,
    /// Per-frame slerp weight, not scaled by elapsed time
    pub rotation_factor_per_frame: f64,
    /// Movement vector to displacement scale
    pub move_speed_scale: f64,
    pub max_jump_height: f64,
    pub max_jump_time: f64,
    /// Extra apex height per combo tier (index 0..=3)
    pub tier_extra_height: [f64; 4],
    /// Apex time multiplier per combo tier (index 0..=3)
    pub tier_time_scale: [f64; 4],
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            run_factor: 2.0,
            run_diag_factor: 1.85,
            grounded_gravity: -0.05,
            fall_multiplier: 2.0,
            terminal_velocity: -20.0,
            combo_reset_delay: 0.5,
            rotation_factor_per_frame: 5.0,
            move_speed_scale: 8.0,
            max_jump_height: 2.15,
            max_jump_time: 0.8,
            tier_extra_height: [0.0, 0.0, 1.25, 1.75],
            tier_time_scale: [1.0, 1.0, 1.2, 1.35],
        }
    }
}

impl LocomotionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.run_factor.is_finite() || self.run_factor <= 0.0 {
            return Err("run_factor must be finite and > 0".to_string());
        }
        if !self.run_diag_factor.is_finite()
            || self.run_diag_factor <= 0.0
            || self.run_diag_factor > self.run_factor
        {
            return Err("run_diag_factor must be > 0 and <= run_factor".to_string());
        }
        if self.grounded_gravity > 0.0 {
            return Err("grounded_gravity must be <= 0".to_string());
        }
        if !self.fall_multiplier.is_finite() || self.fall_multiplier < 1.0 {
            return Err("fall_multiplier must be finite and >= 1".to_string());
        }
        if !self.terminal_velocity.is_finite() || self.terminal_velocity >= 0.0 {
            return Err("terminal_velocity must be finite and < 0".to_string());
        }
        if !self.combo_reset_delay.is_finite() || self.combo_reset_delay < 0.0 {
            return Err("combo_reset_delay must be finite and >= 0".to_string());
        }
        if self.max_jump_height <= 0.0 || self.max_jump_time <= 0.0 {
            return Err("max_jump_height and max_jump_time must be > 0".to_string());
        }
        if self.tier_time_scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err("tier_time_scale entries must be finite and > 0".to_string());
        }
        if self.tier_extra_height.iter().any(|h| !h.is_finite() || *h < 0.0) {
            return Err("tier_extra_height entries must be finite and >= 0".to_string());
        }
        Ok(())
    }
}

/// Reward magnitudes. The training and player-assist scenes disagree on
/// these, so neither is hardcoded.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardConfig {
    /// Added to the last hitter when the ball goes out (negative)
    pub out_of_bounds_penalty: f64,
    /// Given to the scorer; the conceding side gets the negation
    pub win_reward: f64,
    /// Given when the ball crosses into the opponent's area off your hit
    pub cross_court_reward: f64,
}

impl RewardConfig {
    pub fn training() -> Self {
        Self {
            out_of_bounds_penalty: -0.2,
            win_reward: 1.0,
            cross_court_reward: 0.4,
        }
    }

    pub fn player_assist() -> Self {
        Self {
            out_of_bounds_penalty: -0.3,
            win_reward: 1.0,
            cross_court_reward: 0.6,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.out_of_bounds_penalty.is_finite() || self.out_of_bounds_penalty > 0.0 {
            return Err("out_of_bounds_penalty must be finite and <= 0".to_string());
        }
        if !self.win_reward.is_finite() || self.win_reward < 0.0 {
            return Err("win_reward must be finite and >= 0".to_string());
        }
        if !self.cross_court_reward.is_finite() || self.cross_court_reward < 0.0 {
            return Err("cross_court_reward must be finite and >= 0".to_string());
        }
        Ok(())
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self::training()
    }
}

/// Reset layout bounds.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnConfig {
    /// Agent x/z jitter around the team anchor
    pub agent_half_extent: f64,
    /// Distance of each team's spawn anchor from the net
    pub agent_anchor_depth: f64,
    pub agent_height_min: f64,
    /// Depends on jump height
    pub agent_height_max: f64,
    /// Yaw jitter in degrees
    pub agent_yaw_range: f64,
    pub ball_half_width: f64,
    pub ball_depth_min: f64,
    pub ball_depth_max: f64,
    pub ball_height_min: f64,
    pub ball_height_max: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            agent_half_extent: 2.0,
            agent_anchor_depth: 7.0,
            agent_height_min: 0.5,
            agent_height_max: 3.75,
            agent_yaw_range: 45.0,
            ball_half_width: 2.0,
            ball_depth_min: 6.0,
            ball_depth_max: 10.0,
            ball_height_min: 6.0,
            ball_height_max: 8.0,
        }
    }
}

impl SpawnConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.agent_half_extent <= 0.0 || self.ball_half_width <= 0.0 {
            return Err("spawn half extents must be > 0".to_string());
        }
        if self.agent_height_min >= self.agent_height_max {
            return Err("agent_height_min must be < agent_height_max".to_string());
        }
        if self.agent_yaw_range <= 0.0 {
            return Err("agent_yaw_range must be > 0".to_string());
        }
        if self.ball_depth_min >= self.ball_depth_max || self.ball_depth_min < 0.0 {
            return Err("ball depth range must be non-negative and increasing".to_string());
        }
        if self.ball_height_min >= self.ball_height_max {
            return Err("ball_height_min must be < ball_height_max".to_string());
        }
        Ok(())
    }
}
