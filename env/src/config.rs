use volleyball_shared::config::{AgentSettings, LocomotionConfig, RewardConfig, SpawnConfig};

/// Reference court geometry and body physics
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtConfig {
    pub half_width: f64,
    pub half_length: f64,
    pub net_height: f64,
    pub net_thickness: f64,
    /// Depth of the cross-court trigger slabs on each side of the net
    pub area_depth: f64,
    pub area_height: f64,
    pub ball_radius: f64,
    /// Floor and net bounce
    pub ball_restitution: f64,
    /// Bounce off an agent
    pub ball_hit_restitution: f64,
    pub ball_angular_drag: f64,
    /// Body centre height when standing
    pub agent_radius: f64,
    /// Horizontal velocity damping per second
    pub agent_drag: f64,
    pub gravity: f64,
    /// How far past the lines bodies may wander
    pub arena_margin: f64,
}

impl Default for CourtConfig {
    fn default() -> Self {
        Self {
            half_width: 7.0,
            half_length: 14.0,
            net_height: 2.5,
            net_thickness: 0.1,
            area_depth: 1.5,
            area_height: 12.0,
            ball_radius: 0.5,
            ball_restitution: 0.6,
            ball_hit_restitution: 0.9,
            ball_angular_drag: 0.5,
            agent_radius: 0.75,
            agent_drag: 10.0, // ~8 m/s top speed at 50 Hz
            gravity: -9.81,
            arena_margin: 3.0,
        }
    }
}

impl CourtConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.half_width <= 0.0 || self.half_length <= 0.0 {
            return Err("court half extents must be > 0".to_string());
        }
        if self.net_thickness <= 0.0 || self.net_height <= 0.0 {
            return Err("net height and thickness must be > 0".to_string());
        }
        if self.ball_radius <= 0.0 || self.agent_radius <= 0.0 {
            return Err("body radii must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.ball_restitution)
            || !(0.0..=1.0).contains(&self.ball_hit_restitution)
        {
            return Err("restitution must be within [0, 1]".to_string());
        }
        if !self.gravity.is_finite() || self.gravity >= 0.0 {
            return Err("gravity must be finite and < 0".to_string());
        }
        if self.agent_drag < 0.0 || self.ball_angular_drag < 0.0 || self.arena_margin < 0.0 {
            return Err("drag and margin must be >= 0".to_string());
        }
        Ok(())
    }
}

/// One environment instance
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvConfig {
    pub agent: AgentSettings,
    pub locomotion: LocomotionConfig,
    pub rewards: RewardConfig,
    pub spawn: SpawnConfig,
    pub court: CourtConfig,
    /// 0 disables the timeout
    pub max_environment_steps: u32,
    pub purple_agent_present: bool,
    pub player_avatar: bool,
    pub score_message_duration: f64,
    pub material_flash_duration: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            agent: AgentSettings::default(),
            locomotion: LocomotionConfig::default(),
            rewards: RewardConfig::training(),
            spawn: SpawnConfig::default(),
            court: CourtConfig::default(),
            max_environment_steps: 5000,
            purple_agent_present: true,
            player_avatar: false,
            score_message_duration: 2.0, // seconds
            material_flash_duration: 0.5, // seconds
        }
    }
}

impl EnvConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.agent.validate()?;
        self.locomotion.validate()?;
        self.rewards.validate()?;
        self.spawn.validate()?;
        self.court.validate()?;
        if !self.score_message_duration.is_finite() || self.score_message_duration < 0.0 {
            return Err("score_message_duration must be finite and >= 0".to_string());
        }
        if !self.material_flash_duration.is_finite() || self.material_flash_duration < 0.0 {
            return Err("material_flash_duration must be finite and >= 0".to_string());
        }
        if self.spawn.agent_anchor_depth - self.spawn.agent_half_extent
            < self.court.net_thickness / 2.0 + self.court.agent_radius
        {
            return Err("agent spawn box overlaps the net".to_string());
        }
        Ok(())
    }
}

/// Host configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub tick_rate_hz: u32,
    pub render_rate_hz: u32,
    /// Scoreboard publish rate; step messages go out every tick
    pub broadcast_rate_hz: u32,
    pub rng_seed: u64,
    pub env: EnvConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 50,
            render_rate_hz: 60,
            broadcast_rate_hz: 10,
            rng_seed: 42,
            env: EnvConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `VOLLEYBALL_*` environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();
        if let Some(v) = parse_var(&lookup, "VOLLEYBALL_TICK_RATE_HZ")? {
            config.tick_rate_hz = v;
        }
        if let Some(v) = parse_var(&lookup, "VOLLEYBALL_RENDER_RATE_HZ")? {
            config.render_rate_hz = v;
        }
        if let Some(v) = parse_var(&lookup, "VOLLEYBALL_BROADCAST_RATE_HZ")? {
            config.broadcast_rate_hz = v;
        }
        if let Some(v) = parse_var(&lookup, "VOLLEYBALL_SEED")? {
            config.rng_seed = v;
        }
        if let Some(v) = parse_var(&lookup, "VOLLEYBALL_MAX_STEPS")? {
            config.env.max_environment_steps = v;
        }
        if let Some(v) = parse_var(&lookup, "VOLLEYBALL_PURPLE_AGENT")? {
            config.env.purple_agent_present = v;
        }
        if let Some(v) = parse_var(&lookup, "VOLLEYBALL_PLAYER_AVATAR")? {
            config.env.player_avatar = v;
        }
        if let Some(preset) = lookup("VOLLEYBALL_REWARDS") {
            config.env.rewards = reward_preset(&preset)?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate_hz == 0 || self.render_rate_hz == 0 {
            return Err("tick_rate_hz and render_rate_hz must be > 0".to_string());
        }
        if self.broadcast_rate_hz == 0 || self.broadcast_rate_hz > self.tick_rate_hz {
            return Err("broadcast_rate_hz must be in 1..=tick_rate_hz".to_string());
        }
        self.env.validate()
    }

    pub fn tick_dt(&self) -> f64 {
        1.0 / self.tick_rate_hz as f64
    }
}

/// Named reward preset: `training` or `player-assist`.
pub fn reward_preset(name: &str) -> Result<RewardConfig, String> {
    match name {
        "training" => Ok(RewardConfig::training()),
        "player-assist" | "player_assist" => Ok(RewardConfig::player_assist()),
        other => Err(format!("unknown reward preset: {}", other)),
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, String> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{}: cannot parse {:?}", key, raw)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        assert!(ServerConfig::default().validate().is_ok());
        assert!(CourtConfig::default().validate().is_ok());
    }

    #[test]
    fn overrides_apply() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("VOLLEYBALL_SEED", "7"),
            ("VOLLEYBALL_MAX_STEPS", "0"),
            ("VOLLEYBALL_PURPLE_AGENT", "false"),
            ("VOLLEYBALL_REWARDS", "player-assist"),
        ]))
        .unwrap();
        assert_eq!(config.rng_seed, 7);
        assert_eq!(config.env.max_environment_steps, 0);
        assert!(!config.env.purple_agent_present);
        assert_eq!(config.env.rewards.cross_court_reward, 0.6);
        assert_eq!(config.tick_rate_hz, 50);
    }

    #[test]
    fn unparsable_override_is_an_error() {
        let err = ServerConfig::from_lookup(lookup_from(&[("VOLLEYBALL_TICK_RATE_HZ", "fast")]))
            .unwrap_err();
        assert!(err.contains("VOLLEYBALL_TICK_RATE_HZ"));
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert!(reward_preset("casual").is_err());
    }

    #[test]
    fn broadcast_faster_than_tick_invalid() {
        let config = ServerConfig {
            broadcast_rate_hz: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn spawn_box_into_net_invalid() {
        let mut config = EnvConfig::default();
        config.spawn.agent_anchor_depth = 2.0;
        assert!(config.validate().is_err());
    }
}
