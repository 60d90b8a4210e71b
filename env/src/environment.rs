//! One volleyball environment instance and its fixed-step tick.
//!
//! Order within a simulation tick:
//! deferred tasks, agent actions, avatar locomotion, step budget, physics,
//! ball contacts (last hitter), trigger entries (event resolution).

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use volleyball_shared::types::{Event, JumpPhase, Team};
use volleyball_shared::vec3::Vec3;

use crate::agent::{ActionVector, Agent, Observation};
use crate::avatar::PlayerAvatar;
use crate::config::EnvConfig;
use crate::coordinator::{EnvController, Resolution, Scoreboard};
use crate::court::FlatCourt;
use crate::episode::StepSignal;
use crate::error::{EnvError, Result};
use crate::input::InputSnapshot;
use crate::physics::{BodyId, Overlap, PhysicsWorld};
use crate::scene::{Ball, Scene};
use crate::scheduler::{DeferredTask, Scheduler};
use crate::trigger::{classify, EntryTracker};

/// Latest decision for each team. A missing purple agent ignores its slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamActions {
    pub blue: ActionVector,
    pub purple: ActionVector,
}

impl TeamActions {
    pub fn get(&self, team: Team) -> ActionVector {
        match team {
            Team::Purple => self.purple,
            _ => self.blue,
        }
    }

    pub fn set(&mut self, team: Team, action: ActionVector) {
        match team {
            Team::Purple => self.purple = action,
            _ => self.blue = action,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentReport {
    pub team: Team,
    pub position: Vec3,
    pub yaw: f64,
    pub observation: Observation,
    pub signal: StepSignal,
    pub jump_phase: JumpPhase,
}

/// Result of one simulation tick.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub tick: u64,
    pub step_count: u32,
    pub last_hitter: Team,
    pub agents: Vec<AgentReport>,
    pub ball: Ball,
    /// Events resolved this tick, in order
    pub events: Vec<Event>,
    /// The scene was reset during this tick
    pub reset: bool,
}

impl StepReport {
    pub fn agent(&self, team: Team) -> Option<&AgentReport> {
        self.agents.iter().find(|a| a.team == team)
    }
}

pub struct VolleyballEnv<W: PhysicsWorld = FlatCourt> {
    config: EnvConfig,
    world: W,
    scene: Scene,
    controller: EnvController,
    scheduler: Scheduler<DeferredTask>,
    rng: ChaCha8Rng,
    touches: EntryTracker<BodyId>,
    overlaps: EntryTracker<Overlap>,
    dt: f64,
    tick: u64,
}

impl VolleyballEnv<FlatCourt> {
    /// Environment on the reference court.
    pub fn new(config: EnvConfig, dt: f64, seed: u64) -> Result<Self> {
        let world = FlatCourt::new(config.court.clone());
        Self::with_world(world, config, dt, seed)
    }
}

impl<W: PhysicsWorld> VolleyballEnv<W> {
    pub fn with_world(world: W, config: EnvConfig, dt: f64, seed: u64) -> Result<Self> {
        config.validate().map_err(EnvError::InvalidConfig)?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(EnvError::InvalidConfig(format!(
                "tick dt must be finite and > 0, got {}",
                dt
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut scheduler = Scheduler::new();

        let purple = if config.purple_agent_present {
            Some(Agent::new(Team::Purple)?)
        } else {
            None
        };
        let avatar = if config.player_avatar {
            let mut avatar = PlayerAvatar::new(config.locomotion.clone());
            let home = Vec3::new(0.0, config.court.agent_radius, -config.spawn.agent_anchor_depth);
            avatar.reset(home, 0.0, &mut scheduler);
            Some(avatar)
        } else {
            None
        };
        let mut scene = Scene {
            blue: Agent::new(Team::Blue)?,
            purple,
            avatar,
            ball: Ball::default(),
        };

        let mut controller = EnvController::new(&config, &mut rng);
        controller.reset_scene(&mut scene, &mut rng);
        tracing::info!(
            purple = config.purple_agent_present,
            avatar = config.player_avatar,
            max_steps = config.max_environment_steps,
            seed,
            "environment ready"
        );

        Ok(Self {
            config,
            world,
            scene,
            controller,
            scheduler,
            rng,
            touches: EntryTracker::new(),
            overlaps: EntryTracker::new(),
            dt,
            tick: 0,
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct scene access for hosts that stage situations (tests, replays).
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn controller(&self) -> &EnvController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut EnvController {
        &mut self.controller
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        self.controller.scoreboard()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulated seconds since construction
    pub fn elapsed(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn observe(&self, team: Team) -> Option<Observation> {
        self.scene
            .agent(team)
            .map(|agent| agent.collect_observations(&self.scene.ball))
    }

    /// Advance one simulation tick.
    pub fn step(&mut self, actions: &TeamActions, input: &InputSnapshot) -> StepReport {
        let dt = self.dt;
        self.run_deferred(dt);

        for agent in self.scene.agents_mut() {
            agent.update_grounded(&self.world, &self.config.agent);
            agent.resolve_action(actions.get(agent.team()), dt, &self.config.agent);
        }
        if let Some(avatar) = self.scene.avatar.as_mut() {
            avatar.fixed_update(input, &mut self.world, dt, &mut self.scheduler);
        }

        let mut reset = false;
        if self
            .controller
            .fixed_update(&mut self.scene, &mut self.rng)
            == Resolution::Reset
        {
            self.clear_trackers();
            reset = true;
        }

        let contacts = self.world.step(&mut self.scene, dt);

        for body in self.touches.update(&contacts.ball_touches) {
            if let Some(team) = body.team() {
                self.controller.update_last_hitter(team);
            }
        }

        let mut events = Vec::new();
        for overlap in self.overlaps.update(&contacts.overlaps) {
            let Some(event) = classify(overlap.tag) else {
                continue;
            };
            events.push(event);
            if self.resolve_event(event) == Resolution::Reset {
                reset = true;
                // Remaining entries belong to the pre-reset ball
                break;
            }
        }

        self.tick += 1;
        self.report(events, reset)
    }

    /// Render tick: avatar facing and animation flags. No effect on the
    /// simulation state.
    pub fn render_tick(&mut self) {
        if let Some(avatar) = self.scene.avatar.as_mut() {
            avatar.render_update();
        }
    }

    /// Resolve an event as if the ball had triggered it.
    pub fn resolve_event(&mut self, event: Event) -> Resolution {
        let resolution = self.controller.resolve_event(
            event,
            &mut self.scene,
            &mut self.rng,
            &mut self.scheduler,
        );
        if resolution == Resolution::Reset {
            self.clear_trackers();
        }
        resolution
    }

    /// Resolve an event by its wire code. Unknown codes are rejected.
    pub fn resolve_event_code(&mut self, code: u8) -> Result<Resolution> {
        let event = Event::try_from(code).map_err(EnvError::UnknownEvent)?;
        Ok(self.resolve_event(event))
    }

    /// Abandon the current episode: every agent is interrupted and the
    /// scene gets a new layout.
    pub fn force_reset(&mut self) {
        self.controller.interrupt_episode(&mut self.scene, &mut self.rng);
        self.clear_trackers();
        tracing::info!(tick = self.tick, "episode reset on request");
    }

    fn run_deferred(&mut self, dt: f64) {
        for task in self.scheduler.advance(dt) {
            match task {
                DeferredTask::ResetJumpCombo => {
                    if let Some(avatar) = self.scene.avatar.as_mut() {
                        avatar.locomotion.reset_combo();
                    }
                }
                DeferredTask::RevertCourtMaterial => self.controller.revert_court_material(),
                DeferredTask::ClearScoreMessage => self.controller.clear_score_message(),
            }
        }
    }

    fn clear_trackers(&mut self) {
        self.touches.clear();
        self.overlaps.clear();
    }

    fn report(&mut self, events: Vec<Event>, reset: bool) -> StepReport {
        let ball = self.scene.ball;
        let settings = &self.config.agent;
        let agents = self
            .scene
            .agents_mut()
            .map(|agent| AgentReport {
                team: agent.team(),
                position: agent.body.position,
                yaw: agent.body.yaw,
                observation: agent.collect_observations(&ball),
                jump_phase: agent.jump_phase(settings),
                signal: agent.episode.take(),
            })
            .collect();

        StepReport {
            tick: self.tick,
            step_count: self.controller.step_count(),
            last_hitter: self.controller.last_hitter(),
            agents,
            ball,
            events,
            reset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volleyball_shared::types::EpisodeBoundary;

    const DT: f64 = 0.02;

    fn env() -> VolleyballEnv {
        VolleyballEnv::new(EnvConfig::default(), DT, 42).unwrap()
    }

    fn idle(env: &mut VolleyballEnv) -> StepReport {
        env.step(&TeamActions::default(), &InputSnapshot::default())
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EnvConfig::default();
        config.agent.jump_duration = 0.0;
        assert!(matches!(
            VolleyballEnv::new(config, DT, 1),
            Err(EnvError::InvalidConfig(_))
        ));
        assert!(VolleyballEnv::new(EnvConfig::default(), 0.0, 1).is_err());
    }

    #[test]
    fn step_reports_both_agents() {
        let mut env = env();
        let report = idle(&mut env);
        assert_eq!(report.tick, 1);
        assert_eq!(report.step_count, 1);
        assert_eq!(report.agents.len(), 2);
        assert_eq!(report.agents[0].team, Team::Blue);
        assert!(report.events.is_empty());
    }

    #[test]
    fn unknown_event_code_is_an_error() {
        let mut env = env();
        assert_eq!(env.resolve_event_code(9), Err(EnvError::UnknownEvent(9)));
        assert_eq!(env.resolve_event_code(1), Ok(Resolution::Reset));
    }

    #[test]
    fn ball_landing_resolves_goal_and_resets() {
        let mut env = env();
        idle(&mut env);
        env.scene_mut().ball.place(Vec3::new(5.0, 0.6, -11.0));
        env.scene_mut().ball.velocity = Vec3::new(0.0, -10.0, 0.0);
        let report = idle(&mut env);

        assert_eq!(report.events, vec![Event::BallHitBlueGoal]);
        assert!(report.reset);
        assert_eq!(report.step_count, 0);
        let blue = report.agent(Team::Blue).unwrap();
        assert_eq!(blue.signal.boundary, Some(EpisodeBoundary::Ended));
        assert!((blue.signal.reward - 1.0).abs() < 1e-12);
        // Ball was moved back up for the next rally
        assert!(report.ball.position.y >= 6.0);
    }

    #[test]
    fn events_after_an_ending_event_are_dropped() {
        let mut env = env();
        // On the sideline of the purple half: goal floor and out-of-bounds floor at once
        env.scene_mut().ball.place(Vec3::new(7.0, 0.6, -8.0));
        env.scene_mut().ball.velocity = Vec3::new(0.0, -10.0, 0.0);
        let report = idle(&mut env);
        assert_eq!(report.events, vec![Event::BallHitBlueGoal]);
        assert_eq!(env.scoreboard().episodes, 1);
    }

    #[test]
    fn touching_the_ball_sets_last_hitter() {
        let mut env = env();
        env.scene_mut().blue.reset_pose(Vec3::new(0.0, 0.75, 7.0), 0.0);
        env.scene_mut().ball.place(Vec3::new(0.0, 1.95, 7.0));
        let report = idle(&mut env);
        assert_eq!(report.last_hitter, Team::Blue);
    }

    #[test]
    fn timeout_interrupts_both_agents() {
        let config = EnvConfig {
            max_environment_steps: 5,
            ..Default::default()
        };
        let mut env = VolleyballEnv::new(config, DT, 3).unwrap();
        let mut last = None;
        for _ in 0..5 {
            last = Some(idle(&mut env));
        }
        let report = last.unwrap();
        assert!(report.reset);
        for agent in &report.agents {
            assert_eq!(agent.signal.boundary, Some(EpisodeBoundary::Interrupted));
            assert_eq!(agent.signal.reward, 0.0);
        }
    }

    #[test]
    fn score_visuals_clear_on_the_sim_clock() {
        let mut env = env();
        env.resolve_event(Event::BallHitPurpleGoal);
        assert!(env.scoreboard().message.is_some());
        // Keep the next rally in the air for the whole wait
        env.scene_mut().ball.place(Vec3::new(0.0, 100.0, 5.0));
        // 2 s at 50 Hz
        for _ in 0..101 {
            idle(&mut env);
        }
        assert_eq!(env.scoreboard().message, None);
    }

    #[test]
    fn force_reset_interrupts() {
        let mut env = env();
        idle(&mut env);
        env.force_reset();
        let report = idle(&mut env);
        assert_eq!(
            report.agent(Team::Purple).unwrap().signal.boundary,
            Some(EpisodeBoundary::Interrupted)
        );
        assert_eq!(report.step_count, 1);
        assert_eq!(env.scoreboard().episodes, 1);
    }

    #[test]
    fn same_seed_replays_identically() {
        let mut a = env();
        let mut b = env();
        let actions = TeamActions {
            blue: ActionVector::from_branches(&[1, 2, 0, 1]).unwrap(),
            purple: ActionVector::from_branches(&[2, 0, 1, 0]).unwrap(),
        };
        for _ in 0..200 {
            let ra = a.step(&actions, &InputSnapshot::default());
            let rb = b.step(&actions, &InputSnapshot::default());
            assert_eq!(ra.ball, rb.ball);
            assert_eq!(ra.events, rb.events);
        }
    }

    #[test]
    fn avatar_touch_leaves_last_hitter_alone() {
        let config = EnvConfig {
            purple_agent_present: true,
            player_avatar: true,
            ..Default::default()
        };
        let mut env = VolleyballEnv::new(config, DT, 5).unwrap();
        idle(&mut env);
        let avatar = env.scene().avatar.as_ref().unwrap().body.position;
        // Purple agent well away from the ball
        env.scene_mut()
            .purple
            .as_mut()
            .unwrap()
            .reset_pose(Vec3::new(5.0, 0.75, -12.0), 0.0);
        env.scene_mut().ball.place(avatar + Vec3::new(0.0, 1.2, 0.0));
        let report = idle(&mut env);
        assert_eq!(report.last_hitter, Team::Unassigned);
        assert!(report.events.is_empty());

        // A cross-court entry after the avatar's hit pays nobody
        assert_eq!(
            env.resolve_event(Event::BallEnteredBlueArea),
            Resolution::Continue
        );
        let report = idle(&mut env);
        let purple = report.agent(Team::Purple).unwrap();
        assert_eq!(purple.signal.reward, 0.0);
        assert_eq!(report.last_hitter, Team::Unassigned);
    }
}
