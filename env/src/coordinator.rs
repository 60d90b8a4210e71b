//! Episode coordinator: last hitter, step budget, score, event resolution
//! and scene resets.

use rand::Rng;
use volleyball_shared::config::{RewardConfig, SpawnConfig};
use volleyball_shared::types::{CourtMaterial, Event, Team};
use volleyball_shared::vec3::Vec3;

use crate::config::EnvConfig;
use crate::scene::{Ball, Scene};
use crate::scheduler::{DeferredTask, Scheduler, TimerId};

/// In-memory score panel state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scoreboard {
    pub blue: i32,
    pub purple: i32,
    pub message: Option<String>,
    pub court: CourtMaterial,
    /// Finished episodes, ended or interrupted
    pub episodes: u32,
}

/// Outcome of one coordinator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Continue,
    /// The episode finished and the scene was reset
    Reset,
}

pub struct EnvController {
    rewards: RewardConfig,
    spawn: SpawnConfig,
    max_environment_steps: u32,
    purple_present: bool,
    score_message_duration: f64,
    material_flash_duration: f64,
    last_hitter: Team,
    step_count: u32,
    /// -1 spawns the ball over the blue half, +1 over the purple half
    ball_spawn_side: i32,
    scoreboard: Scoreboard,
    message_timer: Option<TimerId>,
    flash_timer: Option<TimerId>,
}

impl EnvController {
    pub fn new<R: Rng + ?Sized>(config: &EnvConfig, rng: &mut R) -> Self {
        let ball_spawn_side = if config.purple_agent_present && rng.gen_bool(0.5) {
            1
        } else {
            -1
        };
        Self {
            rewards: config.rewards.clone(),
            spawn: config.spawn.clone(),
            max_environment_steps: config.max_environment_steps,
            purple_present: config.purple_agent_present,
            score_message_duration: config.score_message_duration,
            material_flash_duration: config.material_flash_duration,
            last_hitter: Team::Unassigned,
            step_count: 0,
            ball_spawn_side,
            scoreboard: Scoreboard::default(),
            message_timer: None,
            flash_timer: None,
        }
    }

    pub fn last_hitter(&self) -> Team {
        self.last_hitter
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn ball_spawn_side(&self) -> i32 {
        self.ball_spawn_side
    }

    /// Pin the side the next `reset_ball` flips from.
    pub fn set_ball_spawn_side(&mut self, side: i32) {
        self.ball_spawn_side = if side < 0 { -1 } else { 1 };
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn rewards(&self) -> &RewardConfig {
        &self.rewards
    }

    /// A player touched the ball.
    pub fn update_last_hitter(&mut self, team: Team) {
        if self.last_hitter != team {
            tracing::debug!(from = ?self.last_hitter, to = ?team, "last hitter changed");
        }
        self.last_hitter = team;
    }

    pub fn resolve_event<R: Rng + ?Sized>(
        &mut self,
        event: Event,
        scene: &mut Scene,
        rng: &mut R,
        scheduler: &mut Scheduler<DeferredTask>,
    ) -> Resolution {
        tracing::debug!(?event, last_hitter = ?self.last_hitter, "resolving ball event");
        let win = self.rewards.win_reward;

        match event {
            Event::BallOutOfBounds => {
                add_reward(scene, self.last_hitter, self.rewards.out_of_bounds_penalty);
                let message = match self.last_hitter {
                    Team::Blue => {
                        self.scoreboard.blue -= 1;
                        "-1 to Blue (out of court)"
                    }
                    Team::Purple => {
                        self.scoreboard.purple -= 1;
                        "-1 to Purple (out of court)"
                    }
                    Team::Unassigned => "Out of court",
                };
                self.announce(message, scheduler);
                self.flash(CourtMaterial::Penalty, scheduler);
                self.end_episode(event, scene, rng)
            }
            Event::BallHitBlueGoal => {
                add_reward(scene, Team::Blue, win);
                add_reward(scene, Team::Purple, -win);
                self.scoreboard.blue += 1;
                self.announce("+1 to Blue", scheduler);
                self.flash(CourtMaterial::BlueScored, scheduler);
                self.end_episode(event, scene, rng)
            }
            Event::BallHitPurpleGoal => {
                add_reward(scene, Team::Purple, win);
                add_reward(scene, Team::Blue, -win);
                self.scoreboard.purple += 1;
                self.announce("+1 to Purple", scheduler);
                self.flash(CourtMaterial::PurpleScored, scheduler);
                self.end_episode(event, scene, rng)
            }
            Event::BallEnteredBlueArea => {
                if self.last_hitter == Team::Purple {
                    add_reward(scene, Team::Purple, self.rewards.cross_court_reward);
                }
                Resolution::Continue
            }
            Event::BallEnteredPurpleArea => {
                if self.last_hitter == Team::Blue {
                    add_reward(scene, Team::Blue, self.rewards.cross_court_reward);
                }
                Resolution::Continue
            }
        }
    }

    /// Per-tick step budget. Running out interrupts every agent without
    /// reward and resets.
    pub fn fixed_update<R: Rng + ?Sized>(&mut self, scene: &mut Scene, rng: &mut R) -> Resolution {
        self.step_count += 1;
        if self.max_environment_steps == 0 || self.step_count < self.max_environment_steps {
            return Resolution::Continue;
        }

        tracing::info!(
            steps = self.step_count,
            episodes = self.scoreboard.episodes + 1,
            "episode interrupted at step budget"
        );
        self.interrupt_episode(scene, rng);
        Resolution::Reset
    }

    /// Abandon the running episode without reward and reset.
    pub fn interrupt_episode<R: Rng + ?Sized>(&mut self, scene: &mut Scene, rng: &mut R) {
        for agent in scene.agents_mut() {
            agent.episode.episode_interrupted();
        }
        self.scoreboard.episodes += 1;
        self.reset_scene(scene, rng);
    }

    /// New random layout. Step counter and last hitter start over.
    pub fn reset_scene<R: Rng + ?Sized>(&mut self, scene: &mut Scene, rng: &mut R) {
        self.step_count = 0;
        self.last_hitter = Team::Unassigned;

        let s = &self.spawn;
        for agent in scene.agents_mut() {
            let anchor = -agent.sign() * s.agent_anchor_depth;
            let position = Vec3::new(
                rng.gen_range(-s.agent_half_extent..=s.agent_half_extent),
                rng.gen_range(s.agent_height_min..=s.agent_height_max),
                anchor + rng.gen_range(-s.agent_half_extent..=s.agent_half_extent),
            );
            let yaw = rng.gen_range(-s.agent_yaw_range..=s.agent_yaw_range);
            agent.reset_pose(position, yaw);
        }

        let side = self.reset_ball(&mut scene.ball, rng);
        tracing::info!(ball_side = side, "scene reset");
    }

    /// Flip the spawn side and drop the ball over it at rest. Without a
    /// purple agent the ball always spawns over blue.
    pub fn reset_ball<R: Rng + ?Sized>(&mut self, ball: &mut Ball, rng: &mut R) -> i32 {
        self.ball_spawn_side = if self.purple_present {
            -self.ball_spawn_side
        } else {
            -1
        };

        let s = &self.spawn;
        let x = rng.gen_range(-s.ball_half_width..=s.ball_half_width);
        let y = rng.gen_range(s.ball_height_min..=s.ball_height_max);
        let depth = rng.gen_range(s.ball_depth_min..=s.ball_depth_max);
        let z = if self.ball_spawn_side < 0 { depth } else { -depth };
        ball.place(Vec3::new(x, y, z));
        self.ball_spawn_side
    }

    pub fn revert_court_material(&mut self) {
        self.scoreboard.court = CourtMaterial::Default;
        self.flash_timer = None;
    }

    pub fn clear_score_message(&mut self) {
        self.scoreboard.message = None;
        self.message_timer = None;
    }

    fn end_episode<R: Rng + ?Sized>(
        &mut self,
        event: Event,
        scene: &mut Scene,
        rng: &mut R,
    ) -> Resolution {
        for agent in scene.agents_mut() {
            agent.episode.end_episode();
        }
        self.scoreboard.episodes += 1;
        tracing::info!(
            ?event,
            steps = self.step_count,
            blue = self.scoreboard.blue,
            purple = self.scoreboard.purple,
            "episode ended"
        );
        self.reset_scene(scene, rng);
        Resolution::Reset
    }

    fn announce(&mut self, message: &str, scheduler: &mut Scheduler<DeferredTask>) {
        if let Some(id) = self.message_timer.take() {
            scheduler.cancel(id);
        }
        self.scoreboard.message = Some(message.to_string());
        self.message_timer =
            Some(scheduler.schedule(self.score_message_duration, DeferredTask::ClearScoreMessage));
    }

    fn flash(&mut self, material: CourtMaterial, scheduler: &mut Scheduler<DeferredTask>) {
        if let Some(id) = self.flash_timer.take() {
            scheduler.cancel(id);
        }
        self.scoreboard.court = material;
        self.flash_timer = Some(
            scheduler.schedule(self.material_flash_duration, DeferredTask::RevertCourtMaterial),
        );
    }
}

/// Rewards for an absent or unassigned team are dropped.
fn add_reward(scene: &mut Scene, team: Team, amount: f64) {
    if let Some(agent) = scene.agent_mut(team) {
        agent.episode.add_reward(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use volleyball_shared::types::EpisodeBoundary;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn scene(purple: bool) -> Scene {
        Scene {
            blue: Agent::new(Team::Blue).unwrap(),
            purple: purple.then(|| Agent::new(Team::Purple).unwrap()),
            avatar: None,
            ball: Ball::default(),
        }
    }

    struct Fixture {
        controller: EnvController,
        scene: Scene,
        rng: ChaCha8Rng,
        scheduler: Scheduler<DeferredTask>,
    }

    impl Fixture {
        fn new(config: EnvConfig) -> Self {
            let mut rng = test_rng();
            let scheduler = Scheduler::new();
            let mut scene = scene(config.purple_agent_present);
            let mut controller = EnvController::new(&config, &mut rng);
            controller.reset_scene(&mut scene, &mut rng);
            Self {
                controller,
                scene,
                rng,
                scheduler,
            }
        }

        fn standard() -> Self {
            Self::new(EnvConfig::default())
        }

        fn resolve(&mut self, event: Event) -> Resolution {
            self.controller
                .resolve_event(event, &mut self.scene, &mut self.rng, &mut self.scheduler)
        }

        fn tick(&mut self) -> Resolution {
            self.controller.fixed_update(&mut self.scene, &mut self.rng)
        }

        fn purple(&self) -> &Agent {
            self.scene.purple.as_ref().unwrap()
        }

        /// Run the clock forward, routing coordinator tasks.
        fn wait(&mut self, seconds: f64) {
            for task in self.scheduler.advance(seconds) {
                match task {
                    DeferredTask::RevertCourtMaterial => self.controller.revert_court_material(),
                    DeferredTask::ClearScoreMessage => self.controller.clear_score_message(),
                    DeferredTask::ResetJumpCombo => {}
                }
            }
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    mod scoring {
        use super::*;

        #[test]
        fn blue_goal_after_purple_touch() {
            let mut f = Fixture::standard();
            f.tick();
            f.tick();
            f.controller.update_last_hitter(Team::Purple);
            let side_before = f.controller.ball_spawn_side();

            assert_eq!(f.resolve(Event::BallHitBlueGoal), Resolution::Reset);

            assert!(close(f.scene.blue.episode.pending_reward(), 1.0));
            assert!(close(f.purple().episode.pending_reward(), -1.0));
            assert_eq!(f.scene.blue.episode.boundary(), Some(EpisodeBoundary::Ended));
            assert_eq!(f.purple().episode.boundary(), Some(EpisodeBoundary::Ended));
            assert_eq!(f.controller.step_count(), 0);
            assert_eq!(f.controller.last_hitter(), Team::Unassigned);
            assert_eq!(f.controller.ball_spawn_side(), -side_before);
            assert_eq!(f.scene.ball.velocity, Vec3::ZERO);
            assert_eq!(f.scene.ball.angular_velocity, Vec3::ZERO);
        }

        #[test]
        fn purple_goal_scores_for_purple() {
            let mut f = Fixture::standard();
            f.resolve(Event::BallHitPurpleGoal);
            assert!(close(f.purple().episode.pending_reward(), 1.0));
            assert!(close(f.scene.blue.episode.pending_reward(), -1.0));
            let board = f.controller.scoreboard();
            assert_eq!((board.blue, board.purple), (0, 1));
            assert_eq!(board.court, CourtMaterial::PurpleScored);
            assert_eq!(board.episodes, 1);
        }

        #[test]
        fn every_goal_moves_exactly_one_score() {
            let mut f = Fixture::standard();
            let events = [
                Event::BallHitBlueGoal,
                Event::BallHitPurpleGoal,
                Event::BallHitBlueGoal,
                Event::BallHitBlueGoal,
            ];
            for event in events {
                let before = f.controller.scoreboard().clone();
                f.resolve(event);
                let after = f.controller.scoreboard();
                let moved = (after.blue - before.blue) + (after.purple - before.purple);
                assert_eq!(moved, 1);
                assert_eq!(f.controller.step_count(), 0);
            }
            assert_eq!(f.controller.scoreboard().blue, 3);
            assert!(close(f.purple().episode.cumulative_reward(), -2.0));
        }
    }

    mod out_of_bounds {
        use super::*;

        #[test]
        fn unassigned_hitter_costs_nobody() {
            let mut f = Fixture::standard();
            f.tick();
            assert_eq!(f.resolve(Event::BallOutOfBounds), Resolution::Reset);
            assert_eq!(f.scene.blue.episode.pending_reward(), 0.0);
            assert_eq!(f.purple().episode.pending_reward(), 0.0);
            assert_eq!(f.scene.blue.episode.boundary(), Some(EpisodeBoundary::Ended));
            assert_eq!(f.controller.step_count(), 0);
            let board = f.controller.scoreboard();
            assert_eq!((board.blue, board.purple), (0, 0));
            assert_eq!(board.message.as_deref(), Some("Out of court"));
            assert_eq!(board.court, CourtMaterial::Penalty);
        }

        #[test]
        fn last_hitter_pays_penalty() {
            let mut f = Fixture::standard();
            f.controller.update_last_hitter(Team::Blue);
            f.resolve(Event::BallOutOfBounds);
            assert!(close(f.scene.blue.episode.pending_reward(), -0.2));
            assert_eq!(f.purple().episode.pending_reward(), 0.0);
            assert_eq!(f.controller.scoreboard().blue, -1);
        }

        #[test]
        fn player_assist_preset_penalises_harder() {
            let config = EnvConfig {
                rewards: RewardConfig::player_assist(),
                ..Default::default()
            };
            let mut f = Fixture::new(config);
            f.controller.update_last_hitter(Team::Purple);
            f.resolve(Event::BallOutOfBounds);
            assert!(close(f.purple().episode.pending_reward(), -0.3));
        }
    }

    mod cross_court {
        use super::*;

        #[test]
        fn own_side_hitter_gets_nothing() {
            let mut f = Fixture::standard();
            f.controller.update_last_hitter(Team::Blue);
            assert_eq!(f.resolve(Event::BallEnteredBlueArea), Resolution::Continue);
            assert_eq!(f.purple().episode.pending_reward(), 0.0);
            assert_eq!(f.scene.blue.episode.pending_reward(), 0.0);
        }

        #[test]
        fn purple_hit_into_blue_area_is_rewarded() {
            let mut f = Fixture::standard();
            f.controller.update_last_hitter(Team::Purple);
            f.resolve(Event::BallEnteredBlueArea);
            assert!(close(f.purple().episode.pending_reward(), 0.4));
            assert_eq!(f.purple().episode.boundary(), None);
        }

        #[test]
        fn blue_hit_into_purple_area_is_rewarded() {
            let mut f = Fixture::standard();
            f.tick();
            f.controller.update_last_hitter(Team::Blue);
            f.resolve(Event::BallEnteredPurpleArea);
            assert!(close(f.scene.blue.episode.pending_reward(), 0.4));
            // Not an episode boundary
            assert_eq!(f.controller.step_count(), 1);
            assert_eq!(f.controller.last_hitter(), Team::Blue);
        }
    }

    mod reset {
        use super::*;

        #[test]
        fn ball_side_alternates() {
            let mut f = Fixture::standard();
            f.controller.set_ball_spawn_side(-1);
            let mut ball = Ball::default();
            assert_eq!(f.controller.reset_ball(&mut ball, &mut f.rng), 1);
            assert!(ball.position.z < 0.0);
            assert_eq!(f.controller.reset_ball(&mut ball, &mut f.rng), -1);
            assert!(ball.position.z > 0.0);
        }

        #[test]
        fn ball_spawns_inside_side_box_at_rest() {
            let mut f = Fixture::standard();
            let mut ball = Ball {
                velocity: Vec3::new(3.0, 3.0, 3.0),
                angular_velocity: Vec3::new(1.0, 0.0, 0.0),
                ..Default::default()
            };
            for _ in 0..20 {
                f.controller.reset_ball(&mut ball, &mut f.rng);
                let p = ball.position;
                assert!(p.x.abs() <= 2.0);
                assert!((6.0..=8.0).contains(&p.y));
                assert!((6.0..=10.0).contains(&p.z.abs()));
                assert_eq!(ball.velocity, Vec3::ZERO);
                assert_eq!(ball.angular_velocity, Vec3::ZERO);
            }
        }

        #[test]
        fn agents_spawn_on_their_half() {
            let mut f = Fixture::standard();
            for _ in 0..20 {
                f.resolve(Event::BallHitBlueGoal);
                let blue = f.scene.blue.body;
                let purple = f.purple().body;
                assert!((5.0..=9.0).contains(&blue.position.z));
                assert!((-9.0..=-5.0).contains(&purple.position.z));
                assert!((0.5..=3.75).contains(&blue.position.y));
                assert!(blue.yaw.abs() <= 45.0 && purple.yaw.abs() <= 45.0);
                assert_eq!(blue.velocity, Vec3::ZERO);
            }
        }

        #[test]
        fn same_seed_same_layout() {
            let a = Fixture::standard();
            let b = Fixture::standard();
            assert_eq!(a.scene.ball.position, b.scene.ball.position);
            assert_eq!(a.scene.blue.body, b.scene.blue.body);
        }
    }

    mod without_purple {
        use super::*;

        fn solo() -> Fixture {
            Fixture::new(EnvConfig {
                purple_agent_present: false,
                ..Default::default()
            })
        }

        #[test]
        fn ball_always_spawns_over_blue() {
            let mut f = solo();
            let mut ball = Ball::default();
            for _ in 0..4 {
                assert_eq!(f.controller.reset_ball(&mut ball, &mut f.rng), -1);
                assert!(ball.position.z > 0.0);
            }
        }

        #[test]
        fn purple_rewards_are_skipped() {
            let mut f = solo();
            f.controller.update_last_hitter(Team::Purple);
            f.resolve(Event::BallEnteredBlueArea);
            assert_eq!(f.resolve(Event::BallHitBlueGoal), Resolution::Reset);
            assert!(close(f.scene.blue.episode.pending_reward(), 1.0));
            assert_eq!(f.controller.scoreboard().blue, 1);
        }
    }

    mod timeout {
        use super::*;

        #[test]
        fn step_budget_interrupts_without_reward() {
            let mut f = Fixture::new(EnvConfig {
                max_environment_steps: 3,
                ..Default::default()
            });
            assert_eq!(f.tick(), Resolution::Continue);
            assert_eq!(f.tick(), Resolution::Continue);
            assert_eq!(f.tick(), Resolution::Reset);
            for agent in f.scene.agents() {
                assert_eq!(agent.episode.boundary(), Some(EpisodeBoundary::Interrupted));
                assert_eq!(agent.episode.pending_reward(), 0.0);
            }
            assert_eq!(f.controller.step_count(), 0);
            assert_eq!(f.controller.scoreboard().court, CourtMaterial::Default);
        }

        #[test]
        fn zero_budget_never_interrupts() {
            let mut f = Fixture::new(EnvConfig {
                max_environment_steps: 0,
                ..Default::default()
            });
            for _ in 0..10_000 {
                assert_eq!(f.tick(), Resolution::Continue);
            }
            assert_eq!(f.controller.step_count(), 10_000);
        }
    }

    mod visuals {
        use super::*;

        #[test]
        fn court_material_reverts_after_flash() {
            let mut f = Fixture::standard();
            f.resolve(Event::BallHitBlueGoal);
            assert_eq!(f.controller.scoreboard().court, CourtMaterial::BlueScored);
            f.wait(0.4);
            assert_eq!(f.controller.scoreboard().court, CourtMaterial::BlueScored);
            f.wait(0.2);
            assert_eq!(f.controller.scoreboard().court, CourtMaterial::Default);
            assert!(f.controller.scoreboard().message.is_some());
        }

        #[test]
        fn score_message_clears_after_two_seconds() {
            let mut f = Fixture::standard();
            f.resolve(Event::BallHitPurpleGoal);
            assert_eq!(
                f.controller.scoreboard().message.as_deref(),
                Some("+1 to Purple")
            );
            f.wait(2.1);
            assert_eq!(f.controller.scoreboard().message, None);
        }

        #[test]
        fn back_to_back_points_restart_the_flash() {
            let mut f = Fixture::standard();
            f.resolve(Event::BallHitBlueGoal);
            f.wait(0.3);
            f.resolve(Event::BallHitPurpleGoal);
            f.wait(0.3);
            // First flash's revert was cancelled
            assert_eq!(f.controller.scoreboard().court, CourtMaterial::PurpleScored);
            assert_eq!(f.scheduler.pending_count(), 2);
        }
    }
}
