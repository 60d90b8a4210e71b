use crate::agent::ActionVector;
use crate::config::ServerConfig;
use crate::environment::{TeamActions, VolleyballEnv};
use crate::input::InputSnapshot;
use crate::protocol::{scoreboard_msg, step_msg, ScoreboardMsg, StepMsg};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use volleyball_shared::types::Team;

/// Commands from learners and the UI host to the game loop
pub enum GameCommand {
    /// Held until replaced; applied on every tick
    SubmitAction { team: Team, action: ActionVector },
    AvatarInput(InputSnapshot),
    Snapshot {
        response: oneshot::Sender<Snapshot>,
    },
    /// Interrupt the running episode
    Reset,
}

/// Point-in-time view answered to `GameCommand::Snapshot`
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub last_step: Option<StepMsg>,
    pub scoreboard: ScoreboardMsg,
}

/// Broadcasts from game loop to all listeners
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    Step(StepMsg),
    Scoreboard(ScoreboardMsg),
}

/// Run the main game loop. Owns the environment.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    server_config: ServerConfig,
) {
    let mut env = match VolleyballEnv::new(
        server_config.env.clone(),
        server_config.tick_dt(),
        server_config.rng_seed,
    ) {
        Ok(env) => env,
        Err(e) => {
            tracing::error!("Cannot build environment: {}", e);
            return;
        }
    };

    let tick_duration = Duration::from_secs_f64(server_config.tick_dt());
    let render_duration = Duration::from_secs_f64(1.0 / server_config.render_rate_hz as f64);
    let broadcast_every_n = (server_config.tick_rate_hz / server_config.broadcast_rate_hz).max(1);
    let mut tick_count: u64 = 0;

    let mut actions = TeamActions::default();
    let mut input = InputSnapshot::default();
    let mut last_step: Option<StepMsg> = None;

    let mut tick_interval = tokio::time::interval(tick_duration);
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut render_interval = tokio::time::interval(render_duration);
    render_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tracing::info!(
        tick_rate_hz = server_config.tick_rate_hz,
        purple = server_config.env.purple_agent_present,
        avatar = server_config.env.player_avatar,
        "Game loop started"
    );

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let report = env.step(&actions, &input);
                // Edges fire once; the held jump state carries over
                input = InputSnapshot::hold(input.jump);

                if report.reset {
                    tracing::debug!(tick = report.tick, events = ?report.events, "episode finished");
                }

                let msg = step_msg(&report);
                last_step = Some(msg.clone());
                // No receivers is fine
                let _ = broadcast_tx.send(GameBroadcast::Step(msg));

                tick_count += 1;
                if tick_count % broadcast_every_n as u64 == 0 {
                    let _ = broadcast_tx.send(GameBroadcast::Scoreboard(scoreboard_msg(
                        env.scoreboard(),
                    )));
                }
            }

            _ = render_interval.tick() => {
                env.render_tick();
            }

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    // Every sender dropped
                    break;
                };
                match cmd {
                    GameCommand::SubmitAction { team, action } => {
                        actions.set(team, action);
                    }
                    GameCommand::AvatarInput(snapshot) => {
                        input = snapshot;
                    }
                    GameCommand::Snapshot { response } => {
                        let _ = response.send(Snapshot {
                            last_step: last_step.clone(),
                            scoreboard: scoreboard_msg(env.scoreboard()),
                        });
                    }
                    GameCommand::Reset => {
                        env.force_reset();
                        tracing::info!("Episode reset by command");
                    }
                }
            }
        }
    }

    tracing::info!("Game loop ended");
}
