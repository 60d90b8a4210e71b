use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::EnvFilter;
use volleyball_env::agent::Observation;
use volleyball_env::config::ServerConfig;
use volleyball_env::game_loop::{run_game_loop, GameBroadcast, GameCommand};
use volleyball_env::policy::{Policy, PolicyKind};
use volleyball_env::types::Team;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid environment configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid environment configuration: {}", e);
        std::process::exit(1);
    }

    let policy_kind = match std::env::var("VOLLEYBALL_POLICY") {
        Ok(name) => match PolicyKind::parse(&name) {
            Some(kind) => kind,
            None => {
                eprintln!("Unknown policy: {} (expected random or heuristic)", name);
                std::process::exit(1);
            }
        },
        Err(_) => PolicyKind::Heuristic,
    };

    let mut teams = vec![Team::Blue];
    if config.env.purple_agent_present {
        teams.push(Team::Purple);
    }
    let seed = config.rng_seed;

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let (broadcast_tx, _) = broadcast::channel::<GameBroadcast>(64);

    // One scripted policy per team, fed from step broadcasts
    for (i, team) in teams.into_iter().enumerate() {
        let policy = policy_kind.build(seed.wrapping_add(i as u64 + 1));
        let rx = broadcast_tx.subscribe();
        let tx = game_tx.clone();
        tokio::spawn(drive_team(team, policy, rx, tx));
    }

    // Scoreboard log
    let mut score_rx = broadcast_tx.subscribe();
    tokio::spawn(async move {
        let mut last = None;
        loop {
            match score_rx.recv().await {
                Ok(GameBroadcast::Scoreboard(board)) => {
                    if last.as_ref() != Some(&board) {
                        tracing::info!(
                            blue = board.blue,
                            purple = board.purple,
                            episodes = board.episodes,
                            note = board.message.as_deref().unwrap_or(""),
                            "Scoreboard"
                        );
                        last = Some(board);
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Scoreboard log lagged by {} messages", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Spawn game loop
    let bc_tx = broadcast_tx.clone();
    let game_loop = tokio::spawn(async move {
        run_game_loop(game_rx, bc_tx, config).await;
    });

    tracing::info!(policy = ?policy_kind, "Starting volleyball environment");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
    drop(game_tx);
    game_loop.abort();
}

/// Answer every step broadcast with the policy's next action.
async fn drive_team(
    team: Team,
    mut policy: Box<dyn Policy>,
    mut rx: broadcast::Receiver<GameBroadcast>,
    tx: mpsc::Sender<GameCommand>,
) {
    loop {
        let step = match rx.recv().await {
            Ok(GameBroadcast::Step(step)) => step,
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::debug!(?team, "Policy skipped {} messages", n);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        let Some(observation) = step
            .agents
            .iter()
            .find(|agent| agent.team == team)
            .and_then(|agent| Observation::from_slice(&agent.observation))
        else {
            continue;
        };
        let action = policy.decide(&observation);
        if tx
            .send(GameCommand::SubmitAction { team, action })
            .await
            .is_err()
        {
            break;
        }
    }
}
