//! Soak run for the volleyball environment.
//!
//! Plays full episodes headless with scripted policies on both teams and
//! prints per-event counts, reward totals and throughput.
//!
//! Usage: cargo run --bin soak -- [OPTIONS]
//!
//! Options:
//!   --episodes N         Episodes to finish (default: 100)
//!   --seed S             RNG seed (default: 42)
//!   --policy NAME        random | heuristic (default: heuristic)
//!   --max-steps N        Step budget per episode, 0 = none (default: 5000)
//!   --no-purple          Run blue alone
//!   --json               Print only the JSON summary

use std::collections::BTreeMap;
use std::time::Instant;
use volleyball_env::config::ServerConfig;
use volleyball_env::environment::{TeamActions, VolleyballEnv};
use volleyball_env::input::InputSnapshot;
use volleyball_env::policy::{Policy, PolicyKind};
use volleyball_env::types::{EpisodeBoundary, Team};

/// Hard stop when episodes refuse to finish
const TICKS_PER_EPISODE_LIMIT: u64 = 100_000;

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    episodes: u32,
    ended: u32,
    interrupted: u32,
    ticks: u64,
    events: BTreeMap<String, u32>,
    blue_reward: f64,
    purple_reward: f64,
    blue_score: i32,
    purple_score: i32,
    ticks_per_sec: f64,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut episodes: u32 = 100;
    let mut seed: u64 = 42;
    let mut policy_name = "heuristic".to_string();
    let mut max_steps: u32 = 5000;
    let mut purple = true;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--episodes" => {
                i += 1;
                episodes = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(100);
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(42);
            }
            "--policy" => {
                i += 1;
                policy_name = args.get(i).cloned().unwrap_or(policy_name);
            }
            "--max-steps" => {
                i += 1;
                max_steps = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(5000);
            }
            "--no-purple" => purple = false,
            "--json" => json = true,
            _ => {}
        }
        i += 1;
    }

    let Some(kind) = PolicyKind::parse(&policy_name) else {
        eprintln!("Unknown policy: {} (expected random or heuristic)", policy_name);
        std::process::exit(1);
    };

    let mut config = ServerConfig {
        rng_seed: seed,
        ..Default::default()
    };
    config.env.max_environment_steps = max_steps;
    config.env.purple_agent_present = purple;
    if let Err(e) = config.validate() {
        eprintln!("Invalid environment configuration: {}", e);
        std::process::exit(1);
    }

    let mut env = match VolleyballEnv::new(config.env.clone(), config.tick_dt(), seed) {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Cannot build environment: {}", e);
            std::process::exit(1);
        }
    };

    let mut teams = vec![Team::Blue];
    if purple {
        teams.push(Team::Purple);
    }
    let mut policies: Vec<(Team, Box<dyn Policy>)> = teams
        .into_iter()
        .enumerate()
        .map(|(i, team)| (team, kind.build(seed.wrapping_add(i as u64 + 1))))
        .collect();

    if !json {
        println!("=== Volleyball Soak Run ===");
        println!("Episodes: {}", episodes);
        println!("Seed: {}", seed);
        println!("Policy: {}", policy_name);
        println!("Max steps: {}", max_steps);
        println!("Purple agent: {}", purple);
        println!();
    }

    let mut summary = Summary::default();
    let tick_limit = TICKS_PER_EPISODE_LIMIT * episodes as u64;
    let input = InputSnapshot::default();
    let start = Instant::now();

    while summary.episodes < episodes && summary.ticks < tick_limit {
        let mut actions = TeamActions::default();
        for (team, policy) in policies.iter_mut() {
            if let Some(observation) = env.observe(*team) {
                actions.set(*team, policy.decide(&observation));
            }
        }

        let report = env.step(&actions, &input);
        summary.ticks += 1;

        for event in &report.events {
            *summary.events.entry(format!("{:?}", event)).or_default() += 1;
        }
        for agent in &report.agents {
            match agent.team {
                Team::Blue => summary.blue_reward += agent.signal.reward,
                Team::Purple => summary.purple_reward += agent.signal.reward,
                Team::Unassigned => {}
            }
        }
        if let Some(blue) = report.agent(Team::Blue) {
            match blue.signal.boundary {
                Some(EpisodeBoundary::Ended) => summary.ended += 1,
                Some(EpisodeBoundary::Interrupted) => summary.interrupted += 1,
                None => {}
            }
        }
        if report.reset {
            summary.episodes += 1;
            if !json && summary.episodes % 10 == 0 {
                println!(
                    "[{} episodes] ticks={} blue={} purple={}",
                    summary.episodes,
                    summary.ticks,
                    env.scoreboard().blue,
                    env.scoreboard().purple
                );
            }
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    summary.blue_score = env.scoreboard().blue;
    summary.purple_score = env.scoreboard().purple;
    summary.ticks_per_sec = if elapsed > 0.0 {
        summary.ticks as f64 / elapsed
    } else {
        0.0
    };

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Cannot encode summary: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!();
    println!("=== Final Results ===");
    println!("Episodes finished: {}", summary.episodes);
    println!("  ended: {}", summary.ended);
    println!("  interrupted: {}", summary.interrupted);
    println!("Total ticks: {}", summary.ticks);
    for (event, count) in &summary.events {
        println!("{}: {}", event, count);
    }
    println!("Blue reward: {:.2}", summary.blue_reward);
    if purple {
        println!("Purple reward: {:.2}", summary.purple_reward);
    }
    println!("Score: {} - {}", summary.blue_score, summary.purple_score);
    println!();
    println!("Ticks/sec: {:.0}", summary.ticks_per_sec);
    if summary.episodes < episodes {
        println!(
            "Stopped after {} ticks with {} episodes unfinished",
            summary.ticks,
            episodes - summary.episodes
        );
    }

    println!();
    println!("=== Summary (JSON) ===");
    match serde_json::to_string_pretty(&summary) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Cannot encode summary: {}", e),
    }
}
