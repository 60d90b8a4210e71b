use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{CourtMaterial, EpisodeBoundary, Event, JumpPhase, Team};

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// === Environment -> UI / learner ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/generated/")]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "step")]
    Step(StepMsg),
    #[serde(rename = "scoreboard")]
    Scoreboard(ScoreboardMsg),
}

/// One simulation tick as seen by the learner.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/generated/")]
#[serde(rename_all = "camelCase")]
pub struct StepMsg {
    pub tick: u64,
    pub step_count: u32,
    pub last_hitter: Team,
    pub agents: Vec<AgentStepWire>,
    pub ball: BallWire,
    /// Events resolved during this tick, in order
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/generated/")]
#[serde(rename_all = "camelCase")]
pub struct AgentStepWire {
    pub team: Team,
    pub pos: [f64; 3],
    pub yaw: f64,
    pub observation: Vec<f64>,
    /// Reward accumulated since the previous step message
    pub reward: f64,
    pub cumulative_reward: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<EpisodeBoundary>,
    #[serde(default)]
    pub jump_phase: JumpPhase,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/generated/")]
#[serde(rename_all = "camelCase")]
pub struct BallWire {
    pub pos: [f64; 3],
    pub vel: [f64; 3],
}

/// Score panel state for the UI host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardMsg {
    pub blue: i32,
    pub purple: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub court: CourtMaterial,
    pub episodes: u32,
}

// === Conversion helpers ===

/// Round to 4 decimal places (keeps JSON small)
#[inline]
pub fn round4(v: f64) -> f64 {
    (v * 10000.0).round() / 10000.0
}

#[inline]
pub fn round4_array(v: [f64; 3]) -> [f64; 3] {
    [round4(v[0]), round4(v[1]), round4(v[2])]
}
