pub use volleyball_shared::protocol::*;

use crate::coordinator::Scoreboard;
use crate::environment::{AgentReport, StepReport};

// === Conversion helpers ===

pub fn agent_to_wire(report: &AgentReport) -> AgentStepWire {
    AgentStepWire {
        team: report.team,
        pos: round4_array(report.position.to_array()),
        yaw: round4(report.yaw),
        // Learner inputs go out exact; only display geometry is rounded
        observation: report.observation.as_slice().to_vec(),
        reward: report.signal.reward,
        cumulative_reward: report.signal.cumulative_reward,
        boundary: report.signal.boundary,
        jump_phase: report.jump_phase,
    }
}

pub fn step_msg(report: &StepReport) -> StepMsg {
    StepMsg {
        tick: report.tick,
        step_count: report.step_count,
        last_hitter: report.last_hitter,
        agents: report.agents.iter().map(agent_to_wire).collect(),
        ball: BallWire {
            pos: round4_array(report.ball.position.to_array()),
            vel: round4_array(report.ball.velocity.to_array()),
        },
        events: report.events.clone(),
    }
}

pub fn scoreboard_msg(scoreboard: &Scoreboard) -> ScoreboardMsg {
    ScoreboardMsg {
        blue: scoreboard.blue,
        purple: scoreboard.purple,
        message: scoreboard.message.clone(),
        court: scoreboard.court,
        episodes: scoreboard.episodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Observation, OBSERVATION_SIZE};
    use crate::episode::StepSignal;
    use crate::scene::Ball;
    use volleyball_shared::types::{CourtMaterial, EpisodeBoundary, Event, JumpPhase, Team};
    use volleyball_shared::vec3::Vec3;

    fn sample_report() -> StepReport {
        StepReport {
            tick: 9,
            step_count: 3,
            last_hitter: Team::Purple,
            agents: vec![AgentReport {
                team: Team::Blue,
                position: Vec3::new(1.234567, 0.75, 7.0),
                yaw: 45.000049,
                observation: Observation([0.333333; OBSERVATION_SIZE]),
                signal: StepSignal {
                    reward: 1.0,
                    cumulative_reward: 1.0,
                    boundary: Some(EpisodeBoundary::Ended),
                },
                jump_phase: JumpPhase::Rising,
            }],
            ball: Ball {
                position: Vec3::new(0.0, 7.0, -8.0),
                velocity: Vec3::new(0.11111, -2.0, 0.0),
                angular_velocity: Vec3::ZERO,
            },
            events: vec![Event::BallHitBlueGoal],
            reset: true,
        }
    }

    #[test]
    fn step_msg_rounds_geometry_only() {
        let msg = step_msg(&sample_report());
        assert_eq!(msg.tick, 9);
        assert_eq!(msg.agents[0].pos, [1.2346, 0.75, 7.0]);
        assert_eq!(msg.agents[0].yaw, 45.0);
        assert_eq!(msg.agents[0].observation.len(), OBSERVATION_SIZE);
        assert_eq!(msg.agents[0].observation[0], 0.333333);
        assert_eq!(
            Observation::from_slice(&msg.agents[0].observation),
            Some(Observation([0.333333; OBSERVATION_SIZE]))
        );
        assert_eq!(msg.ball.vel, [0.1111, -2.0, 0.0]);
    }

    #[test]
    fn step_msg_carries_signal_and_events() {
        let msg = step_msg(&sample_report());
        let agent = &msg.agents[0];
        assert_eq!(agent.reward, 1.0);
        assert_eq!(agent.boundary, Some(EpisodeBoundary::Ended));
        assert_eq!(agent.jump_phase, JumpPhase::Rising);
        assert_eq!(msg.events, vec![Event::BallHitBlueGoal]);
        assert_eq!(msg.last_hitter, Team::Purple);
    }

    #[test]
    fn scoreboard_msg_copies_state() {
        let scoreboard = Scoreboard {
            blue: 2,
            purple: -1,
            message: Some("+1 to Blue".to_string()),
            court: CourtMaterial::BlueScored,
            episodes: 3,
        };
        let msg = scoreboard_msg(&scoreboard);
        assert_eq!(msg.blue, 2);
        assert_eq!(msg.purple, -1);
        assert_eq!(msg.message.as_deref(), Some("+1 to Blue"));
        assert_eq!(msg.court, CourtMaterial::BlueScored);
        assert_eq!(msg.episodes, 3);
    }
}
