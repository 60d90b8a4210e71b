//! Scripted policies that drive agents without a learner attached.
//!
//! Policies read the same team-relative observation a learner gets and
//! return one action per tick. They back the host binary and the soak run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::agent::{ActionVector, ForwardAction, Observation, RotateAction, StrafeAction};

pub trait Policy: Send {
    fn decide(&mut self, observation: &Observation) -> ActionVector;
}

/// Which scripted policy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Uniform over every branch
    Random,
    /// Chase the ball and jump under it
    Heuristic,
}

impl PolicyKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "random" => Some(PolicyKind::Random),
            "heuristic" => Some(PolicyKind::Heuristic),
            _ => None,
        }
    }

    pub fn build(self, seed: u64) -> Box<dyn Policy> {
        match self {
            PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
            PolicyKind::Heuristic => Box::new(HeuristicPolicy::default()),
        }
    }
}

pub struct RandomPolicy {
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn decide(&mut self, _observation: &Observation) -> ActionVector {
        ActionVector {
            forward: match self.rng.gen_range(0..3) {
                0 => ForwardAction::None,
                1 => ForwardAction::Forward,
                _ => ForwardAction::Back,
            },
            rotate: match self.rng.gen_range(0..3) {
                0 => RotateAction::None,
                1 => RotateAction::Left,
                _ => RotateAction::Right,
            },
            strafe: match self.rng.gen_range(0..3) {
                0 => StrafeAction::None,
                1 => StrafeAction::Left,
                _ => StrafeAction::Right,
            },
            jump: self.rng.gen_bool(0.5),
        }
    }
}

/// Steers toward the ball in the team frame, keeps facing the net and
/// jumps when the ball is close and above.
#[derive(Debug, Clone)]
pub struct HeuristicPolicy {
    /// Offsets inside this band along an axis are ignored (m)
    pub deadband: f64,
    /// Facing error tolerated before turning (observation units)
    pub yaw_tolerance: f64,
    pub jump_distance: f64,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self {
            deadband: 0.5,
            yaw_tolerance: 0.05,
            jump_distance: 2.5,
        }
    }
}

impl Policy for HeuristicPolicy {
    fn decide(&mut self, observation: &Observation) -> ActionVector {
        let distance = observation.ball_distance();
        let offset = observation.ball_direction() * distance;

        let forward = if offset.z > self.deadband {
            ForwardAction::Forward
        } else if offset.z < -self.deadband {
            ForwardAction::Back
        } else {
            ForwardAction::None
        };
        let strafe = if offset.x > self.deadband {
            StrafeAction::Right
        } else if offset.x < -self.deadband {
            StrafeAction::Left
        } else {
            StrafeAction::None
        };
        let yaw = observation.yaw();
        let rotate = if yaw > self.yaw_tolerance {
            RotateAction::Left
        } else if yaw < -self.yaw_tolerance {
            RotateAction::Right
        } else {
            RotateAction::None
        };

        ActionVector {
            forward,
            rotate,
            strafe,
            jump: distance < self.jump_distance && offset.y > 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::OBSERVATION_SIZE;

    /// Observation with the given team-relative ball offset and yaw term
    fn observation(offset: (f64, f64, f64), yaw: f64) -> Observation {
        let (x, y, z) = offset;
        let distance = (x * x + y * y + z * z).sqrt();
        let mut values = [0.0; OBSERVATION_SIZE];
        values[0] = yaw;
        if distance > 0.0 {
            values[1] = x / distance;
            values[2] = y / distance;
            values[3] = z / distance;
        }
        values[4] = distance;
        Observation(values)
    }

    mod heuristic {
        use super::*;

        #[test]
        fn chases_ball_ahead() {
            let action = HeuristicPolicy::default().decide(&observation((0.0, 0.0, 6.0), 0.0));
            assert_eq!(action.forward, ForwardAction::Forward);
            assert_eq!(action.strafe, StrafeAction::None);
            assert!(!action.jump);
        }

        #[test]
        fn backs_up_and_strafes() {
            let action = HeuristicPolicy::default().decide(&observation((3.0, 0.0, -4.0), 0.0));
            assert_eq!(action.forward, ForwardAction::Back);
            assert_eq!(action.strafe, StrafeAction::Right);

            let action = HeuristicPolicy::default().decide(&observation((-3.0, 0.0, 0.2), 0.0));
            assert_eq!(action.forward, ForwardAction::None);
            assert_eq!(action.strafe, StrafeAction::Left);
        }

        #[test]
        fn jumps_under_close_ball() {
            let action = HeuristicPolicy::default().decide(&observation((0.0, 1.5, 0.3), 0.0));
            assert!(action.jump);

            // Close but below
            let action = HeuristicPolicy::default().decide(&observation((0.0, -0.5, 0.3), 0.0));
            assert!(!action.jump);
        }

        #[test]
        fn turns_back_to_the_net() {
            let mut policy = HeuristicPolicy::default();
            assert_eq!(policy.decide(&observation((0.0, 0.0, 5.0), 0.38)).rotate, RotateAction::Left);
            assert_eq!(policy.decide(&observation((0.0, 0.0, 5.0), -0.38)).rotate, RotateAction::Right);
            assert_eq!(policy.decide(&observation((0.0, 0.0, 5.0), 0.01)).rotate, RotateAction::None);
        }

        #[test]
        fn ball_at_agent_does_nothing() {
            let action = HeuristicPolicy::default().decide(&observation((0.0, 0.0, 0.0), 0.0));
            assert_eq!(action, ActionVector::default());
        }
    }

    mod random {
        use super::*;

        #[test]
        fn same_seed_same_actions() {
            let obs = observation((0.0, 0.0, 1.0), 0.0);
            let mut a = RandomPolicy::new(42);
            let mut b = RandomPolicy::new(42);
            for _ in 0..50 {
                assert_eq!(a.decide(&obs), b.decide(&obs));
            }
        }

        #[test]
        fn actions_stay_within_branch_sizes() {
            let obs = observation((0.0, 0.0, 1.0), 0.0);
            let mut policy = RandomPolicy::new(7);
            for _ in 0..200 {
                let branches = policy.decide(&obs).to_branches();
                for (value, size) in branches.iter().zip(ActionVector::BRANCH_SIZES) {
                    assert!((0..size).contains(value));
                }
                assert!(ActionVector::from_branches(&branches).is_ok());
            }
        }
    }

    #[test]
    fn kind_parses_names() {
        assert_eq!(PolicyKind::parse("random"), Some(PolicyKind::Random));
        assert_eq!(PolicyKind::parse("heuristic"), Some(PolicyKind::Heuristic));
        assert_eq!(PolicyKind::parse("ppo"), None);
    }
}
