use volleyball_shared::types::EpisodeBoundary;

/// What the learner reads for one agent after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSignal {
    /// Reward accumulated since the previous read
    pub reward: f64,
    /// Episode total at read time. On a boundary this is the finished episode's total.
    pub cumulative_reward: f64,
    pub boundary: Option<EpisodeBoundary>,
}

/// Per-agent reward accumulator and episode boundary flag. Only the
/// coordinator writes to it; the learner drains it with `take`.
#[derive(Debug, Clone, Default)]
pub struct EpisodeSignal {
    pending_reward: f64,
    cumulative_reward: f64,
    boundary: Option<EpisodeBoundary>,
    completed: u32,
}

impl EpisodeSignal {
    pub fn add_reward(&mut self, reward: f64) {
        self.pending_reward += reward;
        self.cumulative_reward += reward;
    }

    pub fn end_episode(&mut self) {
        self.mark(EpisodeBoundary::Ended);
    }

    /// Step budget ran out. No reward side effects.
    pub fn episode_interrupted(&mut self) {
        self.mark(EpisodeBoundary::Interrupted);
    }

    pub fn pending_reward(&self) -> f64 {
        self.pending_reward
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    pub fn boundary(&self) -> Option<EpisodeBoundary> {
        self.boundary
    }

    pub fn completed_episodes(&self) -> u32 {
        self.completed
    }

    /// Drain the pending reward and boundary. A reported boundary starts
    /// the next episode's total at zero.
    pub fn take(&mut self) -> StepSignal {
        let signal = StepSignal {
            reward: self.pending_reward,
            cumulative_reward: self.cumulative_reward,
            boundary: self.boundary.take(),
        };
        self.pending_reward = 0.0;
        if signal.boundary.is_some() {
            self.cumulative_reward = 0.0;
        }
        signal
    }

    fn mark(&mut self, boundary: EpisodeBoundary) {
        self.boundary = Some(boundary);
        self.completed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_drains_pending_reward() {
        let mut signal = EpisodeSignal::default();
        signal.add_reward(0.4);
        signal.add_reward(0.4);
        let first = signal.take();
        assert!((first.reward - 0.8).abs() < 1e-12);
        assert_eq!(first.boundary, None);
        assert_eq!(signal.take().reward, 0.0);
        assert!((signal.cumulative_reward() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn boundary_reports_episode_total_then_resets_it() {
        let mut signal = EpisodeSignal::default();
        signal.add_reward(0.4);
        signal.take();
        signal.add_reward(1.0);
        signal.end_episode();
        let last = signal.take();
        assert_eq!(last.boundary, Some(EpisodeBoundary::Ended));
        assert!((last.cumulative_reward - 1.4).abs() < 1e-12);
        assert_eq!(signal.cumulative_reward(), 0.0);
        assert_eq!(signal.completed_episodes(), 1);
    }

    #[test]
    fn interruption_is_distinct_from_end() {
        let mut signal = EpisodeSignal::default();
        signal.episode_interrupted();
        let s = signal.take();
        assert_eq!(s.boundary, Some(EpisodeBoundary::Interrupted));
        assert_eq!(s.reward, 0.0);
        assert_eq!(signal.boundary(), None);
    }
}
