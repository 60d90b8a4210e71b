//! Per-tick input snapshot for the human-controlled avatar.
//!
//! The host polls its input device once per simulation tick and hands the
//! result over as a value; nothing in the environment reacts to raw device
//! callbacks.

/// Which edge of the movement control produced this snapshot's axis value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEdge {
    /// First contact on an axis-aligned control
    Started,
    /// Continuous or two-axis (diagonal) update
    Performed,
    /// Control released
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSnapshot {
    /// Horizontal intent: x is strafe, y maps to court z
    pub axis: (f64, f64),
    /// None keeps the previously applied intent
    pub edge: Option<InputEdge>,
    pub jump: bool,
}

impl InputSnapshot {
    /// No change to movement, jump button as given.
    pub fn hold(jump: bool) -> Self {
        Self {
            axis: (0.0, 0.0),
            edge: None,
            jump,
        }
    }

    pub fn started(x: f64, y: f64) -> Self {
        Self {
            axis: (x, y),
            edge: Some(InputEdge::Started),
            jump: false,
        }
    }

    pub fn performed(x: f64, y: f64) -> Self {
        Self {
            axis: (x, y),
            edge: Some(InputEdge::Performed),
            jump: false,
        }
    }

    pub fn canceled() -> Self {
        Self {
            axis: (0.0, 0.0),
            edge: Some(InputEdge::Canceled),
            jump: false,
        }
    }

    pub fn with_jump(mut self, jump: bool) -> Self {
        self.jump = jump;
        self
    }
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self::hold(false)
    }
}
