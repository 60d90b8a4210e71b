use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Team allegiance. `Unassigned` marks "nobody has touched the ball yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/generated/")]
#[serde(rename_all = "camelCase")]
pub enum Team {
    Blue,
    Purple,
    #[default]
    Unassigned,
}

impl Team {
    /// Movement/observation sign. The two teams face opposite default
    /// directions, so blue's axes are mirrored to keep one policy usable on
    /// both sides.
    pub fn sign(self) -> Option<f64> {
        match self {
            Team::Blue => Some(-1.0),
            Team::Purple => Some(1.0),
            Team::Unassigned => None,
        }
    }

    pub fn opponent(self) -> Team {
        match self {
            Team::Blue => Team::Purple,
            Team::Purple => Team::Blue,
            Team::Unassigned => Team::Unassigned,
        }
    }
}

/// Ball events produced by trigger overlaps. Codes are stable: 0..=4 in
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/generated/")]
#[serde(rename_all = "camelCase")]
pub enum Event {
    BallHitPurpleGoal,
    BallHitBlueGoal,
    BallOutOfBounds,
    BallEnteredBlueArea,
    BallEnteredPurpleArea,
}

impl Event {
    pub fn code(self) -> u8 {
        match self {
            Event::BallHitPurpleGoal => 0,
            Event::BallHitBlueGoal => 1,
            Event::BallOutOfBounds => 2,
            Event::BallEnteredBlueArea => 3,
            Event::BallEnteredPurpleArea => 4,
        }
    }

    /// Whether resolving this event ends the episode for every agent.
    pub fn ends_episode(self) -> bool {
        matches!(
            self,
            Event::BallHitPurpleGoal | Event::BallHitBlueGoal | Event::BallOutOfBounds
        )
    }
}

impl TryFrom<u8> for Event {
    /// The rejected code.
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        match code {
            0 => Ok(Event::BallHitPurpleGoal),
            1 => Ok(Event::BallHitBlueGoal),
            2 => Ok(Event::BallOutOfBounds),
            3 => Ok(Event::BallEnteredBlueArea),
            4 => Ok(Event::BallEnteredPurpleArea),
            other => Err(other),
        }
    }
}

/// Semantic tag carried by a trigger volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionTag {
    /// Generic out-of-bounds floor.
    Boundary,
    /// Volume just past the net on the blue half.
    BlueBoundary,
    /// Volume just past the net on the purple half.
    PurpleBoundary,
    /// Floor of the blue half (purple scores a point into it).
    PurpleGoal,
    /// Floor of the purple half.
    BlueGoal,
    Untagged,
}

impl RegionTag {
    /// Map an engine tag string. Unknown tags are `Untagged`.
    pub fn from_tag(tag: &str) -> RegionTag {
        match tag {
            "boundary" => RegionTag::Boundary,
            "blueBoundary" => RegionTag::BlueBoundary,
            "purpleBoundary" => RegionTag::PurpleBoundary,
            "purpleGoal" => RegionTag::PurpleGoal,
            "blueGoal" => RegionTag::BlueGoal,
            _ => RegionTag::Untagged,
        }
    }
}

/// Court surface look, swapped briefly after a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/generated/")]
#[serde(rename_all = "camelCase")]
pub enum CourtMaterial {
    #[default]
    Default,
    BlueScored,
    PurpleScored,
    Penalty,
}

/// How an agent's episode stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/generated/")]
#[serde(rename_all = "camelCase")]
pub enum EpisodeBoundary {
    /// Terminal outcome (point scored or ball out).
    Ended,
    /// Step budget ran out; no reward side effects.
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/generated/")]
#[serde(rename_all = "camelCase")]
pub enum JumpPhase {
    #[default]
    Idle,
    Rising,
    ApexHold,
    Falling,
}
