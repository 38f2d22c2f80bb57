//! Action representations and action spaces

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Marker for values an environment accepts as actions
pub trait Action: Clone + Debug + Send {}

/// Discrete action, the index into a discrete action space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteAction(pub usize);

impl Action for DiscreteAction {}

/// Discrete action space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscreteSpace {
    /// Number of discrete actions
    pub n: usize,
}

impl DiscreteSpace {
    /// Create a new discrete action space
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Check if an action is valid within this space
    #[must_use]
    pub fn contains(&self, action: &DiscreteAction) -> bool {
        action.0 < self.n
    }
}

/// The four lander controls.
///
/// Codes match the lunar lander action space: 0 does nothing, 1 fires the
/// left orientation engine, 2 the main engine and 3 the right orientation
/// engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanderAction {
    /// Coast
    #[default]
    Noop,
    /// Main engine
    Thrust,
    /// Rotate clockwise
    RotateRight,
    /// Rotate counter-clockwise
    RotateLeft,
}

impl LanderAction {
    /// Every action, ordered by code
    pub const ALL: [Self; 4] = [Self::Noop, Self::RotateRight, Self::Thrust, Self::RotateLeft];

    /// Discrete code sent to the environment
    #[must_use]
    pub fn code(self) -> usize {
        match self {
            Self::Noop => 0,
            Self::RotateRight => 1,
            Self::Thrust => 2,
            Self::RotateLeft => 3,
        }
    }

    /// Inverse of [`LanderAction::code`]
    #[must_use]
    pub fn from_code(code: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.code() == code)
    }
}

impl From<LanderAction> for DiscreteAction {
    fn from(action: LanderAction) -> Self {
        DiscreteAction(action.code())
    }
}

impl fmt::Display for LanderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Noop => "noop",
            Self::Thrust => "thrust",
            Self::RotateRight => "rotate_right",
            Self::RotateLeft => "rotate_left",
        };
        f.write_str(name)
    }
}
