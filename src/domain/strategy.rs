//! Strategy selection.

use crate::domain::error::StratbenchError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    StatArb,
    BigMovesMonday,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::StatArb, StrategyKind::BigMovesMonday];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::StatArb => "stat_arb",
            StrategyKind::BigMovesMonday => "big_moves_monday",
        }
    }

    /// Config section holding this strategy's parameters.
    pub fn section(self) -> &'static str {
        self.name()
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = StratbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.name() == s.trim())
            .ok_or_else(|| StratbenchError::UnknownStrategy {
                name: s.to_string(),
            })
    }
}
