//! The five gauntlet levels.

use serde::{Deserialize, Serialize};

/// One of the five fixed gauntlet levels.
///
/// Serialized as its ordinal (`1..=5`), including when used as a JSON map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    /// Level 1: problem statement, judged by the skeptic
    ProblemStatement = 1,
    /// Level 2: value proposition, judged by the devil's advocate
    ValueProposition = 2,
    /// Level 3: homepage hero section, judged by a cold visitor
    HeroSection = 3,
    /// Level 4: pricing model, judged by an angel investor
    PricingModel = 4,
    /// Level 5: crisis response, judged on tone
    CrisisResponse = 5,
}

impl Level {
    /// All levels in play order.
    pub const ALL: [Level; 5] = [
        Level::ProblemStatement,
        Level::ValueProposition,
        Level::HeroSection,
        Level::PricingModel,
        Level::CrisisResponse,
    ];

    /// Number of levels in the gauntlet.
    pub const COUNT: usize = Self::ALL.len();

    /// Resolve an ordinal, `None` outside `1..=5`.
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            1 => Some(Self::ProblemStatement),
            2 => Some(Self::ValueProposition),
            3 => Some(Self::HeroSection),
            4 => Some(Self::PricingModel),
            5 => Some(Self::CrisisResponse),
            _ => None,
        }
    }

    /// The level's ordinal.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Levels 3-5 sit behind the unlock.
    pub fn is_paywalled(self) -> bool {
        self.ordinal() >= 3
    }

    /// The level that must be passed before this one.
    pub fn previous(self) -> Option<Self> {
        Self::from_ordinal(i64::from(self.ordinal()) - 1)
    }

    /// The level after this one.
    pub fn next(self) -> Option<Self> {
        Self::from_ordinal(i64::from(self.ordinal()) + 1)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.ordinal()
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(i64::from(value)).ok_or_else(|| format!("no such level: {}", value))
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ordinal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_ordinals() {
        assert_eq!(Level::from_ordinal(1), Some(Level::ProblemStatement));
        assert_eq!(Level::from_ordinal(5), Some(Level::CrisisResponse));
        assert_eq!(Level::from_ordinal(0), None);
        assert_eq!(Level::from_ordinal(6), None);
        assert_eq!(Level::from_ordinal(-1), None);
    }

    #[test]
    fn test_paywall_and_navigation() {
        assert!(!Level::ProblemStatement.is_paywalled());
        assert!(!Level::ValueProposition.is_paywalled());
        assert!(Level::HeroSection.is_paywalled());
        assert!(Level::CrisisResponse.is_paywalled());

        assert_eq!(Level::ProblemStatement.previous(), None);
        assert_eq!(Level::HeroSection.previous(), Some(Level::ValueProposition));
        assert_eq!(Level::CrisisResponse.next(), None);
    }

    #[test]
    fn test_serializes_as_map_key() {
        let mut map = BTreeMap::new();
        map.insert(Level::ValueProposition, true);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2":true}"#);

        let back: BTreeMap<Level, bool> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&Level::ValueProposition), Some(&true));

        assert!(serde_json::from_str::<BTreeMap<Level, bool>>(r#"{"9":true}"#).is_err());
    }
}
