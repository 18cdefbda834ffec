//! The three admissible vote choices.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A voter's position on a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Yes,
    No,
    Abstain,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Abstain => "abstain",
        }
    }

    /// All choices, in tally order.
    pub const ALL: [Choice; 3] = [Choice::Yes, Choice::No, Choice::Abstain];
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of `yes`, `no`, `abstain`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseChoiceError(pub String);

impl fmt::Display for ParseChoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid vote choice '{}': must be yes, no, or abstain", self.0)
    }
}

impl std::error::Error for ParseChoiceError {}

impl FromStr for Choice {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "abstain" => Ok(Self::Abstain),
            other => Err(ParseChoiceError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_lowercase_only() {
        assert_eq!("yes".parse::<Choice>().unwrap(), Choice::Yes);
        assert_eq!("no".parse::<Choice>().unwrap(), Choice::No);
        assert_eq!("abstain".parse::<Choice>().unwrap(), Choice::Abstain);
        assert!("YES".parse::<Choice>().is_err());
        assert!("maybe".parse::<Choice>().is_err());
        assert!("".parse::<Choice>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for choice in Choice::ALL {
            assert_eq!(choice.as_str().parse::<Choice>().unwrap(), choice);
        }
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Choice::Abstain).unwrap(), "\"abstain\"");
    }
}
