//! Review verdicts known to the bot

use std::fmt;
use std::str::FromStr;

use crate::error::PollError;

/// A review status the API can report for a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Approved,
    Reviewing,
    Rejected,
}

impl Verdict {
    /// Every known verdict, in display order
    pub const ALL: [Verdict; 3] = [Verdict::Approved, Verdict::Reviewing, Verdict::Rejected];

    /// Status string as it appears on the wire
    pub fn as_status(&self) -> &'static str {
        match self {
            Verdict::Approved => "approved",
            Verdict::Reviewing => "reviewing",
            Verdict::Rejected => "rejected",
        }
    }

    /// Human-readable sentence sent to the chat
    pub fn description(&self) -> &'static str {
        match self {
            Verdict::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Verdict::Reviewing => "Работа взята на проверку ревьюером.",
            Verdict::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl FromStr for Verdict {
    type Err = PollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verdict::ALL
            .into_iter()
            .find(|v| v.as_status() == s)
            .ok_or_else(|| PollError::UnknownVerdict(s.to_string()))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_statuses() {
        assert_eq!("approved".parse::<Verdict>().unwrap(), Verdict::Approved);
        assert_eq!("reviewing".parse::<Verdict>().unwrap(), Verdict::Reviewing);
        assert_eq!("rejected".parse::<Verdict>().unwrap(), Verdict::Rejected);
    }

    #[test]
    fn test_parse_unknown_status() {
        let err = "pending".parse::<Verdict>().unwrap_err();
        assert_eq!(err, PollError::UnknownVerdict("pending".to_string()));

        // Matching is exact
        assert!("Approved".parse::<Verdict>().is_err());
        assert!("".parse::<Verdict>().is_err());
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(
            Verdict::Approved.description(),
            "Работа проверена: ревьюеру всё понравилось. Ура!"
        );
        assert_eq!(Verdict::Reviewing.description(), "Работа взята на проверку ревьюером.");
        assert_eq!(
            Verdict::Rejected.description(),
            "Работа проверена: у ревьюера есть замечания."
        );
    }

    #[test]
    fn test_status_round_trips_through_display() {
        for verdict in Verdict::ALL {
            assert_eq!(verdict.to_string().parse::<Verdict>().unwrap(), verdict);
        }
    }
}
