use serde::{Deserialize, Serialize};

/// Canonical form of an email used for identity: surrounding whitespace
/// trimmed, lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl Activity {
    pub fn new(
        description: impl Into<String>,
        schedule: impl Into<String>,
        max_participants: u32,
        participants: &[&str],
    ) -> Self {
        Self {
            description: description.into(),
            schedule: schedule.into(),
            max_participants,
            participants: participants.iter().map(|p| normalize_email(p)).collect(),
        }
    }

    /// Position of `email` in the roster. `email` must already be normalized;
    /// stored entries are normalized again before comparing.
    pub fn position_of(&self, email: &str) -> Option<usize> {
        self.participants
            .iter()
            .position(|p| normalize_email(p) == email)
    }
}
