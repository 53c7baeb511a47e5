use serde::{Deserialize, Serialize};

/// A physical obstacle flagged at a pickup or destination address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub label: String,
    pub value: ChallengeValue,
    #[serde(default)]
    pub is_custom: bool,
}

impl Challenge {
    /// A challenge picked from the catalog of known obstacles.
    pub fn known(
        id: impl Into<String>,
        label: impl Into<String>,
        value: ChallengeValue,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value,
            is_custom: false,
        }
    }

    /// A free-text challenge typed in by the user.
    ///
    /// The id is derived from the label so the same text toggles the same entry.
    pub fn custom(label: impl Into<String>) -> Self {
        let label = label.into();
        let slug: String = label
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        Self {
            id: format!("custom-{slug}"),
            label,
            value: ChallengeValue::Flag(true),
            is_custom: true,
        }
    }
}

/// The user's answer attached to a challenge.
///
/// Simple obstacles are a flag; obstacles with an input field (stairs) carry
/// a count or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChallengeValue {
    Flag(bool),
    Count(u32),
    Text(String),
}

impl ChallengeValue {
    /// Number of flights represented by this value.
    ///
    /// Leading digits of text are honoured (`"3 flights"` is 3). Anything
    /// that does not yield a positive count is treated as a single flight.
    pub fn flights(&self) -> u32 {
        let parsed = match self {
            Self::Count(count) => Some(*count),
            Self::Text(text) => {
                let digits: String = text
                    .trim()
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                digits.parse().ok()
            }
            Self::Flag(_) => None,
        };
        parsed.filter(|count| *count > 0).unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn flights_reads_counts_and_leading_digits() {
        assert_eq!(ChallengeValue::Count(3).flights(), 3);
        assert_eq!(ChallengeValue::Text("3".to_string()).flights(), 3);
        assert_eq!(ChallengeValue::Text(" 2 flights".to_string()).flights(), 2);
    }

    #[test]
    fn flights_defaults_to_one() {
        assert_eq!(ChallengeValue::Flag(true).flights(), 1);
        assert_eq!(ChallengeValue::Count(0).flights(), 1);
        assert_eq!(ChallengeValue::Text("several".to_string()).flights(), 1);
        assert_eq!(ChallengeValue::Text(String::new()).flights(), 1);
    }

    #[test]
    fn custom_challenge_derives_stable_id() {
        let challenge = Challenge::custom("Gravel Driveway");

        assert_eq!(challenge.id, "custom-gravel-driveway");
        assert!(challenge.is_custom);
        assert_eq!(challenge.value, ChallengeValue::Flag(true));
    }

    #[test]
    fn value_deserializes_untagged() {
        let flag: ChallengeValue = serde_json::from_str("true").unwrap();
        let count: ChallengeValue = serde_json::from_str("4").unwrap();
        let text: ChallengeValue = serde_json::from_str("\"4\"").unwrap();

        assert_eq!(flag, ChallengeValue::Flag(true));
        assert_eq!(count, ChallengeValue::Count(4));
        assert_eq!(text, ChallengeValue::Text("4".to_string()));
    }
}
