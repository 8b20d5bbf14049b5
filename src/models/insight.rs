//! Track insight model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Analysis summary attached to a track
///
/// Field names follow the camelCase shape stored in the `insights` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub mood: String,
    /// Score and rationale, e.g. `"8/10 - Strong potential for advertising"`
    pub commercial_viability: String,
    #[serde(default)]
    pub suggested_placements: Vec<String>,
    pub summary: String,
    pub generated_at: DateTime<Utc>,
}

impl Insight {
    /// Score part of the commercial viability rating
    pub fn viability_score(&self) -> &str {
        self.viability_parts().0
    }

    /// Rationale part of the commercial viability rating
    pub fn viability_rationale(&self) -> Option<&str> {
        self.viability_parts().1
    }

    fn viability_parts(&self) -> (&str, Option<&str>) {
        match self.commercial_viability.split_once(" - ") {
            Some((score, rationale)) => (score, Some(rationale)),
            None => (self.commercial_viability.as_str(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insight(viability: &str) -> Insight {
        Insight {
            mood: "Calm".to_string(),
            commercial_viability: viability.to_string(),
            suggested_placements: vec!["Trailers".to_string()],
            summary: "Short".to_string(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_viability_split() {
        let i = insight("8/10 - Strong potential for advertising");
        assert_eq!(i.viability_score(), "8/10");
        assert_eq!(
            i.viability_rationale(),
            Some("Strong potential for advertising")
        );

        let bare = insight("7/10");
        assert_eq!(bare.viability_score(), "7/10");
        assert_eq!(bare.viability_rationale(), None);
    }

    #[test]
    fn test_camel_case_shape() {
        let value = serde_json::to_value(insight("5/10")).unwrap();
        assert!(value.get("commercialViability").is_some());
        assert!(value.get("suggestedPlacements").is_some());
        assert!(value.get("generatedAt").is_some());
    }
}
