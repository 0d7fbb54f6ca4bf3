//! Problem model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Problem database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Problem {
    pub id: Uuid,
    pub title: String,
    pub difficulty: String,
    pub tags: Vec<String>,
    pub description: Option<String>,
    #[serde(skip_serializing)]
    pub reference_solution: Option<String>,
    #[serde(skip)]
    pub embedding: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

impl Problem {
    /// Parsed difficulty; unknown values rank as easy
    pub fn difficulty_level(&self) -> Difficulty {
        Difficulty::parse(&self.difficulty).unwrap_or(Difficulty::Easy)
    }

    /// Whether the problem carries a tag (case-insensitive, whitespace-trimmed)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.trim().eq_ignore_ascii_case(tag))
    }

    /// Tags joined for display and prompts
    pub fn tags_display(&self) -> String {
        self.tags.join(", ")
    }

    /// Text fed to the embedding model
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.tags.join(","),
            self.description.as_deref().unwrap_or_default()
        )
    }
}

/// Problem difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse difficulty from its stored string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    /// Ordinal used as a model feature
    pub fn ordinal(&self) -> f64 {
        match self {
            Self::Easy => 0.0,
            Self::Medium => 1.0,
            Self::Hard => 2.0,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::parse("easy"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse(" Medium "), Some(Difficulty::Medium));
        assert_eq!(Difficulty::parse("hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("expert"), None);
    }

    #[test]
    fn test_unknown_difficulty_ranks_as_easy() {
        let p = fixtures::problem("Two Sum", "legendary", &["array"]);
        assert_eq!(p.difficulty_level(), Difficulty::Easy);
        assert_eq!(p.difficulty_level().ordinal(), 0.0);
    }

    #[test]
    fn test_has_tag_ignores_case_and_padding() {
        let p = fixtures::problem("Paths", "medium", &[" Graph", "dp "]);
        assert!(p.has_tag("graph"));
        assert!(p.has_tag("dp"));
        assert!(!p.has_tag("greedy"));
    }

    #[test]
    fn test_embedding_text() {
        let mut p = fixtures::problem("Paths", "medium", &["graph", "dp"]);
        p.description = Some("Count paths".to_string());
        assert_eq!(p.embedding_text(), "Paths graph,dp Count paths");
    }
}
