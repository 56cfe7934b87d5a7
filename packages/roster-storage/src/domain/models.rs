//! Roster domain models
//!
//! Immutable reference data: loaded once, read by every evaluation, never mutated.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Enrollee identifier
pub type Uid = String;

/// Contest identifier
pub type ContestId = i64;

/// Enrollee gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }

    /// Parse a stored gender tag; anything unrecognized is `Unknown`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// A tracked individual with one aggregate score and an enrollment year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollee {
    pub uid: Uid,
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    pub enrollment_year: i32,
    pub aggregate_score: f64,
    #[serde(default)]
    pub secondary_score: f64,
    #[serde(default)]
    pub secondary_level: String,
}

impl Enrollee {
    /// Create an enrollee with the fields the filter engine reads
    ///
    /// Secondary score/level default to zero/empty; gender to `Unknown`.
    pub fn new(
        uid: impl Into<Uid>,
        name: impl Into<String>,
        enrollment_year: i32,
        aggregate_score: f64,
    ) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            gender: Gender::Unknown,
            enrollment_year,
            aggregate_score,
            secondary_score: 0.0,
            secondary_level: String::new(),
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_secondary(mut self, score: f64, level: impl Into<String>) -> Self {
        self.secondary_score = score;
        self.secondary_level = level.into();
        self
    }
}

/// A contest edition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contest {
    pub id: ContestId,
    pub year: i32,
    #[serde(rename = "type")]
    pub contest_type: String,
}

impl Contest {
    pub fn new(id: ContestId, year: i32, contest_type: impl Into<String>) -> Self {
        Self {
            id,
            year,
            contest_type: contest_type.into(),
        }
    }
}

/// One participation result linking an enrollee to a contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestRecord {
    pub uid: Uid,
    pub contest_id: ContestId,
    pub score: f64,
    pub rank: i64,
    pub province: String,
    pub level: String,
}

impl ContestRecord {
    pub fn new(
        uid: impl Into<Uid>,
        contest_id: ContestId,
        score: f64,
        rank: i64,
        province: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            contest_id,
            score,
            rank,
            province: province.into(),
            level: level.into(),
        }
    }
}

/// Complete reference dataset handed over by the loader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub enrollees: Vec<Enrollee>,
    #[serde(default)]
    pub contests: Vec<Contest>,
    #[serde(default)]
    pub records: Vec<ContestRecord>,
}

impl Dataset {
    /// Decode a JSON dataset document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn contest(&self, id: ContestId) -> Option<&Contest> {
        self.contests.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_enrollee_builder() {
        let e = Enrollee::new("uid1", "Ada", 2020, 90.0)
            .with_gender(Gender::Female)
            .with_secondary(71.5, "A");

        assert_eq!(e.uid, "uid1");
        assert_eq!(e.gender, Gender::Female);
        assert_eq!(e.secondary_level, "A");
    }

    #[test]
    fn test_gender_tags() {
        for g in [Gender::Male, Gender::Female, Gender::Unknown] {
            assert_eq!(Gender::from_tag(g.as_str()), g);
        }
        assert_eq!(Gender::from_tag("?"), Gender::Unknown);
    }

    #[test]
    fn test_dataset_from_json() {
        let json = r#"{
            "enrollees": [
                {"uid": "uid1", "name": "Ada", "gender": "female",
                 "enrollment_year": 2020, "aggregate_score": 90.0}
            ],
            "contests": [{"id": 1, "year": 2023, "type": "NOIP"}],
            "records": [
                {"uid": "uid1", "contest_id": 1, "score": 300.0, "rank": 4,
                 "province": "ZJ", "level": "gold"}
            ]
        }"#;

        let dataset = Dataset::from_json_str(json).unwrap();
        assert_eq!(dataset.enrollees.len(), 1);
        assert_eq!(dataset.enrollees[0].gender, Gender::Female);
        assert_eq!(dataset.enrollees[0].secondary_score, 0.0);
        assert_eq!(dataset.contest(1).unwrap().contest_type, "NOIP");
        assert!(dataset.contest(2).is_none());
    }

    #[test]
    fn test_dataset_bad_json() {
        let err = Dataset::from_json_str("[1, 2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
    }
}
