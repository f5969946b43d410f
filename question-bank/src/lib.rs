//! Question Bank
//!
//! Read model of the relational question bank: assessment types, the section/topic/level
//! catalog, and the questions scoped by them.
//!
//! ## Current API
//!
//! - Sample eligible questions for an assessment type
//! - Sample eligible questions per (section, level) stratum
//! - List and create assessment types
//!
pub mod db;
pub mod error;
#[cfg(feature = "memory")]
pub mod memory;
pub mod repository;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use error::Error;
pub use repository::QuestionRepository;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssessmentType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub key_area_id: Option<i64>,
    pub is_active: bool,
    pub create_date: DateTime<Utc>,
}

/// Row returned by the assessment type directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssessmentTypeSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewAssessmentType {
    pub name: String,
    pub description: Option<String>,
    pub key_area_id: Option<i64>,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub section_id: i64,
    pub name: String,
    pub weightage: Option<f64>,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Level {
    pub id: i64,
    pub name: String,
    pub weightage: Option<f64>,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub assessment_type_id: i64,
    pub topic_id: i64,
    pub level_id: i64,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    /// Letter of the correct option, `A` through `D`.
    pub correct_answer: String,
    pub video_url: Option<String>,
    pub is_active: bool,
}

/// A question joined with its topic, section and level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub assessment_type_id: i64,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub topic: String,
    pub section_id: i64,
    pub section: String,
    pub level: String,
    pub topic_weightage: Option<f64>,
    pub level_weightage: Option<f64>,
    pub video_url: Option<String>,
}

/// A (section, level) bucket used for stratified sampling.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stratum {
    pub section_id: i64,
    pub level: String,
}

impl Stratum {
    pub fn new(section_id: i64, level: impl Into<String>) -> Self {
        Self {
            section_id,
            level: level.into(),
        }
    }

    pub fn contains(&self, row: &QuestionRow) -> bool {
        row.section_id == self.section_id && row.level == self.level
    }
}
