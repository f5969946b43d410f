use question_bank::QuestionRow;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{error::Error, policy::Mode};

/// Letter of the correct option as stored in the question bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrectAnswer {
    A,
    B,
    C,
    D,
}

impl CorrectAnswer {
    pub fn parse(letter: &str) -> Option<Self> {
        match letter.trim() {
            "A" | "a" => Some(CorrectAnswer::A),
            "B" | "b" => Some(CorrectAnswer::B),
            "C" | "c" => Some(CorrectAnswer::C),
            "D" | "d" => Some(CorrectAnswer::D),
            _ => None,
        }
    }

    /// Zero-based position in `[A, B, C, D]`.
    pub fn index(self) -> usize {
        match self {
            CorrectAnswer::A => 0,
            CorrectAnswer::B => 1,
            CorrectAnswer::C => 2,
            CorrectAnswer::D => 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormattedQuestion {
    pub id: String,
    pub topic: String,
    pub section: String,
    pub level: String,
    pub question: String,
    pub options: [String; 4],
    #[serde(rename = "correctAnswer")]
    pub correct_answer: usize,
    #[serde(rename = "topicWeightage")]
    pub topic_weightage: Option<f64>,
    #[serde(rename = "levelWeightage")]
    pub level_weightage: Option<f64>,
    pub video_url: Option<String>,
    #[serde(rename = "testType")]
    pub test_type: Mode,
}

/// Formats a question bank row for delivery.
///
/// Deterministic: options always come in `[A, B, C, D]` order.
pub fn format_question(row: &QuestionRow, mode: Mode) -> Result<FormattedQuestion, Error> {
    let correct_answer =
        CorrectAnswer::parse(&row.correct_answer).ok_or_else(|| Error::InvalidCorrectAnswer {
            question_id: row.id,
            value: row.correct_answer.clone(),
        })?;

    Ok(FormattedQuestion {
        id: row.id.to_string(),
        topic: row.topic.clone(),
        section: row.section.clone(),
        level: row.level.clone(),
        question: row.question.clone(),
        options: [
            row.option_a.clone(),
            row.option_b.clone(),
            row.option_c.clone(),
            row.option_d.clone(),
        ],
        correct_answer: correct_answer.index(),
        topic_weightage: row.topic_weightage,
        level_weightage: row.level_weightage,
        video_url: row.video_url.clone(),
        test_type: mode,
    })
}

/// Formats every row, leaving out rows whose correct answer is not `A` to `D`.
pub fn format_questions(rows: &[QuestionRow], mode: Mode) -> Vec<FormattedQuestion> {
    rows.iter()
        .filter_map(|row| match format_question(row, mode) {
            Ok(q) => Some(q),
            Err(e) => {
                warn!(error = %e, "skipping question");
                None
            }
        })
        .collect()
}

/// Uniformly permutes the selected rows.
pub fn shuffle_questions(mut rows: Vec<QuestionRow>) -> Vec<QuestionRow> {
    let mut rng = rand::rng();
    rows.shuffle(&mut rng);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(correct_answer: &str) -> QuestionRow {
        QuestionRow {
            id: 42,
            assessment_type_id: 1,
            question: "Which vessel carries oxygenated blood?".to_string(),
            option_a: "Pulmonary artery".to_string(),
            option_b: "Aorta".to_string(),
            option_c: "Vena cava".to_string(),
            option_d: "Portal vein".to_string(),
            correct_answer: correct_answer.to_string(),
            topic: "Anatomy".to_string(),
            section_id: 1,
            section: "Foundational".to_string(),
            level: "Basic".to_string(),
            topic_weightage: Some(2.5),
            level_weightage: None,
            video_url: Some("https://videos.example/aorta".to_string()),
        }
    }

    #[test]
    fn letters_map_to_option_indexes() {
        for (letter, index) in [("A", 0), ("B", 1), ("C", 2), ("D", 3)] {
            let q = format_question(&row(letter), Mode::Standard).unwrap();
            assert_eq!(q.correct_answer, index);
        }
        assert_eq!(CorrectAnswer::parse(" c"), Some(CorrectAnswer::C));
        assert_eq!(CorrectAnswer::parse("E"), None);
    }

    #[test]
    fn formatting_is_stable() {
        let r = row("B");
        let first = format_question(&r, Mode::Adaptive).unwrap();
        let second = format_question(&r, Mode::Adaptive).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.id, "42");
        assert_eq!(
            first.options,
            ["Pulmonary artery", "Aorta", "Vena cava", "Portal vein"].map(String::from)
        );
        assert_eq!(first.options[first.correct_answer], "Aorta");
        assert_eq!(first.topic_weightage, Some(2.5));
        assert_eq!(first.test_type, Mode::Adaptive);
    }

    #[test]
    fn serialized_fields_use_delivery_names() {
        let q = format_question(&row("D"), Mode::Standard).unwrap();
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["id"], "42");
        assert_eq!(value["correctAnswer"], 3);
        assert_eq!(value["testType"], "standard");
        assert_eq!(value["topicWeightage"], 2.5);
        assert!(value["levelWeightage"].is_null());
        assert_eq!(value["video_url"], "https://videos.example/aorta");
    }

    #[test]
    fn rows_with_unknown_letters_are_left_out() {
        let rows = vec![row("A"), row("Z"), row("C")];
        let formatted = format_questions(&rows, Mode::Standard);
        assert_eq!(formatted.len(), 2);
        assert!(matches!(
            format_question(&row("Z"), Mode::Standard),
            Err(Error::InvalidCorrectAnswer { question_id: 42, .. })
        ));
    }

    #[test]
    fn shuffle_keeps_every_row() {
        let rows: Vec<QuestionRow> = (0..10)
            .map(|id| QuestionRow { id, ..row("A") })
            .collect();
        let mut ids: Vec<i64> = shuffle_questions(rows).into_iter().map(|r| r.id).collect();
        ids.sort();
        assert_eq!(ids, (0..10).collect::<Vec<i64>>());
    }
}
