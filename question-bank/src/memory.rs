//! In-memory question bank.
//!
//! Applies the same eligibility and ordering rules as [`crate::db::PgQuestionBank`]. Used in
//! tests, where it also records how often it was queried and can be made to fail.
use std::sync::{
    Arc, RwLock,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use chrono::Utc;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::{
    AssessmentType, AssessmentTypeSummary, Level, NewAssessmentType, Question, QuestionRow,
    Section, Stratum, Topic, error::Error, repository::QuestionRepository,
};

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub assessment_types: Vec<AssessmentType>,
    pub sections: Vec<Section>,
    pub topics: Vec<Topic>,
    pub levels: Vec<Level>,
    pub questions: Vec<Question>,
}

impl Catalog {
    /// Joined rows for every eligible question of the assessment type.
    pub fn eligible(&self, assessment_type_id: i64) -> Vec<QuestionRow> {
        self.questions
            .iter()
            .filter(|q| q.is_active && q.assessment_type_id == assessment_type_id)
            .filter_map(|q| {
                let topic = self
                    .topics
                    .iter()
                    .find(|t| t.id == q.topic_id && t.is_active)?;
                let section = self
                    .sections
                    .iter()
                    .find(|s| s.id == topic.section_id && s.is_active)?;
                let level = self
                    .levels
                    .iter()
                    .find(|l| l.id == q.level_id && l.is_active)?;

                Some(QuestionRow {
                    id: q.id,
                    assessment_type_id: q.assessment_type_id,
                    question: q.question.clone(),
                    option_a: q.option_a.clone(),
                    option_b: q.option_b.clone(),
                    option_c: q.option_c.clone(),
                    option_d: q.option_d.clone(),
                    correct_answer: q.correct_answer.clone(),
                    topic: topic.name.clone(),
                    section_id: section.id,
                    section: section.name.clone(),
                    level: level.name.clone(),
                    topic_weightage: topic.weightage,
                    level_weightage: level.weightage,
                    video_url: q.video_url.clone(),
                })
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryQuestionBank {
    catalog: Arc<RwLock<Catalog>>,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MemoryQuestionBank {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            ..Default::default()
        }
    }

    /// Number of repository operations attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// When set, every operation fails with [`Error::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn catalog(&self) -> Catalog {
        self.read().clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Unavailable("question bank unavailable".to_string()));
        }
        Ok(())
    }
}

fn draw(rows: Vec<QuestionRow>, amount: usize) -> Vec<QuestionRow> {
    let mut rng = rand::rng();
    let mut drawn: Vec<QuestionRow> = rows.choose_multiple(&mut rng, amount).cloned().collect();
    drawn.shuffle(&mut rng);
    drawn
}

impl QuestionRepository for MemoryQuestionBank {
    async fn sample_questions(
        &self,
        assessment_type_id: i64,
        limit: usize,
    ) -> Result<Vec<QuestionRow>, Error> {
        self.begin()?;
        let eligible = self.read().eligible(assessment_type_id);
        Ok(draw(eligible, limit))
    }

    async fn sample_stratified(
        &self,
        assessment_type_id: i64,
        strata: &[Stratum],
        per_stratum: usize,
    ) -> Result<Vec<QuestionRow>, Error> {
        self.begin()?;
        let eligible = self.read().eligible(assessment_type_id);
        let rows = strata
            .iter()
            .flat_map(|stratum| {
                let bucket: Vec<QuestionRow> = eligible
                    .iter()
                    .filter(|row| stratum.contains(row))
                    .cloned()
                    .collect();
                draw(bucket, per_stratum)
            })
            .collect();
        Ok(rows)
    }

    async fn list_assessment_types(&self) -> Result<Vec<AssessmentTypeSummary>, Error> {
        self.begin()?;
        let catalog = self.read();
        let mut assessment_types: Vec<AssessmentTypeSummary> = catalog
            .assessment_types
            .iter()
            .filter(|at| at.is_active)
            .filter(|at| {
                catalog
                    .questions
                    .iter()
                    .any(|q| q.assessment_type_id == at.id)
            })
            .map(|at| AssessmentTypeSummary {
                id: at.id,
                name: at.name.clone(),
                description: at.description.clone(),
            })
            .collect();
        assessment_types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(assessment_types)
    }

    async fn create_assessment_type(
        &self,
        new_assessment_type: &NewAssessmentType,
    ) -> Result<AssessmentType, Error> {
        self.begin()?;
        let mut catalog = self
            .catalog
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = catalog
            .assessment_types
            .iter()
            .map(|at| at.id)
            .max()
            .unwrap_or(0)
            + 1;
        let assessment_type = AssessmentType {
            id,
            name: new_assessment_type.name.clone(),
            description: new_assessment_type.description.clone(),
            key_area_id: new_assessment_type.key_area_id,
            is_active: new_assessment_type.is_active,
            create_date: Utc::now(),
        };
        catalog.assessment_types.push(assessment_type.clone());
        Ok(assessment_type)
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;

    fn question(id: i64, assessment_type_id: i64, topic_id: i64, level_id: i64) -> Question {
        Question {
            id,
            assessment_type_id,
            topic_id,
            level_id,
            question: format!("Question {id}"),
            option_a: "a".to_string(),
            option_b: "b".to_string(),
            option_c: "c".to_string(),
            option_d: "d".to_string(),
            correct_answer: "A".to_string(),
            video_url: None,
            is_active: true,
        }
    }

    fn assessment_type(id: i64, name: &str, is_active: bool) -> AssessmentType {
        AssessmentType {
            id,
            name: name.to_string(),
            description: None,
            key_area_id: None,
            is_active,
            create_date: Utc::now(),
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            assessment_types: vec![
                assessment_type(1, "Nursing", true),
                assessment_type(2, "General", true),
                assessment_type(3, "Empty", true),
                assessment_type(4, "Archived", false),
            ],
            sections: vec![
                Section {
                    id: 1,
                    name: "Foundational".to_string(),
                    is_active: true,
                },
                Section {
                    id: 2,
                    name: "Industrial".to_string(),
                    is_active: false,
                },
            ],
            topics: vec![
                Topic {
                    id: 10,
                    section_id: 1,
                    name: "Anatomy".to_string(),
                    weightage: Some(2.0),
                    is_active: true,
                },
                Topic {
                    id: 11,
                    section_id: 1,
                    name: "Retired".to_string(),
                    weightage: None,
                    is_active: false,
                },
                Topic {
                    id: 20,
                    section_id: 2,
                    name: "Safety".to_string(),
                    weightage: Some(1.0),
                    is_active: true,
                },
            ],
            levels: vec![
                Level {
                    id: 1,
                    name: "Basic".to_string(),
                    weightage: Some(1.0),
                    is_active: true,
                },
                Level {
                    id: 2,
                    name: "Advanced".to_string(),
                    weightage: Some(3.0),
                    is_active: false,
                },
            ],
            questions: vec![
                question(100, 1, 10, 1),
                question(101, 1, 11, 1),
                question(102, 1, 20, 1),
                question(103, 1, 10, 2),
                Question {
                    is_active: false,
                    ..question(104, 1, 10, 1)
                },
                question(105, 2, 10, 1),
                question(106, 4, 10, 1),
            ],
        }
    }

    #[test]
    fn eligible_requires_every_parent_active() {
        let rows = catalog().eligible(1);
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![100]);
        assert_eq!(rows[0].section, "Foundational");
        assert_eq!(rows[0].topic_weightage, Some(2.0));
    }

    #[tokio::test]
    async fn sample_questions_respects_limit() {
        let bank = MemoryQuestionBank::new(Catalog {
            questions: (0..10).map(|i| question(i, 1, 10, 1)).collect(),
            ..catalog()
        });
        let rows = bank.sample_questions(1, 4).await.unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(bank.calls(), 1);
    }

    #[tokio::test]
    async fn list_assessment_types_skips_inactive_and_empty() {
        let bank = MemoryQuestionBank::new(catalog());
        let names: Vec<String> = bank
            .list_assessment_types()
            .await
            .unwrap()
            .into_iter()
            .map(|at| at.name)
            .collect();
        assert_eq!(names, vec!["General".to_string(), "Nursing".to_string()]);
    }

    #[tokio::test]
    async fn failing_bank_reports_unavailable() {
        let bank = MemoryQuestionBank::new(catalog());
        bank.set_failing(true);
        let err = bank.sample_questions(1, 18).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
    }

    #[tokio::test]
    async fn created_assessment_type_gets_next_id() {
        let bank = MemoryQuestionBank::new(catalog());
        let created = bank
            .create_assessment_type(&NewAssessmentType {
                name: "Pharmacy".to_string(),
                description: Some("Dispensing".to_string()),
                key_area_id: Some(7),
                is_active: true,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 5);
        assert_eq!(created.key_area_id, Some(7));
        assert_eq!(bank.catalog().assessment_types.len(), 5);
    }
}
