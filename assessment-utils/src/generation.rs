use question_bank::{QuestionRepository, QuestionRow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::Error,
    misc::{FormattedQuestion, format_questions, shuffle_questions},
    policy::{ADAPTIVE_PER_STRATUM, AssemblyPolicy, Mode},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestionSetResult {
    pub questions: Vec<FormattedQuestion>,
    #[serde(rename = "testType")]
    pub test_type: Mode,
    #[serde(rename = "totalQuestions")]
    pub total_questions: usize,
}

/// Builds question sets from a question bank under an assembly policy.
///
/// Holds no state between calls. Each call queries the repository once.
#[derive(Debug)]
pub struct Assembler<'a, R> {
    repository: &'a R,
    policy: &'a AssemblyPolicy,
}

impl<'a, R> Assembler<'a, R>
where
    R: QuestionRepository,
{
    pub fn new(repository: &'a R, policy: &'a AssemblyPolicy) -> Self {
        Self { repository, policy }
    }

    /// Selects, shuffles and formats a question set.
    ///
    /// The returned `testType` is the requested mode, even when an adaptive request falls back
    /// to the standard draw. An empty question bank yields an empty set.
    #[tracing::instrument(skip(self), err(Debug))]
    pub async fn assemble(
        &self,
        assessment_type_id: i64,
        mode: Mode,
    ) -> Result<QuestionSetResult, Error> {
        let rows = self.select(assessment_type_id, mode).await?;
        let rows = shuffle_questions(rows);
        let questions = format_questions(&rows, mode);

        debug!(total_questions = questions.len(), "assembled question set");
        Ok(QuestionSetResult {
            total_questions: questions.len(),
            questions,
            test_type: mode,
        })
    }

    /// Draws the rows for a question set, before the final shuffle.
    ///
    /// - standard: up to `standard_limit` random eligible questions
    /// - adaptive: one random eligible question per stratum, for assessment types listed in
    ///   the policy. Other types get the standard draw.
    pub async fn select(
        &self,
        assessment_type_id: i64,
        mode: Mode,
    ) -> Result<Vec<QuestionRow>, Error> {
        if mode == Mode::Adaptive {
            if let Some(strata) = self.policy.strata_for(assessment_type_id) {
                let rows = self
                    .repository
                    .sample_stratified(assessment_type_id, strata, ADAPTIVE_PER_STRATUM)
                    .await?;
                return Ok(rows);
            }
            debug!(
                assessment_type_id,
                "assessment type not eligible for adaptive sets, using standard draw"
            );
        }

        let rows = self
            .repository
            .sample_questions(assessment_type_id, self.policy.standard_limit)
            .await?;
        Ok(rows)
    }
}
