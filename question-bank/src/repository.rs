use std::future::Future;

use crate::{
    AssessmentType, AssessmentTypeSummary, NewAssessmentType, QuestionRow, Stratum, error::Error,
};

/// Query interface over the question bank.
///
/// Every sampling operation only returns eligible questions: the question, its topic, the
/// topic's section and the question's level are all active, and the question belongs to the
/// requested assessment type. Sampling order is random and not reproducible.
pub trait QuestionRepository: Send + Sync {
    /// Up to `limit` eligible questions for the assessment type, in random order.
    fn sample_questions(
        &self,
        assessment_type_id: i64,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<QuestionRow>, Error>> + Send;

    /// For each stratum, up to `per_stratum` eligible questions of that stratum.
    ///
    /// Results are concatenated in the order of `strata`. An empty stratum contributes nothing.
    fn sample_stratified(
        &self,
        assessment_type_id: i64,
        strata: &[Stratum],
        per_stratum: usize,
    ) -> impl Future<Output = Result<Vec<QuestionRow>, Error>> + Send;

    /// Active assessment types with at least one question, ordered by name.
    fn list_assessment_types(
        &self,
    ) -> impl Future<Output = Result<Vec<AssessmentTypeSummary>, Error>> + Send;

    fn create_assessment_type(
        &self,
        new_assessment_type: &NewAssessmentType,
    ) -> impl Future<Output = Result<AssessmentType, Error>> + Send;
}
