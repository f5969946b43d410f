#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("assessment_type_id is required")]
    MissingAssessmentType,
    #[error("Invalid assessment_type_id")]
    InvalidAssessmentType(String),
    #[error("Organization ID is required")]
    MissingOrganization,
    #[error("Invalid org_id")]
    InvalidOrganization(String),
    #[error("Assessment type name is required")]
    MissingName,
    #[error("question {question_id} has invalid correct answer {value:?}")]
    InvalidCorrectAnswer { question_id: i64, value: String },
    #[error("{0}")]
    InvalidPolicy(String),
    // Froms
    #[error("{0}")]
    Repository(#[from] question_bank::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Errors caused by caller input, detected before the question bank is queried.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingAssessmentType
                | Error::InvalidAssessmentType(_)
                | Error::MissingOrganization
                | Error::InvalidOrganization(_)
                | Error::MissingName
        )
    }
}
