use futures_util::TryStreamExt;
use sqlx::{
    PgPool, Postgres, QueryBuilder,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use tracing::instrument;

use crate::{
    AssessmentType, AssessmentTypeSummary, NewAssessmentType, QuestionRow, Stratum, error::Error,
    repository::QuestionRepository,
};

const QUESTION_SELECT_FIELDS: &str = "
  SELECT qb.id::int8 AS id, qb.assessment_type_id::int8 AS assessment_type_id,
    qb.question, qb.option_a, qb.option_b, qb.option_c, qb.option_d, qb.correct_answer,
    t.name AS topic, s.id::int8 AS section_id, s.name AS section, l.name AS level,
    t.weightage::float8 AS topic_weightage, l.weightage::float8 AS level_weightage,
    qb.video_url
";

const QUESTION_JOINS: &str = "
  FROM question_bank qb
  JOIN topic t ON qb.topic_id = t.id
  JOIN section s ON t.section_id = s.id
  JOIN level l ON qb.level_id = l.id
";

const ACTIVE_FILTER: &str = "
  AND qb.is_active = TRUE
  AND t.is_active = TRUE
  AND s.is_active = TRUE
  AND l.is_active = TRUE
";

const LIST_ASSESSMENT_TYPES: &str = "
  SELECT DISTINCT at.id::int8 AS id, at.name, at.description
  FROM assessment_type at
  INNER JOIN question_bank qb ON qb.assessment_type_id = at.id
  WHERE at.is_active = TRUE
  ORDER BY at.name ASC
";

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub max_connections: u32,
    /// Require TLS without certificate verification. Otherwise TLS is disabled.
    pub require_tls: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            require_tls: false,
        }
    }
}

pub async fn client(uri: &str, options: &ClientOptions) -> Result<PgPool, sqlx::Error> {
    let ssl_mode = if options.require_tls {
        PgSslMode::Require
    } else {
        PgSslMode::Disable
    };
    let connect_options = uri
        .parse::<PgConnectOptions>()?
        .application_name(env!("CARGO_CRATE_NAME"))
        .ssl_mode(ssl_mode);

    let pool = PgPoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(connect_options)
        .await?;

    // Ping the server to see if you can connect to the database
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

/// Question bank backed by PostgreSQL.
///
/// Each operation holds one pooled connection for its duration. The connection goes back to
/// the pool when it is dropped, whether the query succeeded or not.
#[derive(Clone, Debug)]
pub struct PgQuestionBank {
    pool: PgPool,
}

impl PgQuestionBank {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn eligible_questions(assessment_type_id: i64) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(QUESTION_SELECT_FIELDS);
    builder
        .push(QUESTION_JOINS)
        .push(" WHERE qb.assessment_type_id = ")
        .push_bind(assessment_type_id)
        .push(ACTIVE_FILTER);
    builder
}

fn sampled_questions(assessment_type_id: i64, limit: usize) -> QueryBuilder<'static, Postgres> {
    let mut builder = eligible_questions(assessment_type_id);
    builder
        .push(" ORDER BY RANDOM() LIMIT ")
        .push_bind(limit as i64);
    builder
}

/// One parenthesised draw per stratum, joined with `UNION ALL`. `strata` must not be empty.
fn stratified_questions(
    assessment_type_id: i64,
    strata: &[Stratum],
    per_stratum: usize,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("");
    for (i, stratum) in strata.iter().enumerate() {
        if i > 0 {
            builder.push(" UNION ALL ");
        }
        builder
            .push("(")
            .push(QUESTION_SELECT_FIELDS)
            .push(QUESTION_JOINS)
            .push(" WHERE qb.assessment_type_id = ")
            .push_bind(assessment_type_id)
            .push(" AND s.id = ")
            .push_bind(stratum.section_id)
            .push(" AND l.name = ")
            .push_bind(stratum.level.clone())
            .push(ACTIVE_FILTER)
            .push(" ORDER BY RANDOM() LIMIT ")
            .push_bind(per_stratum as i64)
            .push(")");
    }
    builder
}

impl QuestionRepository for PgQuestionBank {
    #[instrument(skip(self), err(Debug))]
    async fn sample_questions(
        &self,
        assessment_type_id: i64,
        limit: usize,
    ) -> Result<Vec<QuestionRow>, Error> {
        let mut builder = sampled_questions(assessment_type_id, limit);
        let mut conn = self.pool.acquire().await?;
        let rows = builder
            .build_query_as::<QuestionRow>()
            .fetch_all(&mut *conn)
            .await?;

        tracing::debug!(rows = rows.len(), "sampled questions");
        Ok(rows)
    }

    #[instrument(skip(self, strata), fields(strata = strata.len()), err(Debug))]
    async fn sample_stratified(
        &self,
        assessment_type_id: i64,
        strata: &[Stratum],
        per_stratum: usize,
    ) -> Result<Vec<QuestionRow>, Error> {
        if strata.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = stratified_questions(assessment_type_id, strata, per_stratum);
        let mut conn = self.pool.acquire().await?;
        let rows = builder
            .build_query_as::<QuestionRow>()
            .fetch_all(&mut *conn)
            .await?;

        tracing::debug!(rows = rows.len(), "sampled stratified questions");
        Ok(rows)
    }

    #[instrument(skip(self), err(Debug))]
    async fn list_assessment_types(&self) -> Result<Vec<AssessmentTypeSummary>, Error> {
        let mut conn = self.pool.acquire().await?;
        let assessment_types: Vec<AssessmentTypeSummary> =
            sqlx::query_as::<_, AssessmentTypeSummary>(LIST_ASSESSMENT_TYPES)
                .fetch(&mut *conn)
                .try_collect()
                .await?;

        Ok(assessment_types)
    }

    #[instrument(skip_all, fields(name = %new_assessment_type.name), err(Debug))]
    async fn create_assessment_type(
        &self,
        new_assessment_type: &NewAssessmentType,
    ) -> Result<AssessmentType, Error> {
        let mut conn = self.pool.acquire().await?;
        let assessment_type = sqlx::query_as::<_, AssessmentType>(
            "
            INSERT INTO assessment_type (name, description, key_area_id, is_active, create_date)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id::int8 AS id, name, description, key_area_id::int8 AS key_area_id,
              is_active, create_date::timestamptz AS create_date
            ",
        )
        .bind(&new_assessment_type.name)
        .bind(&new_assessment_type.description)
        .bind(new_assessment_type.key_area_id)
        .bind(new_assessment_type.is_active)
        .fetch_one(&mut *conn)
        .await?;

        tracing::info!(id = assessment_type.id, "created assessment type");
        Ok(assessment_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_active_filter(sql: &str, expected: usize) {
        for column in ["qb", "t", "s", "l"] {
            let filter = format!("{column}.is_active = TRUE");
            assert_eq!(sql.matches(&filter).count(), expected, "{filter}");
        }
    }

    #[test]
    fn sampled_questions_filters_every_parent_and_limits() {
        let builder = sampled_questions(7, 18);
        let sql = builder.sql();

        assert!(sql.contains("WHERE qb.assessment_type_id = $1"));
        assert_active_filter(sql, 1);
        assert!(sql.trim_end().ends_with("ORDER BY RANDOM() LIMIT $2"));
        assert!(sql.contains("JOIN topic t ON qb.topic_id = t.id"));
        assert!(sql.contains("JOIN section s ON t.section_id = s.id"));
        assert!(sql.contains("JOIN level l ON qb.level_id = l.id"));
    }

    #[test]
    fn stratified_questions_draws_once_per_stratum() {
        let strata = [
            Stratum::new(1, "Beginner"),
            Stratum::new(1, "Advanced"),
            Stratum::new(2, "Intermediate"),
        ];
        let builder = stratified_questions(7, &strata, 1);
        let sql = builder.sql();

        assert_eq!(sql.matches(" UNION ALL ").count(), 2);
        assert_eq!(sql.matches("ORDER BY RANDOM() LIMIT").count(), 3);
        assert_active_filter(sql, 3);
        assert!(sql.starts_with('('));
        assert!(sql.ends_with(')'));
        // Four binds per stratum: type id, section, level, limit.
        assert!(sql.contains("AND s.id = $2"));
        assert!(sql.contains("AND l.name = $3"));
        assert!(sql.contains("LIMIT $12)"));
        assert!(!sql.contains("$13"));
    }

    #[test]
    fn single_stratum_has_no_union() {
        let builder = stratified_questions(3, &[Stratum::new(4, "Beginner")], 1);
        assert!(!builder.sql().contains("UNION ALL"));
    }

    #[test]
    fn directory_lists_distinct_active_types_with_questions_by_name() {
        let sql = LIST_ASSESSMENT_TYPES;
        assert!(sql.contains("SELECT DISTINCT"));
        assert!(sql.contains("INNER JOIN question_bank qb ON qb.assessment_type_id = at.id"));
        assert!(sql.contains("WHERE at.is_active = TRUE"));
        assert!(sql.trim_end().ends_with("ORDER BY at.name ASC"));
    }
}
