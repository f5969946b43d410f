#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Unavailable(String),
    // Froms
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}
