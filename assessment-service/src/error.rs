use assessment_utils::policy::Mode;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{1}")]
    Client(StatusCode, String),
    #[error("{message}")]
    Server {
        message: String,
        details: Option<String>,
        test_type: Option<Mode>,
    },
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(rename = "testType", skip_serializing_if = "Option::is_none")]
    test_type: Option<Mode>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        let body = match self {
            Error::Client(_, error) => ErrorBody {
                success: false,
                error,
                details: None,
                test_type: None,
            },
            Error::Server {
                message,
                details,
                test_type,
            } => ErrorBody {
                success: false,
                error: message,
                details,
                test_type,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<&Error> for StatusCode {
    fn from(error: &Error) -> Self {
        match error {
            Error::Client(c, _) => *c,
            Error::Server { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<assessment_utils::error::Error> for Error {
    fn from(error: assessment_utils::error::Error) -> Self {
        if error.is_validation() {
            Error::Client(StatusCode::BAD_REQUEST, error.to_string())
        } else {
            tracing::error!(error = ?error, "unhandled assessment error");
            Error::Server {
                message: "Internal server error".to_string(),
                details: None,
                test_type: None,
            }
        }
    }
}
