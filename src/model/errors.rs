use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use derive_more::Display;
use log::error;
use serde::Serialize;
use tokio_postgres::error::SqlState;

#[derive(Debug, Display, PartialEq)]
pub enum ResError {
    #[display(fmt = "{}", _0)]
    BadRequest(String),
    #[display(fmt = "Unauthorized")]
    Unauthorized,
    #[display(fmt = "{}", _0)]
    Forbidden(&'static str),
    #[display(fmt = "{}", _0)]
    NotFound(&'static str),
    #[display(fmt = "{}", _0)]
    Conflict(&'static str),
    #[display(fmt = "Internal server error")]
    Internal,
}

impl ResponseError for ResError {
    fn status_code(&self) -> StatusCode {
        match self {
            ResError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ResError::Unauthorized => StatusCode::UNAUTHORIZED,
            ResError::Forbidden(_) => StatusCode::FORBIDDEN,
            ResError::NotFound(_) => StatusCode::NOT_FOUND,
            ResError::Conflict(_) => StatusCode::CONFLICT,
            ResError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorMessage::new(&self.to_string()))
    }
}

impl From<tokio_postgres::Error> for ResError {
    fn from(e: tokio_postgres::Error) -> ResError {
        if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
            return ResError::Conflict("Duplicate entry");
        }
        error!("database error: {}", e);
        ResError::Internal
    }
}

impl From<deadpool_postgres::PoolError> for ResError {
    fn from(e: deadpool_postgres::PoolError) -> ResError {
        error!("connection pool error: {}", e);
        ResError::Internal
    }
}

#[derive(Serialize)]
struct ErrorMessage<'a> {
    error: &'a str,
}

impl<'a> ErrorMessage<'a> {
    fn new(msg: &'a str) -> Self {
        ErrorMessage { error: msg }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ResError::BadRequest("bad".to_owned()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ResError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ResError::Forbidden("no").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ResError::NotFound("gone").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ResError::Conflict("dup").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ResError::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_stay_generic_for_upstream_failures() {
        assert_eq!(ResError::Internal.to_string(), "Internal server error");
        assert_eq!(ResError::NotFound("Topic not found").to_string(), "Topic not found");
    }
}
