use actix_web::{http::header::ContentType, http::StatusCode, HttpResponse, HttpResponseBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemmitError {
    #[error("data store disconnected")]
    InternalError,
    #[error("Invalid data provided: Error message: `{0}`")]
    BadClientData(String),
    #[error("There was a conflict with the request. Error message: `{0}`")]
    Conflict(String),
    #[error("404 Not found. Error message: `{0}`")]
    NotFound(String),
}

impl actix_web::error::ResponseError for RemmitError {
    fn error_response(&self) -> HttpResponse {
        HttpResponseBuilder::new(self.status_code())
            .insert_header(ContentType::html())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            RemmitError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            RemmitError::BadClientData(_) => StatusCode::BAD_REQUEST,
            RemmitError::Conflict(_) => StatusCode::CONFLICT,
            RemmitError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}
