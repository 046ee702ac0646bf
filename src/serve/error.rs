use crate::batch::BatchError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use maplit::hashmap;
use thiserror::Error;

pub trait IntoHttpError<T>: Sized {
    fn map_http_error(self, code: StatusCode) -> Result<T, HttpError>;

    fn map_500(self) -> Result<T, HttpError> {
        self.map_http_error(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<T, E: std::fmt::Display> IntoHttpError<T> for Result<T, E> {
    fn map_http_error(self, code: StatusCode) -> Result<T, HttpError> {
        self.map_err(|e| HttpError::new(code, format!("{:#}", e)))
    }
}

#[derive(Error, Debug)]
#[error("{message}")]
pub struct HttpError {
    code: StatusCode,
    message: String,
}

impl HttpError {
    /// Client errors are only worth a warning, everything else is logged as
    /// an error.
    pub fn new(code: StatusCode, message: String) -> Self {
        if code.is_server_error() {
            log::error!("error in response ({}): {}", code.as_u16(), message);
        } else {
            log::warn!("error in response ({}): {}", code.as_u16(), message);
        }
        Self { code, message }
    }
}

impl From<BatchError> for HttpError {
    fn from(e: BatchError) -> Self {
        let code = match &e {
            BatchError::Scrape(s) if s.is_client_error() => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        HttpError::new(code, e.to_string())
    }
}

impl ResponseError for HttpError {
    fn status_code(&self) -> StatusCode {
        self.code
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.code).json(hashmap! { "error" => &self.message })
    }
}
