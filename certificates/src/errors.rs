use std::sync::{Arc, OnceLock};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Request,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{capture, error_responses, notes::ValidationError, storage};

pub use response::ErrorResponse;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not_found")]
    NotFound(String),

    // validation
    #[error("validation")]
    Validation(#[from] ValidationError),
    #[error("validation")]
    JsonValidation(#[from] JsonRejection),
    #[error("validation")]
    QueryValidation(#[from] QueryRejection),
    #[error("validation")]
    PathValidation(#[from] PathRejection),
    #[error("confirmation_required")]
    ConfirmationRequired,
    #[error("invalid_image")]
    InvalidImage(#[from] capture::Error),

    #[error(transparent)]
    Storage(#[from] storage::Error),

    #[error("unexpected")]
    Unexpected(String),
}

error_responses! {
    not_found: 404,
    validation: 400,
    path_validation: 400,
    query_validation: 400,
    json_validation: 400,
    confirmation_required: 400,
    invalid_image: 400,
    unexpected: 500
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let errors = errors();
        match error {
            Error::NotFound(message) => errors.not_found.with_message(message),
            Error::Validation(error) => errors.validation.with_message(error.to_string()),
            Error::JsonValidation(error) => errors.json_validation.with_message(error.body_text()),
            Error::QueryValidation(error) => errors.query_validation.with_message(error.body_text()),
            Error::PathValidation(error) => errors.path_validation.with_message(error.body_text()),
            Error::ConfirmationRequired => errors
                .confirmation_required
                .with_message("Deleting a certificate must be confirmed with `confirm=true`"),
            Error::InvalidImage(error) => errors.invalid_image.with_message(error.to_string()),
            Error::Unexpected(message) => errors.unexpected.with_message(message),
            Error::Storage(_) => errors.unexpected.with_message("Unexpected"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let error = Arc::new(self);

        let error_res = ErrorResponse::from(error.as_ref());
        let status = error_res.status;

        let mut res = axum::Json(error_res).into_response();
        res.extensions_mut().insert(error);

        *res.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        res
    }
}

pub async fn on_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let error = response.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    match error {
        Some(error @ (Error::Storage(_) | Error::Unexpected(_))) => tracing::error!("{:?}", error),
        Some(error) => tracing::debug!("{:?}", error),
        None => {}
    }

    response
}

mod response {
    use super::*;

    #[derive(Debug, Serialize, Clone, Default)]
    pub struct ErrorResponse {
        pub error: String,
        pub message: Option<String>,
        pub status: u16,
    }

    impl ErrorResponse {
        pub fn new(error: impl Into<String>, status: u16) -> Self {
            Self {
                error: error.into(),
                status,
                ..Default::default()
            }
        }

        pub fn with_message(&self, message: impl Into<String>) -> Self {
            let mut res = self.clone();
            res.message = Some(message.into());
            res
        }
    }

    /// One prebuilt [`ErrorResponse`] per error name, with its status code.
    /// ```rust,ignore
    /// error_responses! {
    ///     not_found: 404,
    ///     unexpected: 500
    /// }
    ///
    /// let res = errors().not_found.with_message("Note not found");
    /// ```
    #[macro_export]
    macro_rules! error_responses {
        (
            $($name:ident: $code:expr),* $(,)?
        ) => {
            #[derive(Debug, Clone, Serialize)]
            struct Responses {
                $(
                    $name: ErrorResponse,
                )*
            }

            static ERRORS: OnceLock<Responses> = OnceLock::new();

            fn errors() -> &'static Responses {
                ERRORS.get_or_init(|| Responses {
                    $(
                        $name: ErrorResponse::new(stringify!($name), $code),
                    )*
                })
            }
        };
    }
}
