use crate::auth::AuthError;
use crate::client::BackendError;
use axum::http::StatusCode;
use tracing::{error, warn};

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    /// The backend no longer accepts the access token.
    pub session_expired: bool,
}

/// Response extension marking a reply caused by a token the backend refused.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpired;

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            session_expired: false,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound { .. } => Self::not_found(err.to_string()),
            BackendError::Api { status: 401, .. } => {
                warn!("backend refused the access token: {err}");
                Self {
                    session_expired: true,
                    ..Self::unauthorized(err.to_string())
                }
            }
            BackendError::Api { status: 403, .. } => {
                warn!("backend denied request: {err}");
                Self::forbidden(err.to_string())
            }
            BackendError::Api { status, .. } if (400..500).contains(&status) => {
                Self::bad_request(err.to_string())
            }
            _ => {
                error!("backend call failed: {err}");
                Self::bad_gateway(err.to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected(_) | AuthError::NotAuthenticated => {
                Self::unauthorized(err.to_string())
            }
            AuthError::Io(_) | AuthError::Decode(_) => Self::internal(err),
            AuthError::Request(_) | AuthError::Unavailable { .. } => {
                error!("auth call failed: {err}");
                Self::bad_gateway(err.to_string())
            }
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status, self.message).into_response();
        if self.session_expired {
            response.extensions_mut().insert(SessionExpired);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> BackendError {
        BackendError::Api {
            status,
            message: "new row violates row-level security policy".into(),
        }
    }

    #[test]
    fn row_level_denial_stays_forbidden() {
        let err = AppError::from(api(403));
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert!(err.message.contains("row-level security"));
        assert!(!err.session_expired);
    }

    #[test]
    fn refused_token_is_unauthorized_and_expires_the_session() {
        let err = AppError::from(api(401));
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert!(err.session_expired);
    }

    #[test]
    fn auth_outage_is_a_gateway_error() {
        let err = AppError::from(AuthError::Unavailable {
            status: 503,
            message: "down".into(),
        });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }
}
