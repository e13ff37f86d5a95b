use crate::auth::{AuthClient, Session};
use crate::client::RestClient;
use crate::errors::AppError;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub rest: RestClient,
    pub auth: AuthClient,
    pub session: SessionStore,
}

impl AppState {
    pub fn new(rest: RestClient, auth: AuthClient, session: SessionStore) -> Self {
        Self { rest, auth, session }
    }

    /// The signed-in session, or 401 when nobody is signed in.
    pub async fn require_session(&self) -> Result<Session, AppError> {
        Ok(self.session.active(&self.auth).await?)
    }
}
