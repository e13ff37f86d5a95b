//! The process-wide session shared by every view.
//!
//! Loaded once at startup, replaced on sign-in and token refresh, torn down
//! on sign-out. Interested parties subscribe to a watch channel.

use crate::auth::{AuthClient, AuthError, Session};
use crate::storage::{load_session, persist_session, remove_session};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    TokenRefreshed,
    SignedOut,
}

#[derive(Debug, Clone)]
pub struct AuthState {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

#[derive(Clone)]
pub struct SessionStore {
    path: PathBuf,
    sender: Arc<watch::Sender<AuthState>>,
    refresh_lock: Arc<Mutex<()>>,
}

impl SessionStore {
    /// A signed-out store backed by `path`.
    pub fn new(path: PathBuf) -> Self {
        Self::with_session(path, None)
    }

    fn with_session(path: PathBuf, session: Option<Session>) -> Self {
        let (sender, _) = watch::channel(AuthState {
            event: AuthEvent::InitialSession,
            session,
        });
        Self {
            path,
            sender: Arc::new(sender),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Restores the persisted session, refreshing it if it is about to expire.
    pub async fn init(path: PathBuf, auth: &AuthClient) -> Self {
        let stored = match load_session(&path).await {
            Some(session) if session.needs_refresh() => match auth.refresh(&session.refresh_token).await {
                Ok(fresh) => {
                    if let Err(err) = persist_session(&path, &fresh).await {
                        warn!("failed to persist refreshed session: {err}");
                    }
                    Some(fresh)
                }
                Err(AuthError::Rejected(message)) => {
                    warn!("discarding stored session: {message}");
                    if let Err(err) = remove_session(&path).await {
                        warn!("failed to remove stale session file: {err}");
                    }
                    None
                }
                Err(err) => {
                    // the next request retries the refresh
                    warn!("could not refresh stored session, keeping it: {err}");
                    Some(session)
                }
            },
            other => other,
        };

        if let Some(session) = &stored {
            info!(user_id = %session.user.id, "restored session");
        }
        Self::with_session(path, stored)
    }

    pub fn current(&self) -> Option<Session> {
        self.sender.borrow().session.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.sender.subscribe()
    }

    pub async fn sign_in(&self, session: Session) -> Result<(), AuthError> {
        let _guard = self.refresh_lock.lock().await;
        persist_session(&self.path, &session).await?;
        self.publish(AuthEvent::SignedIn, Some(session));
        Ok(())
    }

    /// Revokes the token (best effort), forgets the session and notifies subscribers.
    pub async fn sign_out(&self, auth: &AuthClient) -> Result<(), AuthError> {
        let _guard = self.refresh_lock.lock().await;
        if let Some(session) = self.current() {
            if let Err(err) = auth.sign_out(&session.access_token).await {
                warn!("token revocation failed: {err}");
            }
        }
        remove_session(&self.path).await?;
        self.publish(AuthEvent::SignedOut, None);
        Ok(())
    }

    /// Forgets a session whose access token the backend no longer accepts.
    pub async fn expire(&self) -> Result<(), AuthError> {
        let _guard = self.refresh_lock.lock().await;
        if self.current().is_none() {
            return Ok(());
        }
        remove_session(&self.path).await?;
        self.publish(AuthEvent::SignedOut, None);
        Ok(())
    }

    /// The session to use for a backend call, refreshed when close to expiry.
    pub async fn active(&self, auth: &AuthClient) -> Result<Session, AuthError> {
        let session = self.current().ok_or(AuthError::NotAuthenticated)?;
        if !session.needs_refresh() {
            return Ok(session);
        }

        let _guard = self.refresh_lock.lock().await;
        // another request may have refreshed while we waited
        let session = self.current().ok_or(AuthError::NotAuthenticated)?;
        if !session.needs_refresh() {
            return Ok(session);
        }

        let fresh = match auth.refresh(&session.refresh_token).await {
            Ok(fresh) => fresh,
            Err(AuthError::Rejected(message)) => {
                warn!("refresh rejected, signing out: {message}");
                remove_session(&self.path).await?;
                self.publish(AuthEvent::SignedOut, None);
                return Err(AuthError::NotAuthenticated);
            }
            Err(err) => return Err(err),
        };
        persist_session(&self.path, &fresh).await?;
        self.publish(AuthEvent::TokenRefreshed, Some(fresh.clone()));
        Ok(fresh)
    }

    /// Logs every session change until the store is dropped.
    pub fn log_changes(&self) -> JoinHandle<()> {
        let mut receiver = self.subscribe();
        tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let state = receiver.borrow_and_update().clone();
                match state.session {
                    Some(session) => info!(event = ?state.event, user_id = %session.user.id, "auth state changed"),
                    None => info!(event = ?state.event, "auth state changed"),
                }
            }
        })
    }

    fn publish(&self, event: AuthEvent, session: Option<Session>) {
        self.sender.send_replace(AuthState { event, session });
    }
}
