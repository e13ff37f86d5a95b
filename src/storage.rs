use crate::auth::{AuthError, Session};
use std::path::Path;
use tokio::fs;
use tracing::error;

/// Reads the persisted session; a missing or unreadable file means signed out.
pub async fn load_session(path: &Path) -> Option<Session> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(session) => Some(session),
            Err(err) => {
                error!("failed to parse session file: {err}");
                None
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            error!("failed to read session file: {err}");
            None
        }
    }
}

pub async fn persist_session(path: &Path, session: &Session) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    let payload = serde_json::to_vec_pretty(session)?;
    fs::write(path, payload).await?;
    Ok(())
}

pub async fn remove_session(path: &Path) -> Result<(), AuthError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
pub(crate) fn unique_session_path(tag: &str) -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("fitness_tracker_{tag}_{}_{}.json", std::process::id(), nanos));
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    #[tokio::test]
    async fn session_survives_persist_and_load() {
        let path = unique_session_path("storage");
        let session = Session {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at: Utc::now() + Duration::hours(1),
            user: User {
                id: Uuid::nil(),
                email: Some("runner@example.com".into()),
            },
        };

        persist_session(&path, &session).await.unwrap();
        assert_eq!(load_session(&path).await, Some(session));

        remove_session(&path).await.unwrap();
        assert_eq!(load_session(&path).await, None);
        remove_session(&path).await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_signed_out() {
        let path = unique_session_path("corrupt");
        fs::write(&path, b"{ not json").await.unwrap();
        assert_eq!(load_session(&path).await, None);
        remove_session(&path).await.unwrap();
    }
}
