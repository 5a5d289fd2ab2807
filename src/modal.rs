use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalKind {
    Login,
    Signup,
    ForgotPassword,
}

impl ModalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModalKind::Login => "login",
            ModalKind::Signup => "signup",
            ModalKind::ForgotPassword => "forgot",
        }
    }
}

impl FromStr for ModalKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(ModalKind::Login),
            "signup" => Ok(ModalKind::Signup),
            "forgot" | "forgot_password" => Ok(ModalKind::ForgotPassword),
            other => Err(anyhow::anyhow!("Unknown modal '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModalSnapshot {
    pub active: Option<ModalKind>,
    pub payload: Option<Value>,
}

/// Which single modal is showing, plus an arbitrary payload.
#[derive(Debug, Clone, Default)]
pub struct ModalStore {
    inner: Arc<Mutex<ModalSnapshot>>,
}

impl ModalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `kind`, replacing whatever was open.
    pub async fn open(&self, kind: ModalKind, payload: Option<Value>) {
        let mut guard = self.inner.lock().await;
        if let Some(previous) = guard.active.filter(|p| *p != kind) {
            debug!("Modal {} replaced by {}", previous.as_str(), kind.as_str());
        }
        *guard = ModalSnapshot {
            active: Some(kind),
            payload,
        };
    }

    pub async fn close(&self) {
        *self.inner.lock().await = ModalSnapshot::default();
    }

    pub async fn active(&self) -> Option<ModalKind> {
        self.inner.lock().await.active
    }

    pub async fn payload(&self) -> Option<Value> {
        self.inner.lock().await.payload.clone()
    }

    pub async fn snapshot(&self) -> ModalSnapshot {
        self.inner.lock().await.clone()
    }
}
