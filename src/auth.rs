use crate::models::User;
use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Boundary to whatever authenticates users.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<User>;
    async fn signup(&self, email: &str, password: &str, username: &str) -> Result<User>;
    async fn logout(&self) -> Result<()>;
    async fn reset_password(&self, email: &str) -> Result<()>;
    async fn confirm_password_reset(&self, token: &str, password: &str) -> Result<()>;
}

/// Accepts everything after a fixed latency. No credential is checked.
#[derive(Debug, Clone)]
pub struct SimulatedAuthGateway {
    delay: Duration,
}

impl SimulatedAuthGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    async fn wait(&self, factor: u32) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay * factor / 2).await;
        }
    }
}

/// Stable id derived from the email so repeated logins map to the same user.
pub fn synthetic_user_id(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!("user-{}", &hex::encode(digest)[..12])
}

#[async_trait]
impl AuthGateway for SimulatedAuthGateway {
    async fn login(&self, email: &str, _password: &str) -> Result<User> {
        self.wait(2).await;
        Ok(User {
            id: synthetic_user_id(email),
            email: email.to_string(),
            username: None,
            avatar_url: None,
        })
    }

    async fn signup(&self, email: &str, _password: &str, username: &str) -> Result<User> {
        self.wait(2).await;
        Ok(User {
            id: synthetic_user_id(email),
            email: email.to_string(),
            username: Some(username.to_string()),
            avatar_url: None,
        })
    }

    async fn logout(&self) -> Result<()> {
        self.wait(1).await;
        Ok(())
    }

    async fn reset_password(&self, _email: &str) -> Result<()> {
        self.wait(2).await;
        Ok(())
    }

    async fn confirm_password_reset(&self, _token: &str, _password: &str) -> Result<()> {
        self.wait(3).await;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct AuthState {
    user: Option<User>,
    is_loading: bool,
}

/// Holds at most one current user and the loading flag.
///
/// The lock is released while the gateway call is in flight, so readers see
/// `is_loading` during the call.
#[derive(Clone)]
pub struct AuthStore {
    gateway: Arc<dyn AuthGateway>,
    state: Arc<Mutex<AuthState>>,
}

impl AuthStore {
    pub fn new(gateway: Arc<dyn AuthGateway>) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(AuthState::default())),
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.lock().await.user.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.is_loading
    }

    pub async fn set_user(&self, user: Option<User>) {
        self.state.lock().await.user = user;
    }

    async fn set_loading(&self, loading: bool) {
        self.state.lock().await.is_loading = loading;
    }

    /// Runs `op` with the loading flag raised; the flag drops on success and failure alike.
    async fn with_loading<T, F>(&self, op: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        self.set_loading(true).await;
        let result = op.await;
        self.set_loading(false).await;
        result
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let gateway = self.gateway.clone();
        let user = self
            .with_loading(async move { gateway.login(email, password).await })
            .await
            .inspect_err(|e| warn!("Login failed for {}: {}", email, e))?;
        info!("Logged in {}", user.id);
        self.set_user(Some(user.clone())).await;
        Ok(user)
    }

    pub async fn signup(&self, email: &str, password: &str, username: &str) -> Result<User> {
        let gateway = self.gateway.clone();
        let user = self
            .with_loading(async move { gateway.signup(email, password, username).await })
            .await
            .inspect_err(|e| warn!("Signup failed for {}: {}", email, e))?;
        info!("Signed up {} as '{}'", user.id, username);
        self.set_user(Some(user.clone())).await;
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        let gateway = self.gateway.clone();
        self.with_loading(async move { gateway.logout().await })
            .await?;
        if let Some(user) = self.state.lock().await.user.take() {
            info!("Logged out {}", user.id);
        }
        Ok(())
    }

    pub async fn reset_password(&self, email: &str) -> Result<()> {
        let gateway = self.gateway.clone();
        self.with_loading(async move { gateway.reset_password(email).await })
            .await?;
        debug!("Password reset requested for {}", email);
        Ok(())
    }

    pub async fn confirm_password_reset(&self, token: &str, password: &str) -> Result<()> {
        let gateway = self.gateway.clone();
        self.with_loading(async move { gateway.confirm_password_reset(token, password).await })
            .await?;
        debug!("Password reset confirmed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RejectingGateway;

    #[async_trait]
    impl AuthGateway for RejectingGateway {
        async fn login(&self, _email: &str, _password: &str) -> Result<User> {
            anyhow::bail!("invalid credentials")
        }
        async fn signup(&self, _email: &str, _password: &str, _username: &str) -> Result<User> {
            anyhow::bail!("signup closed")
        }
        async fn logout(&self) -> Result<()> {
            Ok(())
        }
        async fn reset_password(&self, _email: &str) -> Result<()> {
            anyhow::bail!("mailer down")
        }
        async fn confirm_password_reset(&self, _token: &str, _password: &str) -> Result<()> {
            anyhow::bail!("token expired")
        }
    }

    fn store() -> AuthStore {
        AuthStore::new(Arc::new(SimulatedAuthGateway::instant()))
    }

    #[tokio::test]
    async fn login_assigns_user_and_logout_clears_it() {
        let auth = store();
        assert!(auth.current_user().await.is_none());
        let user = auth.login("owl@example.com", "secret").await.unwrap();
        assert_eq!(user.email, "owl@example.com");
        assert_eq!(auth.current_user().await, Some(user));
        assert!(!auth.is_loading().await);

        auth.logout().await.unwrap();
        assert!(auth.current_user().await.is_none());
        assert!(!auth.is_loading().await);
    }

    #[tokio::test]
    async fn signup_replaces_previous_user() {
        let auth = store();
        auth.login("first@example.com", "pw").await.unwrap();
        let user = auth.signup("second@example.com", "pw", "owlet").await.unwrap();
        assert_eq!(user.username.as_deref(), Some("owlet"));
        assert_eq!(auth.current_user().await.unwrap().email, "second@example.com");
    }

    #[tokio::test]
    async fn reset_password_leaves_session_alone() {
        let auth = store();
        auth.reset_password("owl@example.com").await.unwrap();
        assert!(auth.current_user().await.is_none());
        assert!(!auth.is_loading().await);
    }

    #[tokio::test]
    async fn failures_clear_loading_and_keep_state() {
        let auth = AuthStore::new(Arc::new(RejectingGateway));
        auth.set_user(Some(User {
            id: "keep".to_string(),
            email: "keep@example.com".to_string(),
            username: None,
            avatar_url: None,
        }))
        .await;
        assert!(auth.login("x@example.com", "bad").await.is_err());
        assert!(auth.signup("x@example.com", "bad", "x").await.is_err());
        assert!(auth.reset_password("x@example.com").await.is_err());
        assert!(!auth.is_loading().await);
        assert_eq!(auth.current_user().await.unwrap().id, "keep");
    }

    #[tokio::test(start_paused = true)]
    async fn loading_flag_is_visible_while_gateway_waits() {
        let auth = AuthStore::new(Arc::new(SimulatedAuthGateway::new(Duration::from_millis(1000))));
        let pending = {
            let auth = auth.clone();
            tokio::spawn(async move { auth.login("slow@example.com", "pw").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(auth.is_loading().await);
        pending.await.unwrap().unwrap();
        assert!(!auth.is_loading().await);
        assert!(auth.current_user().await.is_some());
    }

    #[test]
    fn synthetic_ids_ignore_case_and_whitespace() {
        assert_eq!(synthetic_user_id("Owl@Example.com "), synthetic_user_id("owl@example.com"));
        assert_ne!(synthetic_user_id("a@example.com"), synthetic_user_id("b@example.com"));
        assert!(synthetic_user_id("a@example.com").starts_with("user-"));
    }
}
