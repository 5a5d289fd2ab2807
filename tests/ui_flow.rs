use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use owlist::app::{build_router, load_templates, AppState};
use owlist::auth::{synthetic_user_id, AuthGateway};
use owlist::config::Config;
use owlist::filter::ITEMS_PER_PAGE;
use owlist::modal::ModalKind;
use owlist::models::{CommunityUser, Media, MediaDetails, User, UserList};
use owlist::repository::{InMemoryRepository, MediaRepository};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

#[derive(Default)]
struct FakeAuth {
    calls: Mutex<Vec<String>>,
    reject_login: bool,
}

impl FakeAuth {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait::async_trait]
impl AuthGateway for FakeAuth {
    async fn login(&self, email: &str, _password: &str) -> anyhow::Result<User> {
        self.record("login");
        if self.reject_login {
            anyhow::bail!("invalid credentials");
        }
        Ok(User {
            id: synthetic_user_id(email),
            email: email.to_string(),
            username: None,
            avatar_url: None,
        })
    }

    async fn signup(&self, email: &str, _password: &str, username: &str) -> anyhow::Result<User> {
        self.record("signup");
        Ok(User {
            id: synthetic_user_id(email),
            email: email.to_string(),
            username: Some(username.to_string()),
            avatar_url: None,
        })
    }

    async fn logout(&self) -> anyhow::Result<()> {
        self.record("logout");
        Ok(())
    }

    async fn reset_password(&self, _email: &str) -> anyhow::Result<()> {
        self.record("reset_password");
        Ok(())
    }

    async fn confirm_password_reset(&self, _token: &str, _password: &str) -> anyhow::Result<()> {
        self.record("confirm_password_reset");
        Ok(())
    }
}

struct FailingRepository;

#[async_trait::async_trait]
impl MediaRepository for FailingRepository {
    async fn list_media(&self) -> anyhow::Result<Vec<Media>> {
        anyhow::bail!("catalog unavailable")
    }
    async fn get_media(&self, _id: &str) -> anyhow::Result<Option<Media>> {
        anyhow::bail!("catalog unavailable")
    }
    async fn get_details(&self, _id: &str) -> anyhow::Result<Option<MediaDetails>> {
        anyhow::bail!("catalog unavailable")
    }
    async fn community_users(&self) -> anyhow::Result<Vec<CommunityUser>> {
        Ok(Vec::new())
    }
    async fn user_lists(&self) -> anyhow::Result<Vec<UserList>> {
        Ok(Vec::new())
    }
}

fn state_with(repo: Arc<dyn MediaRepository>, auth: Arc<FakeAuth>) -> AppState {
    let tera = load_templates(&Config::default().templates_glob()).expect("templates load");
    AppState::new(repo, auth, tera, ITEMS_PER_PAGE)
}

fn app_with_fakes() -> (Router, AppState, Arc<FakeAuth>) {
    let auth = Arc::new(FakeAuth::default());
    let state = state_with(Arc::new(InMemoryRepository::seeded()), auth.clone());
    (build_router(state.clone()), state, auth)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

async fn send(app: &Router, req: Request<Body>) -> Reply {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let location = res
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    Reply {
        status,
        location,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

async fn sign_in(app: &Router) {
    let res = send(
        app,
        post_form("/auth/login", "email=owl%40example.com&password=hunter2&return_to=%2F"),
    )
    .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn health_answers_ok() {
    let (app, _, _) = app_with_fakes();
    let res = send(&app, get("/health")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "OK");
}

#[tokio::test]
async fn home_lists_trending_titles() {
    let (app, _, _) = app_with_fakes();
    let res = send(&app, get("/")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Trending now"));
    assert!(res.body.contains("Breaking Bad"));
}

#[tokio::test]
async fn explore_counts_filtered_results() {
    let (app, _, _) = app_with_fakes();
    let res = send(&app, get("/explore?type=anime&rating=4")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("data-result-count=\"8\""));
    assert!(res.body.contains("8 results"));
    assert!(res.body.contains("Attack on Titan"));
    assert!(!res.body.contains("Inception"));
}

#[tokio::test]
async fn explore_paginates_full_catalog() {
    let (app, _, _) = app_with_fakes();
    let first = send(&app, get("/explore")).await;
    assert!(first.body.contains("data-result-count=\"24\""));
    assert!(first.body.contains("Next"));
    assert!(!first.body.contains("Previous"));

    let second = send(&app, get("/explore?page=2")).await;
    assert!(second.body.contains("Previous"));
    assert!(!second.body.contains(">Next<"));

    // Out of range pages clamp to the last one.
    let clamped = send(&app, get("/explore?page=99")).await;
    assert_eq!(clamped.status, StatusCode::OK);
    assert!(clamped.body.contains("Previous"));
}

#[tokio::test]
async fn explore_without_matches_shows_empty_state() {
    let (app, _, _) = app_with_fakes();
    let res = send(&app, get("/explore?q=zzzz")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("data-result-count=\"0\""));
    assert!(res.body.contains("No results found"));
}

#[tokio::test]
async fn explore_accepts_repeated_genre_keys() {
    let (app, _, _) = app_with_fakes();
    let res = send(&app, get("/explore?genres=History&genres=Family")).await;
    assert!(res.body.contains("data-result-count=\"2\""));
    assert!(res.body.contains("Chernobyl"));
    assert!(res.body.contains("Spirited Away"));
}

#[tokio::test]
async fn detail_renders_curated_entry() {
    let (app, _, _) = app_with_fakes();
    let res = send(&app, get("/media/1")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Inception"));
    assert!(res.body.contains("Christopher Nolan"));
    assert!(res.body.contains("Similar titles"));
    assert!(!res.body.contains("status-sidebar"));
}

#[tokio::test]
async fn unknown_media_is_not_found() {
    let (app, _, _) = app_with_fakes();
    let res = send(&app, get("/media/999")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.body.contains("Not found"));

    let res = send(&app, get("/no/such/page")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signup_with_mismatched_passwords_leaves_auth_untouched() {
    let (app, state, auth) = app_with_fakes();
    let res = send(
        &app,
        post_form(
            "/auth/signup",
            concat!(
                "username=owlet&email=owl%40example.com&password=one",
                "&confirm_password=two&accept_terms=on&return_to=%2Fexplore",
            ),
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/explore"));
    assert!(auth.calls().is_empty());
    assert!(state.auth.current_user().await.is_none());
    assert_eq!(state.modals.active().await, Some(ModalKind::Signup));

    let page = send(&app, get("/explore")).await;
    assert!(page.body.contains("Passwords do not match"));
    assert!(page.body.contains("toast-destructive"));
}

#[tokio::test]
async fn signup_signs_the_user_in() {
    let (app, state, auth) = app_with_fakes();
    let res = send(
        &app,
        post_form(
            "/auth/signup",
            concat!(
                "username=owlet&email=owl%40example.com&password=Sup3r-secret",
                "&confirm_password=Sup3r-secret&accept_terms=on&return_to=%2F",
            ),
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(auth.calls(), ["signup"]);
    let user = state.auth.current_user().await.unwrap();
    assert_eq!(user.username.as_deref(), Some("owlet"));
    assert_eq!(state.modals.active().await, None);
}

#[tokio::test]
async fn opening_signup_replaces_login_modal() {
    let (app, state, _) = app_with_fakes();
    let res = send(&app, get("/modal/login?return_to=%2Fexplore")).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(state.modals.active().await, Some(ModalKind::Login));

    send(&app, get("/modal/signup?return_to=%2Fexplore")).await;
    assert_eq!(state.modals.active().await, Some(ModalKind::Signup));

    let page = send(&app, get("/explore")).await;
    assert!(page.body.contains("data-modal=\"signup\""));
    assert!(!page.body.contains("data-modal=\"login\""));

    send(&app, post_form("/modal/close", "return_to=%2Fexplore")).await;
    assert_eq!(state.modals.active().await, None);
}

#[tokio::test]
async fn unknown_modal_kind_is_not_found() {
    let (app, state, _) = app_with_fakes();
    let res = send(&app, get("/modal/settings")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(state.modals.active().await, None);
}

#[tokio::test]
async fn external_return_to_falls_back_home() {
    let (app, _, _) = app_with_fakes();
    let res = send(&app, get("/modal/login?return_to=https%3A%2F%2Fevil.example")).await;
    assert_eq!(res.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn tracking_without_user_opens_login() {
    let (app, state, _) = app_with_fakes();
    let res = send(&app, post_form("/media/1/favorite", "")).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/media/1"));
    assert_eq!(state.modals.active().await, Some(ModalKind::Login));
    assert!(!state.tracking.status("1").await.is_favorite);

    send(&app, post_form("/media/1/status", "status=watching")).await;
    assert_eq!(state.tracking.status("1").await.status, None);
}

#[tokio::test]
async fn signed_in_user_tracks_status_and_favorite() {
    let (app, state, _) = app_with_fakes();
    sign_in(&app).await;

    let res = send(&app, post_form("/media/2/status", "status=watching")).await;
    assert_eq!(res.location.as_deref(), Some("/media/2"));
    send(&app, post_form("/media/2/favorite", "")).await;
    send(&app, post_form("/media/2/rating", "rating=4")).await;

    let status = state.tracking.status("2").await;
    assert_eq!(status.status.map(|s| s.as_str()), Some("watching"));
    assert!(status.start_date.is_some());
    assert!(status.is_favorite);
    assert_eq!(status.user_rating, Some(4));

    let page = send(&app, get("/media/2")).await;
    assert!(page.body.contains("status-sidebar"));
}

#[tokio::test]
async fn out_of_range_rating_is_rejected_with_toast() {
    let (app, state, _) = app_with_fakes();
    sign_in(&app).await;
    send(&app, post_form("/media/1/rating", "rating=9")).await;
    assert_eq!(state.tracking.status("1").await.user_rating, None);
    let page = send(&app, get("/media/1")).await;
    assert!(page.body.contains("toast-destructive"));
}

#[tokio::test]
async fn toggling_an_episode_flips_its_watched_flag() {
    let (app, state, _) = app_with_fakes();
    sign_in(&app).await;
    let res = send(&app, post_form("/media/2/episodes/s1-ep-1/toggle", "")).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/media/2?season=s-1"));
    let overrides = state.tracking.episode_overrides("2").await;
    assert_eq!(overrides.get("s1-ep-1"), Some(&false));

    let details = state
        .repo
        .get_details("2")
        .await
        .expect("repository failed")
        .expect("seeded title missing");
    let seed_watched = details
        .seasons
        .iter()
        .flatten()
        .flat_map(|s| &s.episodes)
        .filter(|e| e.watched)
        .count() as u32;
    let status = state.tracking.status("2").await;
    assert_eq!(status.current_episode, Some(seed_watched - 1));

    send(&app, post_form("/media/2/episodes/s1-ep-1/toggle", "")).await;
    let status = state.tracking.status("2").await;
    assert_eq!(status.current_episode, Some(seed_watched));

    let res = send(&app, post_form("/media/2/episodes/s9-ep-1/toggle", "")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_to_lists_requires_a_selection() {
    let (app, state, _) = app_with_fakes();
    sign_in(&app).await;

    let res = send(&app, post_form("/media/3/lists", "")).await;
    assert_eq!(res.location.as_deref(), Some("/media/3?dialog=lists"));
    assert!(state.tracking.lists_for("3").await.is_empty());

    send(&app, post_form("/media/3/lists", "lists=favorites&lists=list2&lists=bogus")).await;
    assert_eq!(state.tracking.lists_for("3").await, ["favorites", "list2"]);

    let page = send(&app, get("/media/3?dialog=lists")).await;
    assert!(page.body.contains("data-dialog=\"lists\""));
}

#[tokio::test]
async fn logging_a_viewing_counts_rewatches() {
    let (app, state, _) = app_with_fakes();
    sign_in(&app).await;
    let res = send(
        &app,
        post_form(
            "/log",
            concat!(
                "media_id=5&watched_on=2024-03-01&rewatch=on&review=Great",
                "&tags=scary%2C+80s%2C&rating=4&liked=on",
            ),
        ),
    )
    .await;
    assert_eq!(res.location.as_deref(), Some("/media/5"));
    let log = state.tracking.log().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].tags, ["scary", "80s"]);
    assert!(log[0].liked);
    assert_eq!(state.tracking.status("5").await.rewatches, 1);
}

#[tokio::test]
async fn log_search_lists_matches() {
    let (app, _, _) = app_with_fakes();
    let res = send(&app, get("/log?q=matrix")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("The Matrix"));
}

#[tokio::test]
async fn logout_clears_user_and_tracking() {
    let (app, state, auth) = app_with_fakes();
    sign_in(&app).await;
    send(&app, post_form("/media/1/favorite", "")).await;
    assert!(state.tracking.status("1").await.is_favorite);

    let res = send(&app, post_form("/auth/logout", "return_to=%2Fmedia%2F1")).await;
    assert_eq!(res.location.as_deref(), Some("/media/1"));
    assert!(state.auth.current_user().await.is_none());
    assert!(!state.tracking.status("1").await.is_favorite);
    assert_eq!(auth.calls(), ["login", "logout"]);
}

#[tokio::test]
async fn rejected_login_keeps_modal_open() {
    let auth = Arc::new(FakeAuth {
        reject_login: true,
        ..FakeAuth::default()
    });
    let state = state_with(Arc::new(InMemoryRepository::seeded()), auth.clone());
    let app = build_router(state.clone());
    send(
        &app,
        post_form("/auth/login", "email=owl%40example.com&password=nope&return_to=%2F"),
    )
    .await;
    assert!(state.auth.current_user().await.is_none());
    assert!(!state.auth.is_loading().await);
    assert_eq!(state.modals.active().await, Some(ModalKind::Login));
    let page = send(&app, get("/")).await;
    assert!(page.body.contains("Login failed"));
}

#[tokio::test]
async fn forgot_password_shows_email_sent_state() {
    let (app, state, auth) = app_with_fakes();
    send(&app, post_form("/auth/forgot", "email=owl%40example.com&return_to=%2F")).await;
    assert_eq!(auth.calls(), ["reset_password"]);
    assert_eq!(state.modals.active().await, Some(ModalKind::ForgotPassword));
    let page = send(&app, get("/")).await;
    assert!(page.body.contains("We sent a reset link"));
}

#[tokio::test]
async fn reset_password_flow() {
    let (app, _, auth) = app_with_fakes();
    let page = send(&app, get("/reset-password")).await;
    assert!(page.body.contains("Invalid link"));

    let page = send(&app, get("/reset-password?token=abc")).await;
    assert!(page.body.contains("Choose a new password"));

    let res = send(
        &app,
        post_form("/reset-password", "token=abc&password=one&confirm_password=two"),
    )
    .await;
    assert_eq!(res.location.as_deref(), Some("/reset-password?token=abc"));
    assert!(auth.calls().is_empty());

    let res = send(
        &app,
        post_form(
            "/reset-password",
            "token=abc&password=Sup3r-secret&confirm_password=Sup3r-secret",
        ),
    )
    .await;
    assert_eq!(res.location.as_deref(), Some("/reset-password?status=success"));
    assert_eq!(auth.calls(), ["confirm_password_reset"]);
    let page = send(&app, get("/reset-password?status=success")).await;
    assert!(page.body.contains("Password updated"));
}

#[tokio::test]
async fn search_all_tab_previews_content() {
    let (app, _, _) = app_with_fakes();
    let res = send(&app, get("/search?q=yuki")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Yuki Tanaka"));

    let res = send(&app, get("/search")).await;
    assert!(res.body.contains("Search owlist"));
}

#[tokio::test]
async fn json_helpers_report_strength_and_availability() {
    let (app, _, _) = app_with_fakes();
    let res = send(&app, get("/password-strength?password=abcdefgH1%21xy")).await;
    let value: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(value["label"], "Strong");
    assert_eq!(value["level"], 3);

    let res = send(&app, get("/password-strength?password=")).await;
    assert_eq!(res.body, "null");

    let res = send(&app, get("/username-available?username=admin")).await;
    let value: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(value["available"], false);
}

#[tokio::test]
async fn repository_failure_is_a_server_error() {
    let state = state_with(Arc::new(FailingRepository), Arc::new(FakeAuth::default()));
    let app = build_router(state);
    let res = send(&app, get("/explore")).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}
