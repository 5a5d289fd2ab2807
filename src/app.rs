use crate::auth::{AuthGateway, AuthStore, SimulatedAuthGateway};
use crate::config::Config;
use crate::filter::{self, ExploreQuery, ExploreState};
use crate::forms::{
    check_username, password_strength, ForgotPasswordForm, LoginForm, PasswordStrength,
    ResetPasswordForm, SignupForm,
};
use crate::modal::{ModalKind, ModalStore};
use crate::models::{Media, User, WatchStatus};
use crate::repository::{similar_media, top_rated, InMemoryRepository, MediaRepository};
use crate::toast::{Toast, ToastQueue};
use crate::tracking::{log_search, parse_tags, LogEntry, TrackingStore, QUICK_LISTS};
use crate::views::{
    cards, AddToListView, CardView, DetailInputs, DetailView, ExploreView, HomeView, Layout,
    LogView, ModalView, ResetPasswordView, SearchTab, SearchView, StrengthView, UserView,
    FEATURES,
};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tera::Tera;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

const MAX_BODY_BYTES: usize = 64 * 1024;
const TRENDING_LIMIT: usize = 8;
const SIMILAR_LIMIT: usize = 8;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn MediaRepository>,
    pub auth: AuthStore,
    pub modals: ModalStore,
    pub tracking: TrackingStore,
    pub toasts: ToastQueue,
    pub tera: Arc<Tera>,
    pub page_size: usize,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn MediaRepository>,
        gateway: Arc<dyn AuthGateway>,
        tera: Tera,
        page_size: usize,
    ) -> Self {
        Self {
            repo,
            auth: AuthStore::new(gateway),
            modals: ModalStore::new(),
            tracking: TrackingStore::new(),
            toasts: ToastQueue::new(),
            tera: Arc::new(tera),
            page_size: page_size.max(1),
        }
    }
}

pub fn load_templates(glob: &str) -> Result<Tera> {
    let tera = Tera::new(glob).with_context(|| format!("Failed to load templates from {}", glob))?;
    debug!(
        "Loaded {} templates",
        tera.get_template_names().count()
    );
    Ok(tera)
}

pub async fn run_server(config: Config) -> Result<()> {
    let tera = load_templates(&config.templates_glob())?;
    let state = AppState::new(
        Arc::new(InMemoryRepository::seeded()),
        Arc::new(SimulatedAuthGateway::new(config.auth_delay)),
        tera,
        config.page_size,
    );

    let app = build_router(state);

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/explore", get(explore))
        .route("/media/:id", get(media_detail))
        .route("/media/:id/status", post(set_status))
        .route("/media/:id/rating", post(set_rating))
        .route("/media/:id/favorite", post(toggle_favorite))
        .route("/media/:id/notes", post(save_notes))
        .route("/media/:id/lists", post(add_to_lists))
        .route("/media/:id/episodes/:episode/toggle", post(toggle_episode))
        .route("/search", get(search))
        .route("/log", get(log_page).post(log_viewing))
        .route("/reset-password", get(reset_password_page).post(reset_password))
        .route("/modal/:kind", get(open_modal))
        .route("/modal/close", post(close_modal))
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/forgot", post(forgot_password))
        .route("/auth/logout", post(logout))
        .route("/password-strength", get(strength))
        .route("/username-available", get(username_available))
        .fallback(fallback)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Infrastructure failure surfaced as a 500.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Something went wrong</h1><p><a href=\"/\">Back to home</a></p>"),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

type AppResult<T> = std::result::Result<T, AppError>;

/// Only local absolute paths are honored; anything else goes home.
pub fn safe_return_to(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn media_path(id: &str) -> String {
    format!("/media/{}", urlencoding::encode(id))
}

async fn layout(state: &AppState, title: &str, return_to: &str) -> Layout {
    Layout {
        title: title.to_string(),
        user: state.auth.current_user().await.as_ref().map(UserView::from),
        modal: ModalView::from_snapshot(&state.modals.snapshot().await),
        toasts: state.toasts.drain().await,
        return_to: return_to.to_string(),
        is_loading: state.auth.is_loading().await,
    }
}

async fn render<T: Serialize>(
    state: &AppState,
    template: &str,
    title: &str,
    return_to: &str,
    page: &T,
) -> AppResult<Html<String>> {
    let mut ctx = tera::Context::new();
    ctx.insert("layout", &layout(state, title, return_to).await);
    ctx.insert("page", page);
    let body = state
        .tera
        .render(template, &ctx)
        .with_context(|| format!("Failed to render {}", template))?;
    Ok(Html(body))
}

async fn not_found(state: &AppState, path: &str) -> AppResult<Response> {
    let html = render(state, "not_found.html", "Not found", "/", &json!({ "path": path })).await?;
    Ok((StatusCode::NOT_FOUND, html).into_response())
}

/// Without a user: opens the login modal, queues a toast and answers with
/// the redirect the caller should return. Nothing is mutated.
async fn require_user(state: &AppState, return_to: &str) -> std::result::Result<User, Response> {
    match state.auth.current_user().await {
        Some(user) => Ok(user),
        None => {
            debug!("Anonymous tracking action, prompting login");
            state
                .modals
                .open(ModalKind::Login, Some(json!({ "return_to": return_to })))
                .await;
            state
                .toasts
                .push(Toast::info("Sign in required", "Log in to keep track of what you watch."))
                .await;
            Err(Redirect::to(return_to).into_response())
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn home(State(state): State<AppState>) -> AppResult<Html<String>> {
    let all = state.repo.list_media().await?;
    let view = HomeView {
        trending: cards(&top_rated(&all, TRENDING_LIMIT)),
        features: &FEATURES,
    };
    render(&state, "home.html", "Track what you watch", "/", &view).await
}

async fn explore(
    State(state): State<AppState>,
    axum_extra::extract::Query(query): axum_extra::extract::Query<ExploreQuery>,
) -> AppResult<Html<String>> {
    let explore = ExploreState::from_query(query);
    let all = state.repo.list_media().await?;
    let results = filter::apply(&all, &explore.filters, explore.sort);
    let page = filter::paginate(&results, explore.page, state.page_size);
    let explore = explore.with_page(page.page);
    let view = ExploreView::build(&explore, &page);
    render(&state, "explore.html", "Explore", &explore.href(), &view).await
}

#[derive(Debug, Default, Deserialize)]
struct DetailQuery {
    season: Option<String>,
    dialog: Option<String>,
}

async fn media_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> AppResult<Response> {
    let path = media_path(&id);
    let Some(details) = state.repo.get_details(&id).await? else {
        return not_found(&state, &path).await;
    };
    let signed_in = state.auth.current_user().await.is_some();
    let status = if signed_in {
        state.tracking.status(&id).await
    } else {
        Default::default()
    };
    let overrides = state.tracking.episode_overrides(&id).await;
    let all = state.repo.list_media().await?;
    let similar = similar_media(&all, &details.media, SIMILAR_LIMIT);
    let add_to_list = if signed_in && query.dialog.as_deref() == Some("lists") {
        let lists = state.repo.user_lists().await?;
        Some(AddToListView::build(&lists, &state.tracking.lists_for(&id).await))
    } else {
        None
    };

    let view = DetailView::build(
        &details,
        DetailInputs {
            status: &status,
            signed_in,
            episode_overrides: &overrides,
            selected_season: query.season.as_deref(),
            similar: &similar,
            add_to_list,
        },
    );
    let title = details.media.title.clone();
    Ok(render(&state, "media.html", &title, &path, &view).await?.into_response())
}

/// Looks up the title a tracking form targets and checks for a user.
async fn tracked_media(
    state: &AppState,
    id: &str,
) -> AppResult<std::result::Result<Media, Response>> {
    let path = media_path(id);
    let Some(media) = state.repo.get_media(id).await? else {
        return Ok(Err(not_found(state, &path).await?));
    };
    if let Err(redirect) = require_user(state, &path).await {
        return Ok(Err(redirect));
    }
    Ok(Ok(media))
}

#[derive(Debug, Deserialize)]
struct StatusForm {
    #[serde(default)]
    status: String,
}

async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> AppResult<Response> {
    let media = match tracked_media(&state, &id).await? {
        Ok(media) => media,
        Err(response) => return Ok(response),
    };
    let raw = form.status.trim();
    let status = if raw.is_empty() || raw == "none" {
        None
    } else {
        match raw.parse::<WatchStatus>() {
            Ok(status) => Some(status),
            Err(e) => {
                warn!("Rejected status for {}: {}", id, e);
                state.toasts.push(Toast::error("Error", e.to_string())).await;
                return Ok(Redirect::to(&media_path(&id)).into_response());
            }
        }
    };
    state.tracking.set_status(&id, status, today()).await;
    let message = match status {
        Some(s) => format!("{} marked as {}", media.title, s.label()),
        None => format!("Status cleared for {}", media.title),
    };
    state.toasts.push(Toast::title(message)).await;
    Ok(Redirect::to(&media_path(&id)).into_response())
}

#[derive(Debug, Deserialize)]
struct RatingForm {
    #[serde(default)]
    rating: String,
}

async fn set_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<RatingForm>,
) -> AppResult<Response> {
    if let Err(response) = tracked_media(&state, &id).await? {
        return Ok(response);
    }
    let stars = form.rating.trim().parse::<u8>().unwrap_or(0);
    match state.tracking.rate(&id, stars).await {
        Ok(_) => {
            state
                .toasts
                .push(Toast::title(format!("Rated {} / 5", stars)))
                .await
        }
        Err(e) => state.toasts.push(Toast::error("Error", e.to_string())).await,
    }
    Ok(Redirect::to(&media_path(&id)).into_response())
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    if let Err(response) = tracked_media(&state, &id).await? {
        return Ok(response);
    }
    let title = if state.tracking.toggle_favorite(&id).await {
        "Added to favorites"
    } else {
        "Removed from favorites"
    };
    state.toasts.push(Toast::title(title)).await;
    Ok(Redirect::to(&media_path(&id)).into_response())
}

#[derive(Debug, Deserialize)]
struct NotesForm {
    #[serde(default)]
    notes: String,
}

async fn save_notes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<NotesForm>,
) -> AppResult<Response> {
    if let Err(response) = tracked_media(&state, &id).await? {
        return Ok(response);
    }
    state.tracking.save_notes(&id, &form.notes).await;
    state.toasts.push(Toast::title("Notes saved")).await;
    Ok(Redirect::to(&media_path(&id)).into_response())
}

#[derive(Debug, Deserialize)]
struct ListsForm {
    #[serde(default)]
    lists: Vec<String>,
}

async fn add_to_lists(
    State(state): State<AppState>,
    Path(id): Path<String>,
    axum_extra::extract::Form(form): axum_extra::extract::Form<ListsForm>,
) -> AppResult<Response> {
    let media = match tracked_media(&state, &id).await? {
        Ok(media) => media,
        Err(response) => return Ok(response),
    };
    let own = state.repo.user_lists().await?;
    let known: Vec<String> = form
        .lists
        .into_iter()
        .filter(|l| QUICK_LISTS.iter().any(|q| q.id == l) || own.iter().any(|o| &o.id == l))
        .collect();
    match state.tracking.add_to_lists(&id, &known).await {
        Ok(lists) => {
            state
                .toasts
                .push(Toast::info(
                    "Added to lists",
                    format!("{} is in {} list(s)", media.title, lists.len()),
                ))
                .await;
            Ok(Redirect::to(&media_path(&id)).into_response())
        }
        Err(e) => {
            state.toasts.push(Toast::error("Error", e.to_string())).await;
            Ok(Redirect::to(&format!("{}?dialog=lists", media_path(&id))).into_response())
        }
    }
}

async fn toggle_episode(
    State(state): State<AppState>,
    Path((id, episode_id)): Path<(String, String)>,
) -> AppResult<Response> {
    let path = media_path(&id);
    let Some(details) = state.repo.get_details(&id).await? else {
        return not_found(&state, &path).await;
    };
    let found = details.seasons.iter().flatten().find_map(|season| {
        season
            .episodes
            .iter()
            .find(|e| e.id == episode_id)
            .map(|e| (season.id.clone(), e.clone()))
    });
    let Some((season_id, episode)) = found else {
        return not_found(&state, &path).await;
    };
    if let Err(redirect) = require_user(&state, &path).await {
        return Ok(redirect);
    }
    state.tracking.toggle_episode(&id, &episode).await;
    let seasons = details.seasons.as_deref().unwrap_or_default();
    state.tracking.sync_episode_progress(&id, seasons).await;
    let target = format!("{}?season={}", path, urlencoding::encode(&season_id));
    Ok(Redirect::to(&target).into_response())
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    q: Option<String>,
    tab: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let q = query.q.unwrap_or_default();
    let tab = SearchTab::parse(query.tab.as_deref());
    let media = state.repo.list_media().await?;
    let users = state.repo.community_users().await?;
    let lists = state.repo.user_lists().await?;
    let view = SearchView::build(&q, tab, &media, &users, &lists);
    let return_to = format!("/search?q={}&tab={}", urlencoding::encode(&view.query), tab.as_str());
    render(&state, "search.html", "Search", &return_to, &view).await
}

#[derive(Debug, Default, Deserialize)]
struct LogQuery {
    q: Option<String>,
    media: Option<String>,
}

async fn log_page(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> AppResult<Html<String>> {
    let q = query.q.unwrap_or_default();
    let all = state.repo.list_media().await?;
    let selected = match query.media.as_deref() {
        Some(id) => state.repo.get_media(id).await?,
        None => None,
    };
    let view = LogView {
        results: cards(&log_search(&all, &q)),
        query: q,
        selected: selected.as_ref().map(CardView::from),
        today: today().format("%Y-%m-%d").to_string(),
        rating_options: (0..=5).collect(),
    };
    render(&state, "log.html", "Log a viewing", "/log", &view).await
}

#[derive(Debug, Deserialize)]
struct LogForm {
    media_id: String,
    #[serde(default)]
    watched_on: String,
    rewatch: Option<String>,
    #[serde(default)]
    review: String,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    rating: String,
    liked: Option<String>,
}

async fn log_viewing(
    State(state): State<AppState>,
    Form(form): Form<LogForm>,
) -> AppResult<Response> {
    let back = format!("/log?media={}", urlencoding::encode(&form.media_id));
    if let Err(redirect) = require_user(&state, &back).await {
        return Ok(redirect);
    }
    let Some(media) = state.repo.get_media(&form.media_id).await? else {
        state
            .toasts
            .push(Toast::error("Error", "Pick a title to log"))
            .await;
        return Ok(Redirect::to("/log").into_response());
    };
    let watched_on = match form.watched_on.trim() {
        "" => today(),
        raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                state
                    .toasts
                    .push(Toast::error("Error", format!("'{}' is not a valid date", raw)))
                    .await;
                return Ok(Redirect::to(&back).into_response());
            }
        },
    };
    let entry = LogEntry {
        media_id: media.id.clone(),
        watched_on,
        rewatch: form.rewatch.is_some(),
        review: form.review.trim().to_string(),
        tags: parse_tags(&form.tags),
        rating: form.rating.trim().parse::<u8>().unwrap_or(0),
        liked: form.liked.is_some(),
    };
    if let Err(e) = state.tracking.log_viewing(entry).await {
        state.toasts.push(Toast::error("Error", e.to_string())).await;
        return Ok(Redirect::to(&back).into_response());
    }
    state
        .toasts
        .push(Toast::info("Viewing logged", format!("{} on {}", media.title, watched_on)))
        .await;
    Ok(Redirect::to(&media_path(&media.id)).into_response())
}

#[derive(Debug, Default, Deserialize)]
struct ResetQuery {
    token: Option<String>,
    status: Option<String>,
}

async fn reset_password_page(
    State(state): State<AppState>,
    Query(query): Query<ResetQuery>,
) -> AppResult<Html<String>> {
    let view = ResetPasswordView {
        token: query.token.filter(|t| !t.trim().is_empty()),
        success: query.status.as_deref() == Some("success"),
    };
    render(&state, "reset_password.html", "Reset password", "/", &view).await
}

async fn reset_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> AppResult<Response> {
    let back = format!("/reset-password?token={}", urlencoding::encode(form.token.trim()));
    if let Err(e) = form.validate() {
        state.toasts.push(Toast::error("Error", e.to_string())).await;
        return Ok(Redirect::to(&back).into_response());
    }
    if let Err(e) = state
        .auth
        .confirm_password_reset(form.token.trim(), &form.password)
        .await
    {
        warn!("Password reset failed: {}", e);
        state
            .toasts
            .push(Toast::error("Error", "Could not reset your password. Try again."))
            .await;
        return Ok(Redirect::to(&back).into_response());
    }
    state.toasts.push(Toast::title("Password updated")).await;
    Ok(Redirect::to("/reset-password?status=success").into_response())
}

#[derive(Debug, Default, Deserialize)]
struct ReturnToQuery {
    return_to: Option<String>,
}

async fn open_modal(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<ReturnToQuery>,
) -> AppResult<Response> {
    let Ok(kind) = kind.parse::<ModalKind>() else {
        return not_found(&state, &format!("/modal/{}", kind)).await;
    };
    let return_to = safe_return_to(query.return_to.as_deref());
    state
        .modals
        .open(kind, Some(json!({ "return_to": return_to })))
        .await;
    Ok(Redirect::to(&return_to).into_response())
}

async fn close_modal(
    State(state): State<AppState>,
    Form(form): Form<ReturnToQuery>,
) -> Redirect {
    state.modals.close().await;
    Redirect::to(&safe_return_to(form.return_to.as_deref()))
}

async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Redirect {
    let return_to = safe_return_to(form.return_to.as_deref());
    if let Err(e) = form.validate() {
        state.modals.open(ModalKind::Login, None).await;
        state.toasts.push(Toast::error("Error", e.to_string())).await;
        return Redirect::to(&return_to);
    }
    match state.auth.login(form.email.trim(), &form.password).await {
        Ok(user) => {
            state.modals.close().await;
            state
                .toasts
                .push(Toast::info("Welcome back", format!("Signed in as {}", user.display_name())))
                .await;
        }
        Err(e) => {
            state.modals.open(ModalKind::Login, None).await;
            state.toasts.push(Toast::error("Login failed", e.to_string())).await;
        }
    }
    Redirect::to(&return_to)
}

async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Redirect {
    let return_to = safe_return_to(form.return_to.as_deref());
    if let Err(e) = form.validate() {
        debug!("Signup rejected: {}", e);
        state.modals.open(ModalKind::Signup, None).await;
        state.toasts.push(Toast::error("Error", e.to_string())).await;
        return Redirect::to(&return_to);
    }
    match state
        .auth
        .signup(form.email.trim(), &form.password, form.username.trim())
        .await
    {
        Ok(user) => {
            state.modals.close().await;
            state
                .toasts
                .push(Toast::info("Account created", format!("Welcome, {}", user.display_name())))
                .await;
            if password_strength(&form.password) == Some(PasswordStrength::Weak) {
                state
                    .toasts
                    .push(Toast::info("Weak password", "Consider choosing a stronger password."))
                    .await;
            }
        }
        Err(e) => {
            state.modals.open(ModalKind::Signup, None).await;
            state.toasts.push(Toast::error("Signup failed", e.to_string())).await;
        }
    }
    Redirect::to(&return_to)
}

async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Redirect {
    let return_to = safe_return_to(form.return_to.as_deref());
    if let Err(e) = form.validate() {
        state.modals.open(ModalKind::ForgotPassword, None).await;
        state.toasts.push(Toast::error("Error", e.to_string())).await;
        return Redirect::to(&return_to);
    }
    let email = form.email.trim();
    match state.auth.reset_password(email).await {
        Ok(()) => {
            state
                .modals
                .open(
                    ModalKind::ForgotPassword,
                    Some(json!({ "email_sent": true, "email": email })),
                )
                .await
        }
        Err(e) => {
            state.modals.open(ModalKind::ForgotPassword, None).await;
            state.toasts.push(Toast::error("Error", e.to_string())).await;
        }
    }
    Redirect::to(&return_to)
}

async fn logout(
    State(state): State<AppState>,
    Form(form): Form<ReturnToQuery>,
) -> AppResult<Redirect> {
    state.auth.logout().await?;
    state.tracking.clear().await;
    state.modals.close().await;
    state.toasts.push(Toast::title("Signed out")).await;
    Ok(Redirect::to(&safe_return_to(form.return_to.as_deref())))
}

#[derive(Debug, Default, Deserialize)]
struct StrengthQuery {
    #[serde(default)]
    password: String,
}

async fn strength(Query(query): Query<StrengthQuery>) -> Json<Option<StrengthView>> {
    Json(password_strength(&query.password).map(StrengthView::from))
}

#[derive(Debug, Default, Deserialize)]
struct UsernameQuery {
    #[serde(default)]
    username: String,
}

#[derive(Debug, Serialize)]
struct Availability {
    available: bool,
    message: Option<String>,
}

async fn username_available(Query(query): Query<UsernameQuery>) -> Json<Availability> {
    let result = check_username(&query.username);
    Json(Availability {
        available: result.is_ok(),
        message: result.err().map(|e| e.to_string()),
    })
}

async fn fallback(State(state): State<AppState>, uri: Uri) -> AppResult<Response> {
    debug!("No route for {}", uri.path());
    not_found(&state, uri.path()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_to_only_accepts_local_paths() {
        assert_eq!(safe_return_to(Some("/explore?type=anime")), "/explore?type=anime");
        assert_eq!(safe_return_to(Some("https://evil.example")), "/");
        assert_eq!(safe_return_to(Some("//evil.example")), "/");
        assert_eq!(safe_return_to(Some("/\\evil")), "/");
        assert_eq!(safe_return_to(None), "/");
        assert_eq!(safe_return_to(Some("  ")), "/");
    }

    #[test]
    fn media_paths_are_encoded() {
        assert_eq!(media_path("12"), "/media/12");
        assert_eq!(media_path("a b"), "/media/a%20b");
    }
}
