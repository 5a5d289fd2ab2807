//! Template-facing view models. Everything here is precomputed so the
//! templates only loop and print.
use crate::catalog::{self, DECADES, GENRES, LANGUAGES};
use crate::filter::{ExploreState, Page, RatingScale, SortKey, YearFilter};
use crate::forms::PasswordStrength;
use crate::modal::{ModalKind, ModalSnapshot};
use crate::models::{
    CommunityUser, EngagementStats, Media, MediaDetails, MediaKind, User, UserList,
    UserMediaStatus, WatchStatus,
};
use crate::toast::Toast;
use crate::tracking::{season_progress, SeasonProgress, QUICK_LISTS};
use serde::Serialize;
use std::collections::HashMap;

/// Filled stars out of five for a 0–10 rating.
pub fn star_count(rating: f32) -> u8 {
    (rating / 2.0).round().clamp(0.0, 5.0) as u8
}

fn stars(filled: u8) -> Vec<bool> {
    (1..=5).map(|i| i <= filled).collect()
}

/// `1234567` → `"1,234,567"`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn results_label(count: usize) -> String {
    if count == 1 {
        "1 result".to_string()
    } else {
        format!("{} results", count)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: user.display_name().to_string(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModalView {
    pub kind: &'static str,
    /// Forgot-password dialog after a successful request.
    pub email_sent: bool,
    pub email: Option<String>,
}

impl ModalView {
    pub fn from_snapshot(snapshot: &ModalSnapshot) -> Option<Self> {
        let kind = snapshot.active?;
        let payload = snapshot.payload.as_ref();
        let email_sent = kind == ModalKind::ForgotPassword
            && payload
                .and_then(|p| p.get("email_sent"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
        let email = payload
            .and_then(|p| p.get("email"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Some(Self {
            kind: kind.as_str(),
            email_sent,
            email,
        })
    }
}

/// Shared by every page: navbar, toasts, the active modal.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: String,
    pub user: Option<UserView>,
    pub modal: Option<ModalView>,
    pub toasts: Vec<Toast>,
    /// Path forms send the user back to.
    pub return_to: String,
    pub is_loading: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub poster: String,
    pub rating: String,
    pub stars: Vec<bool>,
    pub kind: &'static str,
    pub kind_label: &'static str,
    pub href: String,
}

impl From<&Media> for CardView {
    fn from(media: &Media) -> Self {
        Self {
            id: media.id.clone(),
            title: media.title.clone(),
            year: media.year,
            poster: media.poster.clone(),
            rating: format!("{:.1}", media.rating),
            stars: stars(star_count(media.rating)),
            kind: media.kind.as_str(),
            kind_label: media.kind.label(),
            href: format!("/media/{}", media.id),
        }
    }
}

pub fn cards(items: &[Media]) -> Vec<CardView> {
    items.iter().map(CardView::from).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl Choice {
    fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub current: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationView {
    pub pages: Vec<PageLink>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl PaginationView {
    /// `None` when everything fits on one page.
    pub fn build<T>(state: &ExploreState, page: &Page<T>) -> Option<Self> {
        if page.total_pages <= 1 {
            return None;
        }
        let link = |n: usize| state.with_page(n).href();
        Some(Self {
            pages: (1..=page.total_pages)
                .map(|n| PageLink {
                    number: n,
                    href: link(n),
                    current: n == page.page,
                })
                .collect(),
            prev_href: page.has_prev().then(|| link(page.page - 1)),
            next_href: page.has_next().then(|| link(page.page + 1)),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SidebarView {
    pub kinds: Vec<Choice>,
    pub genres: Vec<Choice>,
    pub decades: Vec<Choice>,
    pub languages: Vec<Choice>,
    pub sorts: Vec<Choice>,
    pub ratings: Vec<Choice>,
    pub ten_scale: bool,
    pub year_from: String,
    pub year_to: String,
    pub has_active: bool,
}

impl SidebarView {
    pub fn build(state: &ExploreState) -> Self {
        let f = &state.filters;
        let mut kinds = vec![Choice::new("all", "All", f.kind.is_none())];
        kinds.extend(
            MediaKind::ALL
                .iter()
                .map(|k| Choice::new(k.as_str(), k.label(), f.kind == Some(*k))),
        );

        let any_decade = !matches!(f.years, YearFilter::Decade(_));
        let mut decades = vec![Choice::new("all", "All", any_decade)];
        decades.extend(DECADES.iter().map(|d| {
            Choice::new(d.to_string(), format!("{}s", d), f.years == YearFilter::Decade(*d))
        }));

        let mut languages = vec![Choice::new("all", "All languages", f.language.is_none())];
        languages.extend(
            LANGUAGES
                .iter()
                .map(|l| Choice::new(l.code, l.name, f.language.as_deref() == Some(l.code))),
        );

        let rating_label = |value: f32| match f.rating_scale {
            _ if value == 0.0 => "Any".to_string(),
            RatingScale::Stars => format!("{} ★ ({}+)", value, value * 2.0),
            RatingScale::Ten => format!("{}+", value),
        };
        let max = f.rating_scale.max() as u32;
        let mut ratings: Vec<Choice> = (0..=max)
            .map(|n| Choice::new(n.to_string(), rating_label(n as f32), f.min_rating == n as f32))
            .collect();
        // A fractional threshold from the URL gets its own option so the form resubmits it.
        if f.min_rating.fract() != 0.0 {
            let at = (f.min_rating.floor() as usize + 1).min(ratings.len());
            let value = f.min_rating.to_string();
            ratings.insert(at, Choice::new(value, rating_label(f.min_rating), true));
        }

        let (year_from, year_to) = match f.years {
            YearFilter::Range { from, to } => (
                (from != i32::MIN).then(|| from.to_string()).unwrap_or_default(),
                (to != i32::MAX).then(|| to.to_string()).unwrap_or_default(),
            ),
            _ => (String::new(), String::new()),
        };

        Self {
            kinds,
            genres: GENRES
                .iter()
                .map(|g| Choice::new(*g, *g, f.genres.iter().any(|s| s == g)))
                .collect(),
            decades,
            languages,
            sorts: SortKey::ALL
                .iter()
                .map(|s| Choice::new(s.as_str(), s.label(), *s == state.sort))
                .collect(),
            ratings,
            ten_scale: f.rating_scale == RatingScale::Ten,
            year_from,
            year_to,
            has_active: f.has_active(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExploreView {
    pub query: String,
    pub result_count: usize,
    pub result_label: String,
    pub cards: Vec<CardView>,
    pub pagination: Option<PaginationView>,
    pub sidebar: SidebarView,
    pub clear_href: String,
    pub share_href: String,
}

impl ExploreView {
    pub fn build(state: &ExploreState, page: &Page<Media>) -> Self {
        Self {
            query: state.filters.query.clone(),
            result_count: page.total_items,
            result_label: results_label(page.total_items),
            cards: cards(&page.items),
            pagination: PaginationView::build(state, page),
            sidebar: SidebarView::build(state),
            clear_href: state.cleared().href(),
            share_href: state.with_page(page.page).href(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

pub const FEATURES: [Feature; 6] = [
    Feature {
        title: "Organize your watchlist",
        description: "Build lists for movies, series and anime. \
                      Mark what you've seen and what's next.",
    },
    Feature {
        title: "Rate and review",
        description: "Score every title and share your take with the community.",
    },
    Feature {
        title: "Achievements and stats",
        description: "Unlock achievements as you go and see your viewing habits.",
    },
    Feature {
        title: "Community",
        description: "Connect with other fans, find recommendations and share your lists.",
    },
    Feature {
        title: "Notifications",
        description: "Get alerts when new episodes or movies you care about come out.",
    },
    Feature {
        title: "Detailed statistics",
        description: "See how much time you've spent watching and your favorite genres.",
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub trending: Vec<CardView>,
    pub features: &'static [Feature],
}

#[derive(Debug, Clone, Serialize)]
pub struct StatItem {
    pub label: &'static str,
    pub value: String,
    pub percent: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsView {
    pub items: Vec<StatItem>,
    pub total: String,
}

impl StatsView {
    pub fn build(stats: &EngagementStats) -> Self {
        let total = stats.total();
        let percent = |n: u64| {
            if total == 0 {
                0.0
            } else {
                (n as f64 / total as f64 * 1000.0).round() as f32 / 10.0
            }
        };
        Self {
            items: vec![
                StatItem {
                    label: "Currently Watching",
                    value: group_thousands(stats.watching),
                    percent: percent(stats.watching),
                },
                StatItem {
                    label: "Completed",
                    value: group_thousands(stats.completed),
                    percent: percent(stats.completed),
                },
                StatItem {
                    label: "Plan to Watch",
                    value: group_thousands(stats.plan_to_watch),
                    percent: percent(stats.plan_to_watch),
                },
            ],
            total: group_thousands(total),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EpisodeView {
    pub id: String,
    pub number: u32,
    pub title: String,
    pub duration: u32,
    pub thumbnail: String,
    pub watched: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonTab {
    pub id: String,
    pub label: String,
    pub href: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EpisodeListView {
    pub seasons: Vec<SeasonTab>,
    pub season_id: String,
    pub episodes: Vec<EpisodeView>,
    pub progress: SeasonProgress,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub current: Option<&'static str>,
    pub current_label: Option<&'static str>,
    pub options: Vec<Choice>,
    pub rating_stars: Vec<bool>,
    pub user_rating: Option<u8>,
    pub is_favorite: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub rewatches: u32,
    pub notes: String,
    /// Sidebar shows only for a signed-in user with a status.
    pub show_sidebar: bool,
    pub episode_progress: Option<f32>,
}

impl StatusView {
    pub fn build(status: &UserMediaStatus, signed_in: bool, total_episodes: Option<u32>) -> Self {
        let episode_progress = match (total_episodes, status.current_episode) {
            (Some(total), Some(current)) if total > 0 => {
                Some((current as f32 / total as f32 * 100.0).min(100.0))
            }
            _ => None,
        };
        Self {
            current: status.status.map(|s| s.as_str()),
            current_label: status.status.map(|s| s.label()),
            options: WatchStatus::ALL
                .iter()
                .map(|s| Choice::new(s.as_str(), s.label(), status.status == Some(*s)))
                .collect(),
            rating_stars: stars(status.user_rating.unwrap_or(0)),
            user_rating: status.user_rating,
            is_favorite: status.is_favorite,
            start_date: status.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
            end_date: status.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
            rewatches: status.rewatches,
            notes: status.notes.clone(),
            show_sidebar: signed_in && status.status.is_some(),
            episode_progress,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListChoice {
    pub id: String,
    pub name: String,
    pub icon: Option<&'static str>,
    pub detail: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddToListView {
    pub quick: Vec<ListChoice>,
    pub own: Vec<ListChoice>,
}

impl AddToListView {
    pub fn build(user_lists: &[UserList], selected: &[String]) -> Self {
        let is_selected = |id: &str| selected.iter().any(|s| s == id);
        Self {
            quick: QUICK_LISTS
                .iter()
                .map(|l| ListChoice {
                    id: l.id.to_string(),
                    name: l.name.to_string(),
                    icon: Some(l.icon),
                    detail: None,
                    selected: is_selected(l.id),
                })
                .collect(),
            own: user_lists
                .iter()
                .map(|l| ListChoice {
                    id: l.id.clone(),
                    name: l.name.clone(),
                    icon: None,
                    detail: Some(format!(
                        "{} items · {}",
                        l.item_count,
                        if l.is_public { "Public" } else { "Private" }
                    )),
                    selected: is_selected(&l.id),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub card: CardView,
    pub backdrop: String,
    pub synopsis: String,
    pub genres: Vec<String>,
    pub language: String,
    pub runtime: Option<u32>,
    pub total_episodes: Option<u32>,
    pub director: Option<String>,
    pub creator: Option<String>,
    pub tags: Vec<String>,
    pub trailer_url: Option<String>,
    pub cast: Vec<crate::models::CastMember>,
    pub episodes: Option<EpisodeListView>,
    pub stats: StatsView,
    pub status: StatusView,
    pub similar: Vec<CardView>,
    pub add_to_list: Option<AddToListView>,
}

/// Everything the detail page needs besides the record itself.
pub struct DetailInputs<'a> {
    pub status: &'a UserMediaStatus,
    pub signed_in: bool,
    pub episode_overrides: &'a HashMap<String, bool>,
    pub selected_season: Option<&'a str>,
    pub similar: &'a [Media],
    /// `Some` when the add-to-list dialog is open.
    pub add_to_list: Option<AddToListView>,
}

impl DetailView {
    pub fn build(details: &MediaDetails, inputs: DetailInputs<'_>) -> Self {
        let media = &details.media;
        let is_watched =
            |id: &str, seed: bool| inputs.episode_overrides.get(id).copied().unwrap_or(seed);
        let listed_episodes = details
            .seasons
            .as_deref()
            .map(|seasons| seasons.iter().map(|s| s.episodes.len() as u32).sum());

        let episodes = details.seasons.as_deref().and_then(|seasons| {
            let selected = inputs
                .selected_season
                .and_then(|id| seasons.iter().find(|s| s.id == id))
                .or_else(|| seasons.first())?;
            Some(EpisodeListView {
                seasons: seasons
                    .iter()
                    .map(|s| SeasonTab {
                        id: s.id.clone(),
                        label: format!("Season {}", s.number),
                        href: format!("/media/{}?season={}", media.id, s.id),
                        selected: s.id == selected.id,
                    })
                    .collect(),
                season_id: selected.id.clone(),
                episodes: selected
                    .episodes
                    .iter()
                    .map(|e| EpisodeView {
                        id: e.id.clone(),
                        number: e.number,
                        title: e.title.clone(),
                        duration: e.duration,
                        thumbnail: e.thumbnail.clone(),
                        watched: is_watched(&e.id, e.watched),
                    })
                    .collect(),
                progress: season_progress(selected, |e| is_watched(&e.id, e.watched)),
            })
        });

        Self {
            card: CardView::from(media),
            backdrop: details.backdrop.clone(),
            synopsis: details.synopsis.clone(),
            genres: media.genres.clone(),
            language: catalog::language_name(&media.language)
                .unwrap_or(media.language.as_str())
                .to_string(),
            runtime: details.runtime,
            total_episodes: details.total_episodes,
            director: details.director.clone(),
            creator: details.creator.clone(),
            tags: details.tags.clone(),
            trailer_url: details.trailer_url.clone(),
            cast: details.cast.clone(),
            episodes,
            stats: StatsView::build(&details.stats),
            status: StatusView::build(inputs.status, inputs.signed_in, listed_episodes),
            similar: cards(inputs.similar),
            add_to_list: inputs.add_to_list,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTab {
    #[default]
    All,
    Content,
    Users,
    Lists,
}

impl SearchTab {
    pub const ALL: [SearchTab; 4] = [
        SearchTab::All,
        SearchTab::Content,
        SearchTab::Users,
        SearchTab::Lists,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchTab::All => "all",
            SearchTab::Content => "content",
            SearchTab::Users => "users",
            SearchTab::Lists => "lists",
        }
    }

    pub fn parse(value: Option<&str>) -> Self {
        SearchTab::ALL
            .into_iter()
            .find(|t| Some(t.as_str()) == value)
            .unwrap_or_default()
    }

    fn shows(&self, section: SearchTab) -> bool {
        *self == SearchTab::All || *self == section
    }
}

/// Content results the "all" tab previews.
pub const SEARCH_PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct TabLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchView {
    pub query: String,
    pub tabs: Vec<TabLink>,
    pub content: Vec<CardView>,
    pub content_total: usize,
    pub users: Vec<CommunityUser>,
    pub lists: Vec<UserList>,
    pub has_results: bool,
}

impl SearchView {
    pub fn build(
        query: &str,
        tab: SearchTab,
        media: &[Media],
        users: &[CommunityUser],
        lists: &[UserList],
    ) -> Self {
        let query = query.trim();
        let needle = query.to_lowercase();
        let content: Vec<&Media> = if needle.is_empty() {
            Vec::new()
        } else {
            media
                .iter()
                .filter(|m| m.title.to_lowercase().contains(&needle))
                .collect()
        };
        let users: Vec<CommunityUser> = users
            .iter()
            .filter(|u| {
                !needle.is_empty()
                    && (u.username.to_lowercase().contains(&needle)
                        || u.display_name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        let lists: Vec<UserList> = lists
            .iter()
            .filter(|l| !needle.is_empty() && l.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let has_results = !content.is_empty() || !users.is_empty() || !lists.is_empty();
        let limit = if tab == SearchTab::All {
            SEARCH_PREVIEW_LIMIT
        } else {
            usize::MAX
        };

        Self {
            query: query.to_string(),
            tabs: SearchTab::ALL
                .iter()
                .map(|t| TabLink {
                    label: match t {
                        SearchTab::All => "All",
                        SearchTab::Content => "Content",
                        SearchTab::Users => "Users",
                        SearchTab::Lists => "Lists",
                    },
                    href: format!("/search?q={}&tab={}", urlencoding::encode(query), t.as_str()),
                    active: *t == tab,
                })
                .collect(),
            content_total: content.len(),
            content: if tab.shows(SearchTab::Content) {
                content.into_iter().take(limit).map(CardView::from).collect()
            } else {
                Vec::new()
            },
            users: if tab.shows(SearchTab::Users) { users } else { Vec::new() },
            lists: if tab.shows(SearchTab::Lists) { lists } else { Vec::new() },
            has_results,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StrengthView {
    pub level: u8,
    pub label: &'static str,
}

impl From<PasswordStrength> for StrengthView {
    fn from(strength: PasswordStrength) -> Self {
        Self {
            level: strength.level(),
            label: strength.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordView {
    pub token: Option<String>,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogView {
    pub query: String,
    pub results: Vec<CardView>,
    pub selected: Option<CardView>,
    pub today: String,
    pub rating_options: Vec<u8>,
}
