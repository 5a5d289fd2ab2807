//! Explore-page pipeline: search, filter, sort and paginate the catalog.
//!
//! Stages always run in the same order: text search, type, genres (match any),
//! year range or decade, minimum rating, language, then sort and page.
use crate::models::{Media, MediaKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::debug;

pub const ITEMS_PER_PAGE: usize = 12;

/// Lower bound of the year slider.
pub const YEAR_RANGE_FLOOR: i32 = 1990;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Catalog order.
    #[default]
    Popularity,
    Rating,
    Year,
    Title,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Popularity,
        SortKey::Rating,
        SortKey::Year,
        SortKey::Title,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Popularity => "popularity",
            SortKey::Rating => "rating",
            SortKey::Year => "year",
            SortKey::Title => "title",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Popularity => "Popularity",
            SortKey::Rating => "Highest rated",
            SortKey::Year => "Newest",
            SortKey::Title => "A-Z",
        }
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| anyhow::anyhow!("Unknown sort key '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum YearFilter {
    #[default]
    Any,
    /// Inclusive on both ends.
    Range { from: i32, to: i32 },
    /// `[start, start + 10)`.
    Decade(i32),
}

impl YearFilter {
    pub fn contains(&self, year: i32) -> bool {
        match *self {
            YearFilter::Any => true,
            YearFilter::Range { from, to } => year >= from && year <= to,
            YearFilter::Decade(start) => year >= start && year < start.saturating_add(10),
        }
    }
}

/// Scale the minimum-rating control is expressed in. Catalog ratings are 0–10.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingScale {
    /// Five stars, each worth two rating points.
    #[default]
    Stars,
    Ten,
}

impl RatingScale {
    pub fn max(&self) -> f32 {
        match self {
            RatingScale::Stars => 5.0,
            RatingScale::Ten => 10.0,
        }
    }

    pub fn to_ten(&self, value: f32) -> f32 {
        match self {
            RatingScale::Stars => value * 2.0,
            RatingScale::Ten => value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    pub query: String,
    pub kind: Option<MediaKind>,
    pub genres: Vec<String>,
    pub years: YearFilter,
    /// Zero disables the threshold.
    pub min_rating: f32,
    pub rating_scale: RatingScale,
    pub language: Option<String>,
}

impl Filters {
    /// Whether any sidebar filter differs from its default. Free text is not a filter.
    pub fn has_active(&self) -> bool {
        self.kind.is_some()
            || !self.genres.is_empty()
            || self.years != YearFilter::Any
            || self.min_rating > 0.0
            || self.language.is_some()
    }

    pub fn clear(&mut self) {
        *self = Filters::default();
    }

    pub fn toggle_genre(&mut self, genre: &str) {
        if let Some(pos) = self.genres.iter().position(|g| g == genre) {
            self.genres.remove(pos);
        } else {
            self.genres.push(genre.to_string());
        }
    }

    /// Threshold on the catalog's 0–10 scale, if one is active.
    pub fn rating_threshold(&self) -> Option<f32> {
        (self.min_rating > 0.0).then(|| self.rating_scale.to_ten(self.min_rating))
    }
}

fn matches_query(media: &Media, needle: &str) -> bool {
    media.title.to_lowercase().contains(needle)
        || media.genres.iter().any(|g| g.to_lowercase().contains(needle))
}

fn compare(a: &Media, b: &Media, sort: SortKey) -> Ordering {
    match sort {
        SortKey::Popularity => Ordering::Equal,
        SortKey::Rating => b.rating.total_cmp(&a.rating),
        SortKey::Year => b.year.cmp(&a.year),
        SortKey::Title => a
            .title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title)),
    }
}

/// Runs the full filter and sort pipeline. The result is always a subset of
/// `items` satisfying every active predicate.
pub fn apply(items: &[Media], filters: &Filters, sort: SortKey) -> Vec<Media> {
    let needle = filters.query.trim().to_lowercase();
    let threshold = filters.rating_threshold();

    let mut result: Vec<Media> = items
        .iter()
        .filter(|m| needle.is_empty() || matches_query(m, &needle))
        .filter(|m| filters.kind.map_or(true, |k| m.kind == k))
        .filter(|m| {
            filters.genres.is_empty() || filters.genres.iter().any(|g| m.genres.contains(g))
        })
        .filter(|m| filters.years.contains(m.year))
        .filter(|m| threshold.map_or(true, |t| m.rating >= t))
        .filter(|m| filters.language.as_deref().map_or(true, |l| m.language == l))
        .cloned()
        .collect();

    // sort_by is stable, so popularity keeps catalog order.
    if sort != SortKey::Popularity {
        result.sort_by(|a, b| compare(a, b, sort));
    }
    debug!(
        total = items.len(),
        matched = result.len(),
        sort = sort.as_str(),
        "Applied catalog filters"
    );
    result
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub fn total_pages(total_items: usize, per_page: usize) -> usize {
    total_items.div_ceil(per_page.max(1))
}

/// Slices one page out of `items`. Out-of-range page numbers are clamped.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_pages = total_pages(items.len(), per_page);
    let page = page.clamp(1, total_pages.max(1));
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());
    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        per_page,
        total_items: items.len(),
        total_pages,
    }
}

/// Raw explore query parameters as they appear in the URL.
///
/// Every field is a string so empty form inputs decode instead of rejecting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExploreQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub decade: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub rating: Option<String>,
    pub scale: Option<String>,
    pub lang: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty() && *v != "all")
}

/// Decoded explore-page state: filters plus sort and current page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreState {
    pub filters: Filters,
    pub sort: SortKey,
    pub page: usize,
}

impl Default for ExploreState {
    fn default() -> Self {
        Self {
            filters: Filters::default(),
            sort: SortKey::default(),
            page: 1,
        }
    }
}

impl ExploreState {
    /// Lenient decode: unknown or malformed values fall back to their defaults.
    pub fn from_query(query: ExploreQuery) -> Self {
        let kind = non_empty(&query.kind).and_then(|k| match k.parse::<MediaKind>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                debug!("Ignoring type filter: {}", e);
                None
            }
        });

        let mut genres: Vec<String> = Vec::new();
        for raw in &query.genres {
            for g in raw.split(',').map(str::trim).filter(|g| !g.is_empty()) {
                if !genres.iter().any(|existing| existing == g) {
                    genres.push(g.to_string());
                }
            }
        }

        let parse_year = |v: &Option<String>| non_empty(v).and_then(|y| y.parse::<i32>().ok());
        let decade = non_empty(&query.decade)
            .map(|d| d.trim_end_matches('s'))
            .and_then(|d| d.parse::<i32>().ok())
            .and_then(|d| d.checked_sub(d.rem_euclid(10)));
        let years = match (decade, parse_year(&query.from), parse_year(&query.to)) {
            (Some(start), _, _) => YearFilter::Decade(start),
            (None, None, None) => YearFilter::Any,
            (None, from, to) => YearFilter::Range {
                from: from.unwrap_or(i32::MIN),
                to: to.unwrap_or(i32::MAX),
            },
        };

        let rating_scale = match non_empty(&query.scale) {
            Some("10") | Some("ten") => RatingScale::Ten,
            _ => RatingScale::Stars,
        };
        let min_rating = non_empty(&query.rating)
            .and_then(|r| r.parse::<f32>().ok())
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(0.0, rating_scale.max()))
            .unwrap_or(0.0);

        let sort = non_empty(&query.sort)
            .and_then(|s| s.parse::<SortKey>().ok())
            .unwrap_or_default();
        let page = non_empty(&query.page)
            .and_then(|p| p.parse::<usize>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);

        Self {
            filters: Filters {
                query: query.q.map(|q| q.trim().to_string()).unwrap_or_default(),
                kind,
                genres,
                years,
                min_rating,
                rating_scale,
                language: non_empty(&query.lang).map(str::to_string),
            },
            sort,
            page,
        }
    }

    /// Encodes only non-default values, for shareable URLs.
    pub fn to_query(&self) -> String {
        let f = &self.filters;
        let mut params: Vec<(&str, String)> = Vec::new();
        if !f.query.is_empty() {
            params.push(("q", f.query.clone()));
        }
        if let Some(kind) = f.kind {
            params.push(("type", kind.as_str().to_string()));
        }
        if !f.genres.is_empty() {
            params.push(("genres", f.genres.join(",")));
        }
        match f.years {
            YearFilter::Any => {}
            YearFilter::Decade(start) => params.push(("decade", start.to_string())),
            YearFilter::Range { from, to } => {
                if from != i32::MIN {
                    params.push(("from", from.to_string()));
                }
                if to != i32::MAX {
                    params.push(("to", to.to_string()));
                }
            }
        }
        if f.min_rating > 0.0 {
            params.push(("rating", f.min_rating.to_string()));
            if f.rating_scale == RatingScale::Ten {
                params.push(("scale", "10".to_string()));
            }
        }
        if let Some(lang) = &f.language {
            params.push(("lang", lang.clone()));
        }
        if self.sort != SortKey::Popularity {
            params.push(("sort", self.sort.as_str().to_string()));
        }
        if self.page > 1 {
            params.push(("page", self.page.to_string()));
        }
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn with_page(&self, page: usize) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Same state with the filters reset; the search text goes too.
    pub fn cleared(&self) -> Self {
        Self {
            sort: self.sort,
            ..Self::default()
        }
    }

    pub fn href(&self) -> String {
        let query = self.to_query();
        if query.is_empty() {
            "/explore".to_string()
        } else {
            format!("/explore?{}", query)
        }
    }
}
