//! Static seed dataset standing in for a real backend.
use crate::models::{CommunityUser, Language, Media, MediaKind, UserList};
use once_cell::sync::Lazy;

mod details;

pub use details::{build_details, seeded_value};

const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";

pub const GENRES: [&str; 14] = [
    "Action",
    "Adventure",
    "Animation",
    "Comedy",
    "Crime",
    "Drama",
    "Family",
    "Fantasy",
    "History",
    "Horror",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Thriller",
];

pub const LANGUAGES: [Language; 6] = [
    Language { code: "en", name: "English" },
    Language { code: "ja", name: "Japanese" },
    Language { code: "ko", name: "Korean" },
    Language { code: "de", name: "German" },
    Language { code: "es", name: "Spanish" },
    Language { code: "fr", name: "French" },
];

/// Decade buckets offered by the filter UI, newest first.
pub const DECADES: [i32; 5] = [2020, 2010, 2000, 1990, 1980];

pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES.iter().find(|l| l.code == code).map(|l| l.name)
}

type SeedRow = (
    &'static str,
    &'static str,
    i32,
    &'static str,
    f32,
    MediaKind,
    &'static [&'static str],
    &'static str,
);

#[rustfmt::skip]
const SEED: [SeedRow; 24] = [
    ("1", "Inception", 2010, "ljsZTbVsrQJpxXcJ7jX6B1ZmzLy", 8.8, MediaKind::Movie, &["Sci-Fi", "Action", "Thriller"], "en"),
    ("2", "Breaking Bad", 2008, "ggFHVNu6YYI5L9pCfOacjizRGt", 9.5, MediaKind::Series, &["Drama", "Crime", "Thriller"], "en"),
    ("3", "Attack on Titan", 2013, "hTP1DtLGFamjfu8WqjnuQdP1n4i", 9.0, MediaKind::Anime, &["Action", "Drama", "Fantasy"], "ja"),
    ("4", "The Dark Knight", 2008, "qJ2tW6WMUDux911r6m7haRef0WH", 9.0, MediaKind::Movie, &["Action", "Crime", "Drama"], "en"),
    ("5", "Stranger Things", 2016, "49WJfeN0moxb9IPfGn8AIqMGskD", 8.7, MediaKind::Series, &["Drama", "Fantasy", "Horror"], "en"),
    ("6", "Demon Slayer", 2019, "xUfRZu2mi8jH6SzQEJGP6bMmKLB", 8.7, MediaKind::Anime, &["Action", "Fantasy", "Adventure"], "ja"),
    ("7", "Interstellar", 2014, "gEU2QniE6E77NI6lCU6MxlNBvIx", 8.6, MediaKind::Movie, &["Adventure", "Drama", "Sci-Fi"], "en"),
    ("8", "Game of Thrones", 2011, "1XS1oqL89opfnbLl8WnZY1O1uJx", 9.2, MediaKind::Series, &["Action", "Adventure", "Drama"], "en"),
    ("9", "My Hero Academia", 2016, "ivOLM47yJt90P19RH1NvJrAJz9F", 8.4, MediaKind::Anime, &["Action", "Comedy", "Fantasy"], "ja"),
    ("10", "Pulp Fiction", 1994, "d5iIlFn5s0ImszYzBPb8JPIfbXD", 8.9, MediaKind::Movie, &["Crime", "Drama"], "en"),
    ("11", "The Office", 2005, "qWnJzyZhyy74gjpSjIXWmuk0ifX", 8.9, MediaKind::Series, &["Comedy"], "en"),
    ("12", "Death Note", 2006, "iigTJJskR1PcjjXqxdyJwVB3BoU", 9.0, MediaKind::Anime, &["Mystery", "Thriller", "Drama"], "ja"),
    ("13", "The Matrix", 1999, "f89U3ADr1oiB1s9GkdPOEpXUk5H", 8.7, MediaKind::Movie, &["Action", "Sci-Fi"], "en"),
    ("14", "The Mandalorian", 2019, "sWgBv7LV2PRoQgkxwlibdGXKz1S", 8.7, MediaKind::Series, &["Action", "Adventure", "Sci-Fi"], "en"),
    ("15", "Jujutsu Kaisen", 2020, "hFWP5HkbVEe40hrXgtCeQxoccHE", 8.6, MediaKind::Anime, &["Action", "Fantasy", "Horror"], "ja"),
    ("16", "Parasite", 2019, "7IiTTgloJzvGI1TAYymCfbfl3vT", 8.5, MediaKind::Movie, &["Comedy", "Drama", "Thriller"], "ko"),
    ("17", "The Witcher", 2019, "7vjaCdMw15FEbXyLQTVa04URsPm", 8.2, MediaKind::Series, &["Action", "Adventure", "Drama"], "en"),
    ("18", "One Piece", 1999, "cMD9Ygz11zjJzAovURpO75Qg7rT", 8.9, MediaKind::Anime, &["Action", "Adventure", "Comedy"], "ja"),
    ("19", "Fight Club", 1999, "pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK", 8.8, MediaKind::Movie, &["Drama"], "en"),
    ("20", "Chernobyl", 2019, "hlLXt2tOPT6RRnjiUmoxyG1LTFi", 9.4, MediaKind::Series, &["Drama", "History", "Thriller"], "en"),
    ("21", "Fullmetal Alchemist", 2009, "lz4xYdF1n09lyiCfZWtWT44AaK1", 9.1, MediaKind::Anime, &["Action", "Adventure", "Drama"], "ja"),
    ("22", "Spirited Away", 2001, "39wmItIWsg5sZMyRUHLkWBcuVCM", 8.6, MediaKind::Anime, &["Animation", "Adventure", "Family"], "ja"),
    ("23", "The Shawshank Redemption", 1994, "q6y0Go1tsGEsmtFryDOJo3dEmqu", 9.3, MediaKind::Movie, &["Drama"], "en"),
    ("24", "Dark", 2017, "apbrbWs8M9lyOpJYU5WXrpFbk1Z", 8.8, MediaKind::Series, &["Crime", "Drama", "Mystery"], "de"),
];

static MEDIA: Lazy<Vec<Media>> = Lazy::new(|| {
    SEED.iter()
        .map(|(id, title, year, poster, rating, kind, genres, language)| Media {
            id: id.to_string(),
            title: title.to_string(),
            year: *year,
            poster: format!("{POSTER_BASE}/{poster}.jpg"),
            rating: *rating,
            kind: *kind,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            language: language.to_string(),
        })
        .collect()
});

/// The full catalog in source order. Source order doubles as popularity order.
pub fn media() -> &'static [Media] {
    &MEDIA
}

pub fn community_users() -> Vec<CommunityUser> {
    [
        (
            "u1",
            "moviebuff42",
            "Alex Johnson",
            1,
            "Film enthusiast and critic. Always looking for the next great movie to watch.",
        ),
        (
            "u2",
            "animefan_yuki",
            "Yuki Tanaka",
            2,
            "Anime lover since childhood. Currently watching 10+ shows!",
        ),
        (
            "u3",
            "series_addict",
            "Maria Garcia",
            3,
            "Binge watcher extraordinaire. Ask me about any series!",
        ),
    ]
    .into_iter()
    .map(|(id, username, display_name, img, bio)| CommunityUser {
        id: id.to_string(),
        username: username.to_string(),
        display_name: display_name.to_string(),
        avatar: format!("https://i.pravatar.cc/150?img={img}"),
        bio: bio.to_string(),
    })
    .collect()
}

pub fn user_lists() -> Vec<UserList> {
    [
        ("list1", "Best Sci-Fi Movies", "gEU2QniE6E77NI6lCU6MxlNBvIx", 25, true),
        ("list2", "Weekend Binge", "ggFHVNu6YYI5L9pCfOacjizRGt", 12, true),
        ("list3", "Hidden Gems", "7IiTTgloJzvGI1TAYymCfbfl3vT", 8, false),
    ]
    .into_iter()
    .map(|(id, name, cover, item_count, is_public)| UserList {
        id: id.to_string(),
        name: name.to_string(),
        cover: format!("{POSTER_BASE}/{cover}.jpg"),
        item_count,
        is_public,
    })
    .collect()
}
