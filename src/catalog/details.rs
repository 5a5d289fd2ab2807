use crate::models::{CastMember, EngagementStats, Episode, Media, MediaDetails, MediaKind, Season};
use sha2::{Digest, Sha256};

const BACKDROP_BASE: &str = "https://image.tmdb.org/t/p/original";

/// Deterministic stand-in for a random draw in `0..modulo`, keyed by id and salt.
pub fn seeded_value(id: &str, salt: &str, modulo: u64) -> u64 {
    if modulo == 0 {
        return 0;
    }
    let digest = Sha256::digest(format!("{id}:{salt}").as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head) % modulo
}

fn cast(entries: &[(&str, &str, &str, u32)]) -> Vec<CastMember> {
    entries
        .iter()
        .map(|(id, name, character, img)| CastMember {
            id: id.to_string(),
            name: name.to_string(),
            character: character.to_string(),
            avatar: format!("https://i.pravatar.cc/150?img={img}"),
        })
        .collect()
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| t.to_string()).collect()
}

fn episodes(media_id: &str, season: u32, count: u32) -> Vec<Episode> {
    (0..count)
        .map(|i| Episode {
            id: format!("s{season}-ep-{}", i + 1),
            number: i + 1,
            title: format!("Episode {}", i + 1),
            duration: 42 + seeded_value(media_id, &format!("s{season}e{i}"), 20) as u32,
            thumbnail: format!("https://picsum.photos/seed/{}/320/180", i + 100),
            watched: i < 3,
        })
        .collect()
}

fn seasons(media_id: &str, count: u32) -> Vec<Season> {
    (1..=count)
        .map(|number| {
            let episode_count = 8 + seeded_value(media_id, &format!("season-{number}"), 5) as u32;
            Season {
                id: format!("s-{number}"),
                number,
                episode_count,
                episodes: episodes(media_id, number, episode_count),
            }
        })
        .collect()
}

/// Expands a catalog entry into its detail record.
///
/// The first three entries carry curated details; the rest are generated
/// from the entry itself. Generated numbers are stable for a given id.
pub fn build_details(media: &Media) -> MediaDetails {
    match media.id.as_str() {
        "1" => MediaDetails {
            media: media.clone(),
            backdrop: format!("{BACKDROP_BASE}/8ZTVqvKDQ8emSGUEMjsS4yHAwrp.jpg"),
            synopsis:
                "A thief who steals corporate secrets through the use of dream-sharing technology \
                 is given the inverse task of planting an idea into the mind of a C.E.O., \
                 but his tragic past may doom the project and his team to disaster."
                    .to_string(),
            director: Some("Christopher Nolan".to_string()),
            creator: None,
            cast: cast(&[
                ("c1", "Leonardo DiCaprio", "Cobb", 11),
                ("c2", "Joseph Gordon-Levitt", "Arthur", 12),
                ("c3", "Elliot Page", "Ariadne", 13),
                ("c4", "Tom Hardy", "Eames", 14),
            ]),
            tags: tags(&["Mind-bending", "Heist", "Dreams", "Thriller", "Cerebral"]),
            trailer_url: Some("https://www.youtube.com/embed/YoHD9XEInc0".to_string()),
            seasons: None,
            runtime: Some(148),
            total_episodes: None,
            stats: EngagementStats {
                watching: 1234,
                completed: 45678,
                plan_to_watch: 8901,
            },
        },
        "2" => MediaDetails {
            media: media.clone(),
            backdrop: format!("{BACKDROP_BASE}/tsRy63Mu5cu8etL1X7ZLyf7UP1M.jpg"),
            synopsis:
                "A chemistry teacher diagnosed with inoperable lung cancer turns to manufacturing \
                 and selling methamphetamine with a former student in order to secure \
                 his family's future."
                    .to_string(),
            director: None,
            creator: Some("Vince Gilligan".to_string()),
            cast: cast(&[
                ("c5", "Bryan Cranston", "Walter White", 15),
                ("c6", "Aaron Paul", "Jesse Pinkman", 16),
                ("c7", "Anna Gunn", "Skyler White", 17),
                ("c8", "Dean Norris", "Hank Schrader", 18),
            ]),
            tags: tags(&["Crime", "Transformation", "Family", "Drugs", "Antihero"]),
            trailer_url: Some("https://www.youtube.com/embed/HhesaQXLuRY".to_string()),
            seasons: Some(seasons(&media.id, 5)),
            runtime: None,
            total_episodes: Some(62),
            stats: EngagementStats {
                watching: 2345,
                completed: 67890,
                plan_to_watch: 12345,
            },
        },
        "3" => MediaDetails {
            media: media.clone(),
            backdrop: format!("{BACKDROP_BASE}/rqbCbjB19amtOtFQbb3K2lgm2zv.jpg"),
            synopsis:
                "After his hometown is destroyed and his mother is killed, young Eren Jaeger vows \
                 to cleanse the earth of the giant humanoid Titans that have brought \
                 humanity to the brink of extinction."
                    .to_string(),
            director: None,
            creator: Some("Hajime Isayama".to_string()),
            cast: cast(&[
                ("c9", "Yuki Kaji", "Eren Jaeger", 19),
                ("c10", "Yui Ishikawa", "Mikasa Ackerman", 20),
                ("c11", "Marina Inoue", "Armin Arlert", 21),
                ("c12", "Hiroshi Kamiya", "Levi Ackerman", 22),
            ]),
            tags: tags(&["Titans", "Survival", "War", "Dark Fantasy", "Shounen"]),
            trailer_url: Some("https://www.youtube.com/embed/MGRm4IzK1SQ".to_string()),
            seasons: Some(seasons(&media.id, 4)),
            runtime: None,
            total_episodes: Some(87),
            stats: EngagementStats {
                watching: 5678,
                completed: 89012,
                plan_to_watch: 23456,
            },
        },
        _ => generated_details(media),
    }
}

fn generated_details(media: &Media) -> MediaDetails {
    let id = media.id.as_str();
    let is_movie = media.kind == MediaKind::Movie;
    let img_base: u32 = id.parse::<u32>().unwrap_or(0) + 30;
    let genres = media.genres.join(", ").to_lowercase();

    MediaDetails {
        media: media.clone(),
        backdrop: media.poster.replace("/w500/", "/original/"),
        synopsis: format!(
            "{} is a captivating {} that has earned a rating of {}. It explores themes of {} \
             in a unique and engaging way that keeps audiences hooked from start to finish.",
            media.title, media.kind, media.rating, genres
        ),
        director: is_movie.then(|| "Director Name".to_string()),
        creator: (!is_movie).then(|| "Creator Name".to_string()),
        cast: ["One", "Two", "Three"]
            .iter()
            .zip(["Main Character", "Supporting Role", "Another Role"])
            .enumerate()
            .map(|(i, (ordinal, character))| CastMember {
                id: format!("cast-{id}-{}", i + 1),
                name: format!("Actor {ordinal}"),
                character: character.to_string(),
                avatar: format!("https://i.pravatar.cc/150?img={}", img_base + i as u32),
            })
            .collect(),
        tags: media.genres.clone(),
        trailer_url: None,
        seasons: (!is_movie).then(|| seasons(id, seeded_value(id, "seasons", 5) as u32 + 1)),
        runtime: is_movie.then(|| 90 + seeded_value(id, "runtime", 60) as u32),
        total_episodes: (!is_movie).then(|| seeded_value(id, "episodes", 50) as u32 + 12),
        stats: EngagementStats {
            watching: seeded_value(id, "watching", 5000),
            completed: seeded_value(id, "completed", 50000) + 10000,
            plan_to_watch: seeded_value(id, "plan", 10000),
        },
    }
}
