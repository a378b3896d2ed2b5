//! Maps raw TMDB JSON onto the display model.
//!
//! Every function here is total: missing or mistyped fields become `None`,
//! empty collections or `false`. Only a record without a numeric `id` is
//! rejected, since nothing downstream can address it.

use std::collections::BTreeMap;

use marquee_core::catalog::{
    CastMember, CatalogItem, Credits, CrewMember, Details, Genre, Page, Provider,
    RegionProviders, WatchProviders,
};
use marquee_core::types::ContentType;
use serde_json::Value;

fn string(v: &Value) -> Option<String> {
    v.as_str().map(|s| s.to_string())
}

/// Leading year of an ISO date, e.g. `2010` for `"2010-07-16"`.
pub fn parse_year(date: Option<&str>) -> Option<i32> {
    let head = date?.get(..4)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    head.parse().ok()
}

/// Normalize a list record or detail record of either content type.
pub fn item(content_type: ContentType, data: &Value) -> Option<CatalogItem> {
    let id = data["id"].as_u64()?;

    // Shows use name / first_air_date where movies use title / release_date.
    let (title_key, original_key, date_key) = match content_type {
        ContentType::Movie => ("title", "original_title", "release_date"),
        ContentType::Tv => ("name", "original_name", "first_air_date"),
    };

    let release_date = data[date_key].as_str().filter(|d| !d.is_empty());

    let mut genre_ids: Vec<u64> = data["genre_ids"]
        .as_array()
        .map(|ids| ids.iter().filter_map(Value::as_u64).collect())
        .unwrap_or_default();
    if genre_ids.is_empty() {
        // detail records carry full genre objects instead of ids
        genre_ids = genres(data).into_iter().map(|g| g.id).collect();
    }

    Some(CatalogItem {
        id,
        content_type,
        title: string(&data[title_key]),
        original_title: string(&data[original_key]),
        overview: string(&data["overview"]),
        release_date: release_date.map(|d| d.to_string()),
        year: parse_year(release_date),
        rating: data["vote_average"].as_f64(),
        vote_count: data["vote_count"].as_u64(),
        popularity: data["popularity"].as_f64(),
        adult: data["adult"].as_bool().unwrap_or(false),
        genre_ids,
        poster_path: string(&data["poster_path"]),
        backdrop_path: string(&data["backdrop_path"]),
        original_language: string(&data["original_language"]),
    })
}

pub fn page(content_type: ContentType, data: &Value) -> Page<CatalogItem> {
    let results = data["results"]
        .as_array()
        .map(|rs| rs.iter().filter_map(|r| item(content_type, r)).collect())
        .unwrap_or_default();

    Page {
        page: data["page"].as_u64().unwrap_or(1) as u32,
        total_pages: data["total_pages"].as_u64().unwrap_or(0) as u32,
        total_results: data["total_results"].as_u64().unwrap_or(0),
        results,
    }
}

/// Genre objects from either a `/genre/*/list` body or a detail record.
pub fn genres(data: &Value) -> Vec<Genre> {
    data["genres"]
        .as_array()
        .map(|gs| {
            gs.iter()
                .filter_map(|g| {
                    Some(Genre {
                        id: g["id"].as_u64()?,
                        name: g["name"].as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn details(content_type: ContentType, data: &Value) -> Option<Details> {
    let item = item(content_type, data)?;

    let runtime_minutes = match content_type {
        ContentType::Movie => data["runtime"].as_u64(),
        ContentType::Tv => data["episode_run_time"]
            .as_array()
            .and_then(|a| a.first())
            .and_then(Value::as_u64),
    }
    .map(|r| r as u32);

    Some(Details {
        item,
        tagline: string(&data["tagline"]).filter(|t| !t.is_empty()),
        runtime_minutes,
        status: string(&data["status"]),
        homepage: string(&data["homepage"]).filter(|h| !h.is_empty()),
        genres: genres(data),
        production_companies: data["production_companies"]
            .as_array()
            .map(|cs| {
                cs.iter()
                    .filter_map(|c| c["name"].as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default(),
    })
}

pub fn credits(data: &Value) -> Credits {
    let cast = data["cast"]
        .as_array()
        .map(|cast| {
            cast.iter()
                .enumerate()
                .filter_map(|(i, person)| {
                    Some(CastMember {
                        name: person["name"].as_str()?.to_string(),
                        character: string(&person["character"]).filter(|c| !c.is_empty()),
                        profile_path: string(&person["profile_path"]),
                        order: person["order"].as_u64().unwrap_or(i as u64) as u32,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let crew = data["crew"]
        .as_array()
        .map(|crew| {
            crew.iter()
                .filter_map(|person| {
                    Some(CrewMember {
                        name: person["name"].as_str()?.to_string(),
                        job: string(&person["job"]),
                        department: string(&person["department"]),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Credits { cast, crew }
}

fn providers(list: &Value) -> Vec<Provider> {
    list.as_array()
        .map(|ps| {
            ps.iter()
                .filter_map(|p| {
                    Some(Provider {
                        id: p["provider_id"].as_u64()?,
                        name: p["provider_name"].as_str()?.to_string(),
                        logo_path: string(&p["logo_path"]),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn watch_providers(data: &Value) -> WatchProviders {
    let regions: BTreeMap<String, RegionProviders> = data["results"]
        .as_object()
        .map(|rs| {
            rs.iter()
                .map(|(code, region)| {
                    (
                        code.clone(),
                        RegionProviders {
                            link: string(&region["link"]),
                            flatrate: providers(&region["flatrate"]),
                            rent: providers(&region["rent"]),
                            buy: providers(&region["buy"]),
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    WatchProviders { regions }
}
