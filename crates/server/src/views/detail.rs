//! Title detail page.

use marquee_core::catalog::{Credits, Details, Provider, WatchProviders};
use marquee_core::types::ContentType;
use marquee_metadata::images::{AssetKind, ImageSize, ImageUrls};
use serde::Serialize;

use super::SessionView;
use super::card::{rating_label, year_label};
use crate::identity::SessionContext;

pub const TOP_CAST: usize = 10;
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastView {
    pub name: String,
    pub character: Option<String>,
    pub profile_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderView {
    pub name: String,
    pub logo_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvidersView {
    pub region: String,
    pub link: Option<String>,
    pub stream: Vec<ProviderView>,
    pub rent: Vec<ProviderView>,
    pub buy: Vec<ProviderView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub id: u64,
    pub content_type: ContentType,
    pub title: String,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub year: String,
    pub rating: String,
    pub runtime_minutes: Option<u32>,
    pub poster_url: String,
    pub backdrop_url: String,
    pub genres_text: String,
    pub studio: String,
    pub cast: Vec<CastView>,
    pub directors: Vec<String>,
    pub providers: Option<ProvidersView>,
    /// `None` when nobody is signed in.
    pub in_watchlist: Option<bool>,
    pub session: SessionView,
}

/// First two genre names, comma separated.
pub fn genres_text(details: &Details) -> String {
    let names: Vec<&str> = details
        .genres
        .iter()
        .take(2)
        .map(|g| g.name.as_str())
        .collect();
    if names.is_empty() {
        UNKNOWN.to_string()
    } else {
        names.join(", ")
    }
}

fn provider_views(providers: &[Provider], images: &ImageUrls) -> Vec<ProviderView> {
    providers
        .iter()
        .map(|p| ProviderView {
            name: p.name.clone(),
            logo_url: images.thumbnail(p.logo_path.as_deref()),
        })
        .collect()
}

pub struct DetailParts<'a> {
    pub details: &'a Details,
    pub credits: Option<&'a Credits>,
    pub providers: Option<&'a WatchProviders>,
    pub regions: &'a [String],
    pub in_watchlist: Option<bool>,
}

pub fn build(parts: DetailParts<'_>, images: &ImageUrls, session: &SessionContext) -> DetailView {
    let DetailParts {
        details,
        credits,
        providers,
        regions,
        in_watchlist,
    } = parts;
    let item = &details.item;

    let cast = credits
        .map(|c| {
            c.cast
                .iter()
                .take(TOP_CAST)
                .map(|m| CastView {
                    name: m.name.clone(),
                    character: m.character.clone(),
                    profile_url: images.resolve(
                        m.profile_path.as_deref(),
                        ImageSize::Small,
                        AssetKind::Poster,
                    ),
                })
                .collect()
        })
        .unwrap_or_default();

    let directors = credits
        .map(|c| c.directors().map(|d| d.name.clone()).collect())
        .unwrap_or_default();

    let providers = providers
        .and_then(|p| p.for_regions(regions))
        .map(|(region, p)| ProvidersView {
            region: region.to_string(),
            link: p.link.clone(),
            stream: provider_views(&p.flatrate, images),
            rent: provider_views(&p.rent, images),
            buy: provider_views(&p.buy, images),
        });

    DetailView {
        id: item.id,
        content_type: item.content_type,
        title: item.title.clone().unwrap_or_else(|| "Untitled".to_string()),
        tagline: details.tagline.clone().filter(|t| !t.is_empty()),
        overview: item.overview.clone(),
        year: year_label(item.year),
        rating: rating_label(item.rating),
        runtime_minutes: details.runtime_minutes,
        poster_url: images.resolve(item.poster_path.as_deref(), ImageSize::Large, AssetKind::Poster),
        backdrop_url: images.resolve(
            item.backdrop_path.as_deref(),
            ImageSize::Original,
            AssetKind::Backdrop,
        ),
        genres_text: genres_text(details),
        studio: details
            .production_companies
            .first()
            .cloned()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        cast,
        directors,
        providers,
        in_watchlist,
        session: SessionView::from(session),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use marquee_core::catalog::{CastMember, CatalogItem, CrewMember, Genre, RegionProviders};
    use marquee_metadata::images::PLACEHOLDER_IMAGE;

    use super::*;

    fn details() -> Details {
        Details {
            item: CatalogItem {
                id: 603,
                content_type: ContentType::Movie,
                title: Some("The Matrix".into()),
                original_title: None,
                overview: Some("Neo wakes up.".into()),
                release_date: Some("1999-03-30".into()),
                year: Some(1999),
                rating: Some(8.2),
                vote_count: None,
                popularity: None,
                adult: false,
                genre_ids: vec![28, 878, 53],
                poster_path: Some("/matrix.jpg".into()),
                backdrop_path: Some("/matrix-bg.jpg".into()),
                original_language: None,
            },
            tagline: Some("".into()),
            runtime_minutes: Some(136),
            status: None,
            homepage: None,
            genres: vec![
                Genre { id: 28, name: "Action".into() },
                Genre { id: 878, name: "Science Fiction".into() },
                Genre { id: 53, name: "Thriller".into() },
            ],
            production_companies: vec!["Village Roadshow".into(), "Warner Bros.".into()],
        }
    }

    fn provider(name: &str) -> Provider {
        Provider { id: 1, name: name.into(), logo_path: Some("/logo.png".into()) }
    }

    #[test]
    fn full_detail_view() {
        let credits = Credits {
            cast: vec![CastMember {
                name: "Keanu Reeves".into(),
                character: Some("Neo".into()),
                profile_path: None,
                order: 0,
            }],
            crew: vec![
                CrewMember { name: "Lana Wachowski".into(), job: Some("Director".into()), department: None },
                CrewMember { name: "Bill Pope".into(), job: Some("Director of Photography".into()), department: None },
            ],
        };
        let mut regions = BTreeMap::new();
        regions.insert(
            "US".to_string(),
            RegionProviders { flatrate: vec![provider("Max")], ..Default::default() },
        );
        let providers = WatchProviders { regions };
        let preference = vec!["IN".to_string(), "US".to_string()];

        let view = build(
            DetailParts {
                details: &details(),
                credits: Some(&credits),
                providers: Some(&providers),
                regions: &preference,
                in_watchlist: Some(true),
            },
            &ImageUrls::default(),
            &SessionContext::default(),
        );

        assert_eq!(view.poster_url, "https://image.tmdb.org/t/p/w500/matrix.jpg");
        assert_eq!(view.backdrop_url, "https://image.tmdb.org/t/p/original/matrix-bg.jpg");
        assert_eq!(view.genres_text, "Action, Science Fiction");
        assert_eq!(view.studio, "Village Roadshow");
        assert_eq!(view.tagline, None);
        assert_eq!(view.directors, vec!["Lana Wachowski"]);
        assert_eq!(view.cast[0].profile_url, PLACEHOLDER_IMAGE);
        let providers = view.providers.unwrap();
        assert_eq!(providers.region, "US");
        assert_eq!(providers.stream[0].logo_url, "https://image.tmdb.org/t/p/w92/logo.png");
        assert_eq!(view.in_watchlist, Some(true));
    }

    #[test]
    fn sparse_detail_uses_fallbacks() {
        let mut d = details();
        d.genres.clear();
        d.production_companies.clear();
        d.item.backdrop_path = None;

        let view = build(
            DetailParts {
                details: &d,
                credits: None,
                providers: None,
                regions: &[],
                in_watchlist: None,
            },
            &ImageUrls::default(),
            &SessionContext::default(),
        );
        assert_eq!(view.genres_text, "Unknown");
        assert_eq!(view.studio, "Unknown");
        assert_eq!(view.backdrop_url, PLACEHOLDER_IMAGE);
        assert!(view.cast.is_empty());
        assert!(view.providers.is_none());
        assert_eq!(view.in_watchlist, None);
    }

    #[test]
    fn proxied_detail_images() {
        let view = build(
            DetailParts {
                details: &details(),
                credits: None,
                providers: None,
                regions: &[],
                in_watchlist: None,
            },
            &ImageUrls::proxied("/artwork"),
            &SessionContext::default(),
        );
        assert_eq!(view.poster_url, "/artwork/poster/large/matrix.jpg");
        assert_eq!(view.backdrop_url, "/artwork/backdrop/original/matrix-bg.jpg");
    }
}
