use serde::{Deserialize, Serialize};

/// Kind of catalog title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Movie,
    Tv,
}

impl ContentType {
    /// Path segment used by TMDB and by our own routes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" | "movies" => Some(Self::Movie),
            "tv" | "show" | "shows" => Some(Self::Tv),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing category, independent of content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    NowPlaying,
    TopRated,
    Popular,
    Upcoming,
    Trending,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NowPlaying => "now_playing",
            Self::TopRated => "top_rated",
            Self::Popular => "popular",
            Self::Upcoming => "upcoming",
            Self::Trending => "trending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "now_playing" => Some(Self::NowPlaying),
            "top_rated" => Some(Self::TopRated),
            "popular" => Some(Self::Popular),
            "upcoming" => Some(Self::Upcoming),
            "trending" => Some(Self::Trending),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trending aggregation window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            _ => None,
        }
    }
}

/// Every section the catalog can be browsed by.
///
/// Movies support all five categories; shows only popular, top rated and
/// trending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    MovieNowPlaying,
    MovieTopRated,
    MoviePopular,
    MovieUpcoming,
    MovieTrending,
    TvPopular,
    TvTopRated,
    TvTrending,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Self::MovieNowPlaying,
        Self::MovieTopRated,
        Self::MoviePopular,
        Self::MovieUpcoming,
        Self::MovieTrending,
        Self::TvPopular,
        Self::TvTopRated,
        Self::TvTrending,
    ];

    /// Section used when a content type is requested without a usable category.
    pub fn default_for(content_type: ContentType) -> Self {
        match content_type {
            ContentType::Movie => Self::MovieNowPlaying,
            ContentType::Tv => Self::TvPopular,
        }
    }

    /// Map a content type and category onto a section. Combinations TMDB does
    /// not offer (e.g. upcoming shows) resolve to the content type's default.
    pub fn resolve(content_type: ContentType, category: Option<Category>) -> Self {
        let Some(category) = category else {
            return Self::default_for(content_type);
        };
        match (content_type, category) {
            (ContentType::Movie, Category::NowPlaying) => Self::MovieNowPlaying,
            (ContentType::Movie, Category::TopRated) => Self::MovieTopRated,
            (ContentType::Movie, Category::Popular) => Self::MoviePopular,
            (ContentType::Movie, Category::Upcoming) => Self::MovieUpcoming,
            (ContentType::Movie, Category::Trending) => Self::MovieTrending,
            (ContentType::Tv, Category::Popular) => Self::TvPopular,
            (ContentType::Tv, Category::TopRated) => Self::TvTopRated,
            (ContentType::Tv, Category::Trending) => Self::TvTrending,
            (ContentType::Tv, Category::NowPlaying | Category::Upcoming) => {
                Self::default_for(ContentType::Tv)
            }
        }
    }

    pub fn content_type(self) -> ContentType {
        match self {
            Self::MovieNowPlaying
            | Self::MovieTopRated
            | Self::MoviePopular
            | Self::MovieUpcoming
            | Self::MovieTrending => ContentType::Movie,
            Self::TvPopular | Self::TvTopRated | Self::TvTrending => ContentType::Tv,
        }
    }

    pub fn category(self) -> Category {
        match self {
            Self::MovieNowPlaying => Category::NowPlaying,
            Self::MovieTopRated | Self::TvTopRated => Category::TopRated,
            Self::MoviePopular | Self::TvPopular => Category::Popular,
            Self::MovieUpcoming => Category::Upcoming,
            Self::MovieTrending | Self::TvTrending => Category::Trending,
        }
    }

    /// Heading shown above the section's grid.
    pub fn title(self) -> &'static str {
        match self.category() {
            Category::NowPlaying => "Now Playing",
            Category::TopRated => "Top Rated",
            Category::Popular => "Popular",
            Category::Upcoming => "Upcoming",
            Category::Trending => "Trending",
        }
    }
}
