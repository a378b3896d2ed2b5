use marquee_core::catalog::Genre;
use marquee_core::types::ContentType;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreOption {
    /// `None` for the "All" option.
    pub id: Option<u64>,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreFilterView {
    pub content_type: ContentType,
    pub options: Vec<GenreOption>,
}

/// "All" first, then the genres in provider order. An id that matches no
/// genre leaves "All" active.
pub fn build(content_type: ContentType, genres: &[Genre], selected: Option<u64>) -> GenreFilterView {
    let selected = selected.filter(|id| genres.iter().any(|g| g.id == *id));

    let mut options = Vec::with_capacity(genres.len() + 1);
    options.push(GenreOption {
        id: None,
        name: "All".to_string(),
        active: selected.is_none(),
    });
    options.extend(genres.iter().map(|g| GenreOption {
        id: Some(g.id),
        name: g.name.clone(),
        active: selected == Some(g.id),
    }));

    GenreFilterView {
        content_type,
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres() -> Vec<Genre> {
        vec![
            Genre { id: 28, name: "Action".into() },
            Genre { id: 18, name: "Drama".into() },
        ]
    }

    fn active(view: &GenreFilterView) -> Vec<&str> {
        view.options
            .iter()
            .filter(|o| o.active)
            .map(|o| o.name.as_str())
            .collect()
    }

    #[test]
    fn all_is_active_without_selection() {
        let view = build(ContentType::Movie, &genres(), None);
        assert_eq!(view.options.len(), 3);
        assert_eq!(view.options[0].name, "All");
        assert_eq!(active(&view), ["All"]);
    }

    #[test]
    fn selected_genre_is_marked() {
        let view = build(ContentType::Movie, &genres(), Some(18));
        assert_eq!(active(&view), ["Drama"]);
    }

    #[test]
    fn unknown_selection_falls_back_to_all() {
        let view = build(ContentType::Tv, &genres(), Some(99));
        assert_eq!(active(&view), ["All"]);
    }
}
