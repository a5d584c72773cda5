use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use classroom_core::model::CapsuleId;

/// The three places a user can be.
///
/// Paths that match nothing resolve to the library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Library,
    /// `None` authors a new capsule.
    Author { id: Option<CapsuleId> },
    Learn { id: CapsuleId },
}

impl Route {
    /// Resolve a path such as `/learn/capsule-1`. Leading `#` is ignored.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.trim().trim_start_matches('#');
        let mut parts = path.split('/').filter(|part| !part.is_empty());
        let view = parts.next();
        let id = parts.next();
        match (view, id) {
            (Some("author"), None | Some("new")) => Route::Author { id: None },
            (Some("author"), Some(id)) => Route::Author {
                id: CapsuleId::new(id).ok(),
            },
            (Some("learn"), Some(id)) => match CapsuleId::new(id) {
                Ok(id) => Route::Learn { id },
                Err(_) => Route::Library,
            },
            _ => Route::Library,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Route::Library => "/library".to_owned(),
            Route::Author { id: None } => "/author/new".to_owned(),
            Route::Author { id: Some(id) } => format!("/author/{id}"),
            Route::Learn { id } => format!("/learn/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Route::parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> CapsuleId {
        CapsuleId::new(raw).unwrap()
    }

    #[test]
    fn parses_each_view() {
        assert_eq!(Route::parse("/library"), Route::Library);
        assert_eq!(Route::parse("/author/new"), Route::Author { id: None });
        assert_eq!(Route::parse("/author"), Route::Author { id: None });
        assert_eq!(
            Route::parse("/author/capsule-1"),
            Route::Author {
                id: Some(id("capsule-1"))
            }
        );
        assert_eq!(
            Route::parse("#/learn/capsule-1"),
            Route::Learn { id: id("capsule-1") }
        );
    }

    #[test]
    fn unknown_paths_fall_back_to_library() {
        for path in ["", "/", "/settings", "/learn", "/learn/", "nonsense"] {
            assert_eq!(Route::parse(path), Route::Library, "{path:?}");
        }
    }

    #[test]
    fn paths_round_trip() {
        let routes = [
            Route::Library,
            Route::Author { id: None },
            Route::Author {
                id: Some(id("capsule-9")),
            },
            Route::Learn { id: id("imp-42") },
        ];
        for route in routes {
            let parsed: Route = route.to_string().parse().unwrap();
            assert_eq!(parsed, route);
        }
    }
}
