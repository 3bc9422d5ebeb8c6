//! Navigable locations: `/` and `/decisions/:id`.

use std::fmt;

use shared::domain::DecisionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Decision(DecisionId),
    /// `/decisions/<segment>` where the segment is not a non-negative integer.
    InvalidDecision(String),
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let without_query = trimmed.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = without_query
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["decisions", id] => {
                let parsed = if id.bytes().all(|b| b.is_ascii_digit()) {
                    id.parse::<DecisionId>().ok()
                } else {
                    None
                };
                parsed
                    .map(Route::Decision)
                    .unwrap_or_else(|| Route::InvalidDecision(id.to_string()))
            }
            _ => Route::NotFound(trimmed.to_string()),
        }
    }

    pub fn decision(id: DecisionId) -> Self {
        Route::Decision(id)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Decision(id) => write!(f, "/decisions/{id}"),
            Route::InvalidDecision(raw) => write!(f, "/decisions/{raw}"),
            Route::NotFound(path) => f.write_str(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_home_and_decision_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/decisions/42"), Route::Decision(DecisionId(42)));
        assert_eq!(Route::parse("/decisions/0/"), Route::Decision(DecisionId(0)));
        assert_eq!(Route::parse("decisions/7?tab=report"), Route::Decision(DecisionId(7)));
    }

    #[test]
    fn non_numeric_or_negative_id_is_invalid() {
        assert_eq!(
            Route::parse("/decisions/abc"),
            Route::InvalidDecision("abc".into())
        );
        assert_eq!(
            Route::parse("/decisions/-3"),
            Route::InvalidDecision("-3".into())
        );
        assert_eq!(
            Route::parse("/decisions/1.5"),
            Route::InvalidDecision("1.5".into())
        );
        assert_eq!(
            Route::parse("/decisions/18446744073709551616"),
            Route::InvalidDecision("18446744073709551616".into())
        );
    }

    #[test]
    fn other_paths_are_not_found() {
        assert_eq!(
            Route::parse("/settings"),
            Route::NotFound("/settings".into())
        );
        assert_eq!(
            Route::parse("/decisions/1/evaluate"),
            Route::NotFound("/decisions/1/evaluate".into())
        );
    }

    #[test]
    fn display_round_trips_decision_path() {
        assert_eq!(Route::decision(DecisionId(9)).to_string(), "/decisions/9");
    }
}
