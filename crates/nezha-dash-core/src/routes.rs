use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    ServerList,
    ServerDetail,
    Error,
    NotFound,
}

impl ViewId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ServerList => "server_list",
            Self::ServerDetail => "server_detail",
            Self::Error => "error",
            Self::NotFound => "not_found",
        }
    }
}

/// Path patterns in match order; the first match wins and `*` catches
/// everything else.
pub const ROUTE_TABLE: [(&str, ViewId); 4] = [
    ("/", ViewId::ServerList),
    ("/server/:id", ViewId::ServerDetail),
    ("/error", ViewId::Error),
    ("*", ViewId::NotFound),
];

const WILDCARD: &str = "*";

/// Parameters the error view accepts from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorViewParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub view: ViewId,
    pub pattern: &'static str,
    pub path: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
}

impl RouteMatch {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn error_params(&self) -> ErrorViewParams {
        ErrorViewParams {
            code: self
                .query
                .get("code")
                .and_then(|code| code.trim().parse().ok()),
            message: self
                .query
                .get("message")
                .filter(|message| !message.is_empty())
                .cloned(),
        }
    }
}

/// The static route table mounted under a base path.
#[derive(Debug, Clone)]
pub struct RouteTable {
    base_path: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new("/")
    }
}

impl RouteTable {
    /// `base_path` is the mount point (`/`, `/dashboard`, `/dashboard/`).
    #[must_use]
    pub fn new(base_path: &str) -> Self {
        let trimmed = base_path.trim().trim_matches('/');
        let base_path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        Self { base_path }
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        if self.base_path.is_empty() {
            "/"
        } else {
            &self.base_path
        }
    }

    /// Resolves a location (`path`, optionally followed by `?query` and
    /// `#fragment`).
    #[must_use]
    pub fn resolve(&self, location: &str) -> RouteMatch {
        let location = location.split('#').next().unwrap_or_default();
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (location, None),
        };
        let query = query.map(parse_query).unwrap_or_default();

        let Some(relative) = self.strip_base(path) else {
            tracing::debug!(path, base_path = self.base_path(), "path outside base path");
            return not_found(path, query);
        };

        let segments = relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>();

        for (pattern, view) in ROUTE_TABLE {
            if pattern == WILDCARD {
                return RouteMatch {
                    view,
                    pattern,
                    path: relative.to_string(),
                    params: BTreeMap::new(),
                    query,
                };
            }
            if let Some(params) = match_pattern(pattern, &segments) {
                return RouteMatch {
                    view,
                    pattern,
                    path: relative.to_string(),
                    params,
                    query,
                };
            }
        }

        not_found(relative, query)
    }

    fn strip_base<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.base_path.is_empty() {
            return Some(if path.is_empty() { "/" } else { path });
        }
        let rest = path.strip_prefix(self.base_path.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

fn not_found(path: &str, query: BTreeMap<String, String>) -> RouteMatch {
    RouteMatch {
        view: ViewId::NotFound,
        pattern: WILDCARD,
        path: path.to_string(),
        params: BTreeMap::new(),
        query,
    }
}

fn match_pattern(pattern: &str, segments: &[&str]) -> Option<BTreeMap<String, String>> {
    let pattern_segments = pattern
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>();
    if pattern_segments.len() != segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (expected, actual) in pattern_segments.iter().zip(segments) {
        if let Some(name) = expected.strip_prefix(':') {
            params.insert(name.to_string(), decode_component(actual));
        } else if !expected.eq_ignore_ascii_case(actual) {
            return None;
        }
    }
    Some(params)
}

fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn parse_query(raw: &str) -> BTreeMap<String, String> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (
                decode_component(&key.replace('+', " ")),
                decode_component(&value.replace('+', " ")),
            )
        })
        .collect()
}
