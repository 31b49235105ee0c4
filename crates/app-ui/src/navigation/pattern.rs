//! Route pattern grammar
//!
//! ```text
//! pattern  = segment ("/" segment)* ["?" query ("&" query)*]
//! segment  = literal | "{" name "}"
//! query    = name "=" default
//! ```

use std::collections::HashMap;

use super::error::{NavigationError, Result};
use super::route::{RouteKind, RouteParams};

/// Segment type in a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Literal segment
    Literal(String),
    /// Parameter segment
    Param(String),
}

/// Query parameter with the value used when the path omits it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    /// Parameter name
    pub name: String,
    /// Default value
    pub default: String,
}

/// Parsed route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<PatternSegment>,
    query: Vec<QueryParam>,
}

impl RoutePattern {
    /// Parse a pattern string
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| NavigationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let (path, query) = match pattern.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (pattern, None),
        };
        let path = path.strip_prefix('/').unwrap_or(path);
        if path.is_empty() {
            return Err(invalid("empty path"));
        }

        let mut segments = Vec::new();
        let mut seen = Vec::<String>::new();
        for raw in path.split('/') {
            if raw.is_empty() {
                return Err(invalid("empty segment"));
            }
            let segment = if let Some(inner) = raw.strip_prefix('{') {
                let name = inner
                    .strip_suffix('}')
                    .ok_or_else(|| invalid("unclosed parameter"))?;
                if name.is_empty() || name.contains(['{', '}']) {
                    return Err(invalid("malformed parameter name"));
                }
                PatternSegment::Param(name.to_string())
            } else if raw.contains(['{', '}']) {
                return Err(invalid("braces inside a literal segment"));
            } else {
                PatternSegment::Literal(raw.to_string())
            };
            if let PatternSegment::Param(name) = &segment {
                if seen.contains(name) {
                    return Err(invalid("parameter used twice"));
                }
                seen.push(name.clone());
            }
            segments.push(segment);
        }

        let mut params = Vec::new();
        if let Some(query) = query {
            for pair in query.split('&') {
                let (name, default) = pair
                    .split_once('=')
                    .ok_or_else(|| invalid("query parameter without a default"))?;
                if name.is_empty() {
                    return Err(invalid("empty query parameter name"));
                }
                if seen.iter().any(|n| n == name) {
                    return Err(invalid("parameter used twice"));
                }
                seen.push(name.to_string());
                params.push(QueryParam {
                    name: name.to_string(),
                    default: default.to_string(),
                });
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
            query: params,
        })
    }

    /// Pattern as registered
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Path segments
    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    /// Query parameters
    pub fn query(&self) -> &[QueryParam] {
        &self.query
    }

    /// Every parameter name: path parameters first, then query parameters
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                PatternSegment::Param(name) => Some(name.as_str()),
                PatternSegment::Literal(_) => None,
            })
            .chain(self.query.iter().map(|q| q.name.as_str()))
            .collect()
    }

    /// Check that the pattern uses exactly the declared names
    pub fn validate(&self, declared: &[&str]) -> Result<()> {
        let used = self.param_names();
        if let Some(name) = used.iter().find(|name| !declared.contains(*name)) {
            return Err(NavigationError::UndeclaredParam {
                pattern: self.raw.clone(),
                name: name.to_string(),
            });
        }
        if let Some(name) = declared.iter().find(|name| !used.contains(*name)) {
            return Err(NavigationError::PatternMismatch {
                pattern: self.raw.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Match split path segments and a decoded query against this pattern
    pub fn match_path(
        &self,
        path: &[&str],
        query: &HashMap<String, String>,
    ) -> Option<RouteParams> {
        if path.len() != self.segments.len() {
            return None;
        }

        let mut params = RouteParams::new();
        for (segment, actual) in self.segments.iter().zip(path.iter()) {
            let decoded = urlencoding::decode(actual).ok()?;
            match segment {
                PatternSegment::Literal(expected) => {
                    if *expected != decoded {
                        return None;
                    }
                }
                PatternSegment::Param(name) => {
                    params.insert(name.clone(), decoded.into_owned());
                }
            }
        }

        for declared in &self.query {
            let value = query
                .get(&declared.name)
                .cloned()
                .unwrap_or_else(|| declared.default.clone());
            params.insert(declared.name.clone(), value);
        }

        Some(params)
    }

    /// Check if this pattern beats `other` when both match the same path
    ///
    /// A literal wins over a parameter at the earliest position where they
    /// differ.
    pub fn is_more_specific_than(&self, other: &RoutePattern) -> bool {
        for (mine, theirs) in self.segments.iter().zip(other.segments.iter()) {
            match (mine, theirs) {
                (PatternSegment::Literal(_), PatternSegment::Param(_)) => return true,
                (PatternSegment::Param(_), PatternSegment::Literal(_)) => return false,
                _ => {}
            }
        }
        false
    }

    /// Check if both patterns match exactly the same paths
    pub fn has_same_shape(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|pair| match pair {
                    (PatternSegment::Literal(a), PatternSegment::Literal(b)) => a == b,
                    (PatternSegment::Param(_), PatternSegment::Param(_)) => true,
                    _ => false,
                })
    }

    /// Render a path from parameter values
    ///
    /// Query parameters missing from `params` take their defaults.
    pub fn fill(&self, kind: RouteKind, params: &RouteParams) -> Result<String> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                PatternSegment::Literal(literal) => parts.push(literal.clone()),
                PatternSegment::Param(name) => {
                    let value = params.get(name).ok_or_else(|| NavigationError::MissingParam {
                        kind,
                        name: name.clone(),
                    })?;
                    parts.push(urlencoding::encode(value).into_owned());
                }
            }
        }

        let mut path = parts.join("/");
        if !self.query.is_empty() {
            let pairs: Vec<String> = self
                .query
                .iter()
                .map(|q| {
                    let value = params.get(&q.name).unwrap_or(&q.default);
                    format!("{}={}", q.name, urlencoding::encode(value))
                })
                .collect();
            path.push('?');
            path.push_str(&pairs.join("&"));
        }
        Ok(path)
    }
}

/// Split a navigation path into segments and raw query
pub fn split_path(path: &str) -> (Vec<&str>, Option<&str>) {
    let (pathname, query) = match path.split_once('?') {
        Some((pathname, query)) => (pathname, Some(query)),
        None => (path, None),
    };
    let segments = pathname.split('/').filter(|s| !s.is_empty()).collect();
    (segments, query)
}

/// Parse query string into decoded pairs
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    if let Some(query) = query {
        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                if let Ok(decoded) = urlencoding::decode(value) {
                    pairs.insert(key.to_string(), decoded.into_owned());
                }
            }
        }
    }
    pairs
}
