//! Route matching logic.
//!
//! # Responsibilities
//! - Compile URL templates (`/users/{id}`, `/files/{path:.*}`) into matchers
//! - Match the full request path and extract path variables
//! - Normalize route methods
//!
//! # Design Decisions
//! - `{name}` matches exactly one path segment
//! - `{name:regex}` uses the given regex, which may span segments
//! - Matching is anchored and case-sensitive; `/a` does not match `/a/`
//! - Compilation errors are reported, never panicked on

use axum::http::Method;
use regex::Regex;

use crate::routing::route::RoutingError;

const DEFAULT_VARIABLE_PATTERN: &str = "[^/]+";

/// Path variables captured by a matched pattern, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    /// Value of the named variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A compiled URL template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
    names: Vec<String>,
}

impl PathPattern {
    /// Compile a URL template.
    pub fn parse(pattern: &str) -> Result<Self, RoutingError> {
        let invalid = |reason: &str| RoutingError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut expr = String::from("^");
        let mut names: Vec<String> = Vec::new();
        let mut literal_start = 0;
        let mut var_start = 0;
        let mut depth = 0usize;

        for (i, c) in pattern.char_indices() {
            match c {
                '{' => {
                    if depth == 0 {
                        expr.push_str(&regex::escape(&pattern[literal_start..i]));
                        var_start = i + 1;
                    }
                    depth += 1;
                }
                '}' => {
                    if depth == 0 {
                        return Err(invalid("unbalanced braces"));
                    }
                    depth -= 1;
                    if depth == 0 {
                        let var = &pattern[var_start..i];
                        let (name, var_pattern) = match var.split_once(':') {
                            Some((name, p)) => (name.trim(), p),
                            None => (var.trim(), DEFAULT_VARIABLE_PATTERN),
                        };
                        if name.is_empty() {
                            return Err(invalid("empty variable name"));
                        }
                        if names.iter().any(|n| n == name) {
                            return Err(invalid("duplicate variable name"));
                        }
                        expr.push_str(&format!("(?P<v{}>{})", names.len(), var_pattern));
                        names.push(name.to_string());
                        literal_start = i + 1;
                    }
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(invalid("unbalanced braces"));
        }
        expr.push_str(&regex::escape(&pattern[literal_start..]));
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            names,
        })
    }

    /// Match a request path, returning the captured variables.
    pub fn captures(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;
        let params = self
            .names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                caps.name(&format!("v{i}"))
                    .map(|m| (name.clone(), m.as_str().to_string()))
            })
            .collect();
        Some(PathParams(params))
    }

    /// The template this pattern was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Parse a route method, case-insensitively.
pub fn parse_method(method: &str) -> Result<Method, RoutingError> {
    let upper = method.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(RoutingError::InvalidMethod(method.to_string()));
    }
    Method::from_bytes(upper.as_bytes()).map_err(|_| RoutingError::InvalidMethod(method.to_string()))
}
