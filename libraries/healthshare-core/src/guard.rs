//! Session guard: token-presence route filter.
//!
//! The guard only checks that *some* token is present. It never validates the
//! token, so it is a routing convenience and not an authorization boundary;
//! privileged operations verify the token themselves.

use crate::error::{HealthShareError, Result};

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Continue,
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `:name`
    Single,
    /// `:name*`
    ZeroOrMore,
    /// `:name+`
    OneOrMore,
}

/// Route pattern such as `/profile` or `/dashboard/:path*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self> {
        if !raw.starts_with('/') {
            return Err(HealthShareError::invalid_request(format!(
                "path pattern must start with '/': {raw}"
            )));
        }

        let parts: Vec<&str> = split_path(raw).collect();
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let is_last = i + 1 == parts.len();
            let segment = match part.strip_prefix(':') {
                Some(name) if name.ends_with('*') || name.ends_with('+') => {
                    if !is_last {
                        return Err(HealthShareError::invalid_request(format!(
                            "repeating parameter must be the last segment: {raw}"
                        )));
                    }
                    if name.ends_with('*') {
                        Segment::ZeroOrMore
                    } else {
                        Segment::OneOrMore
                    }
                }
                Some("") => {
                    return Err(HealthShareError::invalid_request(format!(
                        "unnamed parameter in pattern: {raw}"
                    )));
                }
                Some(_) => Segment::Single,
                None => Segment::Literal((*part).to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split_path(path).collect();
        let mut i = 0;
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return false;
                    }
                    i += 1;
                }
                Segment::Single => {
                    if i >= parts.len() {
                        return false;
                    }
                    i += 1;
                }
                Segment::ZeroOrMore => return true,
                Segment::OneOrMore => return i < parts.len(),
            }
        }
        i == parts.len()
    }
}

/// Decides whether a page request may proceed
#[derive(Debug, Clone)]
pub struct SessionGuard {
    protected: Vec<PathPattern>,
    redirect_to: String,
}

impl SessionGuard {
    pub fn new(protected: Vec<PathPattern>, redirect_to: impl Into<String>) -> Self {
        Self {
            protected,
            redirect_to: redirect_to.into(),
        }
    }

    /// Build from raw configuration strings
    pub fn from_config(patterns: &[String], redirect_to: &str) -> Result<Self> {
        if !redirect_to.starts_with('/') {
            return Err(HealthShareError::invalid_request(format!(
                "redirect target must be an absolute path: {redirect_to}"
            )));
        }
        let protected = patterns
            .iter()
            .map(|p| PathPattern::parse(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(protected, redirect_to))
    }

    pub fn redirect_to(&self) -> &str {
        &self.redirect_to
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|p| p.matches(path))
    }

    /// Any non-empty token passes; validity is not checked here.
    pub fn check(&self, path: &str, token: Option<&str>) -> GuardDecision {
        let has_token = token.is_some_and(|t| !t.trim().is_empty());
        if !has_token && self.is_protected(path) {
            GuardDecision::Redirect(self.redirect_to.clone())
        } else {
            GuardDecision::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> SessionGuard {
        SessionGuard::from_config(
            &["/dashboard/:path*".to_string(), "/profile".to_string()],
            "/sign-in",
        )
        .unwrap()
    }

    #[test]
    fn test_literal_pattern() {
        let p = PathPattern::parse("/profile").unwrap();
        assert!(p.matches("/profile"));
        assert!(p.matches("/profile/"));
        assert!(!p.matches("/profile/edit"));
        assert!(!p.matches("/profiles"));
        assert!(!p.matches("/"));
    }

    #[test]
    fn test_zero_or_more_pattern() {
        let p = PathPattern::parse("/dashboard/:path*").unwrap();
        assert!(p.matches("/dashboard"));
        assert!(p.matches("/dashboard/"));
        assert!(p.matches("/dashboard/settings/theme"));
        assert!(!p.matches("/dashboards"));
        assert!(!p.matches("/sign-in"));
    }

    #[test]
    fn test_one_or_more_and_single() {
        let plus = PathPattern::parse("/files/:rest+").unwrap();
        assert!(!plus.matches("/files"));
        assert!(plus.matches("/files/a/b"));

        let single = PathPattern::parse("/users/:id").unwrap();
        assert!(single.matches("/users/42"));
        assert!(!single.matches("/users"));
        assert!(!single.matches("/users/42/posts"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(PathPattern::parse("dashboard").is_err());
        assert!(PathPattern::parse("/a/:rest*/b").is_err());
        assert!(PathPattern::parse("/a/:").is_err());
        assert!(SessionGuard::from_config(&[], "sign-in").is_err());
    }

    #[test]
    fn test_redirects_without_token() {
        let g = guard();
        assert_eq!(
            g.check("/dashboard", None),
            GuardDecision::Redirect("/sign-in".into())
        );
        assert_eq!(
            g.check("/profile", Some("")),
            GuardDecision::Redirect("/sign-in".into())
        );
    }

    #[test]
    fn test_any_token_passes() {
        let g = guard();
        assert_eq!(
            g.check("/dashboard/x", Some("not-a-real-token")),
            GuardDecision::Continue
        );
    }

    #[test]
    fn test_unprotected_paths_continue() {
        let g = guard();
        assert_eq!(g.check("/", None), GuardDecision::Continue);
        assert_eq!(g.check("/sign-in", None), GuardDecision::Continue);
    }
}
