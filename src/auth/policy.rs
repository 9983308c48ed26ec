//! Access Policy
//!
//! Ordered `(pattern, requirement)` rules consulted once per request after the
//! authenticator has bound an [`Identity`]. First match wins; paths no rule
//! matches require an identity.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::models::Identity;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    RequiresIdentity,
}

/// Path pattern. Segments match literally, `*` matches exactly one segment and
/// a trailing `**` matches the rest of the path, including nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<String>,
}

impl RoutePattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            segments: split_path(pattern).map(String::from).collect(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut path_segments = split_path(path);

        for (index, pattern_segment) in self.segments.iter().enumerate() {
            if pattern_segment == "**" && index == self.segments.len() - 1 {
                return true;
            }
            match path_segments.next() {
                Some(segment) if pattern_segment == "*" || pattern_segment == segment => {}
                _ => return false,
            }
        }

        path_segments.next().is_none()
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<(RoutePattern, Requirement)>,
}

impl AccessPolicy {
    pub fn builder() -> AccessPolicyBuilder {
        AccessPolicyBuilder { rules: Vec::new() }
    }

    /// Rules for the routes this server exposes.
    pub fn default_rules() -> Self {
        Self::builder()
            .permit("/ping")
            .permit("/api/auth/**")
            .permit("/api/users/register")
            .require("/api/users/**")
            .build()
    }

    pub fn requirement_for(&self, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, requirement)| *requirement)
            .unwrap_or(Requirement::RequiresIdentity)
    }

    /// Middleware rejecting requests to protected routes that carry no identity.
    pub async fn enforce(
        State(policy): State<Arc<AccessPolicy>>,
        req: Request,
        next: Next,
    ) -> Response {
        let path = req.uri().path();
        let requirement = policy.requirement_for(path);
        let authenticated = req
            .extensions()
            .get::<Identity>()
            .is_some_and(Identity::is_authenticated);

        if requirement == Requirement::RequiresIdentity && !authenticated {
            tracing::info!("[AccessPolicy] Rejecting unauthenticated {} {}", req.method(), path);
            return ApiError::Unauthorized("Authentication required".to_string()).into_response();
        }

        next.run(req).await
    }
}

pub struct AccessPolicyBuilder {
    rules: Vec<(RoutePattern, Requirement)>,
}

impl AccessPolicyBuilder {
    pub fn permit(mut self, pattern: &str) -> Self {
        self.rules.push((RoutePattern::new(pattern), Requirement::Public));
        self
    }

    pub fn require(mut self, pattern: &str) -> Self {
        self.rules.push((RoutePattern::new(pattern), Requirement::RequiresIdentity));
        self
    }

    pub fn build(self) -> AccessPolicy {
        AccessPolicy { rules: self.rules }
    }
}
