//! CORS configuration helpers.
//!
//! Supported `allowed_origins` patterns:
//! - `"*"` allows all origins
//! - `"*.example.com"` matches by suffix
//! - `"https://example.com*"` matches by prefix
//! - `"/^https://(foo|bar)\.example\.com$/"` is a regular expression
//! - anything else must match exactly

use anyhow::{Context, Result};
use axum::http::{header::HeaderValue, request::Parts};
use regex::Regex;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync + 'static>;

fn build_predicate(pattern: &str) -> Result<Predicate> {
	Ok(if pattern == "*" {
		Box::new(|_: &str| true)
	} else if let Some(suffix) = pattern.strip_prefix('*').filter(|s| !s.is_empty() && !s.contains('*')) {
		let suffix = suffix.to_string();
		Box::new(move |origin: &str| origin.ends_with(&suffix))
	} else if let Some(prefix) = pattern.strip_suffix('*').filter(|s| !s.is_empty() && !s.contains('*')) {
		let prefix = prefix.to_string();
		Box::new(move |origin: &str| origin.starts_with(&prefix))
	} else if pattern.len() > 2 && pattern.starts_with('/') && pattern.ends_with('/') {
		let re = Regex::new(&pattern[1..pattern.len() - 1])
			.with_context(|| format!("invalid CORS origin pattern '{pattern}'"))?;
		Box::new(move |origin: &str| re.is_match(origin))
	} else {
		let exact = pattern.to_string();
		Box::new(move |origin: &str| origin == exact)
	})
}

/// Build a `CorsLayer` whose origin predicate ORs all `allowed_origins`.
pub fn build_cors_layer(allowed_origins: &[String], max_age_seconds: u64) -> Result<CorsLayer> {
	let checks = allowed_origins
		.iter()
		.map(|pattern| build_predicate(pattern))
		.collect::<Result<Vec<_>>>()?;

	Ok(CorsLayer::new()
		.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _req: &Parts| {
			let origin = origin.to_str().unwrap_or("");
			checks.iter().any(|check| check(origin))
		}))
		.max_age(Duration::from_secs(max_age_seconds)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		Router,
		body::Body,
		http::{Request, header},
		routing::get,
	};
	use rstest::rstest;
	use tower::ServiceExt;

	async fn allows(patterns: &[&str], origin: &str) -> bool {
		let patterns: Vec<String> = patterns.iter().map(|p| (*p).to_string()).collect();
		let layer = build_cors_layer(&patterns, 3600).unwrap();
		let app = Router::new().route("/", get(|| async { "ok" })).layer(layer);

		let req = Request::builder()
			.uri("/")
			.header(header::ORIGIN, origin)
			.body(Body::empty())
			.unwrap();

		let resp = app.oneshot(req).await.unwrap();
		resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_some()
	}

	#[rstest]
	#[case(&["*"], "http://anything.local", true)]
	#[case(&["https://maps.example.org"], "https://maps.example.org", true)]
	#[case(&["https://maps.example.org"], "https://maps.example.com", false)]
	#[case(&["*.example.com"], "https://foo.example.com", true)]
	#[case(&["*.example.com"], "https://example.org", false)]
	#[case(&["https://dev-*"], "https://dev-01.example.com", true)]
	#[case(&["https://dev-*"], "https://prod-01.example.com", false)]
	#[case(&["/^https://(foo|bar)\\.example\\.com$/"], "https://bar.example.com", true)]
	#[case(&["/^https://(foo|bar)\\.example\\.com$/"], "https://baz.example.com", false)]
	#[case(&["https://a.org", "https://b.org"], "https://b.org", true)]
	#[case(&[], "https://a.org", false)]
	#[tokio::test]
	async fn origin_patterns(#[case] patterns: &[&str], #[case] origin: &str, #[case] expected: bool) {
		assert_eq!(allows(patterns, origin).await, expected);
	}

	#[test]
	fn invalid_regex() {
		let err = build_cors_layer(&["/(/".to_string()], 10).unwrap_err();
		assert_eq!(err.to_string(), "invalid CORS origin pattern '/(/'");
	}

	#[tokio::test]
	async fn max_age_is_set_on_preflight() {
		let layer = build_cors_layer(&["*".into()], 7200).unwrap();
		let app = Router::new().route("/", get(|| async { "ok" })).layer(layer);

		let req = Request::builder()
			.method("OPTIONS")
			.uri("/")
			.header(header::ORIGIN, "https://example.test")
			.header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
			.body(Body::empty())
			.unwrap();

		let resp = app.oneshot(req).await.unwrap();
		assert_eq!(resp.headers().get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "7200");
	}
}
