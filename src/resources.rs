//! Resource fetching and counterexample-aware URL resolution.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Where the overview summary lives; it is never counterexample-scoped.
pub const OVERVIEW_URL: &str = "data/overview.json";

/// Why a resource could not be loaded. Failures stay local and silent in
/// the UI; callers log them and leave the page in its pre-load state.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("request for {url} failed: {source}")]
	Http {
		url: String,
		source: gloo_net::Error,
	},
	#[error("could not parse {url}: {source}")]
	Parse {
		url: String,
		source: serde_json::Error,
	},
}

/// Resource root for the current page view: the primary run's data, or a
/// counterexample's when the page URL carries a `cex` query parameter.
/// Resolved once at startup and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceNamespace {
	base: String,
}

impl ResourceNamespace {
	pub fn from_query(cex: Option<&str>) -> Self {
		let base = match cex {
			Some(value) if !value.is_empty() => format!("cex_{value}/"),
			_ => "data/".to_string(),
		};
		Self { base }
	}

	pub fn graph_url(&self) -> String {
		format!("{}statespace.json", self.base)
	}

	pub fn heap_config_url(&self, id: &str) -> String {
		format!("{}hc_{id}.json", self.base)
	}
}

/// Fetch a textual resource. No timeout, no retry.
pub async fn fetch_text(url: &str) -> Result<String, LoadError> {
	let response = gloo_net::http::Request::get(url)
		.send()
		.await
		.map_err(|source| LoadError::Http {
			url: url.to_string(),
			source,
		})?;
	if !response.ok() {
		return Err(LoadError::Http {
			url: url.to_string(),
			source: gloo_net::Error::GlooError(format!(
				"unexpected status {}",
				response.status()
			)),
		});
	}
	response.text().await.map_err(|source| LoadError::Http {
		url: url.to_string(),
		source,
	})
}

/// Fetch and parse a JSON resource.
pub async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, LoadError> {
	let text = fetch_text(url).await?;
	serde_json::from_str(&text).map_err(|source| LoadError::Parse {
		url: url.to_string(),
		source,
	})
}
