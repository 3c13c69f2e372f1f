use crate::endpoint::EndpointConfig;
use matchit::Router;
use tracing::debug;

/// Path-pattern lookup from request path to endpoint logging config.
///
/// Built once per deployment from [`crate::TrailConfig`] and shared
/// read-only across requests — endpoint configuration is immutable at
/// request time, so there is no rebuild path.
pub struct EndpointRegistry {
    matcher: Router<EndpointConfig>,
    fallback: EndpointConfig,
}

impl EndpointRegistry {
    /// Build a registry from `(path pattern, config)` pairs.
    ///
    /// Patterns use radix-router syntax: exact paths, `{param}` segments,
    /// and `{*rest}` catch-alls. Unmatched paths resolve to `fallback`.
    pub fn build(
        entries: Vec<(String, EndpointConfig)>,
        fallback: EndpointConfig,
    ) -> anyhow::Result<Self> {
        let mut matcher = Router::new();
        for (pattern, config) in entries {
            matcher
                .insert(pattern.as_str(), config)
                .map_err(|e| anyhow::anyhow!("invalid endpoint pattern {:?}: {}", pattern, e))?;
        }
        Ok(Self { matcher, fallback })
    }

    /// Resolve the logging config for a request path.
    pub fn resolve(&self, path: &str) -> &EndpointConfig {
        match self.matcher.at(path) {
            Ok(matched) => matched.value,
            Err(_) => {
                debug!(path = %path, "No endpoint pattern matched, using fallback config");
                &self.fallback
            }
        }
    }
}
