use crate::config::types::{BundleConfig, Config, OutputConfig, RenderConfig, SiteConfig};
use crate::url::PatternSet;
use crate::ConfigError;
use url::Url;

/// Longest settle delay accepted after the render-complete signal (milliseconds)
const MAX_SETTLE_DELAY_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_render_config(&config.render)?;
    validate_bundle_config(&config.bundles)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site section
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_origin(&config.origin)?;

    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "seeds must contain at least one path".to_string(),
        ));
    }

    for seed in &config.seeds {
        if !seed.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "Seed '{}' must be a root-relative path starting with '/'",
                seed
            )));
        }
    }

    PatternSet::compile(&config.exclude)?;
    validate_page_extension(&config.page_extension)?;

    Ok(())
}

/// Validates the render section
fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    if config.settle_delay_ms > MAX_SETTLE_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "settle-delay-ms must be <= {}ms, got {}ms",
            MAX_SETTLE_DELAY_MS, config.settle_delay_ms
        )));
    }

    if config.page_timeout_ms == Some(0) {
        return Err(ConfigError::Validation(
            "page-timeout-ms must be greater than 0".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    PatternSet::compile(&config.skip_resources)?;

    Ok(())
}

/// Validates the bundles section
fn validate_bundle_config(config: &BundleConfig) -> Result<(), ConfigError> {
    if config.strip && config.include.is_empty() {
        return Err(ConfigError::Validation(
            "bundle stripping is enabled but no include directories are configured".to_string(),
        ));
    }

    if config.include.iter().any(|dir| dir.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "bundle include directories cannot be empty".to_string(),
        ));
    }

    PatternSet::compile(&config.exclude)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that the origin is an http(s) URL with a host and nothing past the root path
fn validate_origin(origin: &str) -> Result<(), ConfigError> {
    let url = Url::parse(origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", origin, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Origin '{}' must use the http or https scheme",
            origin
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Origin '{}' has no host",
            origin
        )));
    }

    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "Origin '{}' must not contain a path, query or fragment",
            origin
        )));
    }

    Ok(())
}

/// Validates the page extension (e.g. ".html")
fn validate_page_extension(extension: &str) -> Result<(), ConfigError> {
    let valid = extension.len() > 1
        && extension.starts_with('.')
        && !extension[1..].contains(['.', '/']);

    if !valid {
        return Err(ConfigError::Validation(format!(
            "page-extension must look like '.html', got '{}'",
            extension
        )));
    }

    Ok(())
}
