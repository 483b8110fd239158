use crate::config::types::{Config, CrawlerConfig, ExtractConfig, FilterConfig, HttpConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_filter_config(&config.filter)?;
    validate_extract_config(&config.extract)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = Url::parse(&config.seed_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", config.seed_url, e))
    })?;

    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            config.seed_url
        )));
    }

    if seed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            config.seed_url
        )));
    }

    if config.worker_count < 1 || config.worker_count > 256 {
        return Err(ConfigError::Validation(format!(
            "worker_count must be between 1 and 256, got {}",
            config.worker_count
        )));
    }

    if config.sub_batch_factor < 1 || config.sub_batch_factor > 1000 {
        return Err(ConfigError::Validation(format!(
            "sub_batch_factor must be between 1 and 1000, got {}",
            config.sub_batch_factor
        )));
    }

    if config.article_limit == Some(0) {
        return Err(ConfigError::Validation(
            "article_limit must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("directory", &config.directory),
        ("records_file", &config.records_file),
        ("checkpoint_file", &config.checkpoint_file),
        ("dead_letter_file", &config.dead_letter_file),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.records_file == config.checkpoint_file
        || config.records_file == config.dead_letter_file
        || config.checkpoint_file == config.dead_letter_file
    {
        return Err(ConfigError::Validation(
            "records_file, checkpoint_file and dead_letter_file must be distinct".to_string(),
        ));
    }

    Ok(())
}

/// Validates the link and section policy
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if !config.article_prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "article_prefix must start with '/', got '{}'",
            config.article_prefix
        )));
    }

    if config.namespace_separator.is_empty() {
        return Err(ConfigError::Validation(
            "namespace_separator cannot be empty".to_string(),
        ));
    }

    for extension in &config.rejected_extensions {
        if !extension.starts_with('.') || extension.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "rejected extension must look like '.ext', got '{}'",
                extension
            )));
        }
    }

    if config.excluded_sections.iter().any(|id| id.is_empty()) {
        return Err(ConfigError::Validation(
            "excluded_sections cannot contain empty ids".to_string(),
        ));
    }

    if config.content_container_id.is_empty() {
        return Err(ConfigError::Validation(
            "content_container_id cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates math markup names
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("math_element", &config.math_element),
        ("notation_attribute", &config.notation_attribute),
        ("math_class", &config.math_class),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}
