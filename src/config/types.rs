use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Every section and key has a default, so an empty file (or no file at all)
/// yields a crawl of the English encyclopedia starting at "Mathematics".
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// How pages are dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlMode {
    /// Fan each sub-batch out to a bounded worker pool
    #[default]
    Pooled,
    /// One request at a time, sleeping `request-interval-ms` before each
    Sequential,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerConfig {
    /// Absolute URL of the first article; its origin bounds the whole crawl
    #[serde(rename = "seed-url", default = "default_seed_url")]
    pub seed_url: String,

    #[serde(default)]
    pub mode: CrawlMode,

    /// Maximum number of pages processed concurrently
    #[serde(rename = "worker-count", default = "default_worker_count")]
    pub worker_count: usize,

    /// Sub-batch size is `sub_batch_factor * worker_count`
    #[serde(rename = "sub-batch-factor", default = "default_sub_batch_factor")]
    pub sub_batch_factor: usize,

    /// Delay before each sub-batch (pooled) or each request (sequential), in milliseconds
    #[serde(rename = "request-interval-ms", default)]
    pub request_interval_ms: u64,

    /// Hard cap on the number of pages dispatched in this session
    #[serde(rename = "article-limit", default)]
    pub article_limit: Option<u64>,

    /// Failed attempts allowed per URL before it is dead-lettered (0 = unbounded)
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: default_seed_url(),
            mode: CrawlMode::default(),
            worker_count: default_worker_count(),
            sub_batch_factor: default_sub_batch_factor(),
            request_interval_ms: 0,
            article_limit: None,
            max_attempts: default_max_attempts(),
        }
    }
}

impl CrawlerConfig {
    /// Number of concurrent workers actually used
    pub fn effective_workers(&self) -> usize {
        match self.mode {
            CrawlMode::Pooled => self.worker_count,
            CrawlMode::Sequential => 1,
        }
    }

    /// Number of URLs dispatched behind one barrier
    pub fn sub_batch_size(&self) -> usize {
        match self.mode {
            CrawlMode::Pooled => self.sub_batch_factor.saturating_mul(self.worker_count),
            CrawlMode::Sequential => 1,
        }
    }

    /// Attempt budget, `None` meaning unbounded
    pub fn attempt_budget(&self) -> Option<u32> {
        (self.max_attempts > 0).then_some(self.max_attempts)
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Delay before the single retry of a connection failure, in milliseconds
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory holding every file below
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// JSON-lines article records
    #[serde(rename = "records-file", default = "default_records_file")]
    pub records_file: String,

    /// Newline-delimited visited URLs used to resume a session
    #[serde(rename = "checkpoint-file", default = "default_checkpoint_file")]
    pub checkpoint_file: String,

    /// Newline-delimited URLs that exhausted their attempt budget
    #[serde(rename = "dead-letter-file", default = "default_dead_letter_file")]
    pub dead_letter_file: String,

    #[serde(rename = "record-format", default)]
    pub record_format: RecordFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            records_file: default_records_file(),
            checkpoint_file: default_checkpoint_file(),
            dead_letter_file: default_dead_letter_file(),
            record_format: RecordFormat::default(),
        }
    }
}

impl OutputConfig {
    pub fn records_path(&self) -> PathBuf {
        Path::new(&self.directory).join(&self.records_file)
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        Path::new(&self.directory).join(&self.checkpoint_file)
    }

    pub fn dead_letter_path(&self) -> PathBuf {
        Path::new(&self.directory).join(&self.dead_letter_file)
    }
}

/// Shape of each output line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// `{"key", "url", "text"}`
    #[default]
    Keyed,
    /// `{"url", "text"}`
    Plain,
}

/// Link discovery and content truncation policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    #[serde(rename = "article-prefix", default = "default_article_prefix")]
    pub article_prefix: String,

    #[serde(rename = "namespace-separator", default = "default_namespace_separator")]
    pub namespace_separator: String,

    #[serde(rename = "rejected-extensions", default = "default_rejected_extensions")]
    pub rejected_extensions: Vec<String>,

    /// Element ids marking the first non-prose section of an article
    #[serde(rename = "excluded-sections", default = "default_excluded_sections")]
    pub excluded_sections: Vec<String>,

    #[serde(rename = "content-container-id", default = "default_content_container_id")]
    pub content_container_id: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            article_prefix: default_article_prefix(),
            namespace_separator: default_namespace_separator(),
            rejected_extensions: default_rejected_extensions(),
            excluded_sections: default_excluded_sections(),
            content_container_id: default_content_container_id(),
        }
    }
}

/// Names of the math markup recognized by the extractor
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractConfig {
    #[serde(rename = "math-element", default = "default_math_element")]
    pub math_element: String,

    #[serde(rename = "notation-attribute", default = "default_notation_attribute")]
    pub notation_attribute: String,

    #[serde(rename = "math-class", default = "default_math_class")]
    pub math_class: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            math_element: default_math_element(),
            notation_attribute: default_notation_attribute(),
            math_class: default_math_class(),
        }
    }
}

fn default_seed_url() -> String {
    "https://en.wikipedia.org/wiki/Mathematics".to_string()
}

fn default_worker_count() -> usize {
    8
}

fn default_sub_batch_factor() -> usize {
    10
}

fn default_max_attempts() -> u32 {
    5
}

fn default_user_agent() -> String {
    format!(
        "wiki-math-crawler/{} (+https://github.com/wiki-math-crawler)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_retry_delay_ms() -> u64 {
    3000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_output_directory() -> String {
    "wiki_output".to_string()
}

fn default_records_file() -> String {
    "wiki_data.jsonl".to_string()
}

fn default_checkpoint_file() -> String {
    "session_visited_urls.txt".to_string()
}

fn default_dead_letter_file() -> String {
    "dead_letter_urls.txt".to_string()
}

fn default_article_prefix() -> String {
    "/wiki/".to_string()
}

fn default_namespace_separator() -> String {
    ":".to_string()
}

fn default_rejected_extensions() -> Vec<String> {
    [".png", ".jpg", ".jpeg", ".svg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_excluded_sections() -> Vec<String> {
    ["See_also", "References", "External_links", "Works_cited"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_content_container_id() -> String {
    "mw-content-text".to_string()
}

fn default_math_element() -> String {
    "math".to_string()
}

fn default_notation_attribute() -> String {
    "alttext".to_string()
}

fn default_math_class() -> String {
    "texhtml".to_string()
}
