//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the round loop that coordinates the crawl:
//! - Opening the checkpoint, dead-letter log and record sink
//! - Splitting each round into sub-batches and dispatching them to workers
//! - Merging each sub-batch's results once all of them are in
//! - Honoring pause/stop requests, the request interval and the article limit

use crate::config::Config;
use crate::crawler::control::{self, ControlState};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{Frontier, Requeue};
use crate::crawler::parser::ArticleParser;
use crate::crawler::processor::{CrawlResult, PageError, PageOutcome, PageProcessor};
use crate::output::{open_record_sink, CrawlStatistics, JsonlSink, RecordSink};
use crate::storage::{open_checkpoint, CheckpointStore, UrlLog};
use crate::url::SiteOrigin;
use crate::CrawlError;
use futures::stream::{self, StreamExt};
use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Main crawler coordinator structure
///
/// Owns every piece of mutable crawl state. Workers get an `Arc` of the page
/// processor and a snapshot of the visited set, nothing else.
pub struct Coordinator {
    config: Arc<Config>,
    processor: Arc<PageProcessor>,
    frontier: Frontier,
    checkpoint: UrlLog,
    dead_letters: UrlLog,
    sink: JsonlSink<BufWriter<File>>,
    control: Option<watch::Receiver<ControlState>>,
    stats: CrawlStatistics,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Resumes from the checkpoint in the output directory if there is one.
    /// The pending queue always starts from the seed alone.
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let (origin, seed_path) = SiteOrigin::from_seed(&config.crawler.seed_url)?;

        std::fs::create_dir_all(&config.output.directory)?;
        let (checkpoint, visited) = open_checkpoint(&config.output.checkpoint_path())?;
        let dead_letters = UrlLog::new(config.output.dead_letter_path());
        let sink = open_record_sink(&config.output)?;

        let fetcher = Fetcher::from_config(&config.http)?;
        let parser = ArticleParser::new(&config)?;
        let frontier = Frontier::new(
            origin.clone(),
            parser.filter().clone(),
            visited,
            &seed_path,
            config.crawler.attempt_budget(),
        );

        tracing::info!(
            "Crawling {} from {} ({} already visited)",
            origin.as_str(),
            seed_path,
            frontier.visited_len()
        );

        Ok(Self {
            config: Arc::new(config),
            processor: Arc::new(PageProcessor::new(origin, fetcher, parser)),
            frontier,
            checkpoint,
            dead_letters,
            sink,
            control: None,
            stats: CrawlStatistics::start(),
        })
    }

    /// Lets an external controller pause or stop the crawl between sub-batches
    pub fn with_control(mut self, control: watch::Receiver<ControlState>) -> Self {
        self.control = Some(control);
        self
    }

    /// Runs rounds until the frontier is exhausted, the article limit is hit,
    /// or a stop is requested
    pub async fn run(&mut self) -> Result<CrawlStatistics, CrawlError> {
        let workers = self.config.crawler.effective_workers();
        let sub_batch_size = self.config.crawler.sub_batch_size();
        let interval = Duration::from_millis(self.config.crawler.request_interval_ms);
        let limit = self.config.crawler.article_limit;

        tracing::info!(
            "Starting crawl: {:?} mode, {} workers, sub-batches of {}",
            self.config.crawler.mode,
            workers,
            sub_batch_size
        );

        'rounds: while self.frontier.advance_round() {
            self.stats.rounds = self.frontier.rounds();
            tracing::info!(
                "Round {}: {} URLs pending, {} visited",
                self.frontier.rounds(),
                self.frontier.round_remaining(),
                self.frontier.visited_len()
            );

            loop {
                if !self.proceed().await {
                    tracing::info!("Crawl stopped on request");
                    self.stats.interrupted = true;
                    break 'rounds;
                }

                let mut size = sub_batch_size;
                if let Some(limit) = limit {
                    let remaining = limit.saturating_sub(self.stats.pages_dispatched);
                    if remaining == 0 {
                        tracing::info!("Article limit of {} reached", limit);
                        break 'rounds;
                    }
                    size = remaining.min(size as u64) as usize;
                }

                let batch = self.frontier.next_batch(size);
                if batch.is_empty() {
                    break;
                }

                if !interval.is_zero() {
                    tokio::time::sleep(interval).await;
                }

                let results = self.dispatch(batch, workers).await;
                self.merge(results)?;
            }
        }

        self.sink.flush()?;

        self.stats.visited_total = self.frontier.visited_len() as u64;
        self.stats.pending_at_exit = self.frontier.outstanding() as u64;
        self.stats.finish();

        tracing::info!(
            "Crawl finished: {} articles written, {} visited in total, {} still pending",
            self.stats.articles_written,
            self.stats.visited_total,
            self.stats.pending_at_exit
        );

        Ok(self.stats.clone())
    }

    async fn proceed(&mut self) -> bool {
        match self.control.as_mut() {
            Some(rx) => control::proceed(rx).await,
            None => true,
        }
    }

    /// Runs one sub-batch on at most `workers` tasks and waits for all of it
    ///
    /// Results come back in dispatch order regardless of completion order.
    async fn dispatch(&self, batch: Vec<String>, workers: usize) -> Vec<CrawlResult> {
        let visited = self.frontier.visited_snapshot();

        let mut results: Vec<(usize, CrawlResult)> = stream::iter(batch.into_iter().enumerate())
            .map(|(index, path)| {
                let processor = Arc::clone(&self.processor);
                let visited = Arc::clone(&visited);

                async move {
                    let task = {
                        let processor = Arc::clone(&processor);
                        let path = path.clone();
                        tokio::spawn(async move { processor.process(&path, &visited).await })
                    };

                    let result = match task.await {
                        Ok(result) => result,
                        Err(e) => {
                            let full_url = processor.origin().full_url(&path);
                            CrawlResult::failed(path, full_url, PageError::Worker(e.to_string()))
                        }
                    };
                    (index, result)
                }
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }

    /// Applies a finished sub-batch to the frontier, sink and logs
    ///
    /// Records are flushed before their URLs reach the checkpoint, so a crash
    /// in between can repeat a record but never lose one.
    fn merge(&mut self, results: Vec<CrawlResult>) -> Result<(), CrawlError> {
        let mut newly_visited = Vec::new();
        let mut exhausted = Vec::new();
        let mut admitted = 0usize;
        let mut failed = 0usize;

        for result in results {
            self.stats.pages_dispatched += 1;

            for link in &result.discovered_links {
                if self.frontier.admit(link) {
                    admitted += 1;
                }
            }

            match result.outcome {
                PageOutcome::Extracted(record) => {
                    if self.frontier.is_visited(&result.full_url) {
                        self.stats.already_visited += 1;
                        continue;
                    }
                    self.sink.emit(&record)?;
                    self.frontier.mark_visited(&result.full_url);
                    self.stats.articles_written += 1;
                    newly_visited.push(result.full_url);
                }
                PageOutcome::AlreadyVisited => {
                    tracing::debug!("{} was already visited, links followed only", result.full_url);
                    self.stats.already_visited += 1;
                }
                PageOutcome::Failed(error) => {
                    failed += 1;
                    self.stats.failures += 1;
                    tracing::warn!("Failed to process {}: {}", result.full_url, error);

                    match self.frontier.requeue(&result.path) {
                        Requeue::Requeued { attempt } => {
                            tracing::debug!("Requeued {} after {} failed attempts", result.path, attempt);
                        }
                        Requeue::Exhausted { attempts } => {
                            tracing::warn!("Giving up on {} after {} attempts", result.full_url, attempts);
                            self.stats.dead_lettered += 1;
                            exhausted.push(result.full_url);
                        }
                    }
                }
            }
        }

        self.sink.flush()?;
        self.checkpoint.append(&newly_visited)?;
        self.dead_letters.append(&exhausted)?;

        tracing::info!(
            "Sub-batch done: {} written, {} failed, {} new links; {} visited, {} pending",
            newly_visited.len(),
            failed,
            admitted,
            self.frontier.visited_len(),
            self.frontier.outstanding()
        );

        Ok(())
    }
}

/// Runs a complete crawl session without external control
pub async fn run_crawl(config: Config) -> Result<CrawlStatistics, CrawlError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
