//! Frontier: visited set and round-based pending queue
//!
//! The frontier is the only owner of traversal state. It is mutated solely by
//! the coordinator's merge step, between sub-batches; workers only ever see a
//! shared read-only snapshot of the visited set.
//!
//! Traversal proceeds in rounds. A round is fixed when it starts: links
//! discovered and failures requeued while it runs go to the next round's
//! pending set, which deduplicates them.

use crate::url::{LinkFilter, SiteOrigin};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// What happened to a failed URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requeue {
    /// Scheduled for the next round; `attempt` failures so far
    Requeued { attempt: u32 },

    /// Attempt budget used up; the URL leaves the session
    Exhausted { attempts: u32 },
}

pub struct Frontier {
    origin: SiteOrigin,
    filter: LinkFilter,

    /// Full URLs; shared with workers as a snapshot
    visited: Arc<HashSet<String>>,

    /// Paths of the running round not yet handed out
    current: VecDeque<String>,
    /// Every path of the running round, dispatched or not
    in_round: HashSet<String>,

    /// Next round, in admission order
    pending: Vec<String>,
    pending_set: HashSet<String>,

    attempts: HashMap<String, u32>,
    max_attempts: Option<u32>,
    rounds: u64,
}

impl Frontier {
    /// Starts a session from a resumed visited set
    ///
    /// The seed path is always pending, even when already visited, so a
    /// resumed session can rediscover the links it had not yet processed.
    pub fn new(
        origin: SiteOrigin,
        filter: LinkFilter,
        visited: HashSet<String>,
        seed_path: &str,
        max_attempts: Option<u32>,
    ) -> Self {
        let seed = seed_path.to_string();

        Self {
            origin,
            filter,
            visited: Arc::new(visited),
            current: VecDeque::new(),
            in_round: HashSet::new(),
            pending: vec![seed.clone()],
            pending_set: HashSet::from([seed]),
            attempts: HashMap::new(),
            max_attempts,
            rounds: 0,
        }
    }

    /// Admits a discovered link into the next round
    ///
    /// Returns `false` for links the filter rejects, visited URLs, paths that
    /// are already pending or part of the running round, and dead-lettered paths.
    pub fn admit(&mut self, path: &str) -> bool {
        let Some(path) = self.filter.accept(path) else {
            return false;
        };

        if self.visited.contains(&self.origin.full_url(&path))
            || self.in_round.contains(&path)
            || self.pending_set.contains(&path)
            || self.is_exhausted(&path)
        {
            return false;
        }

        self.pending_set.insert(path.clone());
        self.pending.push(path);
        true
    }

    /// Schedules a failed path for the next round, unless its budget is spent
    pub fn requeue(&mut self, path: &str) -> Requeue {
        let attempts = self.attempts.entry(path.to_string()).or_insert(0);
        *attempts += 1;
        let attempt = *attempts;

        if self.max_attempts.is_some_and(|max| attempt >= max) {
            return Requeue::Exhausted { attempts: attempt };
        }

        if self.pending_set.insert(path.to_string()) {
            self.pending.push(path.to_string());
        }
        Requeue::Requeued { attempt }
    }

    fn is_exhausted(&self, path: &str) -> bool {
        match (self.max_attempts, self.attempts.get(path)) {
            (Some(max), Some(&attempts)) => attempts >= max,
            _ => false,
        }
    }

    /// Records a processed URL; returns `false` if it was already visited
    pub fn mark_visited(&mut self, full_url: &str) -> bool {
        if self.visited.contains(full_url) {
            return false;
        }
        // Workers have dropped their snapshots at the barrier, so this does not clone
        Arc::make_mut(&mut self.visited).insert(full_url.to_string())
    }

    pub fn is_visited(&self, full_url: &str) -> bool {
        self.visited.contains(full_url)
    }

    /// Hands out up to `size` paths of the running round
    pub fn next_batch(&mut self, size: usize) -> Vec<String> {
        let take = size.min(self.current.len());
        self.current.drain(..take).collect()
    }

    /// Starts the next round from the pending set
    ///
    /// Returns `false` once there is nothing left to crawl. Called only after
    /// the running round has been fully handed out.
    pub fn advance_round(&mut self) -> bool {
        debug_assert!(self.current.is_empty(), "round advanced before it drained");

        self.pending_set.clear();
        self.in_round = self.pending.iter().cloned().collect();
        self.current = std::mem::take(&mut self.pending).into();

        if self.current.is_empty() {
            return false;
        }
        self.rounds += 1;
        true
    }

    pub fn visited_snapshot(&self) -> Arc<HashSet<String>> {
        Arc::clone(&self.visited)
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Paths waiting for the next round
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Paths of the running round not yet handed out
    pub fn round_remaining(&self) -> usize {
        self.current.len()
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Everything still waiting, in the running round or the next
    pub fn outstanding(&self) -> usize {
        self.current.len() + self.pending.len()
    }
}
