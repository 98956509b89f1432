//! Brute-force search over timestamp offsets.
//!
//! Candidates are visited in one fixed order (see [`OffsetSchedule`]) so that
//! every run over the same record and bound finds the same first match, with
//! or without parallel hashing.

use crate::commit::{CommitRecord, object_id};
use crate::error::{Result, WishError};
use rayon::prelude::*;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_OFFSET_SECONDS: u64 = 10 * 60;
pub const DEFAULT_BATCH_SIZE: usize = 4096;

const SHA1_HEX_LENGTH: usize = 40;

/// The hash prefixes the user wishes for; any one of them is enough
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixSet {
    prefixes: Vec<String>,
}

impl PrefixSet {
    pub fn new<I, S>(prefixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        if prefixes.is_empty() {
            return Err(WishError::NoPrefixSupplied);
        }

        for prefix in &prefixes {
            if !prefix.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
                warn!(prefix = %prefix, "Wished prefix is not lowercase hex and will never match");
            } else if prefix.len() > SHA1_HEX_LENGTH {
                warn!(prefix = %prefix, "Wished prefix is longer than a SHA-1 hex digest");
            }
        }

        Ok(Self { prefixes })
    }

    /// True when `digest` starts with at least one wished prefix (case-sensitive)
    pub fn matches(&self, digest: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| digest.starts_with(prefix.as_str()))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

/// Cumulative `(author, committer)` offsets in canonical search order.
///
/// Two counters run over `1..=max+1`: the author counter `a` in the outer
/// loop and the committer counter `c` from the current `a` upwards in the
/// inner loop. Each step adds `a` to the author offset and `c` to the
/// committer offset, so the yielded values are running sums rather than the
/// counters themselves. Since `c >= a` on every step, the committer offset
/// never falls behind the author offset.
#[derive(Debug, Clone)]
pub struct OffsetSchedule {
    last: u64,
    author_counter: u64,
    committer_counter: u64,
    author_offset: i64,
    committer_offset: i64,
}

impl OffsetSchedule {
    pub fn new(max_offset_seconds: u64) -> Self {
        Self {
            last: max_offset_seconds.saturating_add(1),
            author_counter: 1,
            committer_counter: 1,
            author_offset: 0,
            committer_offset: 0,
        }
    }

    /// Number of candidates the schedule yields for a bound
    pub fn total(max_offset_seconds: u64) -> u64 {
        let n = max_offset_seconds.saturating_add(1);
        n.saturating_mul(n.saturating_add(1)) / 2
    }
}

impl Iterator for OffsetSchedule {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.author_counter > self.last {
            return None;
        }

        self.author_offset = self.author_offset.saturating_add(self.author_counter as i64);
        self.committer_offset = self
            .committer_offset
            .saturating_add(self.committer_counter as i64);
        let offsets = (self.author_offset, self.committer_offset);

        if self.committer_counter >= self.last {
            self.author_counter += 1;
            self.committer_counter = self.author_counter;
        } else {
            self.committer_counter += 1;
        }

        Some(offsets)
    }
}

/// A rewritten commit whose object id starts with a wished prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub record: Vec<u8>,
    pub digest: String,
    pub author_timestamp: i64,
    pub committer_timestamp: i64,
    pub author_timezone: String,
    pub committer_timezone: String,
    pub attempts: u64,
}

impl Solution {
    fn from_record(record: &CommitRecord, rendered: Vec<u8>, digest: String, attempts: u64) -> Self {
        Self {
            record: rendered,
            digest,
            author_timestamp: record.author_timestamp,
            committer_timestamp: record.committer_timestamp,
            author_timezone: record.author_timezone().to_string(),
            committer_timezone: record.committer_timezone().to_string(),
            attempts,
        }
    }

    pub fn record_text(&self) -> String {
        String::from_utf8_lossy(&self.record).into_owned()
    }

    /// Command line that re-creates HEAD with the found timestamps.
    /// Only printed for the user, never executed.
    pub fn amend_command(&self) -> String {
        format!(
            "GIT_COMMITTER_DATE='{}' git commit --amend -C HEAD --date='{}'",
            git_date(self.committer_timestamp, &self.committer_timezone),
            git_date(self.author_timestamp, &self.author_timezone),
        )
    }
}

fn git_date(seconds: i64, timezone: &str) -> String {
    if timezone.is_empty() {
        seconds.to_string()
    } else {
        format!("{} {}", seconds, timezone)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Solution),
    NotFound { attempts: u64 },
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn into_result(self) -> Result<Solution> {
        match self {
            SearchOutcome::Found(solution) => Ok(solution),
            SearchOutcome::NotFound { attempts } => Err(WishError::NoMatchFound { attempts }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
    pub max_offset_seconds: u64,
    pub parallel: bool,
    pub batch_size: usize,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            max_offset_seconds: DEFAULT_MAX_OFFSET_SECONDS,
            parallel: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Search {
    pub fn new(max_offset_seconds: u64) -> Self {
        Self {
            max_offset_seconds,
            ..Self::default()
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Walks the offset schedule starting from the record's current
    /// timestamps. On success the record keeps the matching timestamps; when
    /// nothing matches it is left at the last candidate tried.
    pub fn run(&self, record: &mut CommitRecord, wished: &PrefixSet) -> SearchOutcome {
        debug!(template = %record.template_text(), "Commit template");
        info!(
            max_offset_seconds = self.max_offset_seconds,
            candidates = OffsetSchedule::total(self.max_offset_seconds),
            parallel = self.parallel,
            prefixes = ?wished.prefixes(),
            "Starting hash search"
        );

        let outcome = if self.parallel {
            self.run_parallel(record, wished)
        } else {
            self.run_sequential(record, wished)
        };

        match &outcome {
            SearchOutcome::Found(solution) => info!(
                digest = %solution.digest,
                attempts = solution.attempts,
                "Found matching hash"
            ),
            SearchOutcome::NotFound { attempts } => {
                info!(attempts = *attempts, "Search space exhausted")
            }
        }
        outcome
    }

    fn run_sequential(&self, record: &mut CommitRecord, wished: &PrefixSet) -> SearchOutcome {
        let (author_base, committer_base) = (record.author_timestamp, record.committer_timestamp);
        let mut buf = Vec::with_capacity(record.original().len() + 16);
        let mut attempts = 0;

        for (author_offset, committer_offset) in OffsetSchedule::new(self.max_offset_seconds) {
            attempts += 1;
            record.set_timestamps(
                author_base.saturating_add(author_offset),
                committer_base.saturating_add(committer_offset),
            );
            record.render_into(&mut buf);

            let digest = object_id(&buf);
            if wished.matches(&digest) {
                return SearchOutcome::Found(Solution::from_record(record, buf, digest, attempts));
            }
        }

        SearchOutcome::NotFound { attempts }
    }

    /// Hashes the schedule in batches across the rayon pool. Within a batch
    /// `find_map_first` keeps the earliest hit, so the result equals the
    /// sequential one.
    fn run_parallel(&self, record: &mut CommitRecord, wished: &PrefixSet) -> SearchOutcome {
        let (author_base, committer_base) = (record.author_timestamp, record.committer_timestamp);
        let mut schedule = OffsetSchedule::new(self.max_offset_seconds);
        let batch_size = self.batch_size.max(1);
        let mut attempts = 0u64;

        loop {
            let batch: Vec<(i64, i64)> = schedule
                .by_ref()
                .take(batch_size)
                .map(|(author_offset, committer_offset)| {
                    (
                        author_base.saturating_add(author_offset),
                        committer_base.saturating_add(committer_offset),
                    )
                })
                .collect();
            let Some(&(last_author, last_committer)) = batch.last() else {
                break;
            };

            let shared: &CommitRecord = &*record;
            let hit = batch
                .par_iter()
                .enumerate()
                .map_init(Vec::<u8>::new, |buf, (index, &(author, committer))| {
                    shared.render_with(author, committer, buf);
                    let digest = object_id(buf);
                    wished
                        .matches(&digest)
                        .then_some((index, author, committer, digest))
                })
                .find_map_first(|hit| hit);

            if let Some((index, author, committer, digest)) = hit {
                attempts += index as u64 + 1;
                record.set_timestamps(author, committer);
                let rendered = record.render();
                return SearchOutcome::Found(Solution::from_record(record, rendered, digest, attempts));
            }

            attempts += batch.len() as u64;
            record.set_timestamps(last_author, last_committer);
            debug!(attempts, "Batch exhausted without a match");
        }

        SearchOutcome::NotFound { attempts }
    }
}

/// Parses `raw`, then searches up to `max_offset_seconds` for a commit id
/// starting with one of `prefixes`. Missing prefixes are reported before the
/// record is even looked at.
pub fn wish<I, S>(raw: impl Into<Vec<u8>>, prefixes: I, max_offset_seconds: u64) -> Result<SearchOutcome>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let wished = PrefixSet::new(prefixes)?;
    let mut record = CommitRecord::parse(raw)?;
    Ok(Search::new(max_offset_seconds).run(&mut record, &wished))
}
