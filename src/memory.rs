use std::collections::{BTreeSet, VecDeque};
use std::time::SystemTime;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

pub const MAX_IMPORTANCE: u8 = 10;
pub const DEFAULT_SHORT_TERM_CAPACITY: usize = 10;
pub const DEFAULT_PROMOTION_THRESHOLD: u8 = 5;

/// A remembered fact with an importance score in `0..=10`.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryEntry {
    pub id: Uuid,
    pub content: String,
    pub importance: u8,
    pub tags: BTreeSet<String>,
    pub created_at: SystemTime,
    pub metadata: Map<String, Value>,
    #[serde(skip)]
    sequence: u64,
}

impl MemoryEntry {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryScope {
    ShortTerm,
    LongTerm,
    All,
}

/// Two-tier store: a bounded FIFO short-term window and an unbounded long-term tier.
///
/// Entries reach long-term only by being evicted from short-term with an
/// importance at or above the promotion threshold.
#[derive(Debug, Clone)]
pub struct Memory {
    short_term: VecDeque<MemoryEntry>,
    long_term: Vec<MemoryEntry>,
    capacity: usize,
    promotion_threshold: u8,
    next_sequence: u64,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_TERM_CAPACITY)
    }
}

impl Memory {
    pub fn new(capacity: usize) -> Self {
        Self {
            short_term: VecDeque::with_capacity(capacity.saturating_add(1).min(1024)),
            long_term: Vec::new(),
            capacity,
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
            next_sequence: 0,
        }
    }

    pub fn with_promotion_threshold(mut self, threshold: u8) -> Self {
        self.promotion_threshold = threshold.min(MAX_IMPORTANCE);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn promotion_threshold(&self) -> u8 {
        self.promotion_threshold
    }

    pub fn add_to_short_term<I, S>(
        &mut self,
        content: impl Into<String>,
        importance: u8,
        tags: I,
    ) -> Uuid
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_entry(content, importance, tags, Map::new())
    }

    /// Append to short-term, evicting the oldest entries while over capacity.
    pub fn add_entry<I, S>(
        &mut self,
        content: impl Into<String>,
        importance: u8,
        tags: I,
        metadata: Map<String, Value>,
    ) -> Uuid
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = MemoryEntry {
            id: Uuid::new_v4(),
            content: content.into(),
            importance: importance.min(MAX_IMPORTANCE),
            tags: tags.into_iter().map(Into::into).collect(),
            created_at: SystemTime::now(),
            metadata,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        let id = entry.id;
        self.short_term.push_back(entry);

        while self.short_term.len() > self.capacity {
            let Some(oldest) = self.short_term.pop_front() else {
                break;
            };
            if oldest.importance >= self.promotion_threshold {
                tracing::debug!(
                    entry = %oldest.id,
                    importance = oldest.importance,
                    "promoting memory to long-term"
                );
                self.long_term.push(oldest);
            } else {
                tracing::debug!(
                    entry = %oldest.id,
                    importance = oldest.importance,
                    "discarding evicted memory"
                );
            }
        }
        id
    }

    /// Oldest first.
    pub fn short_term(&self) -> impl DoubleEndedIterator<Item = &MemoryEntry> + '_ {
        self.short_term.iter()
    }

    /// Oldest first.
    pub fn long_term(&self) -> &[MemoryEntry] {
        &self.long_term
    }

    pub fn short_term_len(&self) -> usize {
        self.short_term.len()
    }

    pub fn long_term_len(&self) -> usize {
        self.long_term.len()
    }

    pub fn len(&self) -> usize {
        self.short_term.len() + self.long_term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &Uuid) -> Option<&MemoryEntry> {
        self.short_term
            .iter()
            .chain(self.long_term.iter())
            .find(|entry| &entry.id == id)
    }

    /// Case-insensitive substring search over both tiers, most recent first.
    pub fn search(&self, query: &str) -> Vec<&MemoryEntry> {
        self.search_in(query, MemoryScope::All)
    }

    pub fn search_in(&self, query: &str, scope: MemoryScope) -> Vec<&MemoryEntry> {
        let needle = query.to_lowercase();
        self.collect(scope, |entry| entry.content.to_lowercase().contains(&needle))
    }

    /// Exact tag match over both tiers, most recent first.
    pub fn search_by_tag(&self, tag: &str) -> Vec<&MemoryEntry> {
        self.search_by_tag_in(tag, MemoryScope::All)
    }

    pub fn search_by_tag_in(&self, tag: &str, scope: MemoryScope) -> Vec<&MemoryEntry> {
        self.collect(scope, |entry| entry.has_tag(tag))
    }

    fn collect<F>(&self, scope: MemoryScope, predicate: F) -> Vec<&MemoryEntry>
    where
        F: Fn(&MemoryEntry) -> bool,
    {
        let mut hits: Vec<&MemoryEntry> = Vec::new();
        if scope != MemoryScope::LongTerm {
            hits.extend(self.short_term.iter().filter(|entry| predicate(entry)));
        }
        if scope != MemoryScope::ShortTerm {
            hits.extend(self.long_term.iter().filter(|entry| predicate(entry)));
        }
        hits.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        hits
    }
}
