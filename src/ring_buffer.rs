//! Bounded journal of reported faults.
//!
//! Keeps the most recent faults that reached the process boundary so crash
//! reporters can attach them. Memory is bounded regardless of how often game
//! code faults.
//!
//! # Design Principles
//!
//! - **Bounded memory**: fixed maximum entry count with FIFO eviction
//! - **Per-entry size caps**: no single message can dominate the journal
//! - **RwLock-based**: concurrent readers, exclusive writers
//! - **Cheap reads**: entries hold `Arc<str>` so cloning is a refcount bump
//!
//! # Example
//!
//! ```rust
//! use bcl_faults::{Fault, FaultJournal, FaultKind};
//!
//! let journal = FaultJournal::new(100, 1024);
//! journal.record(&Fault::new(FaultKind::Timeout), false);
//!
//! let recent = journal.get_recent(10);
//! assert_eq!(recent[0].kind, FaultKind::Timeout);
//! assert_eq!(recent[0].code.to_string(), "0x80131505");
//! ```

use crate::{Fault, FaultKind, LegacyCode};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// Cause kinds kept per entry; deeper chains are counted but not listed.
const MAX_JOURNALED_CAUSES: usize = 8;

/// A single journaled fault with bounded size.
#[derive(Clone, Debug)]
pub struct JournalEntry {
    /// Unix timestamp of the report
    pub timestamp: u64,
    /// Kind of the reported fault
    pub kind: FaultKind,
    /// Code of the reported fault
    pub code: LegacyCode,
    /// Message, truncated to the journal's per-entry cap
    pub message: Arc<str>,
    /// Kinds of the first causes, outermost first
    pub causes: Arc<[FaultKind]>,
    /// Total faults in the chain, including the reported one
    pub chain_len: usize,
    /// Whether the report ended the process
    pub is_terminating: bool,
    /// Approximate size in bytes
    pub size_bytes: usize,
}

impl JournalEntry {
    /// Innermost kind kept in the entry.
    ///
    /// This is the chain's root unless the chain was longer than the entry
    /// keeps (`chain_len > causes.len() + 1`).
    pub fn root_kind(&self) -> FaultKind {
        self.causes.last().copied().unwrap_or(self.kind)
    }
}

/// Oldest-first window over a fixed slot array.
struct EntryRing {
    slots: Box<[Option<JournalEntry>]>,
    next: usize,
    len: usize,
}

impl EntryRing {
    fn with_slots(count: usize) -> Self {
        Self {
            slots: (0..count).map(|_| None).collect(),
            next: 0,
            len: 0,
        }
    }

    /// Store `entry`; returns `true` when it overwrote the oldest entry.
    fn push(&mut self, entry: JournalEntry) -> bool {
        let overwrote = self.slots[self.next].replace(entry).is_some();
        self.next = (self.next + 1) % self.slots.len();
        self.len = (self.len + 1).min(self.slots.len());
        overwrote
    }

    fn oldest_first(&self) -> impl DoubleEndedIterator<Item = &JournalEntry> {
        let cap = self.slots.len();
        let oldest = (self.next + cap - self.len) % cap;
        (0..self.len).filter_map(move |offset| self.slots[(oldest + offset) % cap].as_ref())
    }

    fn clear(&mut self) {
        self.slots.fill_with(|| None);
        self.next = 0;
        self.len = 0;
    }
}

/// Fault journal with bounded memory usage.
///
/// Clones share the same journal.
#[derive(Clone)]
pub struct FaultJournal {
    ring: Arc<RwLock<EntryRing>>,
    max_entries: usize,
    max_entry_bytes: usize,
    evictions: Arc<AtomicU64>,
}

impl FaultJournal {
    /// Create a journal.
    ///
    /// * `max_entries` - entries kept before FIFO eviction (at least 1)
    /// * `max_entry_bytes` - cap on the message bytes kept per entry
    pub fn new(max_entries: usize, max_entry_bytes: usize) -> Self {
        let bounded_entries = max_entries.max(1);
        Self {
            ring: Arc::new(RwLock::new(EntryRing::with_slots(bounded_entries))),
            max_entries: bounded_entries,
            max_entry_bytes,
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    // The ring is never left half-updated; poisoned guards are used as-is.
    fn entries(&self) -> RwLockReadGuard<'_, EntryRing> {
        self.ring.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn entries_mut(&self) -> RwLockWriteGuard<'_, EntryRing> {
        self.ring.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a fault, evicting the oldest entry when full.
    pub fn record(&self, fault: &Fault, is_terminating: bool) {
        let entry = self.summarize(fault, is_terminating);
        if self.entries_mut().push(entry) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn summarize(&self, fault: &Fault, is_terminating: bool) -> JournalEntry {
        fault.with_log(|log| {
            let message = clip_message(log.message(), self.max_entry_bytes);

            let mut causes: SmallVec<[FaultKind; MAX_JOURNALED_CAUSES]> = SmallVec::new();
            let mut chain_len = 1;
            for cause in log.causes() {
                chain_len += 1;
                if causes.len() < MAX_JOURNALED_CAUSES {
                    causes.push(cause.kind());
                }
            }

            JournalEntry {
                timestamp: SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_or(0, |d| d.as_secs()),
                kind: log.kind(),
                code: log.code(),
                size_bytes: message.len() + causes.len() * std::mem::size_of::<FaultKind>(),
                message: Arc::from(message.as_ref()),
                causes: Arc::from(causes.as_slice()),
                chain_len,
                is_terminating,
            }
        })
    }

    /// The `count` most recent entries, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<JournalEntry> {
        self.entries().oldest_first().rev().take(count).cloned().collect()
    }

    /// All entries, newest first.
    pub fn get_all(&self) -> Vec<JournalEntry> {
        self.entries().oldest_first().rev().cloned().collect()
    }

    /// Entries matching a predicate, oldest first.
    ///
    /// ```rust
    /// # use bcl_faults::{Fault, FaultJournal, FaultKind};
    /// # let journal = FaultJournal::new(100, 1024);
    /// # journal.record(&Fault::new(FaultKind::Overflow), false);
    /// let arithmetic = journal.get_filtered(|entry| entry.kind.is_a(FaultKind::Arithmetic));
    /// assert_eq!(arithmetic.len(), 1);
    /// ```
    pub fn get_filtered<F>(&self, predicate: F) -> Vec<JournalEntry>
    where
        F: Fn(&JournalEntry) -> bool,
    {
        self.entries()
            .oldest_first()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    /// Current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries().len
    }

    /// Whether the journal holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total payload bytes (lower-bound estimate).
    pub fn payload_bytes(&self) -> usize {
        self.entries().oldest_first().map(|e| e.size_bytes).sum()
    }

    /// Entries evicted since creation.
    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries_mut().clear();
    }

    /// Maximum entry count.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Whether the journal is at capacity.
    pub fn is_full(&self) -> bool {
        self.len() >= self.max_entries
    }
}

impl Default for FaultJournal {
    /// 256 entries, 1 KiB of message each.
    fn default() -> Self {
        Self::new(256, 1024)
    }
}

/// Marker appended to clipped messages.
const CLIP_MARKER: &str = "...[TRUNC]";

/// Clip `message` to `max_bytes` on a char boundary, marking the cut.
fn clip_message(message: &str, max_bytes: usize) -> Cow<'_, str> {
    if message.len() <= max_bytes {
        return Cow::Borrowed(message);
    }
    let Some(room) = max_bytes.checked_sub(CLIP_MARKER.len()) else {
        return Cow::Borrowed(&CLIP_MARKER[..max_bytes]);
    };
    let cut = (0..=room)
        .rev()
        .find(|&i| message.is_char_boundary(i))
        .unwrap_or(0);
    Cow::Owned(format!("{}{}", &message[..cut], CLIP_MARKER))
}
