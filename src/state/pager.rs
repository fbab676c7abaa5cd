//! Pagination bookkeeping for background page fetches
//!
//! The store itself is stateless between calls; everything about "where we
//! are" lives here, in one value owned by the single consumer that is
//! allowed to mutate it. Two rules from that arrangement:
//! - at most one fetch may be in flight at a time (`begin` refuses a second);
//! - a fetch that completes after the consumer has switched to a different
//!   database must be discarded, which is what the source stamp is for.

use std::path::PathBuf;

use super::data::GenerationRecord;
use super::store::RecordStore;

/// A page fetch handed to a background task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Which record set this request belongs to
    pub source: u64,
    pub offset: usize,
    pub limit: usize,
}

/// What a background fetch hands back to the pager
#[derive(Debug, Clone)]
pub struct PageResult {
    pub source: u64,
    pub offset: usize,
    pub records: Vec<GenerationRecord>,
    /// Total rows in the store at fetch time
    pub total: usize,
    /// Raw rows the query spanned, including ones whose blob failed to
    /// decode. The cursor advances by this, not by `records.len()`, so a
    /// corrupt row is passed over instead of re-fetched on the next page.
    pub rows_spanned: usize,
}

impl PageResult {
    /// An empty page echoing the request's stamps, so a failed fetch still
    /// applies to (or is correctly discarded by) the pager that issued it.
    fn empty(source: u64, offset: usize) -> Self {
        PageResult {
            source,
            offset,
            records: Vec::new(),
            total: 0,
            rows_spanned: 0,
        }
    }
}

/// Explicit pagination state for one record set.
#[derive(Debug)]
pub struct Pager {
    source: u64,
    loaded_offset: usize,
    total: Option<usize>,
    in_flight: bool,
}

impl Pager {
    pub fn new() -> Self {
        Pager {
            source: 0,
            loaded_offset: 0,
            total: None,
            in_flight: false,
        }
    }

    /// Forget everything and move to a new record set. Any fetch still in
    /// flight keeps the old source stamp and will be discarded on arrival.
    pub fn reset(&mut self) {
        self.source += 1;
        self.loaded_offset = 0;
        self.total = None;
        self.in_flight = false;
    }

    /// Rows applied so far
    pub fn loaded_offset(&self) -> usize {
        self.loaded_offset
    }

    /// Total row count, once the first page has reported it
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    /// Whether more rows remain; true until a completed fetch says otherwise
    pub fn has_more(&self) -> bool {
        self.total.map_or(true, |t| self.loaded_offset < t)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start the next page fetch. Returns None while a fetch is outstanding
    /// or when the record set is exhausted.
    pub fn begin(&mut self, limit: usize) -> Option<PageRequest> {
        if self.in_flight || !self.has_more() {
            return None;
        }
        self.in_flight = true;
        Some(PageRequest {
            source: self.source,
            offset: self.loaded_offset,
            limit,
        })
    }

    /// Apply a completed fetch. Late results from a previous record set are
    /// discarded, and discarding does not clear the in-flight guard of the
    /// current set. Returns the records the caller may materialize.
    pub fn complete(&mut self, result: PageResult) -> Option<Vec<GenerationRecord>> {
        if result.source != self.source {
            return None;
        }
        self.in_flight = false;
        // advance by rows spanned, not records decoded: a page that skipped
        // corrupt rows must not make the next request re-fetch them
        self.loaded_offset = result.offset + result.rows_spanned;
        self.total = Some(result.total);
        Some(result.records)
    }
}

impl Default for Pager {
    fn default() -> Self {
        Pager::new()
    }
}

/// Run one page fetch on a blocking worker thread.
///
/// The worker opens its own read-only store handle by path and drops it as
/// soon as the page is out, so no connection is shared across threads. An
/// unopenable database degrades to an empty result rather than an error —
/// the pager then reports a total of zero.
pub async fn fetch_page(db_path: PathBuf, request: PageRequest) -> PageResult {
    let (source, offset) = (request.source, request.offset);
    let result = tokio::task::spawn_blocking(move || fetch_page_blocking(&db_path, &request))
        .await;
    match result {
        Ok(page) => page,
        Err(e) => {
            eprintln!("⚠️  Page fetch task failed: {}", e);
            PageResult::empty(source, offset)
        }
    }
}

fn fetch_page_blocking(db_path: &PathBuf, request: &PageRequest) -> PageResult {
    let store = match RecordStore::open(db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("⚠️  {}", e);
            return PageResult::empty(request.source, request.offset);
        }
    };

    let total = store.count();
    // LIMIT/OFFSET count raw rows, not decodable ones
    let rows_spanned = request.limit.min(total.saturating_sub(request.offset));
    let records = store.fetch(request.offset, request.limit);
    PageResult {
        source: request.source,
        offset: request.offset,
        records,
        total,
        rows_spanned,
    }
}
