//! The `RemoteList` boundary: the abstract external item-catalog collaborator (§5, §6).
//!
//! The engine never talks to the network, auth, or rate limits directly — it
//! depends only on this trait. New module; the trait shape comes straight
//! from §6's contract (`fetch_items`/`replace_items`/`resolve_url`/
//! `create_list`), with pagination surfaced as an iterator per the REDESIGN
//! FLAGS ("coroutine-like pagination ... surfaced as an iterator/stream
//! abstraction"). The in-memory double mirrors the teacher's general pattern
//! of keeping network/storage collaborators behind a trait so tests can swap
//! in a deterministic stand-in.

use crate::errors::RemoteError;
use crate::item::Item;

/// One page of items from a paginated remote fetch.
pub struct ItemPage {
    pub items: Vec<Item>,
    pub next_cursor: Option<String>,
}

/// The external, mutable, ordered item catalog the engine mirrors (§6, GLOSSARY).
///
/// Implementors own authentication, rate limiting, and batching; the engine
/// only ever calls these four operations.
pub trait RemoteList {
    /// Fetch one page of the named list's current ordered items. `cursor` is
    /// `None` for the first page and then whatever the previous page's
    /// `next_cursor` was, so callers drive pagination without this trait
    /// needing `async`.
    fn fetch_page(&self, list_id: &str, cursor: Option<&str>) -> Result<ItemPage, RemoteError>;

    /// Fetch every item in the list by draining [`RemoteList::fetch_page`]
    /// until it reports no further cursor.
    fn fetch_items(&self, list_id: &str) -> Result<Vec<Item>, RemoteError> {
        let mut items = Vec::new();
        let mut cursor = None;
        loop {
            let page = self.fetch_page(list_id, cursor.as_deref())?;
            items.extend(page.items);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(items)
    }

    /// Replace the list's content wholesale with `ordered_item_ids`, in order.
    fn replace_items(&self, list_id: &str, ordered_item_ids: &[String]) -> Result<(), RemoteError>;

    /// Resolve a catalog URL (as a user would paste it) to the list id this
    /// trait's other methods expect.
    fn resolve_url(&self, url: &str) -> Result<String, RemoteError>;

    /// Create a new, empty list under the given display name, returning its id.
    fn create_list(&self, name: &str) -> Result<String, RemoteError>;
}

/// An in-memory [`RemoteList`] for tests: no network, deterministic pagination.
pub struct MemoryRemoteList {
    lists: std::sync::Mutex<std::collections::HashMap<String, Vec<Item>>>,
    page_size: usize,
}

impl MemoryRemoteList {
    pub fn new() -> Self {
        MemoryRemoteList {
            lists: std::sync::Mutex::new(std::collections::HashMap::new()),
            page_size: 2,
        }
    }

    pub fn with_page_size(page_size: usize) -> Self {
        MemoryRemoteList {
            lists: std::sync::Mutex::new(std::collections::HashMap::new()),
            page_size: page_size.max(1),
        }
    }

    pub fn seed(&self, list_id: impl Into<String>, items: Vec<Item>) {
        self.lists.lock().unwrap().insert(list_id.into(), items);
    }
}

impl Default for MemoryRemoteList {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteList for MemoryRemoteList {
    fn fetch_page(&self, list_id: &str, cursor: Option<&str>) -> Result<ItemPage, RemoteError> {
        let lists = self.lists.lock().unwrap();
        let items = lists.get(list_id).ok_or_else(|| RemoteError::ListNotFound(list_id.to_string()))?;
        let start: usize = match cursor {
            Some(c) => c.parse().map_err(|_| RemoteError::Rejected(format!("bad cursor `{c}`")))?,
            None => 0,
        };
        let end = (start + self.page_size).min(items.len());
        let page_items = items[start..end].to_vec();
        let next_cursor = if end < items.len() { Some(end.to_string()) } else { None };
        Ok(ItemPage { items: page_items, next_cursor })
    }

    fn replace_items(&self, list_id: &str, ordered_item_ids: &[String]) -> Result<(), RemoteError> {
        let mut lists = self.lists.lock().unwrap();
        let existing = lists.entry(list_id.to_string()).or_default();
        let by_id: std::collections::HashMap<_, _> =
            existing.iter().map(|item| (item.id.clone(), item.clone())).collect();
        *existing = ordered_item_ids
            .iter()
            .map(|id| by_id.get(id).cloned().unwrap_or_else(|| Item::bare(id.clone())))
            .collect();
        Ok(())
    }

    fn resolve_url(&self, url: &str) -> Result<String, RemoteError> {
        url.rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| RemoteError::Rejected(format!("cannot resolve url `{url}`")))
    }

    fn create_list(&self, name: &str) -> Result<String, RemoteError> {
        let id = format!("list:{name}");
        self.lists.lock().unwrap().entry(id.clone()).or_default();
        Ok(id)
    }
}
