use std::future::Future;

use crate::api::types::Page;
use crate::error::{FugueError, Result};

/// Offset cursor over a paginated listing.
///
/// Each call to [`Paginator::next_page`] issues one fetch at the current
/// offset. The cursor ends after the first page whose `is_truncated` is
/// false; it never fetches past that page.
pub struct Paginator<F> {
    fetch: F,
    offset: u64,
    exhausted: bool,
    pages_fetched: usize,
}

impl<F, Fut, T> Paginator<F>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    pub fn new(fetch: F) -> Self {
        Self::starting_at(0, fetch)
    }

    /// Resume a listing from a previously returned `next_offset`.
    pub fn starting_at(offset: u64, fetch: F) -> Self {
        Paginator {
            fetch,
            offset,
            exhausted: false,
            pages_fetched: 0,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetch the next page, or `None` once the last page has been returned.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = (self.fetch)(self.offset).await?;
        self.pages_fetched += 1;

        if page.is_truncated {
            self.offset = page.next_offset.ok_or_else(|| FugueError::Api {
                status: 200,
                body: format!("truncated page at offset {} has no next_offset", self.offset),
            })?;
        } else {
            self.exhausted = true;
        }

        Ok(Some(page.items))
    }

    /// Drain the cursor, concatenating pages in order.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }
}
