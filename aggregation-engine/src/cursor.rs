//! Pagination cursor shared by both scheduling modes

use common::error::Result;
use common::model::account::Account;

use crate::reader::AccountPageReader;

/// Sequential cursor over account pages.
///
/// Fetching is inherently sequential: the next offset is only known once
/// the previous page's length is. The cursor advances by the number of
/// rows actually returned and finishes on the first page shorter than
/// `page_size` (that page is still yielded) or on an empty page.
pub(crate) struct PageCursor {
    offset: u64,
    page_size: u64,
    finished: bool,
}

impl PageCursor {
    pub(crate) fn new(page_size: u64) -> Self {
        Self {
            offset: 0,
            page_size,
            finished: false,
        }
    }

    /// Fetch the next page, or `None` once pagination has terminated.
    pub(crate) async fn next_page(
        &mut self,
        reader: &dyn AccountPageReader,
    ) -> Result<Option<Vec<Account>>> {
        if self.finished {
            return Ok(None);
        }

        let page = reader.fetch_page(self.offset, self.page_size).await?;
        if page.is_empty() {
            self.finished = true;
            return Ok(None);
        }

        self.offset += page.len() as u64;
        if (page.len() as u64) < self.page_size {
            self.finished = true;
        }
        Ok(Some(page))
    }

    /// Offset the next fetch would use
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }
}
