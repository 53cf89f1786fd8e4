use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rows per page, or everything on a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PageSizeRepr", into = "PageSizeRepr")]
pub enum PageSize {
    Rows(usize),
    All,
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Rows(10)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Rows(n) => write!(f, "{n}"),
            PageSize::All => f.write_str("all"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid page size {0:?}: expected a positive number or \"all\"")]
pub struct ParsePageSizeError(String);

impl FromStr for PageSize {
    type Err = ParsePageSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(PageSize::All);
        }
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(PageSize::Rows(n)),
            _ => Err(ParsePageSizeError(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PageSizeRepr {
    Rows(usize),
    Named(String),
}

impl TryFrom<PageSizeRepr> for PageSize {
    type Error = ParsePageSizeError;

    fn try_from(repr: PageSizeRepr) -> Result<Self, Self::Error> {
        match repr {
            PageSizeRepr::Rows(0) => Err(ParsePageSizeError("0".to_string())),
            PageSizeRepr::Rows(n) => Ok(PageSize::Rows(n)),
            PageSizeRepr::Named(s) => s.parse(),
        }
    }
}

impl From<PageSize> for PageSizeRepr {
    fn from(size: PageSize) -> Self {
        match size {
            PageSize::Rows(n) => PageSizeRepr::Rows(n),
            PageSize::All => PageSizeRepr::Named("all".to_string()),
        }
    }
}

/// One page of a list plus the numbers a pager needs to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    /// The page actually served, after clamping.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 1-indexed position of the first item shown, 0 when there is nothing.
    pub show_start: usize,
    /// 1-indexed position of the last item shown, 0 when there is nothing.
    pub show_end: usize,
}

impl<T> PageResult<T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice `items` into the requested 1-indexed page. Out-of-range pages are
/// clamped to the nearest valid page, so a non-empty list never yields an
/// empty page.
pub fn paginate<T: Clone>(items: &[T], page_size: PageSize, page: usize) -> PageResult<T> {
    let total_items = items.len();
    let (start, end, page, total_pages) = match page_size {
        PageSize::All => (0, total_items, 1, 1),
        PageSize::Rows(rows) => {
            let rows = rows.max(1);
            let total_pages = total_items.div_ceil(rows).max(1);
            let page = page.clamp(1, total_pages);
            let start = (page - 1) * rows;
            let end = (start + rows).min(total_items);
            (start, end, page, total_pages)
        }
    };

    let (show_start, show_end) = if total_items == 0 {
        (0, 0)
    } else {
        (start + 1, end)
    };

    PageResult {
        items: items[start..end].to_vec(),
        page,
        total_pages,
        total_items,
        show_start,
        show_end,
    }
}
