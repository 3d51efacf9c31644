//! Query filters for travel request listings.

use chrono::{DateTime, Utc};

use super::request::TravelRequest;
use super::status::TravelStatus;
use crate::domain::UserId;

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound applied to caller-supplied page sizes.
pub const MAX_PAGE_SIZE: u32 = 100;

/// One-based page selection with a bounded page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Normalise caller input: page is at least 1, size is clamped to
    /// `1..=MAX_PAGE_SIZE`.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::PageRequest;
    ///
    /// let page = PageRequest::new(Some(0), Some(500));
    /// assert_eq!(page.page(), 1);
    /// assert_eq!(page.page_size(), 100);
    /// ```
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

/// Optional constraints narrowing a listing. Absent fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TravelRequestFilters {
    pub owner: Option<UserId>,
    pub status: Option<TravelStatus>,
    /// Inclusive lower bound on departure.
    pub departure_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on departure.
    pub departure_until: Option<DateTime<Utc>>,
    /// Case-insensitive destination substring.
    pub destination: Option<String>,
    pub page: PageRequest,
}

impl TravelRequestFilters {
    /// Restrict the listing to a single owner.
    #[must_use]
    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Destination needle, lower-cased, or `None` when blank.
    pub fn destination_needle(&self) -> Option<String> {
        self.destination
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether `request` satisfies every constraint except paging.
    pub fn matches(&self, request: &TravelRequest) -> bool {
        if self.owner.is_some_and(|owner| !request.is_owned_by(&owner)) {
            return false;
        }
        if self.status.is_some_and(|status| request.status() != status) {
            return false;
        }
        if self
            .departure_from
            .is_some_and(|from| request.departure() < from)
        {
            return false;
        }
        if self
            .departure_until
            .is_some_and(|until| request.departure() > until)
        {
            return false;
        }
        match self.destination_needle() {
            Some(needle) => request.destination().to_lowercase().contains(&needle),
            None => true,
        }
    }
}
