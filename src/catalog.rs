//! Public scholarship catalog: paginated search, detail and top picks.
//!
//! Search, category, sort and page all travel to the server as query
//! parameters; nothing is filtered client-side.

use std::str::FromStr;

use crate::api::{ApiClient, ScholarshipQuery};
use crate::error::ApiError;
use crate::models::scholarship::CATEGORIES;
use crate::models::{Review, Scholarship};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Default,
    FeesAsc,
    FeesDesc,
    Newest,
}

impl SortOrder {
    /// `(sortFees, sortDate)` query values; at most one is set.
    pub fn params(&self) -> (Option<&'static str>, Option<&'static str>) {
        match self {
            SortOrder::Default => (None, None),
            SortOrder::FeesAsc => (Some("asc"), None),
            SortOrder::FeesDesc => (Some("desc"), None),
            SortOrder::Newest => (None, Some("newest")),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "default" => Ok(SortOrder::Default),
            "fees-asc" | "asc" => Ok(SortOrder::FeesAsc),
            "fees-desc" | "desc" => Ok(SortOrder::FeesDesc),
            "newest" | "date" => Ok(SortOrder::Newest),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.iter().any(|c| c.eq_ignore_ascii_case(category))
}

/// Filter, sort and pagination state of the catalog list.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    search: String,
    category: String,
    sort: SortOrder,
    page: u32,
    limit: u32,
    /// Unknown until the first page comes back.
    total: Option<u64>,
}

impl CatalogState {
    pub fn new(limit: u32) -> Self {
        Self {
            search: String::new(),
            category: String::new(),
            sort: SortOrder::Default,
            page: 1,
            limit: limit.max(1),
            total: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.trim().to_string();
        self.page = 1;
    }

    /// `None` or an empty string clears the filter.
    pub fn set_category(&mut self, category: Option<&str>) {
        self.category = category.map(str::trim).unwrap_or_default().to_string();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.page = 1;
    }

    /// `ceil(total / limit)`, never below one.
    pub fn total_pages(&self) -> u32 {
        let total = self.total.unwrap_or(0);
        let pages = total.div_ceil(u64::from(self.limit));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    pub fn has_next(&self) -> bool {
        self.total.is_some() && self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn next_page(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Jumps to `page`, clamped to the known page range.
    pub fn go_to(&mut self, page: u32) {
        let page = page.max(1);
        self.page = match self.total {
            Some(_) => page.min(self.total_pages()),
            None => page,
        };
    }

    pub fn query(&self) -> ScholarshipQuery {
        let (sort_fees, sort_date) = self.sort.params();
        ScholarshipQuery {
            search: self.search.clone(),
            category: self.category.clone(),
            page: self.page,
            limit: self.limit,
            sort_fees,
            sort_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScholarshipDetail {
    pub scholarship: Scholarship,
    pub reviews: Vec<Review>,
}

impl ScholarshipDetail {
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating_point)).sum();
        Some(f64::from(sum) / self.reviews.len() as f64)
    }
}

pub struct Catalog<'a> {
    api: &'a ApiClient,
}

impl<'a> Catalog<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Fetches the page described by `state` and records the server's total.
    pub async fn fetch(&self, state: &mut CatalogState) -> Result<Vec<Scholarship>, ApiError> {
        let page = self.api.search_scholarships(&state.query()).await?;
        tracing::debug!(page = state.page, total = page.total_scholarships, "catalog page loaded");
        state.total = Some(page.total_scholarships);
        Ok(page.scholarships)
    }

    /// Scholarship plus its reviews. `Ok(None)` when the scholarship is gone.
    pub async fn detail(&self, id: &str) -> Result<Option<ScholarshipDetail>, ApiError> {
        let scholarship = match self.api.scholarship(id).await {
            Ok(s) => s,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        let reviews = self.api.reviews_for_scholarship(id).await?;
        Ok(Some(ScholarshipDetail { scholarship, reviews }))
    }

    pub async fn top(&self) -> Result<Vec<Scholarship>, ApiError> {
        self.api.top_scholarships().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_maps_to_one_query_param() {
        assert_eq!(SortOrder::Default.params(), (None, None));
        assert_eq!(SortOrder::FeesAsc.params(), (Some("asc"), None));
        assert_eq!(SortOrder::FeesDesc.params(), (Some("desc"), None));
        assert_eq!(SortOrder::Newest.params(), (None, Some("newest")));
    }

    #[test]
    fn filter_changes_reset_page() {
        let mut state = CatalogState::new(6);
        state.total = Some(30);
        state.go_to(4);
        assert_eq!(state.page(), 4);

        state.set_search("data");
        assert_eq!(state.page(), 1);

        state.go_to(3);
        state.set_category(Some("Partial"));
        assert_eq!(state.page(), 1);

        state.go_to(2);
        state.set_sort(SortOrder::Newest);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn total_pages_rounds_up_and_never_hits_zero() {
        let mut state = CatalogState::new(6);
        assert_eq!(state.total_pages(), 1);
        state.total = Some(0);
        assert_eq!(state.total_pages(), 1);
        state.total = Some(6);
        assert_eq!(state.total_pages(), 1);
        state.total = Some(13);
        assert_eq!(state.total_pages(), 3);
    }

    #[test]
    fn paging_is_bounded() {
        let mut state = CatalogState::new(6);
        assert!(!state.next_page(), "total unknown");
        state.total = Some(12);
        assert!(!state.previous_page());
        assert!(state.next_page());
        assert_eq!(state.page(), 2);
        assert!(!state.next_page());
        state.go_to(99);
        assert_eq!(state.page(), 2);
        state.go_to(0);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn query_carries_state() {
        let mut state = CatalogState::new(6);
        state.set_search("  physics ");
        state.set_category(Some("Full fund"));
        state.set_sort(SortOrder::FeesDesc);
        let q = state.query();
        assert_eq!(q.search, "physics");
        assert_eq!(q.category, "Full fund");
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 6);
        assert_eq!(q.sort_fees, Some("desc"));
        assert_eq!(q.sort_date, None);
    }

    #[test]
    fn sort_and_category_parsing() {
        assert_eq!("fees-asc".parse::<SortOrder>().unwrap(), SortOrder::FeesAsc);
        assert_eq!("date".parse::<SortOrder>().unwrap(), SortOrder::Newest);
        assert!("cheapest".parse::<SortOrder>().is_err());
        assert!(is_known_category("self-fund"));
        assert!(!is_known_category("Loan"));
    }
}
