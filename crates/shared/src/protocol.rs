use serde::{Deserialize, Serialize};

pub const DEFAULT_ORDER: &str = "name";
pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const FIRST_PAGE: u32 = 1;

/// Filter, sort and pagination parameters for a cohort listing.
///
/// The query is sent to the service as-is. Sort keys and page bounds are the
/// service's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortQuery {
    pub filter: String,
    pub order: String,
    pub limit: u32,
    pub page: u32,
}

impl Default for CohortQuery {
    fn default() -> Self {
        Self {
            filter: String::new(),
            order: DEFAULT_ORDER.to_string(),
            limit: DEFAULT_PAGE_SIZE,
            page: FIRST_PAGE,
        }
    }
}

impl CohortQuery {
    pub fn with_page_size(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Query-string pairs in the order the service documents them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("filter", self.filter.clone()),
            ("order", self.order.clone()),
            ("limit", self.limit.to_string()),
            ("page", self.page.to_string()),
        ]
    }
}
