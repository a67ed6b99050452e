use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
    RequestPartsExt,
};
use serde::{Deserialize, Serialize};

/// Page envelope matching the original wire format: `items`, `num_page`
/// (total page count) and `total` (row count ignoring pagination).
#[derive(Serialize, Debug)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub num_page: u32,
    pub total: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u32, num_page: u32) -> Paginated<T> {
        Self {
            items,
            num_page,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            num_page: self.num_page,
            total: self.total,
        }
    }
}

/// LIMIT/OFFSET window for one page of a collection of `total` rows.
///
/// `num_pages` is `ceil(total / per_page)`, never below 1 so an empty
/// collection still has a first (empty) page. Out-of-range page numbers are
/// clamped to the nearest valid page instead of erroring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSlice {
    pub page: u32,
    pub num_pages: u32,
    pub limit: i64,
    pub offset: i64,
}

impl PageSlice {
    pub fn new(total: i64, requested_page: u32, per_page: u32) -> PageSlice {
        let per_page = per_page.max(1);
        let total = total.max(0) as u64;
        let num_pages = (total.div_ceil(per_page as u64)).max(1) as u32;
        let page = requested_page.clamp(1, num_pages);

        Self {
            page,
            num_pages,
            limit: per_page as i64,
            offset: (page as i64 - 1) * per_page as i64,
        }
    }
}

/// Extracts the `page` query parameter. Absent, non-numeric or zero values
/// fall back to the first page; extraction never rejects the request.
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    pub page: u32,
}

#[derive(Deserialize)]
struct RawPagination {
    page: Option<String>,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Pagination {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let page = parts
            .extract::<Query<RawPagination>>()
            .await
            .ok()
            .and_then(|Query(raw)| raw.page)
            .and_then(|page| page.parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1);

        Ok(Pagination { page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn page_count_is_ceil_of_total_over_page_size() {
        assert_eq!(PageSlice::new(10, 1, 5).num_pages, 2);
        assert_eq!(PageSlice::new(11, 1, 5).num_pages, 3);
        assert_eq!(PageSlice::new(4, 1, 5).num_pages, 1);
    }

    #[test]
    fn empty_collection_still_has_one_page() {
        let slice = PageSlice::new(0, 1, 5);
        assert_eq!(slice.num_pages, 1);
        assert_eq!(slice.page, 1);
        assert_eq!(slice.offset, 0);
    }

    #[test]
    fn out_of_range_pages_clamp_to_first_or_last() {
        let last = PageSlice::new(11, 99, 5);
        assert_eq!(last.page, 3);
        assert_eq!(last.offset, 10);

        let first = PageSlice::new(11, 0, 5);
        assert_eq!(first.page, 1);
        assert_eq!(first.offset, 0);
    }

    #[test]
    fn consecutive_pages_cover_the_collection_exactly_once() {
        for total in [0i64, 1, 4, 5, 11, 25] {
            let per_page = 4;
            let num_pages = PageSlice::new(total, 1, per_page).num_pages;

            let mut covered = vec![];
            for page in 1..=num_pages {
                let slice = PageSlice::new(total, page, per_page);
                let end = (slice.offset + slice.limit).min(total);
                covered.extend(slice.offset..end);
            }

            assert_eq!(covered, (0..total).collect::<Vec<_>>(), "total={}", total);
        }
    }

    #[tokio::test]
    async fn page_param_defaults_to_one_when_absent_or_invalid() {
        for uri in ["/ads", "/ads?page=abc", "/ads?page=", "/ads?page=0"] {
            let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
            let pagination = Pagination::from_request_parts(&mut parts, &())
                .await
                .unwrap();
            assert_eq!(pagination.page, 1, "uri={}", uri);
        }

        let (mut parts, _) = Request::builder()
            .uri("/ads?page=3")
            .body(())
            .unwrap()
            .into_parts();
        let pagination = Pagination::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(pagination.page, 3);
    }
}
