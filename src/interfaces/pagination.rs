use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Envelope for every list endpoint: `{ count, next, previous, results }`,
/// with `next`/`previous` as path-relative URLs that keep the caller's
/// filters intact.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(req: &HttpRequest, page: u32, page_size: u32, count: i64, results: Vec<T>) -> Self {
        let has_next = (page as i64) * (page_size as i64) < count;
        let next = has_next.then(|| page_url(req, page + 1));
        let previous = (page > 1).then(|| page_url(req, page - 1));

        Paginated {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Bare pagination parameters, for list endpoints without filters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub fn clamp_page(page: Option<u32>) -> u32 {
    page.unwrap_or(1).max(1)
}

pub fn clamp_page_size(page_size: Option<u32>) -> u32 {
    page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// OFFSET from a 1-based `page` and a clamped `page_size`.
pub fn page_offset(page: u32, page_size: u32) -> i64 {
    let page = page.saturating_sub(1);
    (page as i64) * (page_size as i64)
}

/// Rebuild the request URL with `page` swapped out, re-encoding every
/// other query parameter as-is.
fn page_url(req: &HttpRequest, page: u32) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in url::form_urlencoded::parse(req.query_string().as_bytes()) {
        if key != "page" {
            serializer.append_pair(&key, &value);
        }
    }
    serializer.append_pair("page", &page.to_string());
    format!("{}?{}", req.path(), serializer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(clamp_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(0)), 1);
        assert_eq!(clamp_page_size(Some(500)), MAX_PAGE_SIZE);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(0, 10), 0);
    }

    #[test]
    fn links_preserve_existing_filters() {
        let req = TestRequest::with_uri("/api/projects?search=site%20vitrine&page=2")
            .to_http_request();

        let paginated: Paginated<i32> = Paginated::new(&req, 2, 10, 35, vec![]);

        let next = paginated.next.unwrap();
        assert!(next.starts_with("/api/projects?"));
        assert!(next.contains("search=site+vitrine") || next.contains("search=site%20vitrine"));
        assert!(next.contains("page=3"));
        assert!(paginated.previous.unwrap().contains("page=1"));
    }

    #[test]
    fn first_page_has_no_previous_and_last_has_no_next() {
        let req = TestRequest::with_uri("/api/projects").to_http_request();

        let first: Paginated<i32> = Paginated::new(&req, 1, 10, 15, vec![]);
        assert!(first.previous.is_none());
        assert!(first.next.is_some());

        let last: Paginated<i32> = Paginated::new(&req, 2, 10, 15, vec![]);
        assert!(last.next.is_none());
        assert!(last.previous.is_some());
    }

    #[test]
    fn exact_multiple_of_page_size_has_no_phantom_next() {
        let req = TestRequest::with_uri("/api/projects").to_http_request();
        let paginated: Paginated<i32> = Paginated::new(&req, 2, 10, 20, vec![]);
        assert!(paginated.next.is_none());
    }
}
