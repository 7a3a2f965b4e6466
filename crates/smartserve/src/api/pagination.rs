use axum::http::Uri;
use serde::Serialize;

use super::error::ApiError;

const PAGE_PARAM: &str = "page";

/// One page of a list response.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Slices `items` to the page named by the request's `page` parameter
/// (1-based, or `last`).
pub fn paginate<T>(items: Vec<T>, size: usize, uri: &Uri) -> Result<Paginated<T>, ApiError> {
    let size = size.max(1);
    let count = items.len();
    let pages = count.div_ceil(size).max(1);

    let page = match page_param(uri) {
        None => 1,
        Some("last") => pages,
        Some(raw) => raw.parse::<usize>().map_err(|_| ApiError::InvalidPage)?,
    };
    if page < 1 || page > pages {
        return Err(ApiError::InvalidPage);
    }

    let next = (page < pages).then(|| link(uri, Some(page + 1)));
    let previous = (page > 1).then(|| link(uri, (page > 2).then_some(page - 1)));
    let results = items.into_iter().skip((page - 1) * size).take(size).collect();

    Ok(Paginated {
        count,
        next,
        previous,
        results,
    })
}

fn page_param(uri: &Uri) -> Option<&str> {
    uri.query()?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == PAGE_PARAM).then_some(value)
    })
}

/// The request path with the page parameter replaced, or removed for page 1.
fn link(uri: &Uri, page: Option<usize>) -> String {
    let mut pairs: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split_once('=').map_or(*pair, |(key, _)| key) != PAGE_PARAM)
        .map(str::to_string)
        .collect();
    if let Some(page) = page {
        pairs.push(format!("{PAGE_PARAM}={page}"));
    }

    if pairs.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), pairs.join("&"))
    }
}
