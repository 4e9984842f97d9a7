//! Collects every page of a paginated JSON collection.
//!
//! Pages look like `{"resources": [...], "next_url": "/v2/x?page=2"}`. The
//! helper follows the next-page cursor until it is absent or null and
//! concatenates the items in page order. A first response without the items
//! field is a single (non-collection) result and is returned unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::http::{self, ApiError, HeaderMap, HttpSettings};

/// Field names used by the paginated API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageShape {
    /// Array of items on each page.
    pub items_field: String,
    /// Cursor to the next page; absent, null or empty on the last page.
    pub next_field: String,
}

impl Default for PageShape {
    fn default() -> Self {
        Self {
            items_field: "resources".to_string(),
            next_field: "next_url".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PagedResults {
    /// Items of every page, in page order.
    Items(Vec<Value>),
    /// The endpoint returned one bare value instead of a collection.
    Single(Value),
}

impl PagedResults {
    pub fn into_value(self) -> Value {
        match self {
            PagedResults::Items(items) => Value::Array(items),
            PagedResults::Single(value) => value,
        }
    }
}

/// GETs `url` and every following page with `headers`. Any non-200 response
/// is fatal.
pub fn get_all_results(
    url: &str,
    headers: &HeaderMap,
    shape: &PageShape,
    settings: &HttpSettings,
) -> Result<PagedResults, ApiError> {
    collect_pages(url, shape, |page_url| {
        http::get(page_url, headers, settings)?.ensure_ok()?.json()
    })
}

/// Pagination loop over an arbitrary page source. `fetch` receives the
/// absolute URL of each page.
pub fn collect_pages<F>(start_url: &str, shape: &PageShape, mut fetch: F) -> Result<PagedResults, ApiError>
where
    F: FnMut(&str) -> Result<Value, ApiError>,
{
    let mut items = Vec::new();
    let mut visited = HashSet::new();
    let mut next = Some(start_url.to_string());
    let mut pages = 0usize;

    while let Some(url) = next.take() {
        if !visited.insert(url.clone()) {
            return Err(ApiError::PaginationLoop { url });
        }
        let mut page = fetch(&url)?;

        let has_items = page
            .get(&shape.items_field)
            .is_some_and(|v| !v.is_null());
        if !has_items {
            if pages == 0 {
                tracing::debug!("{} returned a single result", url);
                return Ok(PagedResults::Single(page));
            }
            return Err(ApiError::MalformedPage {
                url,
                reason: format!("missing `{}`", shape.items_field),
            });
        }

        next = next_page_url(&url, &page, &shape.next_field)?;
        let page_items = match page
            .as_object_mut()
            .and_then(|o| o.remove(&shape.items_field))
        {
            Some(Value::Array(a)) => a,
            _ => {
                return Err(ApiError::MalformedPage {
                    url,
                    reason: format!("`{}` is not an array", shape.items_field),
                })
            }
        };

        pages += 1;
        tracing::debug!("page {} ({}): {} items", pages, url, page_items.len());
        items.extend(page_items);
    }

    tracing::info!("collected {} items from {} pages", items.len(), pages);
    Ok(PagedResults::Items(items))
}

/// Resolves the next-page cursor of `page` (fetched from `current`).
///
/// A root-relative cursor such as `/v2/organizations?page=2` replaces the
/// path of `current` from the point where the cursor's first segment
/// (`/v2`) appears, so a gateway prefix like `/cf` survives. Other cursors,
/// and root-relative ones whose first segment is not in the path, are
/// resolved with [`url::Url::join`].
fn next_page_url(current: &str, page: &Value, next_field: &str) -> Result<Option<String>, ApiError> {
    let cursor = match page.get(next_field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.is_empty() => return Ok(None),
        Some(Value::String(s)) => s,
        Some(_) => {
            return Err(ApiError::MalformedPage {
                url: current.to_string(),
                reason: format!("`{}` is not a string", next_field),
            })
        }
    };
    let base = url::Url::parse(current).map_err(|source| ApiError::InvalidUrl {
        url: current.to_string(),
        source,
    })?;
    if let Some(spliced) = splice_cursor(&base, cursor) {
        return Ok(Some(spliced));
    }
    let next = base.join(cursor).map_err(|source| ApiError::InvalidUrl {
        url: cursor.to_string(),
        source,
    })?;
    Ok(Some(next.to_string()))
}

fn splice_cursor(base: &url::Url, cursor: &str) -> Option<String> {
    if !cursor.starts_with('/') || cursor.starts_with("//") {
        return None;
    }
    let segment_end = cursor[1..]
        .find(&['/', '?', '#'][..])
        .map_or(cursor.len(), |i| i + 1);
    let segment = &cursor[..segment_end];
    if segment.len() < 2 {
        return None;
    }
    let path = base.path();
    let at = path
        .match_indices(segment)
        .map(|(i, _)| i)
        .find(|&i| matches!(path[i + segment.len()..].chars().next(), None | Some('/')))?;
    Some(format!(
        "{}{}{}",
        &base[..url::Position::BeforePath],
        &path[..at],
        cursor
    ))
}
