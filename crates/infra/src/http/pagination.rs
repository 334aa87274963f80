//! Pagination cursor decoding
//!
//! The remote exposes two incompatible continuation conventions depending on
//! endpoint: REST collection responses advertise the next page in a `Link`
//! header (`<url?page_info=...>; rel="next"`), GraphQL connections carry a
//! `pageInfo { hasNextPage endCursor }` object. Each convention is decoded
//! here, once, into the shared [`PageCursor`] variant.

use priceloom_domain::PageCursor;
use url::Url;

/// Extract the `rel="next"` continuation token from a `Link` header value.
///
/// Returns `None` when the header carries no next relation, which is the
/// remote's end-of-collection signal.
pub fn next_cursor_from_link_header(header: &str) -> Option<PageCursor> {
    for part in header.split(',') {
        if !part.contains(r#"rel="next""#) {
            continue;
        }
        let target = part.split(';').next()?.trim().trim_start_matches('<').trim_end_matches('>');
        let url = Url::parse(target).ok()?;
        let token = url
            .query_pairs()
            .find(|(key, _)| key == "page_info")
            .map(|(_, value)| value.into_owned())?;
        return Some(PageCursor::LinkHeader(token));
    }
    None
}

/// Build a cursor from a GraphQL `pageInfo` object.
pub fn next_cursor_from_page_info(
    has_next_page: bool,
    end_cursor: Option<String>,
) -> Option<PageCursor> {
    if !has_next_page {
        return None;
    }
    end_cursor.map(PageCursor::Cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_next_relation_among_multiple() {
        let header = concat!(
            r#"<https://shop.example/admin/api/2024-04/products.json?limit=250&page_info=prevtok>; rel="previous", "#,
            r#"<https://shop.example/admin/api/2024-04/products.json?limit=250&page_info=nexttok>; rel="next""#,
        );
        assert_eq!(
            next_cursor_from_link_header(header),
            Some(PageCursor::LinkHeader("nexttok".into()))
        );
    }

    #[test]
    fn absent_next_relation_ends_the_walk() {
        let header =
            r#"<https://shop.example/products.json?page_info=prevtok>; rel="previous""#;
        assert_eq!(next_cursor_from_link_header(header), None);
        assert_eq!(next_cursor_from_link_header(""), None);
    }

    #[test]
    fn malformed_link_targets_are_ignored() {
        assert_eq!(next_cursor_from_link_header(r#"<not a url>; rel="next""#), None);
        assert_eq!(
            next_cursor_from_link_header(r#"<https://shop.example/products.json>; rel="next""#),
            None,
            "next link without a page_info token is treated as exhausted"
        );
    }

    #[test]
    fn page_info_cursor_requires_both_fields() {
        assert_eq!(
            next_cursor_from_page_info(true, Some("abc".into())),
            Some(PageCursor::Cursor("abc".into()))
        );
        assert_eq!(next_cursor_from_page_info(false, Some("abc".into())), None);
        assert_eq!(next_cursor_from_page_info(true, None), None);
    }
}
