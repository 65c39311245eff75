use url::Url;

/// Pagination hints carried by an RFC 8288 `Link` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// A `rel="next"` link is present.
    pub has_next: bool,

    /// Page number of the `rel="last"` link, when present and numeric.
    pub last_page: Option<u64>,
}

impl PageLinks {
    /// Parse a header of the form `<url>; rel="next", <url>; rel="last"`.
    ///
    /// Entries that do not have the expected shape are skipped.
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let mut links = Self::default();

        for entry in header.split(',') {
            let mut parts = entry.split(';');
            let Some(target) = parts.next().map(str::trim) else {
                continue;
            };
            let Some(target) = target.strip_prefix('<').and_then(|t| t.strip_suffix('>')) else {
                continue;
            };

            for param in parts {
                let Some((key, value)) = param.split_once('=') else {
                    continue;
                };
                if !key.trim().eq_ignore_ascii_case("rel") {
                    continue;
                }

                for rel in value.trim().trim_matches('"').split_ascii_whitespace() {
                    match rel {
                        "next" => links.has_next = true,
                        "last" => links.last_page = page_number(target),
                        _ => {}
                    }
                }
            }
        }

        links
    }
}

fn page_number(target: &str) -> Option<u64> {
    Url::parse(target)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_github_first_page() {
        let links = PageLinks::parse(
            r#"<https://api.github.com/repositories/1/contributors?per_page=1&page=2>; rel="next", <https://api.github.com/repositories/1/contributors?per_page=1&page=110>; rel="last""#,
        );

        assert!(links.has_next);
        assert_eq!(links.last_page, Some(110));
    }

    #[test]
    fn test_parse_github_last_page() {
        let links = PageLinks::parse(
            r#"<https://api.github.com/repositories/1/contributors?page=1>; rel="first", <https://api.github.com/repositories/1/contributors?page=2>; rel="prev""#,
        );

        assert!(!links.has_next);
        assert_eq!(links.last_page, None);
    }

    #[test]
    fn test_parse_only_last() {
        let links = PageLinks::parse(r#"<https://api.github.com/repos/honojs/hono/contributors?per_page=1&page=110>; rel="last""#);
        assert!(!links.has_next);
        assert_eq!(links.last_page, Some(110));
    }

    #[test]
    fn test_parse_multiple_rel_values() {
        let links = PageLinks::parse(r#"<https://example.com/items?page=3>; rel="next last""#);
        assert!(links.has_next);
        assert_eq!(links.last_page, Some(3));
    }

    #[test]
    fn test_parse_last_without_page_parameter() {
        let links = PageLinks::parse(r#"<https://example.com/items?cursor=abc>; rel="last""#);
        assert_eq!(links.last_page, None);
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(PageLinks::parse(""), PageLinks::default());
        assert_eq!(PageLinks::parse("not a link header"), PageLinks::default());
        assert_eq!(PageLinks::parse("https://example.com?page=2; rel=last"), PageLinks::default());
    }
}
