//! Base-path aware asset and link resolution

/// Resolves outbound paths against the deployment base path
///
/// # Examples
/// ```
/// use miswag_blog::helpers::AssetResolver;
///
/// let assets = AssetResolver::new("/miswag-tech-blog");
/// assert_eq!(assets.resolve("/logo.png"), "/miswag-tech-blog/logo.png");
/// assert_eq!(assets.resolve("https://x.com/a.png"), "https://x.com/a.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolver {
    /// Normalized prefix: empty for root deployments, otherwise `/segment[/segment..]`
    base_path: String,
}

impl AssetResolver {
    /// Create a resolver for the given base path
    ///
    /// `"blog"`, `"/blog"` and `"/blog/"` all normalize to `"/blog"`; `""` and `"/"`
    /// mean the site is served from the root.
    pub fn new(base_path: &str) -> Self {
        let trimmed = base_path.trim().trim_matches('/');
        let base_path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        };
        Self { base_path }
    }

    /// The normalized base path (empty for root deployments)
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Resolve a path to its final outbound form
    pub fn resolve(&self, path: &str) -> String {
        if is_external(path) {
            return path.to_string();
        }

        if self.has_base_prefix(path) {
            return path.to_string();
        }

        let normalized = format!("/{}", path.trim_start_matches('/'));
        format!("{}{}", self.base_path, normalized)
    }

    /// Request path relative to the base path, or `None` outside of it
    ///
    /// `/blog/data/a.png` gives `/data/a.png` and `/blog` gives `/`.
    pub fn strip_base<'p>(&self, path: &'p str) -> Option<&'p str> {
        if self.base_path.is_empty() {
            return Some(path);
        }
        match path.strip_prefix(&self.base_path) {
            Some("") => Some("/"),
            Some(rest) if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }

    fn has_base_prefix(&self, path: &str) -> bool {
        if self.base_path.is_empty() {
            return false;
        }
        match path.strip_prefix(&self.base_path) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new("")
    }
}

/// Absolute web URL or protocol-relative reference
pub fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}

/// Whether a reference carries a URL scheme (`https:`, `data:`, `mailto:` ...)
pub fn has_scheme(path: &str) -> bool {
    match path.find(':') {
        Some(pos) if pos > 0 => {
            let scheme = &path[..pos];
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Lowercased URL scheme, ignoring the whitespace and control characters browsers drop
fn scheme(reference: &str) -> Option<String> {
    let cleaned: String = reference
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .take_while(|c| *c != '/' && *c != '?' && *c != '#')
        .collect();
    if has_scheme(&cleaned) {
        cleaned
            .split(':')
            .next()
            .map(|scheme| scheme.to_ascii_lowercase())
    } else {
        None
    }
}

/// Whether a link target may be emitted as-is
///
/// Relative paths, fragments and `http`, `https` and `mailto` URLs are allowed.
pub fn is_safe_link(href: &str) -> bool {
    match scheme(href) {
        Some(scheme) => matches!(scheme.as_str(), "http" | "https" | "mailto"),
        None => true,
    }
}

/// Whether an image source may be emitted as-is
///
/// Relative paths, `http` and `https` URLs and inline `data:image/` payloads are allowed.
pub fn is_safe_image(src: &str) -> bool {
    match scheme(src) {
        Some(scheme) if scheme == "data" => src
            .trim_start()
            .get(5..)
            .is_some_and(|rest| rest.to_ascii_lowercase().starts_with("image/")),
        Some(scheme) => matches!(scheme.as_str(), "http" | "https"),
        None => true,
    }
}

/// Percent-encode a single path segment (article ids in links)
pub fn encode_segment(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment, SEGMENT).to_string()
}

const SEGMENT: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_base_path() {
        let assets = AssetResolver::new("/miswag-tech-blog");
        assert_eq!(assets.resolve("/logo.png"), "/miswag-tech-blog/logo.png");
        assert_eq!(assets.resolve("logo.png"), "/miswag-tech-blog/logo.png");
        assert_eq!(assets.resolve("//cdn.x/a.png"), "//cdn.x/a.png");
    }

    #[test]
    fn test_already_prefixed_is_idempotent() {
        let assets = AssetResolver::new("/miswag-tech-blog");
        let once = assets.resolve("/miswag-tech-blog/logo.png");
        assert_eq!(once, "/miswag-tech-blog/logo.png");
        assert_eq!(assets.resolve(&once), once);
        assert_eq!(assets.resolve("/miswag-tech-blog"), "/miswag-tech-blog");
    }

    #[test]
    fn test_external_passthrough() {
        let assets = AssetResolver::new("/miswag-tech-blog");
        assert_eq!(assets.resolve("https://x.com/a.png"), "https://x.com/a.png");
        assert_eq!(assets.resolve("http://x.com/a.png"), "http://x.com/a.png");
    }

    #[test]
    fn test_sibling_segment_is_not_a_prefix() {
        let assets = AssetResolver::new("/blog");
        assert_eq!(assets.resolve("/blogroll.png"), "/blog/blogroll.png");
    }

    #[test]
    fn test_base_path_normalization() {
        assert_eq!(AssetResolver::new("blog/").base_path(), "/blog");
        assert_eq!(AssetResolver::new("/").base_path(), "");
        assert_eq!(AssetResolver::new("").resolve("a/b.png"), "/a/b.png");
        assert_eq!(AssetResolver::new("").resolve("//x/b.png"), "//x/b.png");
    }

    #[test]
    fn test_nested_relative_path() {
        let assets = AssetResolver::new("/blog");
        assert_eq!(assets.resolve("img/a.png"), "/blog/img/a.png");
        assert_eq!(assets.resolve("/articles/"), "/blog/articles/");
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("https://x.com"));
        assert!(has_scheme("data:image/png;base64,AAAA"));
        assert!(has_scheme("mailto:a@b.c"));
        assert!(!has_scheme("pic.png"));
        assert!(!has_scheme("./img/a:b.png"));
        assert!(!has_scheme(":nope"));
    }

    #[test]
    fn test_strip_base() {
        let assets = AssetResolver::new("/blog");
        assert_eq!(assets.strip_base("/blog/data/a.png"), Some("/data/a.png"));
        assert_eq!(assets.strip_base("/blog"), Some("/"));
        assert_eq!(assets.strip_base("/blog/"), Some("/"));
        assert_eq!(assets.strip_base("/blogroll"), None);
        assert_eq!(assets.strip_base("/other"), None);
        assert_eq!(AssetResolver::default().strip_base("/a"), Some("/a"));
    }

    #[test]
    fn test_safe_links() {
        assert!(is_safe_link("https://x.com"));
        assert!(is_safe_link("MAILTO:a@b.c"));
        assert!(is_safe_link("#section"));
        assert!(is_safe_link("../other/page"));
        assert!(is_safe_link("/articles?q=a:b"));
        assert!(!is_safe_link("javascript:alert(1)"));
        assert!(!is_safe_link("JavaScript:alert(1)"));
        assert!(!is_safe_link("java\tscript:alert(1)"));
        assert!(!is_safe_link("vbscript:msgbox(1)"));
        assert!(!is_safe_link("data:text/html,<b>x</b>"));
    }

    #[test]
    fn test_safe_images() {
        assert!(is_safe_image("pic.png"));
        assert!(is_safe_image("https://cdn.x/a.png"));
        assert!(is_safe_image("data:image/png;base64,AAAA"));
        assert!(!is_safe_image("data:text/html,<script></script>"));
        assert!(!is_safe_image("javascript:alert(1)"));
        assert!(!is_safe_image("file:///etc/passwd"));
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("post-1"), "post-1");
        assert_eq!(encode_segment("a b/c"), "a%20b%2Fc");
    }
}
