//! Identity normalization for problem matching.
//!
//! The host site reports the same problem under slightly different URLs
//! (`?envType=...` query strings, a trailing slash or not) and titles with
//! stray whitespace. Matching happens on the normalized forms.

/// Strip the query string, then at most one trailing slash.
///
/// # Examples
/// ```
/// use lsr_srs::normalize_url;
///
/// assert_eq!(
///     normalize_url("https://leetcode.com/problems/two-sum/?envType=daily"),
///     "https://leetcode.com/problems/two-sum"
/// );
/// ```
pub fn normalize_url(url: &str) -> String {
    let without_query = url.split_once('?').map_or(url, |(path, _)| path);
    without_query
        .strip_suffix('/')
        .unwrap_or(without_query)
        .to_string()
}

/// Trim and lowercase.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}
