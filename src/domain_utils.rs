use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IP_HOST_PREFIX: Regex =
        Regex::new(r"(?i)^https?://(\d{1,3}\.){3}\d{1,3}").unwrap();
}

/// Minimal host and path helpers over raw and parsed URLs
pub struct DomainUtils;

impl DomainUtils {
    /// True when the raw URL starts with an http(s) scheme followed by a dotted quad
    pub fn starts_with_ip_host(url: &str) -> bool {
        IP_HOST_PREFIX.is_match(url)
    }

    /// Case-insensitive check for the host repeated inside the path
    pub fn host_in_path(host: &str, path: &str) -> bool {
        if host.is_empty() {
            return false;
        }
        path.to_lowercase().contains(&host.to_lowercase())
    }

    /// Number of non-empty `/`-separated segments
    pub fn count_path_segments(path: &str) -> usize {
        path.split('/').filter(|segment| !segment.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_ip_host() {
        assert!(DomainUtils::starts_with_ip_host("http://192.168.1.1/login"));
        assert!(DomainUtils::starts_with_ip_host("HTTPS://10.0.0.1"));
        assert!(!DomainUtils::starts_with_ip_host("http://example.com"));
        assert!(!DomainUtils::starts_with_ip_host("ftp://192.168.1.1/"));
        // IP appearing later in the URL is not the host
        assert!(!DomainUtils::starts_with_ip_host(
            "http://example.com/?next=http://10.0.0.1"
        ));
    }

    #[test]
    fn test_host_in_path() {
        assert!(DomainUtils::host_in_path("example.com", "/Example.COM/x"));
        assert!(!DomainUtils::host_in_path("example.com", "/other/x"));
        assert!(!DomainUtils::host_in_path("", "/anything"));
    }

    #[test]
    fn test_count_path_segments() {
        assert_eq!(DomainUtils::count_path_segments("/"), 0);
        assert_eq!(DomainUtils::count_path_segments("/a/b/c"), 3);
        assert_eq!(DomainUtils::count_path_segments("/a//b/"), 2);
    }
}
