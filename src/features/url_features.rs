use super::{ExtractionError, FeatureName, FeatureVector, FEATURE_COUNT};
use crate::domain_utils::DomainUtils;
use url::Url;

/// Terms commonly found in credential-harvesting URLs.
pub const SUSPICIOUS_WORDS: &[&str] = &[
    "secure", "login", "signin", "bank", "account", "update", "verify",
];

/// Turn a URL into its 20-feature vector.
///
/// Host and path come from the WHATWG parse of `url`, so they match what a
/// browser's `new URL()` reports. Character counts and keyword checks run over
/// the raw input exactly as given, query string included.
pub fn extract_features(url: &str) -> Result<FeatureVector, ExtractionError> {
    if url.trim().is_empty() {
        return Err(ExtractionError::InvalidUrl {
            url: url.to_string(),
            reason: "empty URL".to_string(),
        });
    }

    let parsed = Url::parse(url).map_err(|e| ExtractionError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => {
            return Err(ExtractionError::MissingComponent {
                url: url.to_string(),
                component: "host".to_string(),
            })
        }
    };
    let path = parsed.path();
    let lowered = url.to_lowercase();

    let mut values = [0u64; FEATURE_COUNT];
    let mut set = |name: FeatureName, value: u64| values[name.index()] = value;

    set(FeatureName::UrlLength, char_len(url));
    set(FeatureName::HostnameLength, char_len(host));
    set(
        FeatureName::DomainInPath,
        flag(DomainUtils::host_in_path(host, path)),
    );
    // No registration lookup is performed
    set(FeatureName::DomainAgeDays, 0);

    set(FeatureName::NumDots, count_char(url, '.'));
    set(FeatureName::NumHyphens, count_char(url, '-'));
    set(FeatureName::NumAt, count_char(url, '@'));
    set(FeatureName::NumQuestionMarks, count_char(url, '?'));
    set(FeatureName::NumAnd, count_char(url, '&'));
    set(FeatureName::NumEqual, count_char(url, '='));
    set(FeatureName::NumUnderscore, count_char(url, '_'));
    set(FeatureName::NumTilde, count_char(url, '~'));
    set(FeatureName::NumPercent, count_char(url, '%'));
    set(FeatureName::NumSlash, count_char(url, '/'));

    set(
        FeatureName::HasIpAddress,
        flag(DomainUtils::starts_with_ip_host(url)),
    );
    set(FeatureName::HasHttps, flag(parsed.scheme() == "https"));
    set(
        FeatureName::HasSuspiciousWords,
        flag(SUSPICIOUS_WORDS.iter().any(|word| lowered.contains(word))),
    );

    set(
        FeatureName::DirCount,
        DomainUtils::count_path_segments(path) as u64,
    );
    set(FeatureName::PathLength, char_len(path));
    set(FeatureName::HasDoubleSlash, flag(path.contains("//")));

    log::debug!("Extracted features for {}: host={} path={}", url, host, path);

    Ok(FeatureVector::from_values(values))
}

fn char_len(text: &str) -> u64 {
    text.chars().count() as u64
}

fn count_char(text: &str, needle: char) -> u64 {
    text.matches(needle).count() as u64
}

fn flag(condition: bool) -> u64 {
    u64::from(condition)
}
