pub mod url_features;

pub use url_features::extract_features;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

pub const FEATURE_COUNT: usize = 20;

/// Canonical URL feature identifiers, in vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    UrlLength,
    HostnameLength,
    DomainInPath,
    DomainAgeDays,
    NumDots,
    NumHyphens,
    NumAt,
    NumQuestionMarks,
    NumAnd,
    NumEqual,
    NumUnderscore,
    NumTilde,
    NumPercent,
    NumSlash,
    HasIpAddress,
    HasHttps,
    HasSuspiciousWords,
    DirCount,
    PathLength,
    HasDoubleSlash,
}

impl FeatureName {
    pub const ALL: [FeatureName; FEATURE_COUNT] = [
        FeatureName::UrlLength,
        FeatureName::HostnameLength,
        FeatureName::DomainInPath,
        FeatureName::DomainAgeDays,
        FeatureName::NumDots,
        FeatureName::NumHyphens,
        FeatureName::NumAt,
        FeatureName::NumQuestionMarks,
        FeatureName::NumAnd,
        FeatureName::NumEqual,
        FeatureName::NumUnderscore,
        FeatureName::NumTilde,
        FeatureName::NumPercent,
        FeatureName::NumSlash,
        FeatureName::HasIpAddress,
        FeatureName::HasHttps,
        FeatureName::HasSuspiciousWords,
        FeatureName::DirCount,
        FeatureName::PathLength,
        FeatureName::HasDoubleSlash,
    ];

    /// Position of this feature in a `FeatureVector`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureName::UrlLength => "url_length",
            FeatureName::HostnameLength => "hostname_length",
            FeatureName::DomainInPath => "domain_in_path",
            FeatureName::DomainAgeDays => "domain_age_days",
            FeatureName::NumDots => "num_dots",
            FeatureName::NumHyphens => "num_hyphens",
            FeatureName::NumAt => "num_at",
            FeatureName::NumQuestionMarks => "num_question_marks",
            FeatureName::NumAnd => "num_and",
            FeatureName::NumEqual => "num_equal",
            FeatureName::NumUnderscore => "num_underscore",
            FeatureName::NumTilde => "num_tilde",
            FeatureName::NumPercent => "num_percent",
            FeatureName::NumSlash => "num_slash",
            FeatureName::HasIpAddress => "has_ip_address",
            FeatureName::HasHttps => "has_https",
            FeatureName::HasSuspiciousWords => "has_suspicious_words",
            FeatureName::DirCount => "dir_count",
            FeatureName::PathLength => "path_length",
            FeatureName::HasDoubleSlash => "has_double_slash",
        }
    }

    /// Title-cased label for terminal output, e.g. "Num Question Marks".
    pub fn label(self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Human-readable reason this signal matters.
    pub fn explanation(self) -> &'static str {
        match self {
            FeatureName::UrlLength => "Unusually long URLs may indicate hidden malicious content",
            FeatureName::HostnameLength => "Extremely long hostnames are often suspicious",
            FeatureName::DomainInPath => "Domain name repeated in URL path may indicate deception",
            FeatureName::DomainAgeDays => {
                "Newly registered domains are more likely to be malicious"
            }
            FeatureName::NumDots => "Excessive dots may indicate subdomain abuse",
            FeatureName::NumHyphens => "Multiple hyphens are common in phishing URLs",
            FeatureName::NumAt => {
                "The @ symbol in URLs can be used to obscure the actual destination"
            }
            FeatureName::NumQuestionMarks => "Multiple query parameters may hide malicious code",
            FeatureName::NumAnd => "Numerous parameters might indicate suspicious data collection",
            FeatureName::NumEqual => "Many parameters could suggest data harvesting",
            FeatureName::NumUnderscore => "Uncommon in legitimate URLs",
            FeatureName::NumTilde => "Rarely used in legitimate URLs",
            FeatureName::NumPercent => "Encoded characters may hide malicious content",
            FeatureName::NumSlash => "Deep directory structures might hide malicious content",
            FeatureName::HasIpAddress => "IP addresses instead of domain names are suspicious",
            FeatureName::HasHttps => "Lack of HTTPS indicates poor security",
            FeatureName::HasSuspiciousWords => "Contains terms commonly used in phishing",
            FeatureName::DirCount => "Excessive directories may hide true purpose",
            FeatureName::PathLength => "Extremely long paths may hide malicious content",
            FeatureName::HasDoubleSlash => "Double slashes in path may indicate URL manipulation",
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-schema feature values for one URL. Booleans are stored as 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureVector {
    values: [u64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Build a vector from values already in canonical order.
    pub fn from_values(values: [u64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, name: FeatureName) -> u64 {
        self.values[name.index()]
    }

    pub fn is_set(&self, name: FeatureName) -> bool {
        self.get(name) > 0
    }

    pub fn values(&self) -> &[u64; FEATURE_COUNT] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureName, u64)> + '_ {
        FeatureName::ALL
            .iter()
            .map(move |name| (*name, self.values[name.index()]))
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name.as_str(), &value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Cannot extract features from '{url}': missing {component}")]
    MissingComponent { url: String, component: String },
}
