pub mod classification;
pub mod config;
pub mod domain_utils;
pub mod features;
pub mod history;
pub mod parity_check;
pub mod report;
pub mod scoring;

pub use classification::{classify, ClassificationResult};
pub use config::{Config, OutputFormat};
pub use features::{extract_features, ExtractionError, FeatureName, FeatureVector};
pub use history::{HistoryEntry, SessionHistory};
pub use report::{analyze_url, AnalysisReport};
pub use scoring::{assess_risk, RiskAssessment, RiskLevel, ScoringProfile, WeightTable};
