use crate::classification::{classify, ClassificationResult};
use crate::config::{Config, OutputFormat};
use crate::features::{extract_features, ExtractionError, FeatureName, FeatureVector};
use crate::history::{HistoryEntry, SessionHistory};
use crate::scoring::{assess_risk, RiskAssessment, WeightEntry, WeightTable};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

/// URLs at or below this length are reported as normal length. This is the
/// complement of the `url_length` trigger, so a URL never both scores for
/// length and gets the normal-length tip.
const NORMAL_URL_LENGTH: u64 = 75;

const BAR_WIDTH: f64 = 40.0;

#[derive(Debug, Clone, Serialize)]
pub struct DetectedPattern {
    pub feature: FeatureName,
    pub value: u64,
    pub explanation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub url: String,
    pub features: FeatureVector,
    pub assessment: RiskAssessment,
    pub classification: ClassificationResult,
}

/// Run extraction, scoring and classification for one URL.
pub fn analyze_url(url: &str) -> Result<AnalysisReport, ExtractionError> {
    let features = extract_features(url)?;
    let assessment = assess_risk(&features);
    let classification = classify(&assessment);

    log::info!(
        "Analyzed {}: {} risk, {}",
        url,
        assessment.level,
        classification.verdict()
    );

    Ok(AnalysisReport {
        url: url.to_string(),
        features,
        assessment,
        classification,
    })
}

impl AnalysisReport {
    /// Every non-zero signal other than HTTPS, which is a good sign when present.
    pub fn detected_patterns(&self) -> Vec<DetectedPattern> {
        self.features
            .iter()
            .filter(|(name, value)| *name != FeatureName::HasHttps && *value > 0)
            .map(|(feature, value)| DetectedPattern {
                feature,
                value,
                explanation: feature.explanation(),
            })
            .collect()
    }

    pub fn warning_signs(&self) -> Vec<&'static str> {
        let mut signs = Vec::new();
        if !self.classification.is_phishing {
            return signs;
        }
        if !self.features.is_set(FeatureName::HasHttps) {
            signs.push("This website does not use HTTPS encryption");
        }
        if self.features.is_set(FeatureName::HasIpAddress) {
            signs.push("URL contains an IP address instead of a domain name");
        }
        if self.features.is_set(FeatureName::HasSuspiciousWords) {
            signs.push("URL contains suspicious keywords");
        }
        if self.features.is_set(FeatureName::DomainInPath) {
            signs.push("Domain name is suspiciously repeated in the URL");
        }
        signs
    }

    pub fn security_features(&self) -> Vec<&'static str> {
        let mut good = Vec::new();
        if self.classification.is_phishing {
            return good;
        }
        if self.features.is_set(FeatureName::HasHttps) {
            good.push("Website uses secure HTTPS encryption");
        }
        good.push("No suspicious patterns detected in URL structure");
        if self.features.get(FeatureName::UrlLength) <= NORMAL_URL_LENGTH {
            good.push("URL length is within normal range");
        }
        good
    }
}

/// Heaviest weighted features of the canonical table.
pub fn top_features(count: usize) -> Vec<WeightEntry> {
    WeightTable::canonical()
        .ranked()
        .into_iter()
        .take(count)
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub show_explanations: bool,
    pub top_features: usize,
}

impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        Self {
            show_explanations: config.show_explanations,
            top_features: config.top_features,
        }
    }
}

/// Render one report and return the history with it recorded.
pub fn render(
    report: &AnalysisReport,
    history: SessionHistory,
    format: OutputFormat,
    options: RenderOptions,
) -> Result<(String, SessionHistory)> {
    let output = match format {
        OutputFormat::Text => render_text(report, options),
        OutputFormat::Json => render_json(report, options)?,
    };
    Ok((output, history.record(HistoryEntry::from(report))))
}

fn render_json(report: &AnalysisReport, options: RenderOptions) -> Result<String> {
    let value = serde_json::json!({
        "url": report.url,
        "verdict": report.classification.verdict(),
        "is_phishing": report.classification.is_phishing,
        "confidence": report.classification.confidence,
        "risk_level": report.assessment.level,
        "score": report.assessment.score,
        "points": report.assessment.points,
        "triggered": report.assessment.triggered,
        "features": report.features,
        "detected_patterns": report.detected_patterns(),
        "warning_signs": report.warning_signs(),
        "security_features": report.security_features(),
        "top_features": top_features(options.top_features),
    });
    serde_json::to_string_pretty(&value)
        .with_context(|| format!("Failed to serialize report for {}", report.url))
}

fn render_text(report: &AnalysisReport, options: RenderOptions) -> String {
    let mut out = String::new();
    let classification = &report.classification;

    let icon = if classification.is_phishing { "⚠️" } else { "✅" };
    let _ = writeln!(out, "{} {}", icon, classification.verdict());
    let _ = writeln!(out, "═══════════════════════════════════════");
    let _ = writeln!(out, "URL: {}", report.url);
    let _ = writeln!(
        out,
        "Risk Level: {} (score {:.2}, confidence {:.0}%)",
        report.assessment.level,
        report.assessment.score,
        classification.confidence * 100.0
    );
    let _ = writeln!(out);

    let patterns = report.detected_patterns();
    let _ = writeln!(out, "🔍 Detected Patterns:");
    if patterns.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for pattern in &patterns {
        let _ = writeln!(out, "  • {}: {}", pattern.feature.label(), pattern.value);
        if options.show_explanations {
            let _ = writeln!(out, "    {}", pattern.explanation);
        }
    }
    let _ = writeln!(out);

    if classification.is_phishing {
        let _ = writeln!(out, "⚠️ Warning Signs Detected:");
        for sign in report.warning_signs() {
            let _ = writeln!(out, "  - {}", sign);
        }
    } else {
        let _ = writeln!(out, "✅ Security Features:");
        for feature in report.security_features() {
            let _ = writeln!(out, "  - {}", feature);
        }
    }

    if options.top_features > 0 {
        let _ = writeln!(out);
        let _ = writeln!(out, "📊 Top Impacting Features:");
        for entry in top_features(options.top_features) {
            let bar = "█".repeat((entry.weight() * BAR_WIDTH).round() as usize);
            let _ = writeln!(
                out,
                "  {:<22} {:.2} {}",
                entry.feature.as_str().replace('_', " ").to_uppercase(),
                entry.weight(),
                bar
            );
        }
    }

    out
}

/// Rendered output of a batch run, in input order.
#[derive(Debug)]
pub struct BatchOutcome {
    pub results: Vec<Result<String, ExtractionError>>,
    pub history: SessionHistory,
}

impl BatchOutcome {
    pub fn outputs(&self) -> impl Iterator<Item = &String> {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }

    /// Process exit code for the run: 1 when any URL failed.
    pub fn exit_code(&self) -> i32 {
        if self.failures() > 0 {
            1
        } else {
            0
        }
    }
}

/// Analyze and render every URL in order. A URL that fails extraction is kept
/// as an error and does not enter the history; the rest of the batch still runs.
pub fn analyze_batch<S: AsRef<str>>(
    urls: &[S],
    mut history: SessionHistory,
    format: OutputFormat,
    options: RenderOptions,
) -> Result<BatchOutcome> {
    let mut results = Vec::with_capacity(urls.len());

    for url in urls {
        let url = url.as_ref();
        let report = match analyze_url(url) {
            Ok(report) => report,
            Err(e) => {
                log::warn!("Skipping {}: {}", url, e);
                results.push(Err(e));
                continue;
            }
        };

        let (output, updated) = render(&report, history, format, options)?;
        history = updated;
        results.push(Ok(output));
    }

    Ok(BatchOutcome { results, history })
}

/// Render the session history table, newest first.
pub fn render_history(history: &SessionHistory, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(history)
            .context("Failed to serialize session history"),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "📜 Analysis History ({} entries):", history.len());
            for entry in history.entries() {
                let _ = writeln!(
                    out,
                    "  {:<6} {:>4.0}%  {:<27} {}",
                    entry.risk_level.to_string(),
                    entry.confidence * 100.0,
                    entry.result,
                    entry.url
                );
            }
            Ok(out)
        }
    }
}
