#![allow(clippy::uninlined_format_args)]

use phish_lens::parity_check::SAMPLE_URLS;
use phish_lens::report::analyze_url;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Scoring parity sample URLs...");

    for (name, url) in SAMPLE_URLS {
        println!("\n=== {} ===", name);
        println!("URL: {}", url);

        let report = analyze_url(url)?;
        println!(
            "Points: {} Level: {} Verdict: {} (confidence {:.2})",
            report.assessment.points,
            report.assessment.level,
            report.classification.verdict(),
            report.classification.confidence
        );
        println!("Triggered: {:?}", report.assessment.triggered);
    }

    for bad in ["", "example.com/login", "mailto:someone@example.com"] {
        println!("\n=== malformed: {:?} ===", bad);
        match analyze_url(bad) {
            Ok(_) => println!("Unexpectedly analyzed"),
            Err(e) => println!("Rejected: {}", e),
        }
    }

    println!("\n=== Sample URL testing complete ===");
    Ok(())
}
