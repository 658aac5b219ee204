use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use phish_lens::config::{Config, OutputFormat};
use phish_lens::features::FeatureName;
use phish_lens::parity_check::ParityReport;
use phish_lens::report::{analyze_batch, render_history, RenderOptions};
use phish_lens::scoring::{ScoringProfile, WeightTable};
use phish_lens::SessionHistory;
use std::process;

const DEFAULT_CONFIG_PATH: &str = "phish-lens.yaml";

fn main() {
    let matches = Command::new("phish-lens")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Heuristic phishing URL detector")
        .long_about(
            "phish-lens scores URLs for phishing risk from 20 structural features:\n\
             • Weighted Low/Medium/High risk levels with a binary verdict\n\
             • Per-feature explanations, warning signs and security tips\n\
             • Exportable scoring profile shared with the browser extension\n\
             • Parity reports to detect scoring drift between runtimes",
        )
        .arg(
            Arg::new("url")
                .value_name("URL")
                .help("URLs to analyze")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("batch")
                .short('b')
                .long("batch")
                .value_name("FILE")
                .help("Analyze URLs listed one per line in FILE ('#' starts a comment)")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format, overrides the configuration (text, json)")
                .value_parser(["text", "json"])
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("export-profile")
                .long("export-profile")
                .value_name("FILE")
                .help("Write the canonical scoring profile as JSON for the browser extension")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("parity-report")
                .long("parity-report")
                .value_name("FILE")
                .help("Write this runtime's parity report as JSON")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("check-parity")
                .long("check-parity")
                .value_name("FILE")
                .help("Compare a parity report from another runtime against this one")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("list-features")
                .long("list-features")
                .help("List the 20 URL features with their weights and triggers")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_PATH);

    let mut config = match Config::load_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    if let Some(format) = matches
        .get_one::<String>("format")
        .and_then(|f| OutputFormat::parse(f))
    {
        config.output_format = format;
    }

    if matches.get_flag("list-features") {
        list_features();
        return;
    }

    if let Some(path) = matches.get_one::<String>("export-profile") {
        export_profile(path);
        return;
    }

    if let Some(path) = matches.get_one::<String>("parity-report") {
        write_parity_report(path);
        return;
    }

    if let Some(path) = matches.get_one::<String>("check-parity") {
        check_parity(path);
        return;
    }

    let mut urls: Vec<String> = matches
        .get_many::<String>("url")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if let Some(batch_path) = matches.get_one::<String>("batch") {
        match read_batch_file(batch_path) {
            Ok(batch) => urls.extend(batch),
            Err(e) => {
                eprintln!("❌ Failed to read batch file {batch_path}: {e}");
                process::exit(1);
            }
        }
    }

    if urls.is_empty() {
        eprintln!("❌ No URLs given. Pass one or more URLs or use --batch FILE");
        process::exit(1);
    }

    let outcome = match analyze_batch(
        &urls,
        SessionHistory::new(config.history_limit),
        config.output_format,
        RenderOptions::from(&config),
    ) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("❌ {e:#}");
            process::exit(1);
        }
    };

    for result in &outcome.results {
        match result {
            Ok(output) => println!("{output}"),
            Err(e) => eprintln!("❌ Error analyzing URL: {e}"),
        }
    }

    if config.show_history && outcome.history.len() > 1 {
        match render_history(&outcome.history, config.output_format) {
            Ok(output) => println!("{output}"),
            Err(e) => eprintln!("❌ {e:#}"),
        }
    }

    if outcome.failures() > 0 {
        log::warn!(
            "{} of {} URLs could not be analyzed",
            outcome.failures(),
            urls.len()
        );
    }
    process::exit(outcome.exit_code());
}

fn read_batch_file(path: &str) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => println!("✅ Default configuration written to: {path}"),
        Err(e) => {
            eprintln!("❌ Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

fn list_features() {
    let table = WeightTable::canonical();
    println!("🔍 URL Features ({} total)", FeatureName::ALL.len());
    println!("┌──────────────────────┬────────┬──────────┐");
    println!("│ Feature              │ Weight │ Trigger  │");
    println!("├──────────────────────┼────────┼──────────┤");
    for name in FeatureName::ALL {
        let (weight, trigger) = match table.get(name) {
            Some(entry) => (format!("{:.2}", entry.weight()), entry.trigger.to_string()),
            None => ("-".to_string(), "-".to_string()),
        };
        println!("│ {:<20} │ {:>6} │ {:<8} │", name.as_str(), weight, trigger);
    }
    println!("└──────────────────────┴────────┴──────────┘");
}

fn export_profile(path: &str) {
    let json = match ScoringProfile::canonical().to_json_pretty() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("❌ Failed to serialize scoring profile: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(path, json) {
        eprintln!("❌ Failed to write scoring profile to {path}: {e}");
        process::exit(1);
    }
    println!("✅ Scoring profile written to: {path}");
}

fn write_parity_report(path: &str) {
    let report = ParityReport::generate("rust");
    let json = match serde_json::to_string_pretty(&report) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("❌ Failed to serialize parity report: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(path, json) {
        eprintln!("❌ Failed to write parity report to {path}: {e}");
        process::exit(1);
    }
    println!(
        "✅ Parity report with {} samples written to: {path}",
        report.sample_scores.len()
    );
}

fn check_parity(path: &str) {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("❌ Failed to read parity report {path}: {e}");
            process::exit(1);
        }
    };
    let theirs: ParityReport = match serde_json::from_str(&content) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ Malformed parity report {path}: {e}");
            process::exit(1);
        }
    };

    let ours = ParityReport::generate("rust");
    let mismatches = ours.compare(&theirs);
    if mismatches.is_empty() {
        println!(
            "✅ {} runtime agrees with rust on the profile and all {} samples",
            theirs.runtime,
            ours.sample_scores.len()
        );
        return;
    }

    println!(
        "❌ {} runtime drifts from rust ({} mismatches):",
        theirs.runtime,
        mismatches.len()
    );
    for mismatch in &mismatches {
        println!("  • {mismatch}");
    }
    process::exit(1);
}
