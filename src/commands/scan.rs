use bytesize::ByteSize;
use console::style;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tripwire::errors::{TripwireError, TripwireResult};
use tripwire::patterns::{Registry, Severity};
use tripwire::report::AnalysisResult;
use tripwire::scan::ScanOptions;
use tripwire::utils::{Config, OutputFormat};
use tripwire::walk::collect_sources;

/// One analysed file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    pub result: AnalysisResult,
}

/// Entry point called by the CLI. `Ok(true)` when the fail-on gate tripped.
pub fn handle(
    path: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    registry: &Registry,
    options: &ScanOptions,
    config: &Config,
) -> TripwireResult<bool> {
    for id in &options.disabled_patterns {
        if registry.get(id).is_none() {
            tracing::warn!("disabled pattern `{id}` does not exist");
        }
    }

    let files = source_files(path, config)?;
    tracing::debug!("{} source files to analyse", files.len());

    let mut reports = files
        .par_iter()
        .map(|file| analyze_file(file, registry, options))
        .collect::<TripwireResult<Vec<_>>>()?;
    reports.sort_by(|a, b| a.0.file.cmp(&b.0.file));
    let scanned_bytes: u64 = reports.iter().map(|(_, bytes)| bytes).sum();
    let reports: Vec<FileReport> = reports.into_iter().map(|(report, _)| report).collect();

    // skipped patterns are always surfaced, whatever the output format
    for report in &reports {
        for warning in &report.result.metadata.warnings {
            eprintln!(
                "{}: pattern {} skipped on {}: {}",
                style("warning").yellow().bold(),
                style(warning.pattern_id).bold(),
                style(&report.file).underlined(),
                warning.reason
            );
        }
    }

    let rendered = match format {
        OutputFormat::Json => render_json(&reports)?,
        OutputFormat::Console => render_console(&reports, config),
    };
    match output {
        Some(target) => {
            fs::write(target, rendered)?;
            eprintln!(
                "{}: report written to {}",
                style("note").green().bold(),
                style(target.display()).underlined()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    eprintln!(
        "{} {} file(s), {}",
        style("Scanned").green().bold(),
        reports.len(),
        ByteSize::b(scanned_bytes)
    );

    Ok(config
        .scanner
        .fail_on
        .is_some_and(|threshold| gate_tripped(&reports, threshold)))
}

fn source_files(path: &Path, config: &Config) -> TripwireResult<Vec<PathBuf>> {
    if path.is_file() {
        Ok(vec![path.to_path_buf()])
    } else if path.is_dir() {
        collect_sources(path, config)
    } else {
        Err(TripwireError::Other(format!(
            "no such file or directory: {}",
            path.display()
        )))
    }
}

fn analyze_file(
    path: &Path,
    registry: &Registry,
    options: &ScanOptions,
) -> TripwireResult<(FileReport, u64)> {
    let bytes = fs::read(path)?;
    let source = String::from_utf8_lossy(&bytes);
    let result = AnalysisResult::analyze(registry, &source, options);
    Ok((
        FileReport {
            file: path.display().to_string(),
            result,
        },
        bytes.len() as u64,
    ))
}

pub(crate) fn gate_tripped(reports: &[FileReport], threshold: Severity) -> bool {
    reports
        .iter()
        .any(|r| r.result.has_findings_at_or_above(threshold))
}

/// One object for a single file, an array of `{ file, result }` otherwise.
pub(crate) fn render_json(reports: &[FileReport]) -> TripwireResult<String> {
    let mut out = match reports {
        [single] => single.result.to_json()?,
        many => serde_json::to_string_pretty(many)?,
    };
    out.push('\n');
    Ok(out)
}

pub(crate) fn render_console(reports: &[FileReport], config: &Config) -> String {
    let mut out = String::new();
    for report in reports {
        render_file(&mut out, report, config);
    }
    out
}

fn render_file(out: &mut String, report: &FileReport, config: &Config) {
    use std::fmt::Write as _;

    let result = &report.result;
    let limit = config.output.max_results.map_or(usize::MAX, |n| n as usize);

    if !config.output.quiet {
        let _ = writeln!(
            out,
            "{}  {}",
            style(&report.file).blue().bold().underlined(),
            style(format!(
                "({}, {} lines, {} patterns)",
                result.metadata.contract_name.as_deref().unwrap_or("no contract"),
                result.metadata.lines_analyzed,
                result.metadata.total_patterns_checked
            ))
            .dim()
        );
    }

    for finding in result.findings.iter().take(limit) {
        let _ = writeln!(
            out,
            "{}:{}  [{}]  {}  {}",
            style(&report.file).blue().underlined(),
            finding.line_number,
            finding.severity,
            style(finding.pattern_id).bold(),
            finding.pattern_name,
        );
        let _ = writeln!(out, "    {}", style(finding.code_snippet.trim()).dim());
        let _ = writeln!(out, "    {}", finding.description);
        if config.output.show_recommendations {
            let _ = writeln!(out, "    {} {}", style("fix:").green(), finding.recommendation);
        }
    }
    if result.findings.len() > limit {
        let _ = writeln!(
            out,
            "    {}",
            style(format!("… {} more", result.findings.len() - limit)).dim()
        );
    }

    if config.output.quiet {
        return;
    }
    let summary = result.summary();
    let risk = result.risk_assessment();
    let _ = writeln!(
        out,
        "  {:10} {} total ({} critical, {} high, {} medium, {} low)",
        style("Summary"),
        summary.total,
        summary.critical,
        summary.high,
        summary.medium,
        summary.low
    );
    let _ = writeln!(
        out,
        "  {:10} {} (score {}/10)  {}\n",
        style("Risk"),
        style(risk.overall_risk_level).bold(),
        risk.risk_score,
        style(risk.deployment_recommendation).bold()
    );
}

#[cfg(test)]
fn demo_report(name: &str, source: &str) -> FileReport {
    let registry = Registry::builtin().unwrap();
    FileReport {
        file: name.into(),
        result: AnalysisResult::analyze(&registry, source, &ScanOptions::default()),
    }
}

#[test]
fn json_is_an_object_for_one_file_and_an_array_for_many() {
    let honey = demo_report("honey.sol", include_str!("../../demos/honeypot_token.sol"));
    let clean = demo_report("clean.sol", include_str!("../../demos/clean_token.sol"));

    let one: serde_json::Value = serde_json::from_str(&render_json(std::slice::from_ref(&honey)).unwrap()).unwrap();
    assert!(one.is_object());
    assert_eq!(one["risk_assessment"]["deployment_recommendation"], "DO NOT DEPLOY");

    let reports = [honey, clean];
    let many: serde_json::Value = serde_json::from_str(&render_json(&reports).unwrap()).unwrap();
    assert_eq!(many.as_array().map(Vec::len), Some(2));
    assert_eq!(many[1]["file"], "clean.sol");
    assert_eq!(many[1]["result"]["summary"]["critical"], 0);
}

#[test]
fn gate_trips_only_at_or_above_threshold() {
    let clean = [demo_report("clean.sol", include_str!("../../demos/clean_token.sol"))];
    assert!(!gate_tripped(&clean, Severity::High));

    let honey = [demo_report("honey.sol", include_str!("../../demos/honeypot_token.sol"))];
    assert!(gate_tripped(&honey, Severity::Critical));
    assert!(gate_tripped(&honey, Severity::Low));
}

#[test]
fn console_output_lists_findings_and_verdict() {
    console::set_colors_enabled(false);
    let honey = [demo_report("honey.sol", include_str!("../../demos/honeypot_token.sol"))];
    let text = render_console(&honey, &Config::default());
    assert!(text.contains("honey.sol:23  [CRITICAL]  disabled-transfer"));
    assert!(text.contains("DO NOT DEPLOY"));
    assert!(text.contains("HoneyToken"));

    let mut config = Config::default();
    config.output.max_results = Some(1);
    let text = render_console(&honey, &config);
    assert_eq!(text.matches("[CRITICAL]").count(), 1);
    assert!(text.contains("more"));
}
