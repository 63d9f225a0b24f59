use crate::errors::TripwireResult;
use crate::patterns::{Category, Severity};
use console::style;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

static DEFAULT_CONFIG_TOML: &str = include_str!("../../default-tripwire.conf");

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ScannerConfig {
    /// The minimum severity level a pattern must have to be run.
    pub min_severity: Severity,

    /// Categories to run; empty runs all of them.
    pub categories: Vec<Category>,

    /// Pattern ids that are never run.
    pub disabled_patterns: Vec<String>,

    /// Exit with status 1 when a finding at or above this severity exists.
    pub fail_on: Option<Severity>,

    /// The maximum file size to scan, in megabytes.
    pub max_file_size_mb: Option<u64>,

    /// Directories to exclude from scanning.
    pub excluded_directories: Vec<String>,

    /// File globs to exclude from scanning.
    pub excluded_files: Vec<String>,

    /// Whether to respect VCS ignore files (`.gitignore`, ..) or not.
    pub read_vcsignore: bool,

    /// Whether to follow symlinks or not.
    pub follow_symlinks: bool,

    /// Whether to scan hidden files or not.
    pub scan_hidden_files: bool,
}
impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Low,
            categories: Vec::new(),
            disabled_patterns: Vec::new(),
            fail_on: None,
            max_file_size_mb: None,
            excluded_directories: vec![
                "node_modules",
                ".git",
                "lib",
                "out",
                "cache",
                "artifacts",
                "typechain-types",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            excluded_files: Vec::new(),
            read_vcsignore: true,
            follow_symlinks: false,
            scan_hidden_files: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    /// The default output format.
    pub default_format: OutputFormat,

    /// Only print findings, no per-file summary.
    pub quiet: bool,

    /// The maximum number of findings to print per file in console output.
    pub max_results: Option<u32>,

    /// Print each finding's recommendation in console output.
    pub show_recommendations: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Console,
            quiet: false,
            max_results: None,
            show_recommendations: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PerformanceConfig {
    /// The maximum number of worker threads to use, or `None` to auto-detect.
    pub worker_threads: Option<usize>,

    /// Paths sent per batch by the directory walker.
    pub batch_size: usize,

    /// capacity = threads × this
    pub channel_multiplier: usize,

    /// The stack size for Rayon threads, in bytes.
    pub rayon_thread_stack_size: usize,

    /// Run the patterns of one file in parallel.
    pub parallel_patterns: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            batch_size: 8usize,
            channel_multiplier: 4usize,
            rayon_thread_stack_size: 8 * 1024 * 1024, // 8 MiB
            parallel_patterns: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub output: OutputConfig,
    pub performance: PerformanceConfig,
}

impl Config {
    pub fn load(config_dir: &Path) -> TripwireResult<Self> {
        let mut config = Config::default();

        let default_config_path = config_dir.join("tripwire.conf");
        if !default_config_path.exists() {
            create_example_config(config_dir)?;
        }

        let user_config_path = config_dir.join("tripwire.local");
        if user_config_path.exists() {
            let user_config_content = fs::read_to_string(&user_config_path)?;
            let user_config: Config = toml::from_str(&user_config_content)?;

            config = merge_configs(config, user_config);

            eprintln!(
                "{}: Loaded user config from: {}\n",
                style("note").green().bold(),
                style(user_config_path.display())
                    .underlined()
                    .white()
                    .bold()
            );
        } else {
            tracing::debug!(
                "no user config at {}, using defaults",
                user_config_path.display()
            );
        }

        Ok(config)
    }
}

fn create_example_config(config_dir: &Path) -> TripwireResult<()> {
    let example_path = config_dir.join("tripwire.conf");
    if !example_path.exists() {
        fs::write(&example_path, DEFAULT_CONFIG_TOML)?;
        tracing::debug!("Example config created at: {}", example_path.display());
    }
    Ok(())
}

/// Merge user config into default config, preserving defaults where the user didn't
/// supply new exclusions and overriding everything else.
fn merge_configs(mut default: Config, user: Config) -> Config {
    // --- ScannerConfig ---
    default.scanner.min_severity = user.scanner.min_severity;
    default.scanner.categories = user.scanner.categories;
    default.scanner.fail_on = user.scanner.fail_on;
    default.scanner.max_file_size_mb = user.scanner.max_file_size_mb;
    default.scanner.read_vcsignore = user.scanner.read_vcsignore;
    default.scanner.follow_symlinks = user.scanner.follow_symlinks;
    default.scanner.scan_hidden_files = user.scanner.scan_hidden_files;

    // Merge exclusion lists (default ⊔ user), then sort & dedupe
    default
        .scanner
        .disabled_patterns
        .extend(user.scanner.disabled_patterns);
    default
        .scanner
        .excluded_directories
        .extend(user.scanner.excluded_directories);
    default
        .scanner
        .excluded_files
        .extend(user.scanner.excluded_files);
    for list in [
        &mut default.scanner.disabled_patterns,
        &mut default.scanner.excluded_directories,
        &mut default.scanner.excluded_files,
    ] {
        list.sort_unstable();
        list.dedup();
    }

    // --- OutputConfig ---
    default.output = user.output;

    // --- PerformanceConfig ---
    default.performance = user.performance;

    default
}

#[test]
fn merge_configs_dedupes_and_keeps_order() {
    let mut default_cfg = Config::default();
    default_cfg.scanner.excluded_directories = vec!["out".into(), "lib".into()];

    let mut user_cfg = Config::default();
    user_cfg.scanner.excluded_directories = vec!["cache".into(), "lib".into()];
    user_cfg.scanner.disabled_patterns = vec!["time-lock".into(), "time-lock".into()];
    user_cfg.scanner.min_severity = Severity::Medium;

    let merged = merge_configs(default_cfg, user_cfg);

    assert_eq!(merged.scanner.excluded_directories, vec!["cache", "lib", "out"]);
    assert_eq!(merged.scanner.disabled_patterns, vec!["time-lock"]);
    assert_eq!(merged.scanner.min_severity, Severity::Medium);
}

#[test]
fn embedded_default_config_parses() {
    let cfg: Config = toml::from_str(DEFAULT_CONFIG_TOML).expect("default config is valid TOML");
    assert_eq!(cfg.scanner.min_severity, Severity::Low);
    assert_eq!(cfg.output.default_format, OutputFormat::Console);
    assert!(cfg.performance.parallel_patterns);
}

#[test]
fn load_creates_example_and_reads_user_overrides() {
    let cfg_dir = tempfile::tempdir().unwrap();
    let cfg_path = cfg_dir.path();

    let user_toml = r#"
        [scanner]
        min_severity = "high"
        categories = ["minting", "access-control"]
        fail_on = "critical"
        excluded_directories = ["mocks"]

        [output]
        default_format = "json"
    "#;
    fs::write(cfg_path.join("tripwire.local"), user_toml).unwrap();

    let cfg = Config::load(cfg_path).expect("Config::load should succeed");

    assert!(cfg_path.join("tripwire.conf").is_file());

    assert_eq!(cfg.scanner.min_severity, Severity::High);
    assert_eq!(cfg.scanner.categories, [Category::Minting, Category::AccessControl]);
    assert_eq!(cfg.scanner.fail_on, Some(Severity::Critical));
    assert_eq!(cfg.output.default_format, OutputFormat::Json);
    assert!(cfg.scanner.excluded_directories.contains(&"mocks".to_string()));
    assert!(cfg.scanner.excluded_directories.contains(&"node_modules".to_string()));

    assert!(!cfg.scanner.follow_symlinks);
}

#[test]
fn unknown_category_in_config_is_an_error() {
    let err = toml::from_str::<Config>("[scanner]\ncategories = [\"bytecode\"]\n");
    assert!(err.is_err());
}
