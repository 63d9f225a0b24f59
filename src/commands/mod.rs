pub mod patterns;
pub mod scan;

use crate::cli::Commands;
use tripwire::errors::TripwireResult;
use tripwire::patterns::Registry;
use tripwire::scan::ScanOptions;
use tripwire::utils::Config;

/// Run `command`; `Ok(true)` means the `--fail-on` gate tripped.
pub fn handle_command(
    command: Commands,
    registry: &Registry,
    config: &mut Config,
) -> TripwireResult<bool> {
    match command {
        Commands::Scan {
            path,
            format,
            output,
            min_severity,
            categories,
            disabled,
            fail_on,
            sequential,
        } => {
            if let Some(min) = min_severity {
                config.scanner.min_severity = min;
            };

            if !categories.is_empty() {
                config.scanner.categories = categories;
            };

            config.scanner.disabled_patterns.extend(disabled);

            if fail_on.is_some() {
                config.scanner.fail_on = fail_on;
            };

            if sequential {
                config.performance.parallel_patterns = false;
            };

            let format = format.unwrap_or(config.output.default_format);
            let options = ScanOptions::from_config(config);
            scan::handle(&path, format, output.as_deref(), registry, &options, config)
        }
        Commands::Patterns { category, verbose } => {
            patterns::handle(registry, category, verbose)?;
            Ok(false)
        }
    }
}
