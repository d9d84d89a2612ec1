use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable holding the log level or filter spec.
pub const LOG_ENV: &str = "DISCOGEN_LOG";

const CRATE_ROOT: &str = "discogen";

/// Install the stderr fmt subscriber.
///
/// `DISCOGEN_LOG` accepts a plain level ("debug") applied to every discogen
/// crate, or a full filter spec like "discogen_core=debug,reqwest=warn".
pub fn init_tracing() {
    let filter = filter_spec(std::env::var(LOG_ENV).ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn filter_spec(value: Option<&str>) -> String {
    match value {
        Some(level) if is_plain_level(level) => crate_directives(level),
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => crate_directives("info"),
    }
}

// Targets are module paths, so every workspace crate needs its own directive.
fn crate_directives(level: &str) -> String {
    ["", "_core", "_runtime", "_cli"]
        .iter()
        .map(|suffix| format!("{CRATE_ROOT}{suffix}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_level_expands_to_every_crate() {
        assert_eq!(
            filter_spec(Some("debug")),
            "discogen=debug,discogen_core=debug,discogen_runtime=debug,discogen_cli=debug"
        );
    }

    #[test]
    fn test_full_spec_is_passed_through() {
        assert_eq!(filter_spec(Some("discogen_core=trace,warn")), "discogen_core=trace,warn");
    }

    #[test]
    fn test_default_is_info() {
        assert!(filter_spec(None).starts_with("discogen=info,"));
        assert!(filter_spec(Some("  ")).ends_with("discogen_cli=info"));
    }
}
