//! Stderr logging for the core binary. Stdout carries protocol lines only.

use env_filter::Builder as EnvFilterBuilder;
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Directives to hand to the logger: `RUST_LOG` when it parses, `None` for
/// the info-level default. An unparsable value is reported back as the error.
fn console_directives(rust_log: Option<&str>) -> (Option<&str>, Option<String>) {
    match rust_log {
        Some(value) if !value.trim().is_empty() => {
            match EnvFilterBuilder::new().try_parse(value) {
                Ok(_) => (Some(value), None),
                Err(err) => (
                    None,
                    Some(format!("ignoring invalid RUST_LOG value '{value}': {err}")),
                ),
            }
        }
        _ => (None, None),
    }
}

fn console_builder(rust_log: Option<&str>) -> (Builder, Option<String>) {
    let (directives, problem) = console_directives(rust_log);

    let mut builder = Builder::new();
    builder.target(Target::Stderr).format_timestamp_millis();
    match directives {
        Some(d) => builder.parse_filters(d),
        None => builder.filter_level(LevelFilter::Info),
    };

    (builder, problem)
}

/// Installs the logger. Calling it twice is harmless.
pub fn init() {
    let rust_log = std::env::var("RUST_LOG").ok();
    let (mut builder, problem) = console_builder(rust_log.as_deref());

    if builder.try_init().is_err() {
        return;
    }

    if let Some(problem) = problem {
        log::warn!("{problem}");
    }
}
