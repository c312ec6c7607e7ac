use crate::workout::{Metric, Workout};
use tracing_subscriber::{EnvFilter, fmt};

#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*);
    };
}

/// Initialize colorful logging on stderr.
///
/// Default level is INFO.
/// - `-v` => DEBUG
/// - `-vv` => TRACE
/// - `-q` => WARN
/// - `-qq` => ERROR
///
/// `RUST_LOG` overrides everything (e.g. `RUST_LOG=trace`).
pub fn init_logging(verbose: u8, quiet: u8) {
    let net = i16::from(verbose) - i16::from(quiet);
    let level = match net {
        i16::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        2..=i16::MAX => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,mapty={level}")));

    let show_src = matches!(level, "debug" | "trace");

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_file(show_src)
        .with_line_number(show_src)
        .compact()
        .init();
}

/// Minutes as `h:mm`, e.g. `95.5` => `1:36`.
pub fn format_minutes(minutes: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let total = minutes.round() as i64;
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn format_metric(m: Metric) -> String {
    if m.value.fract() == 0.0 {
        format!("{:.0} {}", m.value, m.unit)
    } else {
        format!("{:.1} {}", m.value, m.unit)
    }
}

/// One list line: icon, description, then the four figures of the workout card.
pub fn format_workout(w: &Workout) -> String {
    format!(
        "{} {}\t{} km\t{} min\t{}\t{}",
        w.kind().icon(),
        w.description(),
        w.distance(),
        w.duration(),
        format_metric(w.metric()),
        format_metric(w.extra_metric()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_render_as_hours_and_minutes() {
        assert_eq!(format_minutes(25.0), "0:25");
        assert_eq!(format_minutes(95.5), "1:36");
        assert_eq!(format_minutes(120.0), "2:00");
    }

    #[test]
    fn metrics_drop_trailing_zero_decimal() {
        assert_eq!(
            format_metric(Metric {
                value: 178.0,
                unit: "spm"
            }),
            "178 spm"
        );
        assert_eq!(
            format_metric(Metric {
                value: 13.3,
                unit: "km/h"
            }),
            "13.3 km/h"
        );
    }
}
