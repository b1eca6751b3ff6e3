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

/// Minutes as `h:mm`, or `m min` under an hour.
pub fn format_minutes(minutes: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = minutes.round().max(0.0) as u64;
    if total < 60 {
        format!("{total} min")
    } else {
        format!("{}:{:02} h", total / 60, total % 60)
    }
}

/// One decimal, as shown on list entries.
pub fn format_rate(v: f64) -> String {
    format!("{v:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_formatting() {
        assert_eq!(format_minutes(25.0), "25 min");
        assert_eq!(format_minutes(59.6), "1:00 h");
        assert_eq!(format_minutes(135.0), "2:15 h");
    }

    #[test]
    fn rate_has_one_decimal() {
        assert_eq!(format_rate(5.0), "5.0");
        assert_eq!(format_rate(16.666_666), "16.7");
    }
}
