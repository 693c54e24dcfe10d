//! Logging Infrastructure
//!
//! Console output plus, when a log directory is configured, three daily
//! rolling sinks:
//! - `app/`      everything except the `audit` and `security` targets, pruned after 14 days
//! - `audit/`    one line per committed transition, never pruned
//! - `security/` authentication and scope violations, never pruned

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::Layered;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Days an application log file is kept
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

type Base = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Base> + Send + Sync>;

/// Initialize the logging system
///
/// * `level` - default filter when `RUST_LOG` is unset (e.g. "info")
/// * `json_format` - JSON lines instead of the human-readable format
/// * `log_dir` - optional directory for the rolling file sinks
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<BoxedLayer> = vec![console_layer(json_format)];

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        fs::create_dir_all(log_dir)?;

        layers.push(file_layer(log_dir, "app", json_format, |target| {
            target != "audit" && target != "security"
        })?);
        layers.push(file_layer(log_dir, "audit", json_format, |target| target == "audit")?);
        layers.push(file_layer(log_dir, "security", json_format, |target| {
            target == "security"
        })?);

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    Ok(())
}

/// Initialize console-only logging
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

fn console_layer(json_format: bool) -> BoxedLayer {
    if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    }
}

/// Daily rolling file sink under `<log_dir>/<name>/<name>.YYYY-MM-DD.log`
fn file_layer(
    log_dir: &Path,
    name: &str,
    json_format: bool,
    accept: fn(&str) -> bool,
) -> anyhow::Result<BoxedLayer> {
    let dir = log_dir.join(name);
    fs::create_dir_all(&dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(name)
        .filename_suffix("log")
        .build(dir)?;
    let filter = filter_fn(move |meta| accept(meta.target()));

    let layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(appender)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(appender)
            .with_filter(filter)
            .boxed()
    };
    Ok(layer)
}

/// Delete application log files older than [`APP_LOG_RETENTION_DAYS`]
///
/// Audit and security logs are never touched. Returns the number of files removed.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);

    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        // app.YYYY-MM-DD.log
        let date = name
            .strip_prefix("app.")
            .and_then(|rest| rest.strip_suffix(".log"))
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

        if let Some(date) = date
            && date < cutoff
        {
            fs::remove_file(&path)?;
            removed += 1;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(removed)
}

/// Hourly cleanup task
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, interval};

    let mut ticker = interval(Duration::from_secs(3600));
    loop {
        ticker.tick().await;
        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Audit log helper - one line on the `audit` target per committed transition
///
/// ```ignore
/// audit_log!("user-1", "order_accepted", "order:42");
/// audit_log!("user-1", "order_voided", "order:42", "customer left");
/// ```
#[macro_export]
macro_rules! audit_log {
    ($actor:expr, $action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            actor = %$actor,
            action = %$action,
            resource = %$resource,
            timestamp = %chrono::Local::now().to_rfc3339(),
            "AUDIT"
        );
    };
    ($actor:expr, $action:expr, $resource:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            actor = %$actor,
            action = %$action,
            resource = %$resource,
            details = %$details,
            timestamp = %chrono::Local::now().to_rfc3339(),
            "AUDIT"
        );
    };
}

/// Security log helper - records authentication and scope violations
///
/// ```ignore
/// security_log!(WARN, "auth_failed", reason = "expired", uri = "/api/orders/accept");
/// security_log!(WARN, "cross_tenant_access", user_id = "u-1", order_id = 42_i64);
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            timestamp = %chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            timestamp = %chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_old_app_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        let audit = dir.path().join("audit");
        fs::create_dir_all(&app).unwrap();
        fs::create_dir_all(&audit).unwrap();

        let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
        fs::write(app.join("app.2001-01-01.log"), "old").unwrap();
        fs::write(app.join(format!("app.{today}.log")), "new").unwrap();
        fs::write(app.join("notes.txt"), "keep").unwrap();
        fs::write(audit.join("audit.2001-01-01.log"), "keep").unwrap();

        let removed = cleanup_old_logs(dir.path()).unwrap();

        assert_eq!(removed, 1);
        assert!(!app.join("app.2001-01-01.log").exists());
        assert!(app.join(format!("app.{today}.log")).exists());
        assert!(app.join("notes.txt").exists());
        assert!(audit.join("audit.2001-01-01.log").exists());
    }

    #[test]
    fn test_cleanup_without_app_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 0);
    }
}
