use std::{fs::OpenOptions, io::Write, path::PathBuf};

use anyhow::Result;
use once_cell::sync::Lazy;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

const LOG_FILE: &str = "codesleuth.log";

static TELEMETRY_ENABLED: Lazy<std::sync::RwLock<bool>> =
    Lazy::new(|| std::sync::RwLock::new(false));

/**
 * \brief 更新遥测开关状态（默认关闭，由 CLI 的 --telemetry 打开）。
 */
pub fn set_enabled(enabled: bool) {
    if let Ok(mut guard) = TELEMETRY_ENABLED.write() {
        *guard = enabled;
    }
}

/**
 * \brief 查询当前遥测开关状态。
 */
pub fn is_enabled() -> bool {
    TELEMETRY_ENABLED.read().map(|g| *g).unwrap_or(false)
}

/**
 * \brief 记录常规事件，如分析阶段的进度。
 */
pub fn log_event(category: &str, message: &str) {
    if !is_enabled() {
        return;
    }
    if let Err(err) = write_line("INFO", category, message) {
        eprintln!("telemetry write failed: {}", err);
    }
}

/**
 * \brief 记录错误事件。
 */
pub fn log_error(category: &str, message: &str) {
    if !is_enabled() {
        return;
    }
    if let Err(err) = write_line("ERROR", category, message) {
        eprintln!("telemetry write failed: {}", err);
    }
}

/** \brief 日志目录，可用 CODESLEUTH_LOG_DIR 重定向（默认 ./logs）。 */
fn log_dir() -> PathBuf {
    std::env::var("CODESLEUTH_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("logs"))
}

fn write_line(level: &str, category: &str, message: &str) -> Result<()> {
    let dir = log_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    let timestamp = OffsetDateTime::now_utc().format(&Rfc3339)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;
    writeln!(file, "{} [{}] {} - {}", timestamp, level, category, message)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_controls_writes_and_line_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::env::set_var("CODESLEUTH_LOG_DIR", dir.path());

        set_enabled(false);
        log_event("test", "should not appear");
        assert!(!dir.path().join(LOG_FILE).exists());

        set_enabled(true);
        log_event("test", "hello");
        log_error("test", "world");
        set_enabled(false);

        let content = std::fs::read_to_string(dir.path().join(LOG_FILE)).expect("read log");
        assert!(content.contains("[INFO] test - hello"));
        assert!(content.contains("[ERROR] test - world"));

        std::env::remove_var("CODESLEUTH_LOG_DIR");
    }
}
