use std::path::Path;
use flexi_logger::*;

pub fn start_logger(log_path: &Path) -> anyhow::Result<()> {
    let custom_format_fun = |
        w:      &mut dyn std::io::Write,
        now:    &mut DeferredNow,
        record: &Record
    | -> Result<(), std::io::Error> {
        write!(
            w, "[{}] [{}] [{}] {}",
            now.format(TS_DASHES_BLANK_COLONS_DOT_BLANK),
            record.level(),
            record.module_path().unwrap_or_default(),
            record.args()
        )
    };

    Logger::try_with_str("trace")?
        .log_to_file(
            FileSpec::default()
                .directory(log_path)
                .basename(env!("CARGO_PKG_NAME"))
        )
        .format(custom_format_fun)
        .print_message()
        .start()?;

    Ok(())
}

pub fn cleanup_old_logs(log_path: &Path, days: u32) {
    let Ok(entries) = std::fs::read_dir(log_path) else { return; };
    let max_age = std::time::Duration::from_secs(60 * 60 * 24 * u64::from(days));
    for entry in entries.flatten() {
        let path = entry.path();
        let is_log = path.extension().map(|ext| ext == "log").unwrap_or(false);
        if !is_log { continue; }
        let Ok(metadata) = entry.metadata() else { continue; };
        let Ok(modified) = metadata.modified() else { continue; };
        if modified.elapsed().map(|age| age > max_age).unwrap_or(false) {
            _ = std::fs::remove_file(&path);
        }
    }
}
