//! CSV export job
//!
//! Publishes the staged `EXPORT_*.csv` tables from the data folder to the
//! export folder as timestamped artifacts. Tables with no data rows are
//! skipped; a fault on one table is logged and the remaining tables still
//! run.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::EtlConfig;
use crate::job::{Job, JobLog};
use crate::status::JobKind;

/// Exports `data_dir/EXPORT_*.csv` tables to `export_dir`.
pub struct CsvExportJob {
    config: EtlConfig,
}

impl CsvExportJob {
    pub fn new(config: EtlConfig) -> Self {
        Self { config }
    }

    async fn export_table(
        &self,
        table_path: &Path,
        table: &str,
        stamp: &str,
        log: &JobLog,
    ) -> anyhow::Result<bool> {
        if !has_data_rows(table_path).await? {
            log.line(format!("No data found in table {table}"));
            return Ok(false);
        }

        let destination = self.config.export_dir.join(format!("{table}_{stamp}.csv"));
        fs::copy(table_path, &destination)
            .await
            .with_context(|| format!("failed to write {}", destination.display()))?;

        log.line(format!("Exported {table} to {}", destination.display()));
        Ok(true)
    }
}

#[async_trait]
impl Job for CsvExportJob {
    fn kind(&self) -> JobKind {
        JobKind::Export
    }

    async fn run(&self, log: &JobLog) -> anyhow::Result<()> {
        let tables = list_export_tables(&self.config.data_dir)
            .await
            .context("failed to read data folder")?;

        if tables.is_empty() {
            log.line("No export tables found");
            return Ok(());
        }

        log.line(format!("Found {} export tables", tables.len()));
        let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();

        let mut exported = 0u64;
        for path in &tables {
            let table = table_name(path);
            match self.export_table(path, &table, &stamp, log).await {
                Ok(true) => exported += 1,
                Ok(false) => {}
                Err(error) => {
                    log.line(format!("Error exporting table {table}: {error:#}"));
                }
            }
        }

        log.line(format!("Export completed: {exported} tables exported"));
        Ok(())
    }
}

/// Staged tables in `dir` (`EXPORT_*.csv`), sorted by name.
async fn list_export_tables(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut tables = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("EXPORT_")
            && name.to_ascii_lowercase().ends_with(".csv")
            && entry.file_type().await?.is_file()
        {
            tables.push(path);
        }
    }

    tables.sort();
    Ok(tables)
}

/// Whether the table file holds at least one row beyond the header.
async fn has_data_rows(path: &Path) -> std::io::Result<bool> {
    let file = fs::File::open(path).await?;
    let mut lines = BufReader::new(file).lines();

    let mut count = 0usize;
    while let Some(line) = lines.next_line().await? {
        if !line.trim().is_empty() {
            count += 1;
            if count > 1 {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_buffer::LogBuffer;
    use std::sync::Arc;

    fn test_config(root: &Path) -> EtlConfig {
        EtlConfig {
            input_dir: root.join("input"),
            data_dir: root.join("data"),
            export_dir: root.join("export"),
            rejects_dir: root.join("rejects"),
            ..Default::default()
        }
    }

    fn test_log() -> (JobLog, Arc<LogBuffer>) {
        let buffer = Arc::new(LogBuffer::new(100));
        (JobLog::new(Arc::clone(&buffer)), buffer)
    }

    #[tokio::test]
    async fn test_no_export_tables() {
        let root = tempfile::tempdir().unwrap();
        let config = test_config(root.path());
        config.ensure_directories().unwrap();
        let (log, buffer) = test_log();

        CsvExportJob::new(config).run(&log).await.unwrap();

        assert!(buffer.to_text().contains("No export tables found"));
    }

    #[tokio::test]
    async fn test_export_writes_timestamped_artifacts() {
        let root = tempfile::tempdir().unwrap();
        let config = test_config(root.path());
        config.ensure_directories().unwrap();

        std::fs::write(
            config.data_dir.join("EXPORT_users.csv"),
            "id,name\n1,alice\n",
        )
        .unwrap();

        let (log, buffer) = test_log();
        CsvExportJob::new(config.clone()).run(&log).await.unwrap();

        let artifacts: Vec<_> = std::fs::read_dir(&config.export_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(artifacts.len(), 1);
        assert!(artifacts[0].starts_with("EXPORT_users_"));
        assert!(artifacts[0].ends_with(".csv"));

        let exported = std::fs::read_to_string(config.export_dir.join(&artifacts[0])).unwrap();
        assert_eq!(exported, "id,name\n1,alice\n");

        let text = buffer.to_text();
        assert!(text.contains("Found 1 export tables"));
        assert!(text.contains("Exported EXPORT_users to"));
        assert!(text.contains("Export completed: 1 tables exported"));
    }

    #[tokio::test]
    async fn test_header_only_table_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        let config = test_config(root.path());
        config.ensure_directories().unwrap();

        std::fs::write(config.data_dir.join("EXPORT_empty.csv"), "id,name\n").unwrap();

        let (log, buffer) = test_log();
        CsvExportJob::new(config.clone()).run(&log).await.unwrap();

        assert!(buffer.to_text().contains("No data found in table EXPORT_empty"));
        assert!(buffer.to_text().contains("Export completed: 0 tables exported"));
        assert_eq!(std::fs::read_dir(&config.export_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_only_export_prefixed_files_are_tables() {
        let root = tempfile::tempdir().unwrap();
        let config = test_config(root.path());
        config.ensure_directories().unwrap();

        std::fs::write(config.data_dir.join("scratch.csv"), "id\n1\n").unwrap();
        std::fs::write(config.data_dir.join("EXPORT_real.csv"), "id\n1\n").unwrap();

        let (log, buffer) = test_log();
        CsvExportJob::new(config).run(&log).await.unwrap();

        let text = buffer.to_text();
        assert!(text.contains("Found 1 export tables"));
        assert!(text.contains("Exported EXPORT_real to"));
    }
}
