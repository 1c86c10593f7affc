//! CSV import job
//!
//! Scans the input folder for CSV files and stages each one as an
//! `EXPORT_{name}.csv` table under the data folder. Rows are validated
//! against the header (field count); invalid rows are diverted to a
//! per-file rejects CSV instead of the staging table.
//!
//! A fault while processing one file is logged and the remaining files still
//! run; only an unreadable input folder fails the job as a whole.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::config::EtlConfig;
use crate::csv::split_record;
use crate::job::{Job, JobLog};
use crate::status::JobKind;

/// Imports `input_dir/*.csv` into staged `data_dir/EXPORT_*.csv` tables.
pub struct CsvImportJob {
    config: EtlConfig,
}

impl CsvImportJob {
    pub fn new(mut config: EtlConfig) -> Self {
        // The progress interval divides the row counter; a hand-built config
        // can bypass validate(), so clamp here as well.
        config.batch_size = config.batch_size.max(1);
        Self { config }
    }

    async fn process_file(&self, path: &Path, log: &JobLog) -> anyhow::Result<(u64, u64)> {
        let name = file_name(path);
        let stem = file_stem(path);

        let file = fs::File::open(path)
            .await
            .with_context(|| format!("failed to open {name}"))?;
        let mut lines = BufReader::new(file).lines();

        let header = lines
            .next_line()
            .await?
            .map(|l| l.trim_end_matches('\r').to_string())
            .filter(|l| !l.is_empty())
            .ok_or_else(|| anyhow::anyhow!("{name} has no header row"))?;
        let expected_fields = split_record(&header)
            .with_context(|| format!("invalid header in {name}"))?
            .len();

        let mut table = StagingTable::open(&self.config.data_dir, &stem, &header).await?;
        let mut rejects = RejectFile::new(
            self.config.rejects_dir.join(format!("{stem}_rejects.csv")),
            &header,
        );

        let mut successful = 0u64;
        let mut rejected = 0u64;
        let mut row_no = 0u64;

        while let Some(line) = lines.next_line().await? {
            let row = line.trim_end_matches('\r');
            if row.is_empty() {
                continue;
            }
            row_no += 1;

            let valid = matches!(split_record(row), Ok(fields) if fields.len() == expected_fields);
            if valid {
                table.append(row).await?;
                successful += 1;
            } else {
                rejects.append(row).await?;
                rejected += 1;
            }

            if row_no % self.config.batch_size as u64 == 0 {
                log.line(format!(
                    "Processed {row_no} rows for {name}: {successful} valid, {rejected} rejected"
                ));
            }
        }

        table.flush().await?;
        rejects.flush().await?;

        Ok((successful, rejected))
    }
}

#[async_trait]
impl Job for CsvImportJob {
    fn kind(&self) -> JobKind {
        JobKind::Import
    }

    async fn run(&self, log: &JobLog) -> anyhow::Result<()> {
        let files = list_csv_files(&self.config.input_dir)
            .await
            .context("failed to read input folder")?;

        if files.is_empty() {
            log.line("No CSV files found in input folder");
            return Ok(());
        }

        log.line(format!("Found {} CSV files to process", files.len()));

        let mut total_successful = 0u64;
        let mut total_rejected = 0u64;

        for path in &files {
            let name = file_name(path);
            match self.process_file(path, log).await {
                Ok((successful, rejected)) => {
                    log.line(format!(
                        "Completed {name}: {successful} successful, {rejected} rejected"
                    ));
                    total_successful += successful;
                    total_rejected += rejected;
                }
                Err(error) => {
                    log.line(format!("Error processing {name}: {error:#}"));
                }
            }
        }

        log.line(format!(
            "Import completed: {total_successful} total successful rows, {total_rejected} total rejected rows"
        ));

        Ok(())
    }
}

/// Staging table file, created with the header on first use.
struct StagingTable {
    file: fs::File,
}

impl StagingTable {
    async fn open(data_dir: &Path, stem: &str, header: &str) -> anyhow::Result<Self> {
        let path = data_dir.join(format!("EXPORT_{stem}.csv"));
        let is_new = !fs::try_exists(&path).await.unwrap_or(false);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to open staging table {}", path.display()))?;

        if is_new {
            file.write_all(header.as_bytes()).await?;
            file.write_all(b"\n").await?;
        }

        Ok(Self { file })
    }

    async fn append(&mut self, row: &str) -> anyhow::Result<()> {
        self.file.write_all(row.as_bytes()).await?;
        self.file.write_all(b"\n").await?;
        Ok(())
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        self.file.flush().await?;
        Ok(())
    }
}

/// Rejects CSV, created lazily on the first invalid row.
struct RejectFile {
    path: PathBuf,
    header: String,
    file: Option<fs::File>,
}

impl RejectFile {
    fn new(path: PathBuf, header: &str) -> Self {
        Self {
            path,
            header: header.to_string(),
            file: None,
        }
    }

    async fn append(&mut self, row: &str) -> anyhow::Result<()> {
        if self.file.is_none() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent).await?;
            }
            let mut file = fs::File::create(&self.path)
                .await
                .with_context(|| format!("failed to create reject file {}", self.path.display()))?;
            file.write_all(self.header.as_bytes()).await?;
            file.write_all(b"\n").await?;
            self.file = Some(file);
        }

        let file = self.file.as_mut().context("reject file not open")?;
        file.write_all(row.as_bytes()).await?;
        file.write_all(b"\n").await?;
        Ok(())
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush().await?;
        }
        Ok(())
    }
}

/// CSV files in `dir`, sorted by name for deterministic processing order.
async fn list_csv_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}
