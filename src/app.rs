use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use duml::model::config::AppConfig;
use duml::model::format::OutputFormat;
use duml::{ParseResult, parse_file, parse_reader, render};

use crate::msg::Msg;
use crate::watch::DocumentWatcher;

const STDIN_PATH: &str = "-";
const WATCH_SETTLE: Duration = Duration::from_millis(50);

/// Outcome of checking one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Lost(usize),
    Error,
}

pub struct App {
    pub config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn parse_files(
        &self,
        files: &[PathBuf],
        format: OutputFormat,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> Result<()> {
        for file in files {
            let result = self.parse_path(file)?;
            self.print_result(&result, format, out)?;
            self.report_lost(file, &result, err)?;
        }
        Ok(())
    }

    /// Parse every DUML file under `paths`, returning each file's status.
    pub fn check(&self, paths: &[PathBuf], out: &mut impl Write) -> Result<Vec<CheckStatus>> {
        let files = duml::scan::collect_files(paths, &self.config.scan);
        let mut statuses = Vec::with_capacity(files.len());

        for file in &files {
            let status = match parse_file(file, self.config.parse_options()) {
                Ok(result) if result.lost_nodes.is_empty() => {
                    writeln!(out, "ok    {}", file.display())?;
                    CheckStatus::Ok
                }
                Ok(result) => {
                    let count = result.lost_nodes.len();
                    writeln!(out, "lost  {} ({count} lost nodes)", file.display())?;
                    for lost in &result.lost_nodes {
                        writeln!(out, "      {lost}")?;
                    }
                    CheckStatus::Lost(count)
                }
                Err(e) => {
                    writeln!(out, "error {}: {e}", file.display())?;
                    CheckStatus::Error
                }
            };
            statuses.push(status);
        }

        Ok(statuses)
    }

    pub fn render_file(&self, file: &Path, out: &mut impl Write, err: &mut impl Write) -> Result<()> {
        let result = self.parse_path(file)?;
        self.report_lost(file, &result, err)?;
        out.write_all(render(&result.duml)?.as_bytes())?;
        Ok(())
    }

    /// Print `file` now and again after every change, until the watcher goes
    /// away.
    pub fn watch(&self, file: &Path, format: OutputFormat) -> Result<()> {
        let watcher = DocumentWatcher::new(file)?;

        let mut stdout = io::stdout();
        let mut stderr = io::stderr();
        self.reparse_for_watch(&watcher.target, format, &mut stdout, &mut stderr)?;

        loop {
            // Editors emit bursts of events per save; let them settle first.
            let first = watcher.rx.recv()?;
            thread::sleep(WATCH_SETTLE);

            let mut changed = false;
            for msg in std::iter::once(first).chain(watcher.rx.try_iter()) {
                match msg {
                    Msg::FileChanged(path) => {
                        tracing::debug!(file = %path.display(), "document changed");
                        changed = true;
                    }
                    Msg::WatchError(e) => tracing::warn!("file watcher error: {e}"),
                }
            }

            if changed {
                self.reparse_for_watch(&watcher.target, format, &mut stdout, &mut stderr)?;
            }
        }
    }

    fn reparse_for_watch(
        &self,
        target: &Path,
        format: OutputFormat,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> Result<()> {
        match parse_file(target, self.config.parse_options()) {
            Ok(result) => {
                self.print_result(&result, format, out)?;
                self.report_lost(target, &result, err)?;
            }
            // A file mid-save may be missing or half written; wait for the next event.
            Err(e) => writeln!(err, "error: {e}")?,
        }
        out.flush()?;
        Ok(())
    }

    fn parse_path(&self, file: &Path) -> Result<ParseResult> {
        let options = self.config.parse_options();
        if file == Path::new(STDIN_PATH) {
            return parse_reader(io::stdin().lock(), options).context("failed to parse stdin");
        }
        Ok(parse_file(file, options)?)
    }

    fn print_result(
        &self,
        result: &ParseResult,
        format: OutputFormat,
        out: &mut impl Write,
    ) -> Result<()> {
        match format {
            OutputFormat::Json => serde_json::to_writer(&mut *out, &result.duml)?,
            OutputFormat::Pretty => serde_json::to_writer_pretty(&mut *out, &result.duml)?,
            OutputFormat::Tree => write!(out, "{}", result.duml)?,
        }
        writeln!(out)?;
        Ok(())
    }

    fn report_lost(&self, file: &Path, result: &ParseResult, err: &mut impl Write) -> Result<()> {
        if !self.config.output.report_lost {
            return Ok(());
        }
        for lost in &result.lost_nodes {
            writeln!(
                err,
                "warning: {}: value at `{}` was overwritten: {}",
                file.display(),
                lost.dotted_location(),
                lost.node
            )?;
        }
        Ok(())
    }
}

/// Fail with a summary when any checked file had an error.
pub fn check_outcome(statuses: &[CheckStatus]) -> Result<()> {
    let errors = statuses
        .iter()
        .filter(|status| **status == CheckStatus::Error)
        .count();
    let lost: usize = statuses
        .iter()
        .map(|status| match status {
            CheckStatus::Lost(count) => *count,
            _ => 0,
        })
        .sum();
    tracing::info!(files = statuses.len(), errors, lost, "check finished");

    if errors > 0 {
        bail!("{errors} of {} files failed to parse", statuses.len());
    }
    Ok(())
}
