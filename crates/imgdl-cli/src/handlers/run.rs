//! The download command: read URLs, resolve configuration, run the batch,
//! print the summary.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use imgdl_core::{BatchSummary, DownloaderConfig, DownloaderSettings, config_file_candidates};
use imgdl_download::build_downloader;

use crate::error::CliError;
use crate::handlers::report;
use crate::parser::Cli;
use crate::progress::CliProgress;

/// Read one URL per line, dropping line endings and blank lines.
///
/// Other whitespace is kept: the URL string is hashed verbatim.
pub async fn read_urls(path: &Path) -> Result<Vec<String>, CliError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    Ok(text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}

/// Layer defaults, config files, an explicit `--config` file and the
/// command line, then resolve.
pub fn load_config(cli: &Cli) -> Result<DownloaderConfig, CliError> {
    let candidates = config_file_candidates();
    let mut settings = DownloaderSettings::load_layered(&candidates)?;

    if let Some(path) = &cli.config {
        if !path.is_file() {
            return Err(CliError::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        settings.merge(DownloaderSettings::from_file(path)?);
    }

    settings.merge(cli.settings());
    let config = settings.resolve()?;
    debug!(
        store = %config.store_path.display(),
        workers = config.n_workers,
        timeout_secs = config.timeout.as_secs_f64(),
        thumbnails = ?config.thumbnails.iter().map(ToString::to_string).collect::<Vec<_>>(),
        proxies = config.proxies.len(),
        user_agent = config.headers.user_agent().unwrap_or_default(),
        "Resolved configuration"
    );
    Ok(config)
}

/// One summary line, e.g. `Downloaded 66.67% of images (2)`.
pub fn summary_line(summary: &BatchSummary) -> String {
    format!(
        "Downloaded {:.2}% of images ({})",
        summary.success_ratio() * 100.0,
        summary.succeeded
    )
}

/// Cancel `token` on Ctrl-C so in-flight downloads can finish cleanly.
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight downloads");
            token.cancel();
        }
    });
}

/// Run the whole command. A batch with failed URLs is still a success.
pub async fn execute(cli: &Cli) -> Result<BatchSummary, CliError> {
    let urls = read_urls(&cli.urls).await?;
    let config = load_config(cli)?;

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let downloader = build_downloader(&config)?
        .with_progress(Arc::new(CliProgress::new()))
        .with_cancellation(cancel);

    let result = downloader.download_all(urls, false).await;
    let summary = result.summary();

    println!("{}", summary_line(&summary));
    if summary.failed > 0 {
        println!("{} of {} images failed", summary.failed, summary.total);
    }

    if let Some(path) = &cli.report {
        report::write(path, &result).await?;
        info!(path = %path.display(), "Report written");
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_read_urls_skips_blank_lines() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("urls.txt");
        std::fs::write(&path, "https://x/a.png\r\n\n   \nhttps://x/b.png\n").unwrap();

        let urls = read_urls(&path).await.unwrap();

        assert_eq!(urls, vec!["https://x/a.png", "https://x/b.png"]);
    }

    #[tokio::test]
    async fn test_missing_url_file_is_io_error() {
        let err = read_urls(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 74);
    }

    #[test]
    fn test_summary_line_format() {
        let summary = BatchSummary {
            total: 3,
            succeeded: 2,
            failed: 1,
            fetched: 2,
            skipped: 0,
        };
        assert_eq!(summary_line(&summary), "Downloaded 66.67% of images (2)");
    }

    #[test]
    fn test_cli_flags_override_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("imgdl.yaml");
        std::fs::write(
            &file,
            "imgdl:\n  n_workers: 3\n  timeout: 9\n  store_path: /tmp/from-file\n",
        )
        .unwrap();
        let cli = Cli::parse_from([
            "imgdl",
            "urls.txt",
            "--config",
            file.to_str().unwrap(),
            "-o",
            temp.path().join("store").to_str().unwrap(),
            "--timeout",
            "1.5",
        ]);

        let config = load_config(&cli).unwrap();

        assert_eq!(config.n_workers, 3);
        assert_eq!(config.timeout, std::time::Duration::from_secs_f64(1.5));
        assert_eq!(config.store_path, temp.path().join("store"));
    }

    #[test]
    fn test_missing_explicit_config_is_config_error() {
        let cli = Cli::parse_from(["imgdl", "urls.txt", "--config", "/nope/imgdl.yaml"]);
        let err = load_config(&cli).unwrap_err();
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn test_invalid_wait_range_is_config_error() {
        let cli = Cli::parse_from(["imgdl", "urls.txt", "--min-wait", "2", "--max-wait", "1"]);
        let err = load_config(&cli).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[tokio::test]
    async fn test_unreachable_urls_fail_without_failing_the_command() {
        let temp = tempfile::tempdir().unwrap();
        let list = temp.path().join("urls.txt");
        // Port 9 (discard) on loopback is closed on any sane test host
        std::fs::write(&list, "http://127.0.0.1:9/a.png\n").unwrap();
        let report = temp.path().join("report.json");
        let cli = Cli::parse_from([
            "imgdl",
            list.to_str().unwrap(),
            "-o",
            temp.path().join("store").to_str().unwrap(),
            "--timeout",
            "2",
            "--report",
            report.to_str().unwrap(),
        ]);

        let summary = execute(&cli).await.unwrap();

        assert_eq!(summary.total, 1);
        assert_eq!(summary.failed, 1);
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
        assert!(json[0]["path"].is_null());
        assert!(json[0]["error"].is_string());
    }
}
