//! Command-line definition.
//!
//! Every option can also come from an `IMGDL_*` environment variable (or a
//! `.env` file). Flags left unset do not override configuration files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;

use imgdl_core::{DownloaderSettings, ProxySetting, ThumbSizes, ThumbnailSpec};

/// Bulk image downloader.
///
/// Reads a file with one URL per line, stores every image as an RGB JPEG
/// named after the SHA-1 of its URL, and optionally writes thumbnails.
#[derive(Parser, Debug)]
#[command(name = "imgdl")]
#[command(about = "Bulk image downloader from a list of URLs")]
#[command(version)]
pub struct Cli {
    /// Text file with one URL per line
    pub urls: PathBuf,

    /// Root directory of the image store
    #[arg(short = 'o', long, alias = "store_path", env = "IMGDL_STORE_PATH")]
    pub store_path: Option<PathBuf>,

    /// Number of simultaneous downloads (default: number of CPUs)
    #[arg(short = 'n', long, alias = "n_workers", env = "IMGDL_N_WORKERS")]
    pub n_workers: Option<usize>,

    /// Download and rewrite even when files already exist
    #[arg(short = 'f', long, env = "IMGDL_FORCE")]
    pub force: bool,

    /// Request timeout in seconds
    #[arg(long, env = "IMGDL_TIMEOUT")]
    pub timeout: Option<f64>,

    /// Thumbnail to create: SIDE, WxH or NAME=WxH; repeat for several
    #[arg(long = "thumbs", env = "IMGDL_THUMBS", value_delimiter = ',')]
    pub thumbs: Vec<ThumbnailSpec>,

    /// Minimum pause after each download, in seconds
    #[arg(long, alias = "min_wait", env = "IMGDL_MIN_WAIT")]
    pub min_wait: Option<f64>,

    /// Maximum pause after each download, in seconds
    #[arg(long, alias = "max_wait", env = "IMGDL_MAX_WAIT")]
    pub max_wait: Option<f64>,

    /// Proxy URL; repeat to rotate randomly between several
    #[arg(long = "proxy", env = "IMGDL_PROXIES", value_delimiter = ',')]
    pub proxies: Vec<String>,

    /// User-Agent header sent with every request
    #[arg(short = 'u', long, alias = "user_agent", env = "IMGDL_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Extra request header as NAME:VALUE; repeat for several
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Additional YAML configuration file, applied after the default ones
    #[arg(short = 'c', long, env = "IMGDL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write a JSON report of every URL's outcome to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long, visible_short_alias = 'd', alias = "debug")]
    pub verbose: bool,
}

impl Cli {
    /// The settings layer made of the options given on this invocation.
    pub fn settings(&self) -> DownloaderSettings {
        let thumbs_size = (!self.thumbs.is_empty()).then(|| {
            ThumbSizes::Named(
                self.thumbs
                    .iter()
                    .map(|spec| (spec.name.clone(), [spec.width, spec.height]))
                    .collect(),
            )
        });
        let proxies = (!self.proxies.is_empty()).then(|| ProxySetting::Many(self.proxies.clone()));
        let headers = (!self.headers.is_empty())
            .then(|| self.headers.iter().cloned().collect::<BTreeMap<_, _>>());

        DownloaderSettings {
            store_path: self.store_path.clone(),
            n_workers: self.n_workers,
            force: self.force.then_some(true),
            timeout: self.timeout,
            thumbs: thumbs_size.as_ref().map(|_| true),
            thumbs_size,
            min_wait: self.min_wait,
            max_wait: self.max_wait,
            proxies,
            headers,
            user_agent: self.user_agent.clone(),
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in {raw:?}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
