//! Loose, layerable settings and their resolution into [`DownloaderConfig`].
//!
//! Settings come from YAML files, environment and command-line flags. Every
//! field is optional so layers can be merged; shapes are permissive (a proxy
//! may be one string or a list, thumbnail sizes a mapping or a list of square
//! sides). [`DownloaderSettings::resolve`] validates once and produces the
//! canonical configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, de};
use tracing::debug;

use super::thumbs::default_specs;
use super::{
    DEFAULT_STORE_PATH, DEFAULT_TIMEOUT_SECS, DownloaderConfig, HeaderSet, ProxyPool,
    ThumbnailSpec, WaitRange, timeout_from_secs,
};
use crate::error::ConfigError;
use crate::paths::expand_home;

/// Top-level key under which a config file holds imgdl settings.
const FILE_SECTION: &str = "imgdl";

/// One proxy or a list of proxies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProxySetting {
    One(String),
    Many(Vec<String>),
}

/// Thumbnail sizes as `{name: [w, h]}` or a list of square sides.
///
/// Names may be written as bare YAML scalars (`100: [100, 100]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawThumbSizes")]
pub enum ThumbSizes {
    Named(BTreeMap<String, [u32; 2]>),
    Square(Vec<u32>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawThumbSizes {
    Named(BTreeMap<ThumbName, [u32; 2]>),
    Square(Vec<u32>),
}

impl From<RawThumbSizes> for ThumbSizes {
    fn from(raw: RawThumbSizes) -> Self {
        match raw {
            RawThumbSizes::Named(map) => {
                Self::Named(map.into_iter().map(|(name, size)| (name.0, size)).collect())
            }
            RawThumbSizes::Square(sides) => Self::Square(sides),
        }
    }
}

/// Mapping key taken from any scalar.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct ThumbName(String);

impl<'de> Deserialize<'de> for ThumbName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScalarVisitor;

        impl de::Visitor<'_> for ScalarVisitor {
            type Value = ThumbName;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a thumbnail name")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ThumbName, E> {
                Ok(ThumbName(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ThumbName, E> {
                Ok(ThumbName(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ThumbName, E> {
                Ok(ThumbName(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ThumbName, E> {
                Ok(ThumbName(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<ThumbName, E> {
                Ok(ThumbName(v.to_string()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

impl ThumbSizes {
    fn into_specs(self) -> Vec<ThumbnailSpec> {
        match self {
            Self::Named(map) => map
                .into_iter()
                .map(|(name, [w, h])| ThumbnailSpec::new(name, w, h))
                .collect(),
            Self::Square(sides) => sides.into_iter().map(ThumbnailSpec::square).collect(),
        }
    }
}

/// Partial settings; `None` means "not set at this layer".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloaderSettings {
    pub store_path: Option<PathBuf>,
    pub n_workers: Option<usize>,
    pub force: Option<bool>,
    /// Request timeout in seconds.
    pub timeout: Option<f64>,
    /// Enable thumbnails; implied when `thumbs_size` is set.
    pub thumbs: Option<bool>,
    pub thumbs_size: Option<ThumbSizes>,
    /// Minimum pause after a fetch, in seconds.
    pub min_wait: Option<f64>,
    /// Maximum pause after a fetch, in seconds.
    pub max_wait: Option<f64>,
    pub proxies: Option<ProxySetting>,
    pub headers: Option<BTreeMap<String, String>>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "imgdl")]
    section: Option<DownloaderSettings>,
}

impl DownloaderSettings {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    ///
    /// Header maps are merged key by key rather than replaced.
    pub fn merge(&mut self, other: Self) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            store_path,
            n_workers,
            force,
            timeout,
            thumbs,
            thumbs_size,
            min_wait,
            max_wait,
            proxies,
            user_agent
        );
        if let Some(headers) = other.headers {
            self.headers.get_or_insert_with(BTreeMap::new).extend(headers);
        }
    }

    /// Parse the `imgdl:` section of a YAML document.
    ///
    /// Documents without that section yield empty settings.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: ConfigFile = serde_yaml::from_str(text)?;
        Ok(file.section.unwrap_or_default())
    }

    /// Read one config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let to_error = |reason: String| ConfigError::File {
            path: path.to_path_buf(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| to_error(e.to_string()))?;
        Self::from_yaml(&text).map_err(|e| to_error(e.to_string()))
    }

    /// Merge every existing file in `paths`, in order; missing files are
    /// skipped.
    pub fn load_layered(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        for path in paths.iter().filter(|p| p.is_file()) {
            debug!(path = %path.display(), "Loading config file");
            settings.merge(Self::from_file(path)?);
        }
        Ok(settings)
    }

    /// Validate and fill defaults, producing the canonical configuration.
    pub fn resolve(self) -> Result<DownloaderConfig, ConfigError> {
        let store_path = self
            .store_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
        if store_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyStorePath);
        }
        let store_path = expand_home(&store_path)?;

        let n_workers = self
            .n_workers
            .unwrap_or_else(DownloaderConfig::default_workers);
        if n_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }

        let timeout = timeout_from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))?;

        let min_wait = self.min_wait.unwrap_or(0.0);
        let max_wait = self.max_wait.unwrap_or(min_wait);
        let wait = WaitRange::from_secs(min_wait, max_wait)?;

        let thumbnails = match (self.thumbs, self.thumbs_size) {
            (Some(false), _) => Vec::new(),
            (_, Some(sizes)) => sizes.into_specs(),
            (Some(true), None) => default_specs(),
            (None, None) => Vec::new(),
        };
        ThumbnailSpec::validate_all(&thumbnails)?;

        let proxies = match self.proxies {
            None => ProxyPool::direct(),
            Some(ProxySetting::One(proxy)) => ProxyPool::parse([proxy])?,
            Some(ProxySetting::Many(list)) => ProxyPool::parse(list)?,
        };

        let mut headers = HeaderSet::defaults();
        for (name, value) in self.headers.unwrap_or_default() {
            headers = headers.with(name, value);
        }
        if let Some(user_agent) = self.user_agent {
            headers = headers.with_user_agent(user_agent);
        }
        headers.validate()?;

        Ok(DownloaderConfig {
            store_path,
            n_workers,
            force: self.force.unwrap_or(false),
            timeout,
            thumbnails,
            wait,
            proxies,
            headers,
        })
    }
}

/// Config files consulted by default, lowest precedence first: the
/// user-wide file then the project-local one.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(2);
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".imgdl").join("config.yaml"));
    }
    paths.push(PathBuf::from(format!("{FILE_SECTION}.yaml")));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USER_AGENT;
    use std::time::Duration;

    fn settings(store: &str) -> DownloaderSettings {
        DownloaderSettings {
            store_path: Some(PathBuf::from(store)),
            ..Default::default()
        }
    }

    #[test]
    fn resolve_applies_defaults() {
        let config = settings("/tmp/imgs").resolve().unwrap();
        assert_eq!(config.store_path, PathBuf::from("/tmp/imgs"));
        assert!(config.n_workers >= 1);
        assert!(!config.force);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.thumbnails.is_empty());
        assert!(config.wait.is_zero());
        assert!(config.proxies.is_direct());
        assert_eq!(config.headers.user_agent(), Some(DEFAULT_USER_AGENT));
    }

    #[test]
    fn proxies_accept_string_or_list() {
        let mut s = settings("/tmp/imgs");
        s.proxies = Some(ProxySetting::One("10.0.0.1:3128".into()));
        assert_eq!(
            s.clone().resolve().unwrap().proxies.records()[0].url(),
            "http://10.0.0.1:3128"
        );

        s.proxies = Some(ProxySetting::One("http://p:1".into()));
        assert_eq!(s.clone().resolve().unwrap().proxies.len(), 1);

        s.proxies = Some(ProxySetting::Many(vec!["http://p:1".into(), "http://q:2".into()]));
        assert_eq!(s.clone().resolve().unwrap().proxies.len(), 2);

        s.proxies = Some(ProxySetting::Many(vec!["ftp://garbage".into()]));
        assert!(matches!(s.resolve(), Err(ConfigError::InvalidProxy { .. })));
    }

    #[test]
    fn thumbnails_follow_flag_and_sizes() {
        let mut s = settings("/tmp/imgs");
        s.thumbs = Some(true);
        let names: Vec<_> = s.clone().resolve().unwrap().thumbnails.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["small", "big"]);

        s.thumbs_size = Some(ThumbSizes::Square(vec![100]));
        assert_eq!(
            s.clone().resolve().unwrap().thumbnails,
            vec![ThumbnailSpec::square(100)]
        );

        s.thumbs = Some(false);
        assert!(s.resolve().unwrap().thumbnails.is_empty());
    }

    #[test]
    fn user_agent_overrides_header_map() {
        let mut s = settings("/tmp/imgs");
        s.headers = Some(BTreeMap::from([
            ("User-Agent".to_string(), "from-headers".to_string()),
            ("Referer".to_string(), "https://x/".to_string()),
        ]));
        s.user_agent = Some("from-flag".to_string());

        let headers = s.resolve().unwrap().headers;
        assert_eq!(headers.user_agent(), Some("from-flag"));
        assert_eq!(headers.get("referer"), Some("https://x/"));
    }

    #[test]
    fn max_wait_defaults_to_min_wait() {
        let mut s = settings("/tmp/imgs");
        s.min_wait = Some(0.5);
        let wait = s.clone().resolve().unwrap().wait;
        assert_eq!(wait.min(), wait.max());

        s.max_wait = Some(0.1);
        assert!(matches!(s.resolve(), Err(ConfigError::InvalidWaitRange { .. })));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let mut s = settings("/tmp/imgs");
        s.n_workers = Some(0);
        assert!(matches!(s.resolve(), Err(ConfigError::ZeroWorkers)));
    }

    #[test]
    fn merge_prefers_later_layer_and_merges_headers() {
        let mut base = settings("/base");
        base.n_workers = Some(2);
        base.headers = Some(BTreeMap::from([("A".to_string(), "1".to_string())]));

        let mut over = settings("/over");
        over.headers = Some(BTreeMap::from([("B".to_string(), "2".to_string())]));
        base.merge(over);

        assert_eq!(base.store_path, Some(PathBuf::from("/over")));
        assert_eq!(base.n_workers, Some(2));
        assert_eq!(base.headers.unwrap().len(), 2);
    }

    #[test]
    fn yaml_section_is_read_and_other_keys_ignored() {
        let text = r"
other_tool:
  anything: true
imgdl:
  store_path: /data/imgs
  n_workers: 3
  proxies: http://p:3128
  thumbs_size:
    small: [50, 50]
    big: [200, 100]
";
        let s = DownloaderSettings::from_yaml(text).unwrap();
        assert_eq!(s.n_workers, Some(3));
        assert_eq!(s.proxies, Some(ProxySetting::One("http://p:3128".into())));

        let config = s.resolve().unwrap();
        assert_eq!(config.thumbnails.len(), 2);
        assert!(config.thumbnails.contains(&ThumbnailSpec::new("big", 200, 100)));
    }

    #[test]
    fn yaml_accepts_numeric_thumbnail_names() {
        let s = DownloaderSettings::from_yaml("imgdl:\n  thumbs_size:\n    100: [100, 100]\n    big: [200, 150]\n")
            .unwrap();
        assert_eq!(
            s.thumbs_size,
            Some(ThumbSizes::Named(BTreeMap::from([
                ("100".to_string(), [100, 100]),
                ("big".to_string(), [200, 150]),
            ])))
        );
        let config = s.resolve().unwrap();
        assert!(config.thumbnails.contains(&ThumbnailSpec::new("100", 100, 100)));
    }

    #[test]
    fn yaml_square_thumbnail_list_still_parses() {
        let s = DownloaderSettings::from_yaml("imgdl:\n  thumbs_size: [64, 128]\n").unwrap();
        assert_eq!(s.thumbs_size, Some(ThumbSizes::Square(vec![64, 128])));
    }

    #[test]
    fn yaml_without_section_is_empty() {
        assert_eq!(
            DownloaderSettings::from_yaml("foo: 1\n").unwrap(),
            DownloaderSettings::default()
        );
        assert_eq!(
            DownloaderSettings::from_yaml("").unwrap(),
            DownloaderSettings::default()
        );
    }

    #[test]
    fn yaml_rejects_unknown_fields() {
        assert!(DownloaderSettings::from_yaml("imgdl:\n  n_wrokers: 3\n").is_err());
    }

    #[test]
    fn load_layered_skips_missing_files() {
        let temp = tempfile::tempdir().unwrap();
        let user = temp.path().join("user.yaml");
        let project = temp.path().join("project.yaml");
        fs::write(&user, "imgdl:\n  n_workers: 2\n  timeout: 9\n").unwrap();
        fs::write(&project, "imgdl:\n  n_workers: 7\n").unwrap();

        let s = DownloaderSettings::load_layered(&[
            user,
            temp.path().join("missing.yaml"),
            project,
        ])
        .unwrap();
        assert_eq!(s.n_workers, Some(7));
        assert_eq!(s.timeout, Some(9.0));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("bad.yaml");
        fs::write(&path, "imgdl: [unclosed").unwrap();
        assert!(matches!(
            DownloaderSettings::load_layered(&[path]),
            Err(ConfigError::File { .. })
        ));
    }
}
