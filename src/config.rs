use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;
use std::{env, fs, io};

use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct Site {
    pub name: String,
    pub tagline: String,
    pub base_url: String,
    pub founded_year: i32,
    pub launched: TomlDate,
}

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
    pub posts_dir: PathBuf,
    pub pages_dir: PathBuf,
}

#[derive(Deserialize)]
pub struct Defaults {
    pub index_base_name: Option<String>,
    pub page_size: u32,
    pub related_limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Metrics {
    pub location: Option<PathBuf>,
    pub time_slot_secs: Option<i64>,
}

#[derive(Deserialize)]
pub struct RssFeed {
    pub title: String,
    pub description: String,
    pub page_size: u32,
}

#[derive(Deserialize)]
pub struct Config {
    pub site: Site,
    pub paths: Paths,
    pub defaults: Defaults,
    pub server: Server,
    pub log: Option<Log>,
    pub metrics: Option<Metrics>,
    pub rss_feed: Option<RssFeed>,
}

// Paths in the config file may be anchored to the executable location with
// a ${exe_dir} prefix, so the same file works from the build tree and from
// an installed layout.
fn expand_path(path: PathBuf) -> io::Result<PathBuf> {
    if !path.starts_with("${exe_dir}") {
        return Ok(path);
    }

    let cur_exe = env::current_exe()?;
    let exe_dir = match cur_exe.parent().and_then(|p| p.to_str()) {
        Some(dir) => dir.to_string(),
        None => return Err(io::Error::new(ErrorKind::NotFound, "Could not resolve executable dir")),
    };

    let str_path = path.to_str().unwrap_or_default();
    Ok(PathBuf::from(str_path.replace("${exe_dir}", &exe_dir)))
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.to_str().unwrap_or("?"), e))),
    };

    let mut cfg: Config = match toml::from_str::<Config>(cfg_content.as_str()) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        template_dir: expand_path(cfg.paths.template_dir)?,
        public_dir: expand_path(cfg.paths.public_dir)?,
        posts_dir: expand_path(cfg.paths.posts_dir)?,
        pages_dir: expand_path(cfg.paths.pages_dir)?,
    };

    Ok(cfg)
}

// Code adapted from https://www.seachess.net/notes/toml-dates/
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TomlDate(pub NaiveDate);

impl<'de> Deserialize<'de> for TomlDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let value = toml::value::Datetime::deserialize(deserializer)?;
        let date = TomlDate::from_str(&value.to_string()).map_err(Error::custom)?;
        Ok(date)
    }
}

impl FromStr for TomlDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let naive = NaiveDate::from_str(s)?;
        Ok(Self(naive))
    }
}
