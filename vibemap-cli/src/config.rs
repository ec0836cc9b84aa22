use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use vibemap_core::{FeedSchedule, MatchConfig, ReviewPolicy, FEED_CAP};

use crate::state::ensure_vibemap_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub matching: MatchingSection,
    pub reviews: ReviewsSection,
    pub live: LiveSection,
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingSection {
    pub top_n: usize,
    pub min_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewsSection {
    /// Geofence radius for location-verified reviews.
    pub tolerance_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveSection {
    pub first_delay_secs: u64,
    pub min_interval_secs: u64,
    pub max_interval_secs: u64,
    pub probability: f64,
    pub feed_cap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// IANA zone used for "open now" checks and printed times.
    pub timezone: String,
    /// Catalog JSON to use instead of the built-in sample data.
    pub catalog: Option<PathBuf>,
}

impl Default for MatchingSection {
    fn default() -> Self {
        let m = MatchConfig::default();
        Self { top_n: m.top_n, min_score: m.min_score }
    }
}

impl Default for ReviewsSection {
    fn default() -> Self {
        Self { tolerance_m: ReviewPolicy::default().tolerance_m }
    }
}

impl Default for LiveSection {
    fn default() -> Self {
        let s = FeedSchedule::default();
        Self {
            first_delay_secs: s.first_delay.as_secs(),
            min_interval_secs: s.min_interval.as_secs(),
            max_interval_secs: s.max_interval.as_secs(),
            probability: s.probability,
            feed_cap: FEED_CAP,
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            timezone: "America/Los_Angeles".to_string(),
            catalog: None,
        }
    }
}

impl Config {
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            top_n: self.matching.top_n.max(1),
            min_score: self.matching.min_score,
        }
    }

    pub fn review_policy(&self) -> ReviewPolicy {
        ReviewPolicy { tolerance_m: self.reviews.tolerance_m }
    }

    pub fn feed_schedule(&self) -> FeedSchedule {
        FeedSchedule {
            first_delay: Duration::from_secs(self.live.first_delay_secs),
            min_interval: Duration::from_secs(self.live.min_interval_secs),
            max_interval: Duration::from_secs(self.live.max_interval_secs.max(self.live.min_interval_secs)),
            probability: self.live.probability,
        }
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.display
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid timezone {:?}: {e}", self.display.timezone))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_vibemap_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
