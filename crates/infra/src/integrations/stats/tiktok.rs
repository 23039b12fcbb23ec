//! TikTok public profile scrape
//!
//! Counts are pulled from the JSON TikTok embeds in the profile page. When
//! the page layout changes the counts stop matching, the fetch reports
//! `NotFound` and the provider degrades to the fallback estimate.

use std::sync::LazyLock;

use async_trait::async_trait;
use influlink_core::{StatsSource, StatsTarget};
use influlink_domain::{quality_score, Provider, StatsFragment, StatsSourceError};
use regex::Regex;

use super::{ratio, source_error};
use crate::http::HttpClient;

const DEFAULT_WEB_BASE: &str = "https://www.tiktok.com";
const SOURCE: &str = "tiktok_scrape";

static FOLLOWER_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""followerCount"\s*:\s*(\d+)"#).expect("FOLLOWER_COUNT regex should compile")
});
static HEART_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""heart(?:Count)?"\s*:\s*(\d+)"#).expect("HEART_COUNT regex should compile")
});
static VIDEO_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""videoCount"\s*:\s*(\d+)"#).expect("VIDEO_COUNT regex should compile")
});

pub struct TiktokScrapeSource {
    http: HttpClient,
    web_base: String,
}

impl TiktokScrapeSource {
    pub fn new(http: HttpClient, web_base: Option<String>) -> Self {
        Self {
            http,
            web_base: web_base.as_deref().unwrap_or(DEFAULT_WEB_BASE).trim_end_matches('/').to_string(),
        }
    }
}

/// Embedded profile counters.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProfileCounts {
    pub followers: u64,
    pub hearts: u64,
    pub videos: u64,
}

fn first_count(pattern: &Regex, page: &str) -> u64 {
    pattern
        .captures(page)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_default()
}

pub fn extract_counts(page: &str) -> ProfileCounts {
    ProfileCounts {
        followers: first_count(&FOLLOWER_COUNT, page),
        hearts: first_count(&HEART_COUNT, page),
        videos: first_count(&VIDEO_COUNT, page),
    }
}

fn username_for(target: &StatsTarget) -> Option<String> {
    target
        .bare_handle()
        .map(str::to_string)
        .or_else(|| {
            let path = target.link_url.split("tiktok.com/@").nth(1)?;
            path.split(['/', '?', '#']).next().map(str::to_string)
        })
        .filter(|name| !name.is_empty())
}

#[async_trait]
impl StatsSource for TiktokScrapeSource {
    fn provider(&self) -> Provider {
        Provider::Tiktok
    }

    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, target: &StatsTarget) -> Result<StatsFragment, StatsSourceError> {
        let username = username_for(target)
            .ok_or_else(|| StatsSourceError::NotFound(format!("{SOURCE}: no username")))?;

        let request = self.http.get(format!("{}/@{username}", self.web_base));
        let page = self.http.fetch_text(request).await.map_err(|err| source_error(SOURCE, err))?;

        let counts = extract_counts(&page);
        if counts.followers == 0 {
            return Err(StatsSourceError::NotFound(format!("{SOURCE}: no follower count for @{username}")));
        }

        let avg_likes = ratio(counts.hearts, counts.videos).map(f64::round);
        #[allow(clippy::cast_precision_loss)]
        let engagement_rate = avg_likes.map(|likes| (likes / counts.followers as f64 * 10_000.0).round() / 100.0);

        let mut fragment = StatsFragment::live(Provider::Tiktok, counts.followers);
        fragment.avg_likes = avg_likes;
        fragment.engagement_rate = engagement_rate;
        fragment.quality_score = Some(quality_score(counts.followers, engagement_rate));
        Ok(fragment)
    }
}
