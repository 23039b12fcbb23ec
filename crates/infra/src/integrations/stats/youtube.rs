//! YouTube Data API channel statistics

use async_trait::async_trait;
use influlink_core::{StatsSource, StatsTarget};
use influlink_domain::{quality_score, Provider, StatsFragment, StatsSourceError};
use serde::Deserialize;

use super::{parse_count, ratio, source_error};
use crate::http::HttpClient;

const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const SOURCE: &str = "youtube_data_api";

pub struct YoutubeStatsSource {
    http: HttpClient,
    api_key: Option<String>,
    api_base: String,
}

impl YoutubeStatsSource {
    pub fn new(http: HttpClient, api_key: Option<String>, api_base: Option<String>) -> Self {
        Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_base: api_base.as_deref().unwrap_or(DEFAULT_API_BASE).trim_end_matches('/').to_string(),
        }
    }
}

/// How a channel is addressed in `channels.list`.
#[derive(Debug, PartialEq, Eq)]
enum ChannelLookup {
    Id(String),
    Handle(String),
}

impl ChannelLookup {
    fn query(&self) -> (&'static str, String) {
        match self {
            Self::Id(id) => ("id", id.clone()),
            Self::Handle(handle) => ("forHandle", format!("@{handle}")),
        }
    }
}

fn is_channel_id(value: &str) -> bool {
    value.len() == 24 && value.starts_with("UC")
}

/// Channel id first (stored id, then a `UC…` handle), else the handle,
/// else whatever the profile link names.
fn lookup_for(target: &StatsTarget) -> Option<ChannelLookup> {
    if is_channel_id(&target.external_id) {
        return Some(ChannelLookup::Id(target.external_id.clone()));
    }
    if let Some(handle) = target.bare_handle() {
        if is_channel_id(handle) {
            return Some(ChannelLookup::Id(handle.to_string()));
        }
        return Some(ChannelLookup::Handle(handle.to_string()));
    }

    let path = target.link_url.split("youtube.com/").nth(1)?;
    let path = path.split(['?', '#']).next().unwrap_or_default().trim_end_matches('/');
    if let Some(id) = path.strip_prefix("channel/") {
        return Some(ChannelLookup::Id(id.to_string()));
    }
    path.strip_prefix('@').filter(|h| !h.is_empty()).map(|h| ChannelLookup::Handle(h.to_string()))
}

#[derive(Debug, Deserialize)]
struct ChannelList {
    #[serde(default)]
    items: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    subscriber_count: Option<String>,
    view_count: Option<String>,
    video_count: Option<String>,
}

#[async_trait]
impl StatsSource for YoutubeStatsSource {
    fn provider(&self) -> Provider {
        Provider::Youtube
    }

    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, target: &StatsTarget) -> Result<StatsFragment, StatsSourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(StatsSourceError::NotConfigured("youtube api key".into()));
        };
        let lookup = lookup_for(target)
            .ok_or_else(|| StatsSourceError::NotFound(format!("{SOURCE}: no channel reference")))?;
        let (param, value) = lookup.query();

        let request = self
            .http
            .get(format!("{}/channels", self.api_base))
            .query(&[("part", "statistics"), (param, value.as_str()), ("key", api_key)]);

        let list: ChannelList = self.http.fetch_json(request).await.map_err(|err| source_error(SOURCE, err))?;
        let channel = list
            .items
            .into_iter()
            .next()
            .ok_or_else(|| StatsSourceError::NotFound(format!("{SOURCE}: no channel for {value}")))?;

        let stats = channel.statistics;
        let followers = parse_count(SOURCE, "subscriberCount", stats.subscriber_count.as_deref())?;
        let views = parse_count(SOURCE, "viewCount", stats.view_count.as_deref())?;
        let videos = parse_count(SOURCE, "videoCount", stats.video_count.as_deref())?;

        let mut fragment = StatsFragment::live(Provider::Youtube, followers);
        fragment.avg_views = ratio(views, videos).map(f64::round);
        fragment.quality_score = Some(quality_score(followers, None));
        Ok(fragment)
    }
}
