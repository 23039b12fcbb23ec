//! Instagram statistics from a third-party profile search index

use async_trait::async_trait;
use influlink_core::{StatsSource, StatsTarget};
use influlink_domain::{
    quality_score, AudienceShare, ProfileSearchConfig, Provider, StatsFragment, StatsSourceError,
};
use serde::Deserialize;

use super::source_error;
use crate::http::HttpClient;

const SOURCE: &str = "profile_search";

pub struct ProfileSearchSource {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl ProfileSearchSource {
    pub fn new(http: HttpClient, config: &ProfileSearchConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ProfileHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileHit {
    #[serde(default)]
    url: String,
    #[serde(default)]
    followers: u64,
    engagement_rate: Option<f64>,
    avg_likes: Option<f64>,
    avg_comments: Option<f64>,
    avg_views: Option<f64>,
    #[serde(default)]
    audience_gender: Vec<AudienceShare>,
    #[serde(default)]
    audience_age: Vec<AudienceShare>,
    #[serde(default)]
    audience_country: Vec<AudienceShare>,
}

/// Compare profile URLs ignoring scheme, `www.`, case, query and trailing
/// slashes.
pub fn canonical_url(url: &str) -> String {
    let lower = url.trim().to_ascii_lowercase();
    let rest = lower.split_once("://").map_or(lower.as_str(), |(_, rest)| rest);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    rest.trim_end_matches('/').to_string()
}

#[async_trait]
impl StatsSource for ProfileSearchSource {
    fn provider(&self) -> Provider {
        Provider::Instagram
    }

    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, target: &StatsTarget) -> Result<StatsFragment, StatsSourceError> {
        if self.base_url.is_empty() {
            return Err(StatsSourceError::NotConfigured("profile search index".into()));
        }

        let profile_url = if target.link_url.is_empty() {
            Provider::Instagram.profile_url(Some(&target.handle), None).unwrap_or_default()
        } else {
            target.link_url.clone()
        };
        if profile_url.is_empty() {
            return Err(StatsSourceError::NotFound(format!("{SOURCE}: no profile url")));
        }

        let mut request = self.http.get(format!("{}/search", self.base_url)).query(&[("q", profile_url.as_str())]);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response: SearchResponse =
            self.http.fetch_json(request).await.map_err(|err| source_error(SOURCE, err))?;

        let mut results = response.results;
        if results.is_empty() {
            return Err(StatsSourceError::NotFound(format!("{SOURCE}: no results for {profile_url}")));
        }
        let wanted = canonical_url(&profile_url);
        let index = results.iter().position(|hit| canonical_url(&hit.url) == wanted).unwrap_or(0);
        let hit = results.swap_remove(index);

        let mut fragment = StatsFragment::live(Provider::Instagram, hit.followers);
        fragment.engagement_rate = hit.engagement_rate;
        fragment.avg_likes = hit.avg_likes;
        fragment.avg_comments = hit.avg_comments;
        fragment.avg_views = hit.avg_views;
        fragment.quality_score = Some(quality_score(hit.followers, hit.engagement_rate));
        fragment.audience_gender = hit.audience_gender;
        fragment.audience_age = hit.audience_age;
        fragment.audience_country = hit.audience_country;
        Ok(fragment)
    }
}
