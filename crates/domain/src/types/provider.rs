//! External platform identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::InfluLinkError;

/// One external platform an influencer can bind to.
///
/// Instagram has no OAuth login of its own; its flow authenticates through
/// Facebook and is routed under either `instagram` or `facebook`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Youtube,
    Instagram,
    Twitch,
    Tiktok,
}

impl Provider {
    /// Every provider, in document order.
    pub const ALL: [Provider; 4] =
        [Provider::Youtube, Provider::Instagram, Provider::Twitch, Provider::Tiktok];

    /// Stable lowercase identifier used in documents and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Instagram => "instagram",
            Self::Twitch => "twitch",
            Self::Tiktok => "tiktok",
        }
    }

    /// Path segment used for the redirect flow routes.
    pub fn route_segment(self) -> &'static str {
        match self {
            Self::Instagram => "facebook",
            other => other.as_str(),
        }
    }

    /// Public profile URL for a handle or provider-assigned id.
    ///
    /// YouTube prefers the channel id when one is known.
    pub fn profile_url(self, handle: Option<&str>, external_id: Option<&str>) -> Option<String> {
        let handle = handle.map(str::trim).filter(|h| !h.is_empty());
        let external_id = external_id.map(str::trim).filter(|id| !id.is_empty());

        match self {
            Self::Youtube => match (external_id, handle) {
                (Some(id), _) => Some(format!("https://www.youtube.com/channel/{id}")),
                (None, Some(h)) => Some(format!("https://www.youtube.com/@{}", strip_at(h))),
                (None, None) => None,
            },
            Self::Instagram => {
                handle.map(|h| format!("https://www.instagram.com/{}", strip_at(h)))
            }
            Self::Twitch => handle.map(|h| format!("https://www.twitch.tv/{}", strip_at(h))),
            Self::Tiktok => handle.map(|h| format!("https://www.tiktok.com/@{}", strip_at(h))),
        }
    }
}

/// Remove a leading `@` from a handle.
pub fn strip_at(handle: &str) -> &str {
    handle.trim().trim_start_matches('@')
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = InfluLinkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "youtube" => Ok(Self::Youtube),
            "instagram" | "facebook" => Ok(Self::Instagram),
            "twitch" => Ok(Self::Twitch),
            "tiktok" => Ok(Self::Tiktok),
            other => Err(InfluLinkError::InvalidInput(format!("unknown provider: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facebook_routes_to_instagram() {
        assert_eq!("facebook".parse::<Provider>().unwrap(), Provider::Instagram);
        assert_eq!("Instagram".parse::<Provider>().unwrap(), Provider::Instagram);
        assert!("myspace".parse::<Provider>().is_err());
    }

    #[test]
    fn youtube_profile_url_prefers_channel_id() {
        let url = Provider::Youtube.profile_url(Some("@acme"), Some("UC123"));
        assert_eq!(url.as_deref(), Some("https://www.youtube.com/channel/UC123"));

        let url = Provider::Youtube.profile_url(Some("@acme"), None);
        assert_eq!(url.as_deref(), Some("https://www.youtube.com/@acme"));
    }

    #[test]
    fn handle_based_profile_urls() {
        assert_eq!(
            Provider::Tiktok.profile_url(Some("@dancer"), None).as_deref(),
            Some("https://www.tiktok.com/@dancer")
        );
        assert_eq!(
            Provider::Twitch.profile_url(Some("streamer"), Some("42")).as_deref(),
            Some("https://www.twitch.tv/streamer")
        );
        assert!(Provider::Instagram.profile_url(Some("  "), None).is_none());
    }
}
