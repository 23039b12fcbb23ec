//! Deterministic synthetic statistics
//!
//! Substituted when a live source fails so repeated reads of the same
//! handle stay stable. Always tagged `fallback`, never stamped as fetched.

use influlink_domain::{quality_score, AudienceShare, Provider, StatsFragment, StatsOrigin};

/// Fixed audience age distribution, in percent.
const AGE_SHAPE: [(&str, f64); 5] =
    [("13-17", 8.0), ("18-24", 34.0), ("25-34", 31.0), ("35-44", 17.0), ("45+", 10.0)];

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackEstimator;

impl FallbackEstimator {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn estimate(&self, provider: Provider, handle: &str) -> StatsFragment {
        let mut draws = Draws::new(handle);

        let followers = draws.int(10_000, 110_000);
        let engagement_rate = round_to(draws.float(1.5, 5.0), 2);
        let avg_likes = (followers as f64 * engagement_rate / 100.0).round();
        let avg_comments = (avg_likes / 25.0).round();
        let view_share = draws.int(20, 60);
        let avg_views = (followers as f64 * view_share as f64 / 100.0).round();

        let female = round_to(draws.float(35.0, 65.0), 1);
        let audience_gender = vec![
            AudienceShare::new("female", female),
            AudienceShare::new("male", round_to(100.0 - female, 1)),
        ];
        let audience_age =
            AGE_SHAPE.iter().map(|(label, share)| AudienceShare::new(*label, *share)).collect();

        StatsFragment {
            provider,
            followers,
            engagement_rate: Some(engagement_rate),
            avg_likes: Some(avg_likes),
            avg_comments: Some(avg_comments),
            avg_views: Some(avg_views),
            quality_score: Some(quality_score(followers, Some(engagement_rate))),
            audience_gender,
            audience_age,
            audience_country: Vec::new(),
            source: StatsOrigin::Fallback,
            fetched_at: None,
        }
    }
}

/// Little-endian `u64` words read from the BLAKE3 output stream of a handle.
/// The sequence for a handle is fixed by BLAKE3 alone.
struct Draws(blake3::OutputReader);

impl Draws {
    fn new(handle: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(handle.as_bytes());
        Self(hasher.finalize_xof())
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.0.fill(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    /// Uniform in `[low, high)`.
    fn int(&mut self, low: u64, high: u64) -> u64 {
        low + self.next_u64() % (high - low)
    }

    /// Uniform in `[low, high)` with 53 bits of precision.
    #[allow(clippy::cast_precision_loss)]
    fn float(&mut self, low: f64, high: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        low + unit * (high - low)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
