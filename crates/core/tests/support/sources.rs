//! Scripted statistics sources

use std::time::Duration;

use async_trait::async_trait;
use influlink_core::{StatsSource, StatsTarget};
use influlink_domain::{Provider, StatsFragment, StatsSourceError};

pub enum Script {
    Followers(u64),
    Fail(StatsSourceError),
    Hang,
}

pub struct ScriptedSource {
    provider: Provider,
    script: Script,
}

impl ScriptedSource {
    pub fn new(provider: Provider, script: Script) -> Self {
        Self { provider, script }
    }
}

#[async_trait]
impl StatsSource for ScriptedSource {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch(&self, _target: &StatsTarget) -> Result<StatsFragment, StatsSourceError> {
        match &self.script {
            Script::Followers(count) => Ok(StatsFragment::live(self.provider, *count)),
            Script::Fail(err) => Err(err.clone()),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(StatsFragment::live(self.provider, 1))
            }
        }
    }
}
