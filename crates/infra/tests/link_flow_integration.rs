//! Redirect flow and statistics aggregation wired from configuration, with
//! every provider endpoint served by a mock server.

use std::sync::Arc;

use influlink_core::{CallbackParams, InfluencerRepository, LinkService, StateTokenCodec};
use influlink_domain::{
    Config, InfluLinkError, OAuthClientConfig, Provider, ProvidersConfig, StatsConfig, StatsOrigin,
};
use influlink_infra::{
    build_provider_registry, build_stats_aggregator, HttpClient, InMemoryInfluencerRepository,
    TracingLinkNotifier,
};
use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> Config {
    let uri = server.uri();
    Config {
        providers: ProvidersConfig {
            twitch: Some(OAuthClientConfig {
                client_id: "tw-client".into(),
                client_secret: "tw-secret".into(),
                authorization_endpoint: Some(format!("{uri}/oauth2/authorize")),
                token_endpoint: Some(format!("{uri}/oauth2/token")),
                api_base_url: Some(format!("{uri}/helix")),
                scopes: None,
            }),
            ..ProvidersConfig::default()
        },
        stats: StatsConfig {
            cache_ttl_secs: 0,
            twitch_api_base_url: Some(format!("{uri}/helix")),
            ..StatsConfig::default()
        },
        ..Config::default()
    }
}

async fn mount_twitch(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "user-token", "refresh_token": "user-refresh",
            "expires_in": 14_000, "token_type": "bearer"
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "app-token", "expires_in": 5_000_000, "token_type": "bearer"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/helix/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "42", "login": "acme_live", "display_name": "Acme_Live"}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/helix/channels/followers"))
        .and(query_param("broadcaster_id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 12_345, "data": []})))
        .mount(server)
        .await;
}

fn state_from(authorization_url: &str) -> String {
    let url = Url::parse(authorization_url).expect("authorization url");
    url.query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .expect("state parameter")
}

#[tokio::test]
async fn twitch_link_then_partial_statistics() {
    let server = MockServer::start().await;
    mount_twitch(&server).await;

    let config = config(&server);
    let http = HttpClient::builder().max_attempts(1).build().unwrap();
    let repository = Arc::new(InMemoryInfluencerRepository::new());
    let service = LinkService::new(
        Arc::new(build_provider_registry(&config, &http)),
        Arc::new(StateTokenCodec::new("integration-secret")),
        repository.clone(),
        Arc::new(TracingLinkNotifier::new()),
    );

    let influencer = service.create_influencer("Acme").await.unwrap();
    let consent = service.begin(Provider::Twitch, &influencer.id).await.unwrap();
    assert!(consent.starts_with(&format!("{}/oauth2/authorize?", server.uri())));
    assert!(consent.contains("client_id=tw-client"));

    let params = CallbackParams {
        code: Some("auth-code".into()),
        state: Some(state_from(&consent)),
        error: None,
    };
    let outcome = service.complete(Provider::Twitch, &params).await.unwrap();
    assert!(outcome.changed);

    let stored = repository.get(&influencer.id).await.unwrap().expect("stored");
    let twitch = &stored.social_identity.twitch;
    assert!(twitch.verified);
    assert_eq!(twitch.handle, "acme_live");
    assert_eq!(twitch.external_id, "42");
    assert_eq!(twitch.credentials.as_ref().unwrap().refresh_token.as_deref(), Some("user-refresh"));
    assert!(stored.is_verified);

    service
        .declare_handle(&influencer.id, Provider::Youtube, "@acme", None)
        .await
        .unwrap();
    let stored = service.load(&influencer.id).await.unwrap();

    let snapshot = build_stats_aggregator(&config, &http).aggregate(&stored).await;

    let live = &snapshot.providers[&Provider::Twitch];
    assert_eq!(live.followers, 12_345);
    assert_eq!(live.source, StatsOrigin::Live);

    let estimated = &snapshot.providers[&Provider::Youtube];
    assert!(estimated.is_fallback());
    assert_eq!(snapshot.degraded.get(&Provider::Youtube).map(String::as_str), Some("not_configured"));
    assert!(!snapshot.degraded.contains_key(&Provider::Twitch));
}

#[tokio::test]
async fn refused_consent_and_tampered_state_leave_document_untouched() {
    let server = MockServer::start().await;
    mount_twitch(&server).await;

    let config = config(&server);
    let http = HttpClient::new().unwrap();
    let repository = Arc::new(InMemoryInfluencerRepository::new());
    let service = LinkService::new(
        Arc::new(build_provider_registry(&config, &http)),
        Arc::new(StateTokenCodec::new("integration-secret")),
        repository.clone(),
        Arc::new(TracingLinkNotifier::new()),
    );
    let influencer = service.create_influencer("Acme").await.unwrap();
    let state = state_from(&service.begin(Provider::Twitch, &influencer.id).await.unwrap());

    let refused = CallbackParams { code: None, state: Some(state.clone()), error: Some("access_denied".into()) };
    assert!(matches!(service.complete(Provider::Twitch, &refused).await, Err(InfluLinkError::Auth(_))));

    let tampered = CallbackParams { code: Some("auth-code".into()), state: Some(format!("{state}00")), error: None };
    assert!(matches!(service.complete(Provider::Twitch, &tampered).await, Err(InfluLinkError::Decode(_))));

    let unconfigured = service.begin(Provider::Tiktok, &influencer.id).await;
    assert!(matches!(unconfigured, Err(InfluLinkError::ProviderNotConfigured(_))));

    let stored = repository.get(&influencer.id).await.unwrap().expect("stored");
    assert!(stored.social_identity.twitch.is_empty());
    assert_eq!(stored.version, 1);
}
