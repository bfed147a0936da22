use futures_util::{pin_mut, StreamExt, TryStreamExt};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use whoop_client::client::{CollectionParams, Cycles};
use whoop_client::models::{ScoreState, ValidationError};
use whoop_client::{AuthError, WhoopClient, WhoopConfig, WhoopError};

const TOKEN_PATH: &str = "/oauth/oauth2/token";

fn config_for(server: &MockServer) -> WhoopConfig {
    WhoopConfig::new("test_client_id", "test_secret", "http://localhost:8000/callback")
        .with_api_base_url(server.uri())
        .with_oauth_urls(
            format!("{}/oauth/oauth2/auth", server.uri()),
            format!("{}{}", server.uri(), TOKEN_PATH),
        )
}

fn session_client(server: &MockServer) -> WhoopClient {
    WhoopClient::with_tokens(config_for(server), "test_access", "test_refresh").unwrap()
}

fn token_body(access: &str, refresh: Option<&str>, expires_in: u64) -> Value {
    let mut body = json!({
        "access_token": access,
        "token_type": "bearer",
        "expires_in": expires_in,
        "scope": "offline read:cycles"
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = json!(refresh);
    }
    body
}

fn cycle_json(id: i64) -> Value {
    json!({
        "id": id,
        "user_id": 10129,
        "created_at": "2022-04-24T11:25:44.774Z",
        "updated_at": "2022-04-24T14:25:44.774Z",
        "start": "2022-04-24T02:25:44.774Z",
        "end": "2022-04-24T10:25:44.774Z",
        "timezone_offset": "-05:00",
        "score_state": "SCORED",
        "score": {
            "strain": 5.2951527,
            "kilojoule": 8288.297,
            "average_heart_rate": 68,
            "max_heart_rate": 141
        }
    })
}

fn profile_json(email: &str) -> Value {
    json!({
        "user_id": 10129,
        "email": email,
        "first_name": "John",
        "last_name": "Smith"
    })
}

fn sleep_json(id: &str) -> Value {
    json!({
        "id": id,
        "user_id": 10129,
        "created_at": "2022-04-24T11:25:44.774Z",
        "updated_at": "2022-04-24T14:25:44.774Z",
        "start": "2022-04-24T02:25:44.774Z",
        "end": "2022-04-24T10:25:44.774Z",
        "timezone_offset": "-05:00",
        "nap": false,
        "score_state": "PENDING_SCORE"
    })
}

fn recovery_json(cycle_id: i64) -> Value {
    json!({
        "cycle_id": cycle_id,
        "sleep_id": "550e8400-e29b-41d4-a716-446655440000",
        "user_id": 10129,
        "created_at": "2022-04-24T11:25:44.774Z",
        "updated_at": "2022-04-24T14:25:44.774Z",
        "score_state": "SCORED",
        "score": {
            "user_calibrating": false,
            "recovery_score": 44.0,
            "resting_heart_rate": 64.0,
            "hrv_rmssd_milli": 31.813562,
            "spo2_percentage": 95.6875,
            "skin_temp_celsius": 33.7
        }
    })
}

fn workout_json(id: &str) -> Value {
    json!({
        "id": id,
        "user_id": 9012,
        "created_at": "2022-04-24T11:25:44.774Z",
        "updated_at": "2022-04-24T14:25:44.774Z",
        "start": "2022-04-24T02:25:44.774Z",
        "end": "2022-04-24T10:25:44.774Z",
        "timezone_offset": "-05:00",
        "sport_name": "running",
        "score_state": "UNSCORABLE"
    })
}

const SLEEP_ID: &str = "ecfc6a15-4661-442f-a9a4-f160dd7afae8";
const WORKOUT_ID: &str = "b7a51a40-5b0c-4a6a-8a6e-2f2a1f0c9e11";

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

#[tokio::test]
async fn test_exchange_code_stores_credential() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains("client_id=test_client_id"))
        .and(body_string_contains("client_secret=test_secret"))
        .and(body_string_contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fcallback",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(
            "new-access",
            Some("new-refresh"),
            3600,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = WhoopClient::new(config_for(&server)).unwrap();
    let credential = client.exchange_code("the-code").await.unwrap();

    assert_eq!(credential.access_token, "new-access");
    assert_eq!(credential.scope.as_deref(), Some("offline read:cycles"));

    let auth = client.authenticator();
    assert_eq!(auth.access_token(), Some("new-access"));
    assert_eq!(auth.refresh_token(), Some("new-refresh"));
    assert!(!auth.is_expired());
}

#[tokio::test]
async fn test_token_endpoint_error_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = WhoopClient::new(config_for(&server)).unwrap();
    let err = client.exchange_code("bad-code").await.unwrap_err();

    match err {
        WhoopError::Auth(AuthError::TokenEndpoint { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(client.authenticator().credential().is_none());
}

#[tokio::test]
async fn test_refresh_keeps_previous_refresh_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=test_refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("refreshed", None, 3600)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let credential = client.refresh().await.unwrap();

    // O retorno é a resposta como veio; o store mantém o refresh token anterior
    assert_eq!(credential.refresh_token, None);
    assert_eq!(client.authenticator().access_token(), Some("refreshed"));
    assert_eq!(client.authenticator().refresh_token(), Some("test_refresh"));
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once_before_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(
            "fresh-access",
            Some("fresh-refresh"),
            3600,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/user/profile/basic"))
        .and(header("authorization", "Bearer fresh-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("jsmith123@whoop.com")))
        .expect(2)
        .mount(&server)
        .await;

    let mut client = WhoopClient::new(config_for(&server)).unwrap();
    client
        .authenticator_mut()
        .set_credential("stale-access", "test_refresh", Some(60));
    assert!(client.authenticator().is_expired());

    let profile = client.get_profile_basic().await.unwrap();
    assert_eq!(profile.first_name, "John");

    // Segunda chamada usa o token renovado, sem novo refresh
    client.get_profile_basic().await.unwrap();
    assert_eq!(client.authenticator().refresh_token(), Some("fresh-refresh"));
}

#[tokio::test]
async fn test_failed_refresh_propagates_and_skips_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("revoked"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = WhoopClient::new(config_for(&server)).unwrap();
    client
        .authenticator_mut()
        .set_credential("stale-access", "test_refresh", Some(0));

    let err = client.get_body_measurement().await.unwrap_err();
    assert!(matches!(
        err,
        WhoopError::Auth(AuthError::TokenEndpoint { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_unauthenticated_client_makes_no_requests() {
    let server = MockServer::start().await;
    let mut client = WhoopClient::new(config_for(&server)).unwrap();

    let err = client.get_cycle_by_id(93845).await.unwrap_err();
    assert!(matches!(err, WhoopError::Auth(AuthError::NoAccessToken)));
    assert_eq!(err.to_string(), "no access token available");
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_expired_token_without_refresh_token() {
    let server = MockServer::start().await;

    // Sessão de vida curta e sem refresh token
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("short", None, 120)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = WhoopClient::new(config_for(&server)).unwrap();
    client.exchange_code("code").await.unwrap();

    let err = client.get_profile_basic().await.unwrap_err();
    assert!(matches!(err, WhoopError::Auth(AuthError::TokenExpired)));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_get_cycle_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/cycle/93845"))
        .and(header("authorization", "Bearer test_access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cycle_json(93845)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let cycle = client.get_cycle_by_id(93845).await.unwrap();

    assert_eq!(cycle.id, 93845);
    assert_eq!(cycle.score_state, ScoreState::Scored);
    assert_eq!(cycle.score.unwrap().strain, 5.2951527);
}

#[tokio::test]
async fn test_not_found_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/cycle/999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Cycle not found"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let err = client.get_cycle_by_id(999).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Cycle not found"));
}

#[tokio::test]
async fn test_invalid_profile_email_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/user/profile/basic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("not-an-email")))
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let err = client.get_profile_basic().await.unwrap_err();
    assert!(matches!(
        err,
        WhoopError::Validation(ValidationError::InvalidEmail(_))
    ));
}

#[tokio::test]
async fn test_sleep_id_is_percent_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/activity/sleep/a%20b"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let err = client.get_sleep_by_id("a b").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_collection_limit_is_clamped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/activity/workout"))
        .and(query_param("limit", "25"))
        .and(query_param("start", "2024-01-01T00:00:00Z"))
        .and(query_param_is_missing("nextToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let start = "2024-01-01T00:00:00Z".parse().unwrap();
    let page = client
        .get_workout_collection(&CollectionParams::new().limit(100).start(start))
        .await
        .unwrap();

    assert!(page.records.is_empty());
    assert!(page.next_cursor().is_none());
}

async fn mount_two_cycle_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2/cycle"))
        .and(query_param("limit", "25"))
        .and(query_param_is_missing("nextToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [cycle_json(1), cycle_json(2)],
            "next_token": "t2"
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/cycle"))
        .and(query_param("nextToken", "t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [cycle_json(3)]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_iterate_cycles_follows_cursor() {
    let server = MockServer::start().await;
    mount_two_cycle_pages(&server).await;

    let mut client = session_client(&server);
    let cycles: Vec<_> = client
        .iterate_cycles(None, None, None)
        .try_collect()
        .await
        .unwrap();

    let ids: Vec<i64> = cycles.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_iteration_is_lazy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/cycle"))
        .and(query_param_is_missing("nextToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [cycle_json(1), cycle_json(2)],
            "next_token": "t2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/cycle"))
        .and(query_param("nextToken", "t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    {
        let stream = client.iterate::<Cycles>(CollectionParams::new().limit(25));
        pin_mut!(stream);
        assert_eq!(request_count(&server).await, 0);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(request_count(&server).await, 1);

        // O segundo registro já está em memória
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(request_count(&server).await, 1);
    }

    // Stream descartado no meio da caminhada: nenhuma requisição extra
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_empty_page_with_cursor_continues() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/activity/sleep"))
        .and(query_param_is_missing("nextToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [],
            "next_token": "more"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/activity/sleep"))
        .and(query_param("nextToken", "more"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [],
            "next_token": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let sleeps: Vec<_> = client
        .iterate_sleeps(None, None, Some(10))
        .try_collect()
        .await
        .unwrap();

    assert!(sleeps.is_empty());
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_error_ends_iteration() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/cycle"))
        .and(query_param_is_missing("nextToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [cycle_json(1)],
            "next_token": "t2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/cycle"))
        .and(query_param("nextToken", "t2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let items: Vec<_> = client.iterate_cycles(None, None, None).collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().id, 1);
    match &items[1] {
        Err(WhoopError::Http { status, body }) => {
            assert_eq!(*status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected item: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_sleep_for_cycle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/cycle/93845/sleep"))
        .and(header("authorization", "Bearer test_access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sleep_json(SLEEP_ID)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let sleep = client.get_sleep_for_cycle(93845).await.unwrap();

    assert_eq!(sleep.id.to_string(), SLEEP_ID);
    assert_eq!(sleep.score_state, ScoreState::PendingScore);
    assert!(sleep.score.is_none());
}

#[tokio::test]
async fn test_get_recovery_for_cycle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/activity/recovery/cycle/93845/recovery"))
        .and(header("authorization", "Bearer test_access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recovery_json(93845)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let recovery = client.get_recovery_for_cycle(93845).await.unwrap();

    assert_eq!(recovery.cycle_id, 93845);
    let score = recovery.score.unwrap();
    assert_eq!(score.recovery_score, 44.0);
    assert_eq!(score.spo2_percentage, Some(95.6875));
}

#[tokio::test]
async fn test_get_recovery_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/activity/recovery"))
        .and(query_param("limit", "10"))
        .and(query_param("nextToken", "r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [recovery_json(1), recovery_json(2)],
            "next_token": "r2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let page = client
        .get_recovery_collection(&CollectionParams::new().next_token("r1"))
        .await
        .unwrap();

    let ids: Vec<i64> = page.records.iter().map(|r| r.cycle_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(page.next_cursor(), Some("r2"));
}

#[tokio::test]
async fn test_get_workout_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v2/activity/workout/{WORKOUT_ID}")))
        .and(header("authorization", "Bearer test_access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workout_json(WORKOUT_ID)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let workout = client.get_workout_by_id(WORKOUT_ID).await.unwrap();

    assert_eq!(workout.id.to_string(), WORKOUT_ID);
    assert_eq!(workout.sport_name, "running");
    assert_eq!(workout.score_state, ScoreState::Unscorable);
}

#[tokio::test]
async fn test_iterate_recoveries_follows_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/activity/recovery"))
        .and(query_param("limit", "25"))
        .and(query_param_is_missing("nextToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [recovery_json(1)],
            "next_token": "r2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/activity/recovery"))
        .and(query_param("nextToken", "r2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [recovery_json(2)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let recoveries: Vec<_> = client
        .iterate_recoveries(None, None, None)
        .try_collect()
        .await
        .unwrap();

    let ids: Vec<i64> = recoveries.iter().map(|r| r.cycle_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_iterate_workouts_with_page_size() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/activity/workout"))
        .and(query_param("limit", "5"))
        .and(query_param("end", "2024-02-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [workout_json(WORKOUT_ID)],
            "next_token": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);
    let end = "2024-02-01T00:00:00Z".parse().unwrap();
    let workouts: Vec<_> = client
        .iterate_workouts(None, Some(end), Some(5))
        .try_collect()
        .await
        .unwrap();

    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0].id.to_string(), WORKOUT_ID);
    assert_eq!(request_count(&server).await, 1);
}
