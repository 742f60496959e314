//! Repository behavior against a stubbed backend
//!
//! Each call must emit `Loading` and then exactly one terminal value, with
//! transport failures classified into the right error kind.

mod common;

use std::time::Duration;

use common::{Backend, TOKEN, analysis_json, history_json, ok, refused, transcript_json, user_json};
use futures::StreamExt;
use serde_json::json;
use urvoice::{
    AnalyzeRepository, ArticleRepository, AsyncResult, AudioClip, AuthRepository, ErrorKind,
    HistoryRepository, ResultStream, SaveHistoryRequest, SpeechRepository, UserRepository,
};
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn collect<T>(results: ResultStream<T>) -> Vec<AsyncResult<T>> {
    results.collect().await
}

/// Asserts the `Loading, terminal` shape and returns the terminal value
fn terminal<T: std::fmt::Debug>(mut emitted: Vec<AsyncResult<T>>) -> AsyncResult<T> {
    assert_eq!(emitted.len(), 2, "unexpected emissions: {emitted:?}");
    assert!(emitted[0].is_loading());
    emitted.pop().unwrap()
}

// ============ Auth ============

#[tokio::test]
async fn login_stores_access_token() {
    let backend = Backend::logged_out().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("password=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(
            "Login success",
            json!({"email": "rina@example.com", "accessToken": "fresh-token", "refreshToken": "r-1"}),
        )))
        .expect(1)
        .mount(&backend.server)
        .await;

    let repo = AuthRepository::new(backend.api.clone());
    let result = terminal(collect(repo.login("rina@example.com", "secret")).await);

    assert_eq!(result.message(), Some("Login success"));
    let token = result.into_value().unwrap();
    assert_eq!(token.access_token.as_deref(), Some("fresh-token"));
    assert_eq!(backend.token().await.as_deref(), Some("fresh-token"));
    assert!(repo.is_logged_in().await.unwrap());
}

#[tokio::test]
async fn wrong_password_is_rejected_and_stores_nothing() {
    let backend = Backend::logged_out().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refused("Wrong password")))
        .mount(&backend.server)
        .await;

    let repo = AuthRepository::new(backend.api.clone());
    let result = terminal(collect(repo.login("rina@example.com", "nope")).await);

    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::Rejected);
    assert_eq!(failure.message, "Wrong password");
    assert_eq!(backend.token().await, None);
}

#[tokio::test]
async fn login_without_token_in_response_is_a_decode_error() {
    let backend = Backend::logged_out().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok("Login success", json!({"email": "rina@example.com"}))),
        )
        .mount(&backend.server)
        .await;

    let repo = AuthRepository::new(backend.api.clone());
    let result = terminal(collect(repo.login("rina@example.com", "secret")).await);

    assert_eq!(result.failure().unwrap().kind, ErrorKind::Decode);
    assert_eq!(backend.token().await, None);
}

#[tokio::test]
async fn logout_clears_token() {
    let backend = Backend::logged_in().await;
    Mock::given(method("POST"))
        .and(path("/api/users/logout"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok("Logged out", json!(null))))
        .expect(1)
        .mount(&backend.server)
        .await;

    let repo = AuthRepository::new(backend.api.clone());
    let result = terminal(collect(repo.logout()).await);

    assert!(result.is_success());
    assert_eq!(backend.token().await, None);
}

#[tokio::test]
async fn logout_with_expired_token_still_clears_it() {
    let backend = Backend::logged_in().await;
    Mock::given(method("POST"))
        .and(path("/api/users/logout"))
        .respond_with(ResponseTemplate::new(401).set_body_json(refused("Token expired")))
        .mount(&backend.server)
        .await;

    let repo = AuthRepository::new(backend.api.clone());
    let result = terminal(collect(repo.logout()).await);

    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::Unauthorized);
    assert!(failure.message.contains("Token expired"));
    assert_eq!(backend.token().await, None);
}

#[tokio::test]
async fn register_requires_all_fields_without_calling_server() {
    let backend = Backend::logged_out().await;
    Mock::given(method("POST"))
        .and(path("/api/users/register"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend.server)
        .await;

    let repo = AuthRepository::new(backend.api.clone());
    let result = terminal(collect(repo.register("Rina", "", "secret")).await);

    assert_eq!(result.failure().unwrap().kind, ErrorKind::Local);
}

#[tokio::test]
async fn register_posts_json_body() {
    let backend = Backend::logged_out().await;
    Mock::given(method("POST"))
        .and(path("/api/users/register"))
        .and(body_json(json!({
            "name": "Rina",
            "email": "rina@example.com",
            "password": "secret"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(ok("Registered", user_json("Rina"))),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let repo = AuthRepository::new(backend.api.clone());
    let result = terminal(collect(repo.register(" Rina ", "rina@example.com", "secret")).await);

    let user = result.into_value().unwrap().unwrap();
    assert_eq!(user.display_name(), "Rina");
}

// ============ Transport failures ============

#[tokio::test]
async fn missing_token_fails_without_sending() {
    let backend = Backend::logged_out().await;
    Mock::given(method("GET"))
        .and(path("/api/users/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok("", user_json("Rina"))))
        .expect(0)
        .mount(&backend.server)
        .await;

    let repo = UserRepository::new(backend.api.clone());
    let result = terminal(collect(repo.current_user()).await);

    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::Unauthorized);
    assert!(failure.message.contains("Please login again"));
}

#[tokio::test]
async fn server_error_yields_single_error() {
    let backend = Backend::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/getAll"))
        .respond_with(ResponseTemplate::new(500).set_body_json(refused("Database unavailable")))
        .mount(&backend.server)
        .await;

    let repo = ArticleRepository::new(backend.api.clone());
    let emitted = collect(repo.all_articles()).await;

    assert!(!emitted.iter().any(|s| s.is_success()));
    let failure = terminal(emitted).failure().cloned().unwrap();
    assert_eq!(failure.kind, ErrorKind::Server);
    assert!(failure.message.contains("Database unavailable"));
}

#[tokio::test]
async fn server_error_with_plain_body_keeps_the_text() {
    let backend = Backend::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/getAll"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway from proxy"))
        .mount(&backend.server)
        .await;

    let repo = ArticleRepository::new(backend.api.clone());
    let result = terminal(collect(repo.all_articles()).await);

    assert!(result.failure().unwrap().message.contains("Bad gateway from proxy"));
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let backend = Backend::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/getAll"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{\"success\": tru", "application/json"))
        .mount(&backend.server)
        .await;

    let repo = ArticleRepository::new(backend.api.clone());
    let emitted = collect(repo.all_articles()).await;

    assert!(!emitted.iter().any(|s| s.is_success()));
    assert_eq!(terminal(emitted).failure().unwrap().kind, ErrorKind::Decode);
}

#[tokio::test]
async fn slow_response_times_out_as_network_error() {
    let backend = Backend::start(Some(TOKEN), Duration::from_millis(200)).await;
    Mock::given(method("GET"))
        .and(path("/api/articles/getAll"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok("", json!([])))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&backend.server)
        .await;

    let repo = ArticleRepository::new(backend.api.clone());
    let emitted = collect(repo.all_articles()).await;

    assert!(!emitted.iter().any(|s| s.is_success()));
    assert_eq!(terminal(emitted).failure().unwrap().kind, ErrorKind::Network);
}

// ============ Content ============

#[tokio::test]
async fn articles_decode_into_payload() {
    let backend = Backend::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/getAll"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(
            "Articles fetched",
            json!([
                {"id": 1, "title": "Small talk", "content": "...", "image": "articles/1.jpg"},
                {"id": 2, "title": "Interviews", "content": "...", "image": null}
            ]),
        )))
        .mount(&backend.server)
        .await;

    let repo = ArticleRepository::new(backend.api.clone());
    let articles = terminal(collect(repo.all_articles()).await)
        .into_value()
        .unwrap();

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].title.as_deref(), Some("Small talk"));
    assert_eq!(articles[1].image, None);
}

#[tokio::test]
async fn article_detail_uses_id_in_path() {
    let backend = Backend::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/getArticle/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(
            "",
            json!({"id": 42, "title": "Phone calls"}),
        )))
        .expect(1)
        .mount(&backend.server)
        .await;

    let repo = ArticleRepository::new(backend.api.clone());
    let article = terminal(collect(repo.article(42)).await).into_value().unwrap();
    assert_eq!(article.id, Some(42));
}

#[tokio::test]
async fn update_user_sends_put_with_json() {
    let backend = Backend::logged_in().await;
    Mock::given(method("PUT"))
        .and(path("/api/users/update"))
        .and(body_json(json!({"name": "Rina S", "password": ""})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok("Profile updated", json!(null))))
        .expect(1)
        .mount(&backend.server)
        .await;

    let repo = UserRepository::new(backend.api.clone());
    let result = terminal(collect(repo.update_user("Rina S", "")).await);

    assert_eq!(result.message(), Some("Profile updated"));
    assert_eq!(result.into_value(), Some(None));
}

#[tokio::test]
async fn delete_account_clears_session() {
    let backend = Backend::logged_in().await;
    Mock::given(method("DELETE"))
        .and(path("/api/users/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok("Account deleted", json!(null))))
        .mount(&backend.server)
        .await;

    let repo = UserRepository::new(backend.api.clone());
    assert!(terminal(collect(repo.delete_account()).await).is_success());
    assert_eq!(backend.token().await, None);
}

// ============ Speech and history ============

#[tokio::test]
async fn speech_to_text_uploads_multipart_wav() {
    let backend = Backend::logged_in().await;
    Mock::given(method("POST"))
        .and(path("/api/models/speech-to-text"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ok("Transcribed", transcript_json())),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let repo = SpeechRepository::new(backend.api.clone());
    let clip = AudioClip::new(vec![0.1; 1600], 16000);
    let transcript = terminal(collect(repo.speech_to_text(clip)).await)
        .into_value()
        .unwrap();
    assert_eq!(transcript.audio_file_name.as_deref(), Some("rec-1.wav"));

    let requests = backend.server.received_requests().await.unwrap();
    let content_type = requests[0].headers["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn analyze_sends_text_and_file_name() {
    let backend = Backend::logged_in().await;
    Mock::given(method("POST"))
        .and(path("/api/models/analyze-speech"))
        .and(body_json(json!({
            "text": "i goes to school yesterday",
            "audioFileName": "rec-1.wav"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok("Analyzed", analysis_json())))
        .expect(1)
        .mount(&backend.server)
        .await;

    let repo = AnalyzeRepository::new(backend.api.clone());
    let analysis = terminal(collect(repo.analyze("i goes to school yesterday", "rec-1.wav")).await)
        .into_value()
        .unwrap();

    assert_eq!(analysis.grammar_analysis.len(), 1);
    assert_eq!(
        analysis.grammar_analysis[0].corrected.as_deref(),
        Some("went")
    );
}

#[tokio::test]
async fn save_history_round_trip() {
    let backend = Backend::logged_in().await;
    let analysis: urvoice::Analysis = serde_json::from_value(analysis_json()).unwrap();
    let request =
        SaveHistoryRequest::from_analysis("rec-1.wav", "i goes to school yesterday", &analysis);

    Mock::given(method("POST"))
        .and(path("/api/history/save"))
        .and(body_json(json!({
            "audioFileName": "rec-1.wav",
            "originalParagraph": "i goes to school yesterday",
            "correctedParagraph": "I went to school yesterday.",
            "grammarAnalysis": [
                {"original": "goes", "corrected": "went", "reason": "past tense with 'yesterday'"}
            ]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(ok(
            "History saved",
            history_json(9, Some("2026-10-01T08:00:00Z")),
        )))
        .expect(1)
        .mount(&backend.server)
        .await;

    let repo = HistoryRepository::new(backend.api.clone());
    let entry = terminal(collect(repo.save_history(request)).await)
        .into_value()
        .unwrap();
    assert_eq!(entry.id, Some(9));
}

#[tokio::test]
async fn history_detail_uses_id_in_path() {
    let backend = Backend::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/history/getHistory/5"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok("", history_json(5, Some("2026-10-05T08:00:00Z")))),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let repo = HistoryRepository::new(backend.api.clone());
    let entry = terminal(collect(repo.history(5)).await)
        .into_value()
        .unwrap();
    assert_eq!(entry.id, Some(5));
    assert_eq!(entry.audio_file_name.as_deref(), Some("rec-5.wav"));
}

// ============ Profile photo ============

#[tokio::test]
async fn upload_photo_sends_profile_image_part() {
    let backend = Backend::logged_in().await;
    Mock::given(method("POST"))
        .and(path("/api/users/uploadPhotos"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(body_string_contains("name=\"profileImage\""))
        .and(body_string_contains("filename=\"me.png\""))
        .and(body_string_contains("image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok("Photo uploaded", user_json("Rina"))))
        .expect(1)
        .mount(&backend.server)
        .await;

    let repo = UserRepository::new(backend.api.clone());
    let result = terminal(collect(repo.upload_photo("me.png", b"not-really-a-png".to_vec())).await);
    assert_eq!(result.message(), Some("Photo uploaded"));
    let user = result.into_value().flatten().unwrap();
    assert_eq!(user.profile_image.as_deref(), Some("profile/7.png"));

    let requests = backend.server.received_requests().await.unwrap();
    let content_type = requests[0].headers["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn empty_photo_is_rejected_locally() {
    let backend = Backend::logged_in().await;

    let repo = UserRepository::new(backend.api.clone());
    let result = terminal(collect(repo.upload_photo("me.jpg", Vec::new())).await);
    assert_eq!(result.failure().unwrap().kind, ErrorKind::Local);
    assert!(backend.server.received_requests().await.unwrap().is_empty());
}
