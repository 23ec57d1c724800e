//! Request validation, authentication and authorization at the HTTP boundary.
//!
//! These run against an unreachable database: every case here must be decided
//! before any query is issued.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use server_core::kernel::test_dependencies::{MockAI, MockEmailService, MockSmsService};
use server_core::kernel::TestDependencies;
use uuid::Uuid;

use crate::common::*;

fn app() -> TestApp {
    TestApp::offline(TestDependencies::new())
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn missing_token_is_rejected() {
    let (status, body) = app().get("/api/children", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "Non autorisé");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let (status, _) = app().get("/api/orphanages", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let token = server_core::domains::auth::JwtService::new(
        server_core::kernel::test_dependencies::TEST_JWT_SECRET,
    )
    .create_token(Uuid::new_v4(), None, None, chrono::Duration::minutes(-5))
    .unwrap();

    let (status, _) = app().get("/api/children", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let token = server_core::domains::auth::JwtService::new("some_other_secret")
        .create_token(Uuid::new_v4(), None, None, chrono::Duration::hours(1))
        .unwrap();

    let (status, _) = app().get("/api/children", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stream_requires_token() {
    let (status, body) = app().get("/api/notifications/stream", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "Non autorisé");
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn analytics_requires_admin() {
    let token = user_token(Uuid::new_v4());
    let (status, body) = app()
        .post(
            "/api/analytics/ask",
            Some(&token),
            json!({"question": "Combien d'enfants ?"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "Accès réservé aux administrateurs");
}

#[tokio::test]
async fn admin_only_routes_reject_field_agents() {
    let app = app();
    let token = user_token(Uuid::new_v4());
    let id = Uuid::new_v4();

    let (status, _) = app.get("/api/partner-requests", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .patch(
            &format!("/api/orphanages/{}/legal-status", id),
            Some(&token),
            json!({"status": "verified"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/api/notifications/send",
            Some(&token),
            json!({"email": "a@b.cd", "subject": "s", "message": "m"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.post("/api/alerts/run", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Identifiers and pagination
// =============================================================================

#[tokio::test]
async fn non_uuid_path_id_is_rejected() {
    let app = app();
    let token = user_token(Uuid::new_v4());

    for uri in [
        "/api/children/abc",
        "/api/orphanages/123",
        "/api/health-records/not-a-uuid",
    ] {
        let (status, body) = if uri.starts_with("/api/health-records") {
            app.delete(uri, Some(&token)).await
        } else {
            app.get(uri, Some(&token)).await
        };
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(error_message(&body), "Identifiant invalide");
    }
}

#[tokio::test]
async fn out_of_range_pagination_is_rejected() {
    let app = app();
    let token = user_token(Uuid::new_v4());

    for query in ["limit=0", "limit=101", "page=0", "page=-3"] {
        let (status, _) = app
            .get(&format!("/api/children?{}", query), Some(&token))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", query);
    }
}

#[tokio::test]
async fn non_numeric_pagination_is_rejected() {
    let token = user_token(Uuid::new_v4());
    let (status, body) = app()
        .get("/api/diseases?limit=ten", Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("Paramètres de requête invalides"));
}

// =============================================================================
// Body validation
// =============================================================================

#[tokio::test]
async fn child_with_future_birth_date_is_rejected() {
    let token = user_token(Uuid::new_v4());
    let tomorrow = chrono::Utc::now().date_naive() + chrono::Duration::days(1);

    let (status, _) = app()
        .post(
            "/api/children",
            Some(&token),
            json!({
                "orphanage_id": Uuid::new_v4(),
                "first_name": "Amani",
                "last_name": "Kabila",
                "gender": "F",
                "birth_date": tomorrow,
                "entry_date": "2024-01-10",
                "parent_status": "total_orphan"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn nutrition_record_with_zero_weight_is_rejected() {
    let token = user_token(Uuid::new_v4());
    let (status, _) = app()
        .post(
            "/api/nutrition-records",
            Some(&token),
            json!({
                "child_id": Uuid::new_v4(),
                "date": "2024-03-01",
                "weight_kg": 0.0,
                "height_cm": 110.0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let token = user_token(Uuid::new_v4());
    let (status, body) = app()
        .post("/api/orphanages", Some(&token), json!({"capacity": "lots"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("Corps de requête invalide"));
}

#[tokio::test]
async fn partner_request_is_public_but_validated() {
    let (status, body) = app()
        .post(
            "/api/partner-requests",
            None,
            json!({"organization_name": "ONG Espoir", "contact_person": "Mme Mbuyi"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Le champ 'email' est obligatoire");
}

// =============================================================================
// Document uploads
// =============================================================================

fn upload_uri() -> String {
    format!("/api/orphanages/{}/documents", Uuid::new_v4())
}

#[tokio::test]
async fn upload_with_disallowed_type_is_rejected() {
    let app = app();
    let token = user_token(Uuid::new_v4());
    let body = multipart_body(
        "statuts.txt",
        "text/plain",
        b"hello",
        &[("document_type", "statuts")],
    );

    let (status, body) = app
        .send(upload_request(&upload_uri(), &token, body))
        .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(error_message(&body), "Type de fichier non autorisé");
    assert!(app.deps.storage.objects().is_empty());
}

#[tokio::test]
async fn upload_over_ten_megabytes_is_rejected() {
    let app = app();
    let token = user_token(Uuid::new_v4());
    let oversized = vec![0u8; 10 * 1024 * 1024 + 1];
    let body = multipart_body(
        "agrement.pdf",
        "application/pdf",
        &oversized,
        &[("document_type", "agrement")],
    );

    let (status, body) = app
        .send(upload_request(&upload_uri(), &token, body))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_message(&body), "Fichier trop volumineux (max 10 Mo)");
    assert!(app.deps.storage.objects().is_empty());
}

#[tokio::test]
async fn empty_upload_is_rejected() {
    let token = user_token(Uuid::new_v4());
    let body = multipart_body(
        "vide.pdf",
        "application/pdf",
        b"",
        &[("document_type", "agrement")],
    );

    let (status, _) = app()
        .send(upload_request(&upload_uri(), &token, body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_without_document_type_is_rejected() {
    let token = user_token(Uuid::new_v4());
    let body = multipart_body("agrement.pdf", "application/pdf", b"%PDF-1.4", &[]);

    let (status, body) = app()
        .send(upload_request(&upload_uri(), &token, body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        "Le champ 'document_type' est obligatoire"
    );
}

// =============================================================================
// Analytics assistant
// =============================================================================

async fn ask_with(ai: MockAI) -> (TestApp, StatusCode, serde_json::Value) {
    let app = TestApp::offline(TestDependencies::new().mock_ai(ai));
    let token = admin_token(Uuid::new_v4());
    let (status, body) = app
        .post(
            "/api/analytics/ask",
            Some(&token),
            json!({"question": "Combien d'enfants par province ?"}),
        )
        .await;
    (app, status, body)
}

#[tokio::test]
async fn generated_drop_statement_is_rejected() {
    let (app, status, body) = ask_with(MockAI::new().with_response("DROP TABLE children;")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Requête non autorisée");
    assert_eq!(app.deps.ai.call_count(), 1);
}

#[tokio::test]
async fn generated_delete_hidden_after_select_is_rejected() {
    let (_, status, body) = ask_with(
        MockAI::new().with_response("```sql\nSELECT 1; DELETE FROM children\n```"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Requête non autorisée");
}

#[tokio::test]
async fn all_models_failing_is_bad_gateway() {
    let (app, status, _) = ask_with(
        MockAI::new()
            .with_failure("rate limited")
            .with_failure("timeout"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        app.deps.ai.models_called(),
        vec!["gpt-4o-mini".to_string(), "gpt-3.5-turbo".to_string()]
    );
}

#[tokio::test]
async fn second_model_is_used_when_first_fails() {
    let (app, status, _) = ask_with(
        MockAI::new()
            .with_failure("rate limited")
            .with_response("UPDATE children SET first_name = 'x'"),
    )
    .await;
    // The fallback answered; its statement is then refused
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.deps.ai.call_count(), 2);
}

#[tokio::test]
async fn blank_question_never_reaches_the_model() {
    let app = app();
    let token = admin_token(Uuid::new_v4());
    let (status, _) = app
        .post("/api/analytics/ask", Some(&token), json!({"question": "   "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.deps.ai.call_count(), 0);
}

// =============================================================================
// Outbound messaging
// =============================================================================

#[tokio::test]
async fn email_only_notification_is_sent() {
    let app = app();
    let token = admin_token(Uuid::new_v4());
    let (status, body) = app
        .post(
            "/api/notifications/send",
            Some(&token),
            json!({
                "email": "directeur@espoir.cd",
                "subject": "Visite de contrôle",
                "message": "La visite aura lieu lundi."
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"email": "sent", "sms": "skipped"}));
    let sent = app.deps.email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "directeur@espoir.cd");
    assert!(app.deps.sms.sent().is_empty());
}

#[tokio::test]
async fn sms_is_sent_to_normalized_number() {
    let app = app();
    let token = admin_token(Uuid::new_v4());
    let (status, body) = app
        .post(
            "/api/notifications/send",
            Some(&token),
            json!({"phone": "0812345678", "subject": "Alerte", "message": "Rappel vaccination"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sms"], "sent");
    assert_eq!(app.deps.sms.sent()[0].0, "+243812345678");
}

#[tokio::test]
async fn one_failed_channel_does_not_abort_the_other() {
    let app = TestApp::offline(TestDependencies::new().mock_email(MockEmailService::failing()));
    let token = admin_token(Uuid::new_v4());
    let (status, body) = app
        .post(
            "/api/notifications/send",
            Some(&token),
            json!({
                "email": "directeur@espoir.cd",
                "phone": "+243812345678",
                "subject": "Alerte",
                "message": "Rappel"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"email": "failed", "sms": "sent"}));
}

#[tokio::test]
async fn every_channel_failing_is_bad_gateway() {
    let app = TestApp::offline(
        TestDependencies::new()
            .mock_email(MockEmailService::failing())
            .mock_sms(MockSmsService::failing()),
    );
    let token = admin_token(Uuid::new_v4());
    let (status, _) = app
        .post(
            "/api/notifications/send",
            Some(&token),
            json!({
                "email": "directeur@espoir.cd",
                "phone": "+243812345678",
                "subject": "Alerte",
                "message": "Rappel"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn notification_without_recipient_is_rejected() {
    let token = admin_token(Uuid::new_v4());
    let (status, _) = app()
        .post(
            "/api/notifications/send",
            Some(&token),
            json!({"subject": "Alerte", "message": "Rappel"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_reports_unreachable_database() {
    let (status, body) = app().get("/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"]["status"], "error");
    assert_eq!(body["auth_mode"], "verified");
}
