// apps/api/tests/api_integration_test.rs

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::{AppointmentState, BookingService};
use auth_cell::{AccountService, AuthState};
use careloop_clinic_api::router::create_router;
use doctor_cell::{AvailabilityCache, AvailabilityService, DoctorService, DoctorState};
use notification_cell::MailNotifier;
use patient_cell::{PatientService, PatientState};
use shared_database::supabase::SupabaseClient;
use shared_utils::test_utils::{JwtTestUtils, MockStoreRows, TestConfig, TestUser};

async fn create_test_app(mock_server: &MockServer) -> (Router, String) {
    let mut config = TestConfig::default().to_app_config();
    config.supabase_url = mock_server.uri();
    let jwt_secret = config.supabase_jwt_secret.clone();
    let config = Arc::new(config);

    let supabase = Arc::new(SupabaseClient::new(&config));
    let notifier = Arc::new(MailNotifier::new(&config));
    let cache = AvailabilityCache::disabled();

    let auth_state = AuthState {
        accounts: Arc::new(AccountService::new(supabase.clone(), jwt_secret.clone())),
    };
    let appointment_state = AppointmentState {
        config: config.clone(),
        booking: Arc::new(BookingService::new(supabase.clone(), notifier)),
    };
    let doctor_state = DoctorState {
        config: config.clone(),
        doctors: Arc::new(DoctorService::new(supabase.clone(), cache.clone())),
        availability: Arc::new(AvailabilityService::new(supabase.clone(), cache)),
    };
    let patient_state = PatientState {
        config: config.clone(),
        patients: Arc::new(PatientService::new(supabase)),
    };

    let app = create_router(auth_state, appointment_state, doctor_state, patient_state);
    (app, jwt_secret)
}

fn request(
    http_method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(http_method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_root_is_public() {
    let mock_server = MockServer::start().await;
    let (app, _) = create_test_app(&mock_server).await;

    let response = app
        .oneshot(request("GET", "/", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let mock_server = MockServer::start().await;
    let (app, _) = create_test_app(&mock_server).await;

    let response = app
        .oneshot(request("GET", "/appointments", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["status"], json!(401));
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let mock_server = MockServer::start().await;
    let (app, jwt_secret) = create_test_app(&mock_server).await;

    let patient = TestUser::patient("patient@example.com");
    let expired = JwtTestUtils::create_expired_token(&patient, &jwt_secret);

    let response = app
        .oneshot(request("GET", "/appointments", Some(&expired), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_book_and_rebook_same_slot_conflicts() {
    let mock_server = MockServer::start().await;
    let (app, jwt_secret) = create_test_app(&mock_server).await;

    let patient = TestUser::patient("patient@example.com");
    let doctor_id = Uuid::new_v4().to_string();
    let token = JwtTestUtils::create_test_token(&patient, &jwt_secret, Some(24));

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("select", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": doctor_id }])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("select", "id,email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": patient.id, "email": patient.email }
        ])))
        .mount(&mock_server)
        .await;

    // First probe sees a free slot, every later one sees it taken
    let appointment_id = Uuid::new_v4().to_string();
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("select", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("select", "id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": appointment_id }])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreRows::appointment_row(
                &appointment_id,
                &patient.id,
                &doctor_id,
                "2025-04-05",
                "14:30:00",
            )
        ])))
        .mount(&mock_server)
        .await;

    let book_body = json!({
        "doctor_id": doctor_id,
        "date": "2025-04-05",
        "time": "14:30"
    });

    let first = app
        .clone()
        .oneshot(request(
            "POST",
            "/appointments/book",
            Some(&token),
            Some(book_body.clone()),
        ))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::CREATED);
    let created = response_json(first).await;
    assert_eq!(created["appointmentId"], json!(appointment_id));
    assert_eq!(created["date"], json!("2025-04-05"));
    assert_eq!(created["time"], json!("14:30"));
    assert_eq!(created["status"], json!("booked"));

    let second = app
        .oneshot(request(
            "POST",
            "/appointments/book",
            Some(&token),
            Some(book_body),
        ))
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::CONFLICT);
    let conflict = response_json(second).await;
    assert_eq!(conflict["status"], json!(409));
    assert_eq!(conflict["message"], json!("Appointment already exists"));
}

#[tokio::test]
async fn test_doctor_profile_via_router() {
    let mock_server = MockServer::start().await;
    let (app, jwt_secret) = create_test_app(&mock_server).await;

    let patient = TestUser::patient("patient@example.com");
    let doctor_id = Uuid::new_v4().to_string();
    let token = JwtTestUtils::create_test_token(&patient, &jwt_secret, Some(24));

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::doctor_row(&doctor_id, "doctor@example.com")
        ])))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(request(
            "GET",
            &format!("/doctors/{}", doctor_id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["id"], json!(doctor_id));
    assert_eq!(body["specialization"], json!("General Practice"));
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_patient_cannot_read_another_profile() {
    let mock_server = MockServer::start().await;
    let (app, jwt_secret) = create_test_app(&mock_server).await;

    let caller = TestUser::patient("patient@example.com");
    let other_id = Uuid::new_v4().to_string();
    let token = JwtTestUtils::create_test_token(&caller, &jwt_secret, Some(24));

    let response = app
        .oneshot(request(
            "GET",
            &format!("/patients/{}", other_id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = response_json(response).await;
    assert_eq!(body["status"], json!(403));
}
