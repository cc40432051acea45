pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::identity::handlers as auth;
use crate::session::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_capture_bytes = state.config.max_capture_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Identity
        .route("/api/v1/auth/sign-in", post(auth::handle_sign_in))
        .route("/api/v1/auth/sign-up", post(auth::handle_sign_up))
        .route("/api/v1/auth/provider", post(auth::handle_provider_sign_in))
        .route("/api/v1/auth/sign-out", post(auth::handle_sign_out))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Resumes
        .route(
            "/api/v1/resumes",
            get(resumes::handle_list_resumes).post(resumes::handle_create_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_save_resume)
                .patch(resumes::handle_edit_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/preview",
            get(resumes::handle_preview_resume),
        )
        .route(
            "/api/v1/resumes/:id/export",
            post(resumes::handle_export_resume).layer(DefaultBodyLimit::max(max_capture_bytes)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use image::{ImageBuffer, ImageFormat, Rgb};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::export::ExportPipeline;
    use crate::identity::fakes::FakeIdentityGateway;
    use crate::store::MemoryDocumentStore;

    const ALICE: &str = "alice";
    const BOB: &str = "bob";

    fn make_state() -> AppState {
        let gateway = FakeIdentityGateway::with_account("alice@example.com", "secret1", ALICE)
            .and_account("bob@example.com", "secret2", BOB);
        AppState {
            config: Config::for_tests(),
            identity: Arc::new(gateway),
            store: Arc::new(MemoryDocumentStore::new()),
            export: ExportPipeline::new(),
        }
    }

    fn request(method: Method, uri: &str, uid: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(uid) = uid {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", FakeIdentityGateway::token_for(uid)),
            );
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> Response {
        app.clone().oneshot(req).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_resume(app: &Router, body: Value) -> String {
        let response = send(app, request(Method::POST, "/api/v1/resumes", Some(ALICE), Some(body))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["id"].as_str().unwrap().to_string()
    }

    fn make_png(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgb([255, 255, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(make_state());
        let response = send(&app, request(Method::GET, "/health", None, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_resume_routes_require_a_token() {
        let app = build_router(make_state());
        let response = send(&app, request(Method::GET, "/api/v1/resumes", None, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let mut req = request(Method::GET, "/api/v1/resumes", None, None);
        req.headers_mut()
            .insert(header::AUTHORIZATION, "Bearer forged".parse().unwrap());
        let response = send(&app, req).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_sign_in_and_me() {
        let app = build_router(make_state());
        let response = send(
            &app,
            request(
                Method::POST,
                "/api/v1/auth/sign-in",
                None,
                Some(json!({ "email": "alice@example.com", "password": "secret1" })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let session = json_body(response).await;
        assert_eq!(session["identity"]["uid"], ALICE);
        assert_eq!(session["idToken"], FakeIdentityGateway::token_for(ALICE));

        let response = send(&app, request(Method::GET, "/api/v1/auth/me", Some(ALICE), None)).await;
        assert_eq!(json_body(response).await["provider"], "Email");
    }

    #[tokio::test]
    async fn test_sign_up_password_mismatch() {
        let app = build_router(make_state());
        let response = send(
            &app,
            request(
                Method::POST,
                "/api/v1/auth/sign-up",
                None,
                Some(json!({
                    "email": "new@example.com",
                    "password": "abcdef",
                    "confirmPassword": "abcdeg"
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["message"],
            "Passwords do not match"
        );
    }

    #[tokio::test]
    async fn test_create_edit_and_fetch() {
        let app = build_router(make_state());
        let id = create_resume(&app, json!({ "templateId": "classic", "title": "My CV" })).await;
        let uri = format!("/api/v1/resumes/{id}");

        let ops = json!([
            { "op": "set_entry_field", "section": "experience", "index": 0, "field": "company", "value": "Acme" },
            { "op": "set_entry_field", "section": "experience", "index": 0, "field": "position", "value": "Engineer" },
            { "op": "set_entry_field", "section": "experience", "index": 0, "field": "startDate", "value": "2020-01" }
        ]);
        let response = send(&app, request(Method::PATCH, &uri, Some(ALICE), Some(ops))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let saved = json_body(response).await;
        assert_eq!(saved["message"], "Saved!");

        let doc = json_body(send(&app, request(Method::GET, &uri, Some(ALICE), None)).await).await;
        assert_eq!(doc["title"], "My CV");
        assert_eq!(doc["experience"][0]["company"], "Acme");
        assert!(doc["updatedAt"].is_string());

        let preview = send(
            &app,
            request(Method::GET, &format!("{uri}/preview?format=json"), Some(ALICE), None),
        )
        .await;
        let preview = json_body(preview).await;
        let item = &preview["columns"][0][0]["items"][0];
        assert_eq!(item["subtitle"], "Acme • Location");
        assert_eq!(item["meta"], "2020-01 - Present");
    }

    #[tokio::test]
    async fn test_out_of_bounds_edit_is_rejected_without_saving() {
        let app = build_router(make_state());
        let id = create_resume(&app, json!({ "quick": true })).await;
        let uri = format!("/api/v1/resumes/{id}");

        let ops = json!({ "ops": [
            { "op": "add_entry", "section": "skills" },
            { "op": "remove_entry", "section": "skills", "index": 5 }
        ]});
        let response = send(&app, request(Method::PATCH, &uri, Some(ALICE), Some(ops))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let doc = json_body(send(&app, request(Method::GET, &uri, Some(ALICE), None)).await).await;
        assert_eq!(doc["skills"], json!([]));
    }

    #[tokio::test]
    async fn test_put_merges_partial_state() {
        let app = build_router(make_state());
        let id = create_resume(&app, json!({ "quick": true, "title": "Draft" })).await;
        let uri = format!("/api/v1/resumes/{id}");

        let response = send(
            &app,
            request(
                Method::PUT,
                &uri,
                Some(ALICE),
                Some(json!({ "personalInfo": { "fullName": "Alice" } })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let saved = json_body(response).await;
        assert_eq!(saved["document"]["title"], "Draft");
        assert_eq!(saved["document"]["personalInfo"]["fullName"], "Alice");

        let response = send(&app, request(Method::PUT, &uri, Some(ALICE), Some(json!([1, 2])))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preview_html_and_unknown_template() {
        let app = build_router(make_state());
        let id = create_resume(&app, json!({ "quick": true, "templateId": "classic" })).await;

        let response = send(
            &app,
            request(
                Method::GET,
                &format!("/api/v1/resumes/{id}/preview?template=unknown-value&theme=dark"),
                Some(ALICE),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("id=\"resume-container\""));
        assert!(html.contains("data-template=\"modern\""));
        assert!(html.contains("Your Name"));
        assert!(html.contains("<body class=\"dark\">"));
    }

    #[tokio::test]
    async fn test_other_users_cannot_see_documents() {
        let app = build_router(make_state());
        let id = create_resume(&app, json!({})).await;
        let uri = format!("/api/v1/resumes/{id}");

        let response = send(&app, request(Method::GET, &uri, Some(BOB), None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = send(&app, request(Method::DELETE, &uri, Some(BOB), None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let list = json_body(send(&app, request(Method::GET, "/api/v1/resumes", Some(BOB), None)).await).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_list_and_search() {
        let app = build_router(make_state());
        create_resume(&app, json!({ "title": "Backend CV" })).await;
        create_resume(&app, json!({ "title": "Design Portfolio" })).await;

        let list = json_body(send(&app, request(Method::GET, "/api/v1/resumes", Some(ALICE), None)).await).await;
        assert_eq!(list.as_array().unwrap().len(), 2);
        assert_eq!(list[0]["title"], "Design Portfolio");

        let found = json_body(
            send(&app, request(Method::GET, "/api/v1/resumes?q=backend", Some(ALICE), None)).await,
        )
        .await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["title"], "Backend CV");
    }

    #[tokio::test]
    async fn test_export_returns_paginated_pdf() {
        let app = build_router(make_state());
        let id = create_resume(&app, json!({ "title": "Alice CV" })).await;

        // 210 px wide → 1 px per mm; 600 px tall → 3 pages.
        let req = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/v1/resumes/{id}/export"))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", FakeIdentityGateway::token_for(ALICE)),
            )
            .header(header::CONTENT_TYPE, "image/png")
            .body(Body::from(make_png(210, 600)))
            .unwrap();
        let response = send(&app, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Alice CV.pdf\""
        );
        assert_eq!(response.headers()["x-page-count"], "3");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let pdf = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(pdf.get_pages().len(), 3);
    }

    #[tokio::test]
    async fn test_export_rejects_empty_capture() {
        let app = build_router(make_state());
        let id = create_resume(&app, json!({})).await;
        let response = send(
            &app,
            request(Method::POST, &format!("/api/v1/resumes/{id}/export"), Some(ALICE), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_then_not_found() {
        let app = build_router(make_state());
        let id = create_resume(&app, json!({})).await;
        let uri = format!("/api/v1/resumes/{id}");

        let response = send(&app, request(Method::DELETE, &uri, Some(ALICE), None)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, request(Method::GET, &uri, Some(ALICE), None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
