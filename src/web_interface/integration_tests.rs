#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;

    use serde_json::{json, Value};
    use tempfile::TempDir;
    use warp::http::StatusCode;

    use crate::configuration::types::{DatabaseConfig, PaginationConfig};
    use crate::storage::database_storage::DatabaseStorage;
    use crate::storage::storage_trait::Storage;
    use crate::storage::types::{NewCourse, NewStudent};
    use crate::web_interface::web_server::WebServer;

    struct Fixture {
        server: WebServer,
        student_id: i32,
        course_id: i32,
        _dir: TempDir,
    }

    async fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", dir.path().join("api.sqlite3").display()),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let storage = DatabaseStorage::connect(&config).await.unwrap();
        storage.migrate().await.unwrap();

        let student_id = storage
            .add_student(&NewStudent {
                first_name: "Grace".into(),
                last_name: "Hopper".into(),
                email: None,
            })
            .await
            .unwrap();
        let course_id = storage
            .add_course(&NewCourse {
                course_name: "Electrical Basics".into(),
                course_code: None,
            })
            .await
            .unwrap();

        let storage: Arc<dyn Storage> = Arc::new(storage);
        Fixture {
            server: WebServer::new(storage, PaginationConfig::default()),
            student_id,
            course_id,
            _dir: dir,
        }
    }

    async fn call(fx: &Fixture, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = warp::test::request().method(method).path(path);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let res = request.reply(&fx.server.routes()).await;
        let status = res.status();
        let body = serde_json::from_slice(res.body()).unwrap_or(Value::Null);
        (status, body)
    }

    async fn create_agreement(fx: &Fixture, total_hours: f64) -> i64 {
        let (status, body) = call(
            fx,
            "POST",
            "/ita-master",
            Some(json!({
                "student_id": fx.student_id,
                "course_id": fx.course_id,
                "agreement_date": "2024-01-15",
                "start_date": "2024-02-01",
                "end_date": "2024-06-30",
                "total_hours": total_hours,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_i64().unwrap()
    }

    async fn log_session(fx: &Fixture, agreement_id: i64, date: &str, hours: f64) -> i64 {
        let (status, body) = call(
            fx,
            "POST",
            "/signed-ita-attendance",
            Some(json!({
                "ita_master_id": agreement_id,
                "session_date": date,
                "hours_completed": hours,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let fx = fixture().await;
        let (status, body) = call(&fx, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "up");
    }

    #[tokio::test]
    async fn test_create_agreement_defaults_to_active() {
        let fx = fixture().await;
        let id = create_agreement(&fx, 120.0).await;

        let (status, body) = call(&fx, "GET", &format!("/ita-master/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "active");
        assert_eq!(body["data"]["student_name"], "Grace Hopper");
        assert_eq!(body["data"]["course_name"], "Electrical Basics");
    }

    #[tokio::test]
    async fn test_progress_after_three_sessions() {
        let fx = fixture().await;
        let id = create_agreement(&fx, 120.0).await;
        log_session(&fx, id, "2024-02-05", 2.0).await;
        log_session(&fx, id, "2024-02-06", 3.0).await;
        log_session(&fx, id, "2024-02-07", 2.0).await;

        let (status, body) = call(
            &fx,
            "GET",
            &format!("/signed-ita-attendance/progress/{}", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let progress = &body["data"];
        assert_eq!(progress["completed_hours"].as_f64(), Some(7.0));
        assert_eq!(progress["planned_hours"].as_f64(), Some(120.0));
        assert_eq!(progress["completion_percentage"].as_f64(), Some(5.83));
        assert_eq!(progress["total_sessions"], 3);
        assert_eq!(progress["completed_sessions"], 0);

        let (_, list) = call(
            &fx,
            "GET",
            &format!("/signed-ita-attendance?ita_master_id={}", id),
            None,
        )
        .await;
        let entries = list["data"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries
            .iter()
            .all(|e| e["total_hours_accumulated"].as_f64() == Some(7.0)));
    }

    #[tokio::test]
    async fn test_signature_endpoints_complete_an_entry() {
        let fx = fixture().await;
        let id = create_agreement(&fx, 40.0).await;
        let entry = log_session(&fx, id, "2024-02-05", 2.0).await;

        let (status, body) = call(
            &fx,
            "POST",
            &format!("/signed-ita-attendance/{}/student-signature", entry),
            Some(json!({ "signature": "data:image/png;base64,AAAA" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["data"]["status"], "signed_by_student");
        assert!(body["data"]["student_signature_date"].is_string());

        let (status, body) = call(
            &fx,
            "POST",
            &format!("/signed-ita-attendance/{}/instructor-signature", entry),
            Some(json!({ "signature": "data:image/png;base64,BBBB" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["data"]["status"], "completed");

        let (_, progress) = call(
            &fx,
            "GET",
            &format!("/signed-ita-attendance/progress/{}", id),
            None,
        )
        .await;
        assert_eq!(progress["data"]["completed_sessions"], 1);
    }

    #[tokio::test]
    async fn test_missing_signature_is_bad_request() {
        let fx = fixture().await;
        let id = create_agreement(&fx, 40.0).await;
        let entry = log_session(&fx, id, "2024-02-05", 2.0).await;

        let (status, body) = call(
            &fx,
            "POST",
            &format!("/signed-ita-attendance/{}/student-signature", entry),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_delete_agreement_removes_its_entries() {
        let fx = fixture().await;
        let id = create_agreement(&fx, 40.0).await;
        let entry = log_session(&fx, id, "2024-02-05", 2.0).await;

        let (status, _) = call(&fx, "DELETE", &format!("/ita-master/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&fx, "GET", &format!("/ita-master/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) =
            call(&fx, "GET", &format!("/signed-ita-attendance/{}", entry), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "ITA attendance record not found");
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let fx = fixture().await;

        let (status, body) = call(&fx, "GET", "/ita-master/9999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "ITA agreement not found");

        let (status, _) = call(&fx, "GET", "/ita-master/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &fx,
            "POST",
            "/ita-master",
            Some(json!({ "student_id": fx.student_id })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Missing required fields"));

        let (status, _) = call(
            &fx,
            "POST",
            "/signed-ita-attendance",
            Some(json!({ "ita_master_id": 9999, "session_date": "2024-02-05", "hours_completed": 1.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&fx, "GET", "/no-such-route", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_pagination_envelope() {
        let fx = fixture().await;
        let id = create_agreement(&fx, 40.0).await;
        log_session(&fx, id, "2024-02-05", 1.0).await;
        log_session(&fx, id, "2024-02-06", 1.0).await;
        log_session(&fx, id, "2024-02-07", 1.0).await;

        let (status, body) =
            call(&fx, "GET", "/signed-ita-attendance?page=2&limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(
            body["pagination"],
            json!({ "page": 2, "limit": 2, "total": 3, "pages": 2 })
        );
        // newest session first
        assert_eq!(body["data"][0]["session_date"], "2024-02-05");

        let (_, body) = call(&fx, "GET", "/ita-master?page=abc&limit=-4", None).await;
        assert_eq!(
            body["pagination"],
            json!({ "page": 1, "limit": 10, "total": 1, "pages": 1 })
        );
    }

    #[tokio::test]
    async fn test_stats_overview() {
        let fx = fixture().await;
        let id = create_agreement(&fx, 40.0).await;
        create_agreement(&fx, 60.0).await;
        log_session(&fx, id, "2024-02-05", 2.5).await;

        let (status, body) = call(&fx, "GET", "/ita-master/stats/overview", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["active"], 2);
        assert_eq!(body["data"]["total_planned_hours"].as_f64(), Some(100.0));

        let (status, body) =
            call(&fx, "GET", "/signed-ita-attendance/stats/overview", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["pending"], 1);
        assert_eq!(body["data"]["total_hours_completed"].as_f64(), Some(2.5));
    }

    #[tokio::test]
    async fn test_update_entry_route() {
        let fx = fixture().await;
        let id = create_agreement(&fx, 40.0).await;
        let entry = log_session(&fx, id, "2024-02-05", 2.0).await;
        log_session(&fx, id, "2024-02-06", 1.0).await;

        let (status, body) = call(
            &fx,
            "PUT",
            &format!("/signed-ita-attendance/{}", entry),
            Some(json!({
                "start_time": "09:00:00",
                "end_time": "12:00:00",
                "instructor_signature": "data:image/png;base64,EEEE",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["data"]["hours_completed"].as_f64(), Some(3.0));
        assert_eq!(body["data"]["total_hours_accumulated"].as_f64(), Some(4.0));
        assert_eq!(body["data"]["status"], "signed_by_instructor");
        assert!(body["data"]["instructor_signature_date"].is_string());

        let (status, _) = call(
            &fx,
            "PUT",
            &format!("/signed-ita-attendance/{}", entry),
            Some(json!({ "hours_completed": 30.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &fx,
            "PUT",
            "/signed-ita-attendance/9999",
            Some(json!({ "hours_completed": 1.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_huge_page_returns_empty_list() {
        let fx = fixture().await;
        create_agreement(&fx, 40.0).await;

        let (status, body) = call(
            &fx,
            "GET",
            "/ita-master?page=9223372036854775807&limit=10",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert!(body["data"].as_array().unwrap().is_empty());
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["pagination"]["page"], i64::MAX / 10);

        let (status, _) = call(
            &fx,
            "GET",
            "/signed-ita-attendance?page=9223372036854775807",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
