//! Route handlers for the mobile API.

pub mod generate;
pub mod health;
pub mod plan;
pub mod session;
pub mod stream;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Main endpoint to generate meals
        .route("/v1/mobile/generate-meals", post(generate::generate_meals))
        // SSE streaming endpoint
        .route("/v1/mobile/stream/:session_id", get(stream::stream))
        // Get session status
        .route(
            "/v1/mobile/session/:session_id/status",
            get(session::session_status),
        )
        // Get existing meal plan
        .route("/v1/mobile/meal-plan/:user_identifier", get(plan::meal_plan))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use database::{catalog, Database};
    use mock_backend::ScriptedBackend;
    use orchestrator::{
        Dispatcher, GenerationRun, OrchestratorError, ProgressPublisher, RunConfig, RunJob,
    };

    use crate::state::AppState;

    /// Run job backed by scripted responses, one full plan per attempt.
    struct ScriptedRunJob {
        db: Database,
        days: i64,
    }

    #[async_trait]
    impl RunJob for ScriptedRunJob {
        async fn execute(&self, session_id: &str) -> Result<(), OrchestratorError> {
            let backend = Arc::new(ScriptedBackend::new());
            for day in 1..=self.days {
                backend.push_response(day_json(day));
            }

            let run = GenerationRun::new(self.db.clone(), backend).with_config(RunConfig {
                day_delay: Duration::ZERO,
                ..RunConfig::default()
            });
            run.execute(session_id).await
        }
    }

    fn day_json(day: i64) -> String {
        format!(
            r#"{{
                "goal": "maintain",
                "day": {day},
                "meals": [
                    {{
                        "type": "lunch",
                        "name": "Day {day} lunch",
                        "time": "12:00",
                        "ingredients": [{{"name": "RICE", "amount": "150g", "cal": 195, "protein": 4.05, "carbs": 42, "fat": 0.45, "price": 0.99}}],
                        "sauces": [],
                        "instructions": "Cook the rice.",
                        "total_cal": 600,
                        "total_protein": 25,
                        "total_carbs": 80,
                        "total_fat": 10,
                        "total_price": 4
                    }}
                ]
            }}"#
        )
    }

    fn request_json(device_id: &str) -> serde_json::Value {
        serde_json::json!({
            "device_id": device_id,
            "age": 30,
            "height": 180.0,
            "weight": 80.0,
            "gender": "male",
            "activity_level": "Moderately active (3-5 days/week)",
            "neck_circumference": 38.0,
            "waist_circumference": 90.0,
            "plan_period": 7
        })
    }

    async fn test_app() -> axum::Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        catalog::seed_defaults(db.pool()).await.unwrap();

        let job = Arc::new(ScriptedRunJob {
            db: db.clone(),
            days: 7,
        });
        let dispatcher = Arc::new(Dispatcher::inline(db.clone(), job));
        let publisher = ProgressPublisher::new(db.clone());

        super::router().with_state(AppState::new(db, dispatcher, publisher))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_generate_status_and_plan_flow() {
        let app = test_app().await;

        // Start generation; inline dispatch finishes the run before replying.
        let response = app
            .clone()
            .oneshot(post("/v1/mobile/generate-meals", request_json("device-e2e")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["is_existing_user"], false);
        let session_id = body["data"]["session_id"].as_str().unwrap().to_string();
        assert_eq!(
            body["data"]["stream_url"],
            format!("/v1/mobile/stream/{session_id}")
        );

        // Status reflects the finished run.
        let response = app
            .clone()
            .oneshot(get(&format!("/v1/mobile/session/{session_id}/status")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], "completed");
        assert_eq!(body["data"]["current_day"], 7);
        assert_eq!(body["data"]["progress"], 100.0);

        // The completed plan is retrievable by device id.
        let response = app
            .clone()
            .oneshot(get("/v1/mobile/meal-plan/device-e2e"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["goal"], "maintain");
        assert_eq!(body["data"]["meal_plan"].as_array().unwrap().len(), 7);
        assert_eq!(body["data"]["summary"]["total_meals"], 7);
        assert_eq!(body["data"]["averages"]["avg_cal_per_day"], 600.0);
    }

    #[tokio::test]
    async fn test_repeat_request_reuses_profile() {
        let app = test_app().await;

        let first = app
            .clone()
            .oneshot(post("/v1/mobile/generate-meals", request_json("device-1")))
            .await
            .unwrap();
        let first = body_json(first).await;

        let second = app
            .clone()
            .oneshot(post("/v1/mobile/generate-meals", request_json("device-1")))
            .await
            .unwrap();
        let second = body_json(second).await;

        assert_eq!(second["data"]["is_existing_user"], true);
        assert_eq!(first["data"]["user_id"], second["data"]["user_id"]);
        assert_ne!(first["data"]["session_id"], second["data"]["session_id"]);
    }

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let app = test_app().await;

        let mut body = request_json("device-1");
        body["age"] = serde_json::json!(0);

        let response = app
            .oneshot(post("/v1/mobile/generate-meals", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation error");
    }

    #[tokio::test]
    async fn test_unknown_session_status_is_404() {
        let app = test_app().await;

        let response = app
            .oneshot(get("/v1/mobile/session/nope/status"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_user_plan_is_404() {
        let app = test_app().await;

        let response = app.oneshot(get("/v1/mobile/meal-plan/nobody")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

