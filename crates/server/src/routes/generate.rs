//! Plan generation endpoint: identify the user, create a session, dispatch.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use database::validation::{validate_generation_request, GenerationRequest};
use database::{profile, session, Database, Profile};
use orchestrator::metrics;

use crate::error::Result;
use crate::state::AppState;

/// Response payload for a started generation.
#[derive(Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub data: GenerateData,
    pub message: &'static str,
}

/// Session and user info the client needs to follow along.
#[derive(Serialize)]
pub struct GenerateData {
    pub session_id: String,
    pub stream_url: String,
    pub user_id: String,
    pub is_existing_user: bool,
    pub user_metrics: UserMetrics,
}

/// Derived metrics echoed back to the client.
#[derive(Serialize)]
pub struct UserMetrics {
    pub bmi: f64,
    pub bmi_overview: String,
    pub bmr: i64,
    pub tdee: i64,
    pub body_fat: f64,
    pub goal: database::Goal,
}

/// Start generating a meal plan.
///
/// No authentication: users are identified by their physical metrics (plus
/// an optional device id). Returns the session id and stream locator; the
/// run itself proceeds via the dispatcher.
pub async fn generate_meals(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<GenerateResponse>> {
    validate_generation_request(&request)?;

    let (user, is_existing) = find_or_create_profile(&state.db, &request).await?;
    let plan_period = request.plan_period_or_default();

    let created =
        session::create_session(state.db.pool(), &user.id, plan_period, Some(user.goal)).await?;
    profile::record_generation(state.db.pool(), &user.id).await?;

    info!(
        session_id = %created.id,
        user_id = %user.id,
        plan_period,
        "Starting meal generation"
    );

    // Failures from here on are reported through the session row and the
    // progress stream, not this response.
    if let Err(e) = state.dispatcher.dispatch(&created.id).await {
        warn!(session_id = %created.id, error = %e, "Generation run did not finish cleanly");
    }

    Ok(Json(GenerateResponse {
        success: true,
        data: GenerateData {
            session_id: created.id.clone(),
            stream_url: format!("/v1/mobile/stream/{}", created.id),
            user_id: user.id.clone(),
            is_existing_user: is_existing,
            user_metrics: UserMetrics {
                bmi: user.bmi,
                bmi_overview: user.bmi_overview.clone(),
                bmr: user.bmr,
                tdee: user.tdee,
                body_fat: user.body_fat,
                goal: user.goal,
            },
        },
        message: "Meal generation started successfully",
    }))
}

/// Find the profile matching the request's identity, refreshing drifted
/// metrics, or create a new one.
async fn find_or_create_profile(
    db: &Database,
    request: &GenerationRequest,
) -> Result<(Profile, bool)> {
    let hash = metrics::metrics_hash(
        request.age,
        request.height,
        request.weight,
        &request.gender,
        request.device_id.as_deref(),
    );

    let existing = profile::find_by_identity(db.pool(), &hash, request.device_id.as_deref()).await?;

    match existing {
        Some(found) => {
            if metrics::metrics_changed(&found, request) {
                let derived = metrics::derive_profile(request);
                profile::update_metrics(db.pool(), &found.id, &derived).await?;
            } else if let Some(ref device_id) = request.device_id {
                if found.device_id.as_deref() != Some(device_id) {
                    profile::adopt_device(db.pool(), &found.id, device_id).await?;
                }
            }

            let refreshed = profile::get_profile(db.pool(), &found.id).await?;
            info!(user_id = %refreshed.id, "Existing user found");
            Ok((refreshed, true))
        }
        None => {
            let derived = metrics::derive_profile(request);
            let created = profile::create_profile(db.pool(), &derived).await?;
            info!(user_id = %created.id, "New user created");
            Ok((created, false))
        }
    }
}
