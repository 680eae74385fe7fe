//! Completed meal plan retrieval.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use database::{profile, session, Goal, MealSession, PlanSummary};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Meal plan response payload.
#[derive(Serialize)]
pub struct PlanResponse {
    pub success: bool,
    pub data: PlanData,
}

/// The full accumulated plan of the latest completed session.
#[derive(Serialize)]
pub struct PlanData {
    pub session_id: String,
    pub goal: Option<Goal>,
    pub goal_explanation: Option<String>,
    pub total_days: i64,
    pub meal_plan: serde_json::Value,
    pub daily_totals: serde_json::Value,
    pub summary: PlanSummary,
    pub averages: PlanAverages,
    pub generated_at: Option<String>,
}

/// Per-day averages over the whole plan.
#[derive(Serialize)]
pub struct PlanAverages {
    pub avg_cal_per_day: f64,
    pub avg_protein_per_day: f64,
    pub avg_carbs_per_day: f64,
    pub avg_fat_per_day: f64,
    pub avg_price_per_day: f64,
}

impl PlanAverages {
    fn from_session(stored: &MealSession) -> Self {
        let days = stored.total_days;
        let per_day = |total: f64| {
            if days > 0 {
                (total / days as f64 * 100.0).round() / 100.0
            } else {
                0.0
            }
        };

        Self {
            avg_cal_per_day: per_day(stored.total_calories),
            avg_protein_per_day: per_day(stored.total_protein),
            avg_carbs_per_day: per_day(stored.total_carbs),
            avg_fat_per_day: per_day(stored.total_fat),
            avg_price_per_day: per_day(stored.total_price),
        }
    }
}

/// Return the latest completed plan for a user, identified by metrics hash
/// or device id.
pub async fn meal_plan(
    State(state): State<AppState>,
    Path(user_identifier): Path<String>,
) -> Result<Json<PlanResponse>> {
    let user = profile::find_by_identifier(state.db.pool(), &user_identifier)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let stored = session::latest_completed_for_profile(state.db.pool(), &user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No completed meal plan found".to_string()))?;

    let meal_plan = serde_json::Value::Array(stored.meal_days()?);
    let daily_totals =
        serde_json::to_value(stored.day_totals()?).unwrap_or(serde_json::Value::Null);

    Ok(Json(PlanResponse {
        success: true,
        data: PlanData {
            session_id: stored.id.clone(),
            goal: stored.goal,
            goal_explanation: stored.goal_explanation.clone(),
            total_days: stored.total_days,
            meal_plan,
            daily_totals,
            summary: stored.summary(),
            averages: PlanAverages::from_session(&stored),
            generated_at: stored.completed_at.clone(),
        },
    }))
}
