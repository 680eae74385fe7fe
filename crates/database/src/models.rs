//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{DatabaseError, Result};

/// Lifecycle status of a generation session.
///
/// `Completed` and `Failed` are terminal; no further transition is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl SessionStatus {
    /// Stable lowercase name, matching the stored column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Processing => "processing",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    /// Whether the status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight goal for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    Gain,
    Maintain,
}

impl Goal {
    /// Stable lowercase name, matching the stored column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Lose => "lose",
            Goal::Gain => "gain",
            Goal::Maintain => "maintain",
        }
    }

    /// Parse a goal from backend output or user input.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lose" => Some(Goal::Lose),
            "gain" => Some(Goal::Gain),
            "maintain" => Some(Goal::Maintain),
            _ => None,
        }
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate nutrition and price figures for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayTotal {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub price: f64,
}

/// A user profile with derived physical metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    /// Opaque UUID.
    pub id: String,
    /// Optional device identifier from the mobile client.
    pub device_id: Option<String>,
    /// Hash of the identifying physical metrics.
    pub metrics_hash: String,
    pub age: i64,
    /// Height in cm.
    pub height: f64,
    /// Weight in kg.
    pub weight: f64,
    pub gender: String,
    pub activity_level: String,
    pub neck_circumference: f64,
    pub waist_circumference: f64,
    pub hip_circumference: Option<f64>,
    pub bmi: f64,
    pub bmi_overview: String,
    pub bmr: i64,
    pub tdee: i64,
    pub body_fat: f64,
    pub plan_period: i64,
    pub goal: Goal,
    pub last_generation_at: Option<String>,
    pub total_plans_generated: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// One meal plan generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MealSession {
    /// Opaque UUID.
    pub id: String,
    /// Owning profile.
    pub profile_id: String,
    pub status: SessionStatus,
    /// Last day the orchestrator started work on (0 before the run begins).
    pub current_day: i64,
    /// Plan horizon, fixed at creation.
    pub total_days: i64,
    pub goal: Option<Goal>,
    pub goal_explanation: Option<String>,
    /// JSON array of per-day meal arrays.
    pub meal_data: String,
    /// JSON array of per-day totals, parallel to `meal_data`.
    pub daily_totals: String,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub total_price: f64,
    pub total_meals: i64,
    pub error_message: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Aggregate summary of a whole plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub total_price: f64,
    pub total_meals: i64,
}

impl MealSession {
    /// Aggregate summary of the accumulated plan so far.
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            total_calories: self.total_calories,
            total_protein: self.total_protein,
            total_carbs: self.total_carbs,
            total_fat: self.total_fat,
            total_price: self.total_price,
            total_meals: self.total_meals,
        }
    }

    /// Decode the accumulated per-day meal arrays.
    pub fn meal_days(&self) -> Result<Vec<serde_json::Value>> {
        serde_json::from_str(&self.meal_data).map_err(|source| DatabaseError::CorruptColumn {
            column: "meal_data",
            id: self.id.clone(),
            source,
        })
    }

    /// Decode the accumulated per-day totals.
    pub fn day_totals(&self) -> Result<Vec<DayTotal>> {
        serde_json::from_str(&self.daily_totals).map_err(|source| DatabaseError::CorruptColumn {
            column: "daily_totals",
            id: self.id.clone(),
            source,
        })
    }

    /// Progress percentage, rounded to two decimals (0 when total_days is 0).
    pub fn progress(&self) -> f64 {
        if self.total_days == 0 {
            return 0.0;
        }
        let pct = self.current_day as f64 / self.total_days as f64 * 100.0;
        (pct * 100.0).round() / 100.0
    }
}

/// A named catalog entry (ingredient or sauce) with per-100g macros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats_per_100g: f64,
    pub price: f64,
}
