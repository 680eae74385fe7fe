//! Profile storage: users identified by their physical metrics.
//!
//! Mobile clients carry no credentials; a profile is found by a hash of the
//! identifying metrics or by the device id, whichever matches first.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Goal, Profile};

const PROFILE_COLUMNS: &str = "id, device_id, metrics_hash, age, height, weight, gender, \
     activity_level, neck_circumference, waist_circumference, hip_circumference, bmi, \
     bmi_overview, bmr, tdee, body_fat, plan_period, goal, last_generation_at, \
     total_plans_generated, created_at, updated_at";

/// Input for creating or refreshing a profile, with metrics already derived.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub device_id: Option<String>,
    pub metrics_hash: String,
    pub age: i64,
    pub height: f64,
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
}

/// Create a new profile.
pub async fn create_profile(pool: &SqlitePool, new: &NewProfile) -> Result<Profile> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO profiles (
            id, device_id, metrics_hash, age, height, weight, gender, activity_level,
            neck_circumference, waist_circumference, hip_circumference, bmi, bmi_overview,
            bmr, tdee, body_fat, plan_period, goal
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&new.device_id)
    .bind(&new.metrics_hash)
    .bind(new.age)
    .bind(new.height)
    .bind(new.weight)
    .bind(&new.gender)
    .bind(&new.activity_level)
    .bind(new.neck_circumference)
    .bind(new.waist_circumference)
    .bind(new.hip_circumference)
    .bind(new.bmi)
    .bind(&new.bmi_overview)
    .bind(new.bmr)
    .bind(new.tdee)
    .bind(new.body_fat)
    .bind(new.plan_period)
    .bind(new.goal)
    .execute(pool)
    .await?;

    tracing::info!(profile_id = %id, "Created profile");

    get_profile(pool, &id).await
}

/// Fetch a profile by id.
pub async fn get_profile(pool: &SqlitePool, id: &str) -> Result<Profile> {
    let query = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?");
    sqlx::query_as::<_, Profile>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound {
            entity: "profile",
            id: id.to_string(),
        })
}

/// Find a profile by metrics hash, falling back to device id.
pub async fn find_by_identity(
    pool: &SqlitePool,
    metrics_hash: &str,
    device_id: Option<&str>,
) -> Result<Option<Profile>> {
    let query = format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles \
         WHERE metrics_hash = ? OR (? IS NOT NULL AND device_id = ?) \
         LIMIT 1"
    );
    let profile = sqlx::query_as::<_, Profile>(&query)
        .bind(metrics_hash)
        .bind(device_id)
        .bind(device_id)
        .fetch_optional(pool)
        .await?;

    Ok(profile)
}

/// Find a profile by an opaque identifier: metrics hash or device id.
pub async fn find_by_identifier(pool: &SqlitePool, identifier: &str) -> Result<Option<Profile>> {
    let query = format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles \
         WHERE metrics_hash = ? OR device_id = ? \
         LIMIT 1"
    );
    let profile = sqlx::query_as::<_, Profile>(&query)
        .bind(identifier)
        .bind(identifier)
        .fetch_optional(pool)
        .await?;

    Ok(profile)
}

/// Replace a profile's metrics with freshly derived values.
pub async fn update_metrics(pool: &SqlitePool, id: &str, new: &NewProfile) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET age = ?, height = ?, weight = ?, activity_level = ?,
            neck_circumference = ?, waist_circumference = ?, hip_circumference = ?,
            bmi = ?, bmi_overview = ?, bmr = ?, tdee = ?, body_fat = ?, goal = ?,
            device_id = COALESCE(?, device_id),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(new.age)
    .bind(new.height)
    .bind(new.weight)
    .bind(&new.activity_level)
    .bind(new.neck_circumference)
    .bind(new.waist_circumference)
    .bind(new.hip_circumference)
    .bind(new.bmi)
    .bind(&new.bmi_overview)
    .bind(new.bmr)
    .bind(new.tdee)
    .bind(new.body_fat)
    .bind(new.goal)
    .bind(&new.device_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "profile",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Associate a device id with an existing profile.
pub async fn adopt_device(pool: &SqlitePool, id: &str, device_id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET device_id = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(device_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "profile",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Stamp the latest generation time and bump the plan counter.
pub async fn record_generation(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET last_generation_at = datetime('now'),
            total_plans_generated = total_plans_generated + 1,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "profile",
            id: id.to_string(),
        });
    }

    Ok(())
}
