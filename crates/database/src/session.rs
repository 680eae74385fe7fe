//! Meal session storage: the durable record of one generation run.
//!
//! The orchestrator is the only writer while a run is in flight; the progress
//! publisher and status endpoints read the same rows concurrently. Every
//! write goes straight to the pool so readers observe it immediately.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{DayTotal, Goal, MealSession, SessionStatus};

const SESSION_COLUMNS: &str = "id, profile_id, status, current_day, total_days, goal, \
     goal_explanation, meal_data, daily_totals, total_calories, total_protein, total_carbs, \
     total_fat, total_price, total_meals, error_message, started_at, completed_at, created_at, \
     updated_at";

/// Create a new session in `pending` state with day counter at zero.
pub async fn create_session(
    pool: &SqlitePool,
    profile_id: &str,
    total_days: i64,
    goal: Option<Goal>,
) -> Result<MealSession> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO meal_sessions (id, profile_id, status, current_day, total_days, goal)
        VALUES (?, ?, 'pending', 0, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(profile_id)
    .bind(total_days)
    .bind(goal)
    .execute(pool)
    .await?;

    tracing::info!(session_id = %id, total_days, "Created meal session");

    get_session(pool, &id).await
}

/// Fetch a session, or `None` when the id is unknown.
pub async fn find_session(pool: &SqlitePool, id: &str) -> Result<Option<MealSession>> {
    let query = format!("SELECT {SESSION_COLUMNS} FROM meal_sessions WHERE id = ?");
    let session = sqlx::query_as::<_, MealSession>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(session)
}

/// Fetch a session, erroring when the id is unknown.
pub async fn get_session(pool: &SqlitePool, id: &str) -> Result<MealSession> {
    find_session(pool, id).await?.ok_or(DatabaseError::NotFound {
        entity: "meal session",
        id: id.to_string(),
    })
}

/// Set the session status.
pub async fn update_status(pool: &SqlitePool, id: &str, status: SessionStatus) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE meal_sessions
        SET status = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "meal session",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Advance the day counter. Written before generation starts for that day so
/// a concurrent observer always sees which day a failure belongs to.
pub async fn update_progress(pool: &SqlitePool, id: &str, current_day: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE meal_sessions
        SET current_day = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(current_day)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "meal session",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Record the goal decided on day 1. Rejected once the run has moved past
/// day 1, since the goal drives every later day's prompt.
pub async fn mark_goal(
    pool: &SqlitePool,
    id: &str,
    goal: Goal,
    explanation: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE meal_sessions
        SET goal = ?, goal_explanation = ?, updated_at = datetime('now')
        WHERE id = ? AND current_day <= 1
        "#,
    )
    .bind(goal)
    .bind(explanation)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        // Distinguish a missing session from a locked one.
        return match find_session(pool, id).await? {
            Some(_) => Err(DatabaseError::GoalLocked(id.to_string())),
            None => Err(DatabaseError::NotFound {
                entity: "meal session",
                id: id.to_string(),
            }),
        };
    }

    Ok(())
}

/// Append one day's meals and totals in a single durable write.
///
/// Extends both JSON arrays and folds the day totals into the running
/// aggregates inside one transaction, so a concurrent reader never sees the
/// arrays and the aggregates disagree.
pub async fn append_day_result(
    pool: &SqlitePool,
    id: &str,
    meals: &serde_json::Value,
    day_total: &DayTotal,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let query = format!("SELECT {SESSION_COLUMNS} FROM meal_sessions WHERE id = ?");
    let session = sqlx::query_as::<_, MealSession>(&query)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DatabaseError::NotFound {
            entity: "meal session",
            id: id.to_string(),
        })?;

    let mut days = session.meal_days()?;
    days.push(meals.clone());
    let mut totals = session.day_totals()?;
    totals.push(day_total.clone());

    let meal_count = meals.as_array().map(|a| a.len()).unwrap_or(0) as i64;
    let meal_data = serde_json::to_string(&days).map_err(|source| {
        DatabaseError::CorruptColumn {
            column: "meal_data",
            id: id.to_string(),
            source,
        }
    })?;
    let daily_totals = serde_json::to_string(&totals).map_err(|source| {
        DatabaseError::CorruptColumn {
            column: "daily_totals",
            id: id.to_string(),
            source,
        }
    })?;

    sqlx::query(
        r#"
        UPDATE meal_sessions
        SET meal_data = ?,
            daily_totals = ?,
            total_calories = total_calories + ?,
            total_protein = total_protein + ?,
            total_carbs = total_carbs + ?,
            total_fat = total_fat + ?,
            total_price = total_price + ?,
            total_meals = total_meals + ?,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&meal_data)
    .bind(&daily_totals)
    .bind(day_total.calories)
    .bind(day_total.protein)
    .bind(day_total.carbs)
    .bind(day_total.fat)
    .bind(day_total.price)
    .bind(meal_count)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Mark the session completed and stamp the finish time.
pub async fn complete_session(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE meal_sessions
        SET status = 'completed', completed_at = datetime('now'), updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "meal session",
            id: id.to_string(),
        });
    }

    tracing::info!(session_id = %id, "Meal session completed");
    Ok(())
}

/// Mark the session failed with a human-readable message.
pub async fn fail_session(pool: &SqlitePool, id: &str, message: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE meal_sessions
        SET status = 'failed', error_message = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "meal session",
            id: id.to_string(),
        });
    }

    tracing::warn!(session_id = %id, error = message, "Meal session failed");
    Ok(())
}

/// Latest completed session for a profile, if any.
pub async fn latest_completed_for_profile(
    pool: &SqlitePool,
    profile_id: &str,
) -> Result<Option<MealSession>> {
    let query = format!(
        "SELECT {SESSION_COLUMNS} FROM meal_sessions \
         WHERE profile_id = ? AND status = 'completed' \
         ORDER BY created_at DESC, rowid DESC LIMIT 1"
    );
    let session = sqlx::query_as::<_, MealSession>(&query)
        .bind(profile_id)
        .fetch_optional(pool)
        .await?;

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{self, NewProfile};
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn test_profile() -> NewProfile {
        NewProfile {
            device_id: Some("device-1".to_string()),
            metrics_hash: "hash-1".to_string(),
            age: 30,
            height: 180.0,
            weight: 80.0,
            gender: "male".to_string(),
            activity_level: "Moderately active (3-5 days/week)".to_string(),
            neck_circumference: 38.0,
            waist_circumference: 90.0,
            hip_circumference: None,
            bmi: 24.69,
            bmi_overview: "Normal".to_string(),
            bmr: 1780,
            tdee: 2759,
            body_fat: 20.5,
            plan_period: 30,
            goal: Goal::Maintain,
        }
    }

    async fn seed_session(db: &Database, total_days: i64) -> MealSession {
        let profile = profile::create_profile(db.pool(), &test_profile())
            .await
            .unwrap();
        create_session(db.pool(), &profile.id, total_days, Some(profile.goal))
            .await
            .unwrap()
    }

    fn sample_meals(count: usize) -> serde_json::Value {
        let meals: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "type": "lunch",
                    "name": format!("Meal {i}"),
                    "total_cal": 500,
                })
            })
            .collect();
        serde_json::Value::Array(meals)
    }

    fn sample_total() -> DayTotal {
        DayTotal {
            calories: 1800.0,
            protein: 120.0,
            carbs: 180.0,
            fat: 60.0,
            price: 30.0,
        }
    }

    #[tokio::test]
    async fn test_create_session_defaults() {
        let db = test_db().await;
        let session = seed_session(&db, 7).await;

        assert_eq!(session.status, SessionStatus::Pending);
        assert_eq!(session.current_day, 0);
        assert_eq!(session.total_days, 7);
        assert_eq!(session.goal, Some(Goal::Maintain));
        assert_eq!(session.total_meals, 0);
        assert!(session.error_message.is_none());
        assert!(session.completed_at.is_none());
        assert!(!session.started_at.is_empty());
    }

    #[tokio::test]
    async fn test_get_session_not_found() {
        let db = test_db().await;
        let result = get_session(db.pool(), "missing").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_status_and_progress_updates() {
        let db = test_db().await;
        let session = seed_session(&db, 30).await;

        update_status(db.pool(), &session.id, SessionStatus::Processing)
            .await
            .unwrap();
        update_progress(db.pool(), &session.id, 4).await.unwrap();

        let session = get_session(db.pool(), &session.id).await.unwrap();
        assert_eq!(session.status, SessionStatus::Processing);
        assert_eq!(session.current_day, 4);
        assert_eq!(session.progress(), 13.33);
    }

    #[tokio::test]
    async fn test_append_day_result_keeps_arrays_parallel() {
        let db = test_db().await;
        let session = seed_session(&db, 7).await;

        for day in 0..3 {
            append_day_result(db.pool(), &session.id, &sample_meals(3 + day), &sample_total())
                .await
                .unwrap();

            let session = get_session(db.pool(), &session.id).await.unwrap();
            let days = session.meal_days().unwrap();
            let totals = session.day_totals().unwrap();
            assert_eq!(days.len(), totals.len());
        }

        let session = get_session(db.pool(), &session.id).await.unwrap();
        assert_eq!(session.meal_days().unwrap().len(), 3);
        assert_eq!(session.total_meals, 3 + 4 + 5);
    }

    #[tokio::test]
    async fn test_running_totals_match_day_totals() {
        let db = test_db().await;
        let session = seed_session(&db, 7).await;

        for _ in 0..4 {
            append_day_result(db.pool(), &session.id, &sample_meals(3), &sample_total())
                .await
                .unwrap();
        }

        let session = get_session(db.pool(), &session.id).await.unwrap();
        let totals = session.day_totals().unwrap();

        let calories: f64 = totals.iter().map(|t| t.calories).sum();
        let protein: f64 = totals.iter().map(|t| t.protein).sum();
        let price: f64 = totals.iter().map(|t| t.price).sum();

        assert_eq!(session.total_calories, calories);
        assert_eq!(session.total_protein, protein);
        assert_eq!(session.total_price, price);
    }

    #[tokio::test]
    async fn test_mark_goal_on_day_one() {
        let db = test_db().await;
        let session = seed_session(&db, 30).await;

        update_progress(db.pool(), &session.id, 1).await.unwrap();
        mark_goal(db.pool(), &session.id, Goal::Lose, Some("high body fat"))
            .await
            .unwrap();

        let session = get_session(db.pool(), &session.id).await.unwrap();
        assert_eq!(session.goal, Some(Goal::Lose));
        assert_eq!(session.goal_explanation.as_deref(), Some("high body fat"));
    }

    #[tokio::test]
    async fn test_mark_goal_locked_after_day_one() {
        let db = test_db().await;
        let session = seed_session(&db, 30).await;

        update_progress(db.pool(), &session.id, 2).await.unwrap();
        let result = mark_goal(db.pool(), &session.id, Goal::Lose, None).await;

        assert!(matches!(result, Err(DatabaseError::GoalLocked(_))));
    }

    #[tokio::test]
    async fn test_complete_session() {
        let db = test_db().await;
        let session = seed_session(&db, 7).await;

        complete_session(db.pool(), &session.id).await.unwrap();

        let session = get_session(db.pool(), &session.id).await.unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_fail_session_records_message() {
        let db = test_db().await;
        let session = seed_session(&db, 7).await;

        fail_session(db.pool(), &session.id, "day 2 failed on both transports")
            .await
            .unwrap();

        let session = get_session(db.pool(), &session.id).await.unwrap();
        assert_eq!(session.status, SessionStatus::Failed);
        assert_eq!(
            session.error_message.as_deref(),
            Some("day 2 failed on both transports")
        );
    }

    #[tokio::test]
    async fn test_latest_completed_for_profile() {
        let db = test_db().await;
        let profile = profile::create_profile(db.pool(), &test_profile())
            .await
            .unwrap();

        let first = create_session(db.pool(), &profile.id, 7, None).await.unwrap();
        let second = create_session(db.pool(), &profile.id, 7, None).await.unwrap();
        let third = create_session(db.pool(), &profile.id, 7, None).await.unwrap();

        complete_session(db.pool(), &first.id).await.unwrap();
        complete_session(db.pool(), &second.id).await.unwrap();
        fail_session(db.pool(), &third.id, "boom").await.unwrap();

        let latest = latest_completed_for_profile(db.pool(), &profile.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, second.id);
    }

    #[tokio::test]
    async fn test_latest_completed_none() {
        let db = test_db().await;
        let profile = profile::create_profile(db.pool(), &test_profile())
            .await
            .unwrap();

        let latest = latest_completed_for_profile(db.pool(), &profile.id)
            .await
            .unwrap();
        assert!(latest.is_none());
    }
}
