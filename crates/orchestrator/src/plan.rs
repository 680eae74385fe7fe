//! Typed day plan structures produced by the parser.

use database::DayTotal;
use serde::{Deserialize, Serialize};

/// One ingredient or sauce line inside a meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealComponent {
    /// Catalog name, echoed exactly.
    pub name: String,
    /// Portion description, e.g. "100g" or "1tbsp".
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub cal: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub price: f64,
}

/// One meal within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// Meal slot: breakfast/lunch/dinner/snack.
    #[serde(rename = "type", default)]
    pub meal_type: String,
    pub name: String,
    /// Suggested time, e.g. "07:00".
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub ingredients: Vec<MealComponent>,
    #[serde(default)]
    pub sauces: Vec<MealComponent>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub total_cal: f64,
    #[serde(default)]
    pub total_protein: f64,
    #[serde(default)]
    pub total_carbs: f64,
    #[serde(default)]
    pub total_fat: f64,
    #[serde(default)]
    pub total_price: f64,
}

/// A full generated day. `meals` is the only required field; a response
/// without it is a parse failure, not a thin day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Goal decided by the backend, present on day 1 only.
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub goal_explanation: Option<String>,
    /// Day index as echoed by the backend.
    #[serde(default)]
    pub day: Option<u32>,
    pub meals: Vec<Meal>,
}

impl DayPlan {
    /// Sum the per-meal totals into one day total.
    pub fn day_total(&self) -> DayTotal {
        let mut total = DayTotal::default();
        for meal in &self.meals {
            total.calories += meal.total_cal;
            total.protein += meal.total_protein;
            total.carbs += meal.total_carbs;
            total.fat += meal.total_fat;
            total.price += meal.total_price;
        }
        total
    }

    /// The meals as a JSON array for appending to the session store.
    pub fn meals_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.meals).unwrap_or_else(|_| serde_json::Value::Array(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(cal: f64, protein: f64, price: f64) -> Meal {
        Meal {
            meal_type: "lunch".to_string(),
            name: "Test meal".to_string(),
            time: "12:00".to_string(),
            ingredients: Vec::new(),
            sauces: Vec::new(),
            instructions: String::new(),
            total_cal: cal,
            total_protein: protein,
            total_carbs: 0.0,
            total_fat: 0.0,
            total_price: price,
        }
    }

    #[test]
    fn test_day_total_sums_meals() {
        let plan = DayPlan {
            goal: None,
            goal_explanation: None,
            day: Some(1),
            meals: vec![meal(500.0, 30.0, 10.0), meal(700.0, 45.0, 12.5)],
        };

        let total = plan.day_total();
        assert_eq!(total.calories, 1200.0);
        assert_eq!(total.protein, 75.0);
        assert_eq!(total.price, 22.5);
    }

    #[test]
    fn test_empty_day_total() {
        let plan = DayPlan {
            goal: None,
            goal_explanation: None,
            day: None,
            meals: Vec::new(),
        };

        assert_eq!(plan.day_total(), DayTotal::default());
    }

    #[test]
    fn test_meals_json_is_array() {
        let plan = DayPlan {
            goal: None,
            goal_explanation: None,
            day: Some(2),
            meals: vec![meal(500.0, 30.0, 10.0)],
        };

        let json = plan.meals_json();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["type"], "lunch");
    }
}
