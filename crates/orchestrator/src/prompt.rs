//! Day-prompt construction.
//!
//! The prompt embeds a bounded catalog snapshot and requires exact name
//! echoes so generated meals reconcile against catalog prices and macros.

use database::{CatalogItem, Profile};

use crate::metrics::{meal_count_band, target_calories};

fn format_catalog(items: &[CatalogItem]) -> String {
    let lines: Vec<String> = items
        .iter()
        .map(|item| {
            format!(
                "{}|{}cal|{}p|{}c|{}f|{}$",
                item.name, item.calories, item.protein, item.carbs, item.fats_per_100g, item.price
            )
        })
        .collect();
    lines.join(" | ")
}

/// Build the prompt for one day of the plan.
pub fn build_day_prompt(
    profile: &Profile,
    day: u32,
    ingredients: &[CatalogItem],
    sauces: &[CatalogItem],
) -> String {
    let meal_count = meal_count_band(profile.bmi);
    let target = target_calories(profile.tdee, profile.goal);

    format!(
        r#"Nutritionist Day {day}. User: {gender}, {weight}kg, BMI {bmi} ({overview}), TDEE {tdee}

INGREDIENTS: {ingredients}

SAUCES: {sauces}

RULES:
1. Use EXACT names from lists above
2. Create {meal_count} meals for {goal} weight goal
3. Never repeat ingredient/sauce in same day
4. Target calories: {target}
5. Vary meals from previous days

JSON FORMAT ONLY:
{{
    "goal": "{goal}",
    "day": {day},
    "meals": [
        {{
            "type": "breakfast/lunch/dinner/snack",
            "name": "Meal Name",
            "time": "07:00",
            "ingredients": [{{"name": "exact_name", "amount": "100g", "cal": 150, "protein": 20, "carbs": 10, "fat": 5, "price": 5}}],
            "sauces": [{{"name": "exact_name", "amount": "1tbsp", "cal": 20, "protein": 0, "carbs": 5, "fat": 0, "price": 1}}],
            "instructions": "Preparation steps",
            "total_cal": 170,
            "total_protein": 20,
            "total_carbs": 15,
            "total_fat": 5,
            "total_price": 6
        }}
    ],
    "daily_total": {{
        "calories": 1800,
        "protein": 120,
        "carbs": 180,
        "fat": 60,
        "price": 30
    }}
}}"#,
        day = day,
        gender = profile.gender,
        weight = profile.weight,
        bmi = profile.bmi,
        overview = profile.bmi_overview,
        tdee = profile.tdee,
        ingredients = format_catalog(ingredients),
        sauces = format_catalog(sauces),
        meal_count = meal_count,
        goal = profile.goal,
        target = target,
    )
}
