//! Physical-metric derivation for profiles.
//!
//! Pure functions: BMI, Mifflin-St Jeor BMR, TDEE from a closed activity
//! enumeration, US Navy body-fat estimate, and the goal decision that seeds
//! day-1 prompts.

use sha2::{Digest, Sha256};

use database::validation::GenerationRequest;
use database::{Goal, NewProfile, Profile};

/// Activity levels mapped to fixed TDEE multipliers.
///
/// Unrecognized input falls back to [`ActivityLevel::Sedentary`] explicitly
/// rather than through an open-ended lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    SuperActive,
}

impl ActivityLevel {
    /// Parse a client-supplied label. Matching is keyword-based so the
    /// mobile clients' long-form labels ("Lightly active (1-3 days/week)")
    /// resolve without exact string agreement.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("super") {
            ActivityLevel::SuperActive
        } else if label.contains("very") {
            ActivityLevel::VeryActive
        } else if label.contains("moderate") {
            ActivityLevel::ModeratelyActive
        } else if label.contains("light") {
            ActivityLevel::LightlyActive
        } else {
            ActivityLevel::Sedentary
        }
    }

    /// Fixed TDEE multiplier for this level.
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::SuperActive => 1.9,
        }
    }
}

/// Body mass index from weight (kg) and height (cm), rounded to 2 decimals.
pub fn bmi(weight: f64, height: f64) -> f64 {
    let height_m = height / 100.0;
    round2(weight / (height_m * height_m))
}

/// Textual BMI classification.
pub fn bmi_overview(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "Underweight"
    } else if bmi < 24.9 {
        "Normal"
    } else if bmi < 29.9 {
        "Overweight"
    } else {
        "Obese"
    }
}

/// Basal metabolic rate (Mifflin-St Jeor), rounded to whole kcal.
pub fn bmr(weight: f64, height: f64, age: i64, gender: &str) -> i64 {
    let base = 10.0 * weight + 6.25 * height - 5.0 * age as f64;
    let bmr = if gender == "male" { base + 5.0 } else { base - 161.0 };
    bmr.round() as i64
}

/// Total daily energy expenditure, rounded to whole kcal.
pub fn tdee(bmr: i64, activity: ActivityLevel) -> i64 {
    (bmr as f64 * activity.multiplier()).round() as i64
}

/// Body-fat percentage (US Navy method), rounded to 2 decimals.
///
/// Circumferences and height in cm. Females without a hip measurement fall
/// back to the waist value.
pub fn body_fat(
    gender: &str,
    waist: f64,
    neck: f64,
    height: f64,
    hip: Option<f64>,
) -> f64 {
    let height_in = height * 0.393_701;
    let fat = if gender == "male" {
        86.010 * (waist - neck).log10() - 70.041 * height_in.log10() + 36.76
    } else {
        let hip = hip.unwrap_or(waist);
        163.205 * (waist + hip - neck).log10() - 97.684 * height_in.log10() - 78.387
    };
    round2(fat)
}

/// Decide the weight goal from BMI and body-fat percentage.
pub fn determine_goal(bmi: f64, body_fat: f64) -> Goal {
    if bmi < 18.5 {
        Goal::Gain
    } else if bmi > 25.0 {
        Goal::Lose
    } else if body_fat > 25.0 {
        Goal::Lose
    } else if body_fat < 15.0 {
        Goal::Gain
    } else {
        Goal::Maintain
    }
}

/// Daily meal count band for the prompt, from BMI.
pub fn meal_count_band(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "4-6"
    } else if bmi < 25.0 {
        "3-4"
    } else {
        "2-3"
    }
}

/// Target calories: TDEE adjusted for the goal.
pub fn target_calories(tdee: i64, goal: Goal) -> i64 {
    match goal {
        Goal::Lose => tdee - 400,
        Goal::Gain => tdee + 400,
        Goal::Maintain => tdee,
    }
}

/// Stable identity hash over the metrics that identify one person.
pub fn metrics_hash(
    age: i64,
    height: f64,
    weight: f64,
    gender: &str,
    device_id: Option<&str>,
) -> String {
    let identity = format!(
        "{}|{:.1}|{:.1}|{}|{}",
        age,
        height,
        weight,
        gender,
        device_id.unwrap_or("no-device")
    );

    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

/// Derive a full profile record from a validated request.
pub fn derive_profile(request: &GenerationRequest) -> NewProfile {
    let bmi_value = bmi(request.weight, request.height);
    let bmr_value = bmr(request.weight, request.height, request.age, &request.gender);
    let activity = ActivityLevel::from_label(&request.activity_level);
    let tdee_value = tdee(bmr_value, activity);
    let body_fat_value = body_fat(
        &request.gender,
        request.waist_circumference,
        request.neck_circumference,
        request.height,
        request.hip_circumference,
    );
    let goal = determine_goal(bmi_value, body_fat_value);

    NewProfile {
        device_id: request.device_id.clone(),
        metrics_hash: metrics_hash(
            request.age,
            request.height,
            request.weight,
            &request.gender,
            request.device_id.as_deref(),
        ),
        age: request.age,
        height: request.height,
        weight: request.weight,
        gender: request.gender.clone(),
        activity_level: request.activity_level.clone(),
        neck_circumference: request.neck_circumference,
        waist_circumference: request.waist_circumference,
        hip_circumference: request.hip_circumference,
        bmi: bmi_value,
        bmi_overview: bmi_overview(bmi_value).to_string(),
        bmr: bmr_value,
        tdee: tdee_value,
        body_fat: body_fat_value,
        plan_period: request.plan_period_or_default(),
        goal,
    }
}

/// Whether a returning user's metrics drifted enough to re-derive everything.
pub fn metrics_changed(profile: &Profile, request: &GenerationRequest) -> bool {
    (profile.weight - request.weight).abs() > 0.5
        || (profile.height - request.height).abs() > 1.0
        || profile.age != request.age
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
