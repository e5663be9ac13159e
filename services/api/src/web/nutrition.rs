//! services/api/src/web/nutrition.rs
//!
//! Handlers for the BMI and BMR calculators and the AI meal planner. The
//! calculators are pure; the meal planner feeds the computed BMR into the
//! meal-plan adapter.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::state::AppState;
use health_advisor_core::ports::{DietGoal, DietProfile, PortError};
use health_advisor_core::scoring::{bmi, bmr, BmiCategory, Sex};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct BmiRequest {
    pub weight_kg: f64,
    pub height_cm: f64,
}

#[derive(Serialize, ToSchema)]
pub struct BmiResponse {
    /// BMI rounded to one decimal for display.
    pub bmi: f64,
    pub category: String,
}

#[derive(Deserialize, ToSchema)]
pub struct BmrRequest {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: f64,
    /// "male" or "female"
    pub sex: String,
}

#[derive(Serialize, ToSchema)]
pub struct BmrResponse {
    pub bmr: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct MealPlanRequest {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: f64,
    /// "male" or "female"
    pub sex: String,
    /// "lose_weight", "gain_weight" or "build_muscle"
    pub goal: String,
}

#[derive(Serialize, ToSchema)]
pub struct MealPlanResponse {
    pub bmr: f64,
    pub plan: String,
}

//=========================================================================================
// Boundary Validation
//=========================================================================================

/// Form inputs arrive untyped; weight and height must be positive, finite
/// numbers before they reach the scoring functions.
fn validate_measurements(weight_kg: f64, height_cm: f64) -> Result<(), (StatusCode, String)> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "weight_kg must be a positive number".to_string(),
        ));
    }
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "height_cm must be a positive number".to_string(),
        ));
    }
    Ok(())
}

fn parse_sex(raw: &str) -> Result<Sex, (StatusCode, String)> {
    match raw {
        "male" => Ok(Sex::Male),
        "female" => Ok(Sex::Female),
        _ => Err((
            StatusCode::BAD_REQUEST,
            "sex must be 'male' or 'female'".to_string(),
        )),
    }
}

fn parse_goal(raw: &str) -> Result<DietGoal, (StatusCode, String)> {
    match raw {
        "lose_weight" => Ok(DietGoal::LoseWeight),
        "gain_weight" => Ok(DietGoal::GainWeight),
        "build_muscle" => Ok(DietGoal::BuildMuscle),
        _ => Err((
            StatusCode::BAD_REQUEST,
            "goal must be 'lose_weight', 'gain_weight' or 'build_muscle'".to_string(),
        )),
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /calculators/bmi - Compute BMI and its category
#[utoipa::path(
    post,
    path = "/calculators/bmi",
    request_body = BmiRequest,
    responses(
        (status = 200, description = "BMI computed", body = BmiResponse),
        (status = 400, description = "Invalid measurements")
    )
)]
pub async fn bmi_handler(
    Json(req): Json<BmiRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    validate_measurements(req.weight_kg, req.height_cm)?;

    let value = bmi(req.weight_kg, req.height_cm);
    let category = BmiCategory::from_bmi(value);

    Ok(Json(BmiResponse {
        bmi: round_one_decimal(value),
        category: category.label().to_string(),
    }))
}

/// POST /calculators/bmr - Estimate basal metabolic rate
#[utoipa::path(
    post,
    path = "/calculators/bmr",
    request_body = BmrRequest,
    responses(
        (status = 200, description = "BMR estimated", body = BmrResponse),
        (status = 400, description = "Invalid inputs")
    )
)]
pub async fn bmr_handler(
    Json(req): Json<BmrRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    validate_measurements(req.weight_kg, req.height_cm)?;
    if !req.age_years.is_finite() || req.age_years <= 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "age_years must be a positive number".to_string(),
        ));
    }
    let sex = parse_sex(&req.sex)?;

    Ok(Json(BmrResponse {
        bmr: bmr(sex, req.weight_kg, req.height_cm, req.age_years),
    }))
}

/// POST /meal-plans - Generate a one-day AI meal plan
#[utoipa::path(
    post,
    path = "/meal-plans",
    request_body = MealPlanRequest,
    responses(
        (status = 200, description = "Meal plan generated", body = MealPlanResponse),
        (status = 400, description = "Invalid inputs"),
        (status = 503, description = "AI service unavailable")
    )
)]
pub async fn meal_plan_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MealPlanRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    validate_measurements(req.weight_kg, req.height_cm)?;
    if !req.age_years.is_finite() || req.age_years <= 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "age_years must be a positive number".to_string(),
        ));
    }
    let sex = parse_sex(&req.sex)?;
    let goal = parse_goal(&req.goal)?;

    let estimated_bmr = bmr(sex, req.weight_kg, req.height_cm, req.age_years);
    let profile = DietProfile {
        weight_kg: req.weight_kg,
        height_cm: req.height_cm,
        goal,
        bmr: estimated_bmr,
    };

    let plan = state.meal_adapter.generate_plan(&profile).await.map_err(|e| {
        error!("Meal plan generation failed: {:?}", e);
        match e {
            PortError::AiUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "The AI service is unavailable right now. Please try again later.".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate a meal plan".to_string(),
            ),
        }
    })?;

    Ok(Json(MealPlanResponse {
        bmr: estimated_bmr,
        plan,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_measurements() {
        assert!(validate_measurements(0.0, 170.0).is_err());
        assert!(validate_measurements(-5.0, 170.0).is_err());
        assert!(validate_measurements(60.0, 0.0).is_err());
        assert!(validate_measurements(f64::NAN, 170.0).is_err());
        assert!(validate_measurements(60.0, 170.0).is_ok());
    }

    #[test]
    fn parses_sex_and_goal() {
        assert_eq!(parse_sex("male").unwrap(), Sex::Male);
        assert_eq!(parse_sex("female").unwrap(), Sex::Female);
        assert!(parse_sex("other").is_err());
        assert_eq!(parse_goal("build_muscle").unwrap(), DietGoal::BuildMuscle);
        assert!(parse_goal("bulk").is_err());
    }

    #[test]
    fn one_decimal_rounding() {
        assert_eq!(round_one_decimal(20.761245), 20.8);
        assert_eq!(round_one_decimal(18.449), 18.4);
    }
}
