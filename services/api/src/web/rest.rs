//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, aggregating the
//! handlers declared across the web modules.

use utoipa::OpenApi;

use crate::web::{auth, consultations, medicines, nutrition, screenings};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        nutrition::bmi_handler,
        nutrition::bmr_handler,
        nutrition::meal_plan_handler,
        consultations::ask_handler,
        consultations::history_handler,
        consultations::lab_report_handler,
        screenings::submit_handler,
        screenings::history_handler,
        medicines::add_handler,
        medicines::list_handler,
        medicines::delete_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            nutrition::BmiRequest,
            nutrition::BmiResponse,
            nutrition::BmrRequest,
            nutrition::BmrResponse,
            nutrition::MealPlanRequest,
            nutrition::MealPlanResponse,
            consultations::ConsultationResponse,
            consultations::ConsultationHistoryEntry,
            screenings::ScreeningRequest,
            screenings::ScreeningResponse,
            screenings::ScreeningHistoryEntry,
            medicines::AddMedicineRequest,
            medicines::MedicineResponse,
        )
    ),
    tags(
        (name = "Health Advisor API", description = "Accounts, health-record logs, scoring calculators and the AI consultation gateway.")
    )
)]
pub struct ApiDoc;
