pub mod domain;
pub mod ports;
pub mod scoring;

pub use domain::{
    Account, AccountCredentials, AuthSession, ChatMessage, ChatRole, ConsultationRecord,
    MedicineEntry, MentalScoreRecord,
};
pub use ports::{
    ConsultationPrompt, ConsultationService, DatabaseService, DietGoal, DietProfile,
    DocumentTextService, MealPlanService, PortError, PortResult,
};
pub use scoring::{
    bmi, bmr, screening_score, BmiCategory, ResponseLevel, ScreeningCategory,
    ScreeningResult, Sex,
};
