//! services/api/src/adapters/disabled.rs
//!
//! Stand-in AI adapters used when no API credential is configured. A missing
//! credential disables AI features gracefully instead of failing startup:
//! every call reports `AiUnavailable` and the handlers surface an inline
//! message.

use async_trait::async_trait;
use health_advisor_core::ports::{
    ConsultationPrompt, ConsultationService, DietProfile, MealPlanService, PortError,
    PortResult,
};

/// An adapter bound in place of the real AI gateways when `OPENAI_API_KEY`
/// is absent.
#[derive(Clone, Copy)]
pub struct DisabledAiAdapter;

impl DisabledAiAdapter {
    fn unavailable<T>() -> PortResult<T> {
        Err(PortError::AiUnavailable(
            "No AI credential is configured".to_string(),
        ))
    }
}

#[async_trait]
impl ConsultationService for DisabledAiAdapter {
    async fn advise(&self, _prompt: &ConsultationPrompt) -> PortResult<String> {
        Self::unavailable()
    }
}

#[async_trait]
impl MealPlanService for DisabledAiAdapter {
    async fn generate_plan(&self, _profile: &DietProfile) -> PortResult<String> {
        Self::unavailable()
    }
}
