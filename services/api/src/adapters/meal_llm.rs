//! services/api/src/adapters/meal_llm.rs
//!
//! This module contains the adapter for the meal-plan LLM.
//! It implements the `MealPlanService` port from the `core` crate.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use health_advisor_core::ports::{DietProfile, MealPlanService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `MealPlanService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiMealPlanAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiMealPlanAdapter {
    /// Creates a new `OpenAiMealPlanAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }
}

fn build_user_input(profile: &DietProfile) -> String {
    format!(
        "Create a one-day meal plan (breakfast, lunch, dinner, one snack) for a person \
         weighing {:.1} kg, {:.1} cm tall, whose goal is to {}. Their estimated basal \
         metabolic rate is {:.0} kcal/day; size the portions accordingly and give a \
         rough calorie count per meal.",
        profile.weight_kg,
        profile.height_cm,
        profile.goal.label(),
        profile.bmr
    )
}

//=========================================================================================
// `MealPlanService` Trait Implementation
//=========================================================================================

#[async_trait]
impl MealPlanService for OpenAiMealPlanAdapter {
    /// Generates a one-day meal plan as free text.
    async fn generate_plan(&self, profile: &DietProfile) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(
                    "You are a pragmatic nutritionist. Write concrete, affordable meal \
                     plans with everyday ingredients. Keep the whole plan under 250 words.",
                )
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_user_input(profile))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::AiUnavailable(format!(
                    "Completion service did not answer within {:?}",
                    self.timeout
                ))
            })?
            .map_err(|e: OpenAIError| PortError::AiUnavailable(e.to_string()))?;

        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::AiUnavailable(
                    "Completion response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::AiUnavailable(
                "Completion service returned no choices in its response.".to_string(),
            ))
        }
    }
}
