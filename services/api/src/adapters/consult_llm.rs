//! services/api/src/adapters/consult_llm.rs
//!
//! This module contains the adapter for the AI doctor. It implements the
//! `ConsultationService` port from the `core` crate on top of an
//! OpenAI-compatible chat-completion API.

const SYSTEM_INSTRUCTIONS: &str = r#"You are a careful, friendly AI health advisor talking to a patient.

The input you receive can include:
- PREVIOUS EXCHANGES: earlier questions and answers from this visit.
- LAB REPORT TEXT: text extracted from a document the patient uploaded.
- An attached photo of a symptom or document.

Your role:
- Answer the patient's health question in plain, reassuring language.
- Explain likely causes and sensible self-care steps.
- Recommend seeing a clinician whenever symptoms sound serious, persistent,
  or ambiguous. You are not a substitute for a medical professional and you
  never give a definitive diagnosis or prescribe medication.
- When LAB REPORT TEXT is present, summarize the notable values in plain
  language and say which ones are worth discussing with a doctor.

Style:
- Warm and conversational, a short paragraph or a few bullet points.
- No disclaimers longer than one sentence."#;

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use base64::Engine;
use health_advisor_core::domain::ChatRole;
use health_advisor_core::ports::{
    ConsultationPrompt, ConsultationService, PortError, PortResult,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ConsultationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiConsultAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiConsultAdapter {
    /// Creates a new `OpenAiConsultAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }
}

/// Folds the patient name, the running transcript, any extracted document
/// text, and the current question into one prompt string. Every request is
/// self-contained; nothing else is sent to the remote service.
fn build_user_input(prompt: &ConsultationPrompt) -> String {
    let mut sections = Vec::new();

    sections.push(format!("PATIENT: {}", prompt.patient_name));

    if !prompt.transcript.is_empty() {
        let mut lines = vec!["PREVIOUS EXCHANGES:".to_string()];
        for message in &prompt.transcript {
            let speaker = match message.role {
                ChatRole::User => "Patient",
                ChatRole::Assistant => "Advisor",
            };
            lines.push(format!("{}: {}", speaker, message.content));
        }
        sections.push(lines.join("\n"));
    }

    if let Some(document_text) = &prompt.document_text {
        sections.push(format!("LAB REPORT TEXT:\n---\n{}\n---", document_text));
    }

    sections.push(format!("QUESTION:\n{}", prompt.question));

    sections.join("\n\n")
}

/// Best-effort content sniffing for the uploaded photo. The form only
/// accepts JPEG and PNG.
fn image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else {
        "image/jpeg"
    }
}

//=========================================================================================
// `ConsultationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ConsultationService for OpenAiConsultAdapter {
    /// Runs one blocking round trip to the completion service. Failures and
    /// timeouts both surface as `AiUnavailable`; the caller shows an inline
    /// message and moves on.
    async fn advise(&self, prompt: &ConsultationPrompt) -> PortResult<String> {
        let user_input = build_user_input(prompt);

        let user_message = match &prompt.image {
            Some(image_bytes) => {
                // Vision input rides along as a base64 data URL content part.
                let data_url = format!(
                    "data:{};base64,{}",
                    image_mime(image_bytes),
                    base64::engine::general_purpose::STANDARD.encode(image_bytes)
                );
                let text_part = ChatCompletionRequestMessageContentPartTextArgs::default()
                    .text(user_input)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?;
                let image_part = ChatCompletionRequestMessageContentPartImageArgs::default()
                    .image_url(
                        ImageUrlArgs::default()
                            .url(data_url)
                            .detail(ImageDetail::Auto)
                            .build()
                            .map_err(|e| PortError::Unexpected(e.to_string()))?,
                    )
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?;
                ChatCompletionRequestUserMessageArgs::default()
                    .content(vec![text_part.into(), image_part.into()])
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
            }
            None => ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
        };

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            user_message.into(),
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

        // Extract the text content from the first choice in the response.
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
