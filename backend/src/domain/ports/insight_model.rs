//! Port for the language model that drafts insights.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by model clients.
    pub enum InsightModelError {
        /// The model endpoint could not be reached.
        Transport { message: String } => "insight model request failed: {message}",
        /// The endpoint answered with a non-success status.
        Status { status: u16, message: String } => "insight model returned {status}: {message}",
        /// The response carried no text content.
        EmptyResponse => "insight model returned no text content",
    }
}

/// System and user messages sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightPrompt {
    pub system: String,
    pub user: String,
}

/// Text completion used for insight generation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InsightModel: Send + Sync {
    /// Return the text blocks of the model's reply, concatenated.
    async fn complete(&self, prompt: &InsightPrompt) -> Result<String, InsightModelError>;
}

/// Fixture model that answers with an empty insight list.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInsightModel;

#[async_trait]
impl InsightModel for FixtureInsightModel {
    async fn complete(&self, _prompt: &InsightPrompt) -> Result<String, InsightModelError> {
        Ok("[]".to_owned())
    }
}
