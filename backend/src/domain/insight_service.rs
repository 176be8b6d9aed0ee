//! Insight generation, listing and the thirty-day retention policy.

use std::sync::{Arc, OnceLock};

use mockable::Clock;
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use super::ports::{
    InsightModel, InsightModelError, InsightPrompt, InsightRepository, SubscriptionRepository,
};
use super::{Error, Insight, NewInsight, PortfolioService, UserId, retention_cutoff};

/// Instructions sent with every generation request.
pub const INSIGHT_SYSTEM_PROMPT: &str = "\
You are a senior wealth advisor specializing in ultra-high-net-worth (UHNW) portfolio management. \
You provide actionable, specific insights based on portfolio data.

Generate exactly 3-5 insights based on the portfolio data provided. Focus on:
1. Concentration risk: any single category exceeding 35% of portfolio
2. Tax optimization: tax-loss harvesting opportunities, estate tax thresholds ($13.99M per individual in 2026)
3. Rebalancing: drift from typical UHNW allocation targets
4. Opportunities: liquidity events, market conditions, or structural improvements

Each insight must be specific to THIS portfolio's actual data. Reference specific assets, values, and percentages.

Respond ONLY with a JSON array. Each object must have:
- \"title\": string (concise, under 80 chars)
- \"description\": string (2-3 sentences with specific numbers)
- \"category\": \"opportunity\" | \"risk\" | \"tax\" | \"rebalance\"
- \"priority\": \"high\" | \"medium\" | \"low\"
- \"actionable\": boolean";

const PARSE_FAILURE: &str = "Failed to parse insights from AI response";

static JSON_ARRAY_RE: OnceLock<Regex> = OnceLock::new();

fn json_array_regex() -> &'static Regex {
    JSON_ARRAY_RE.get_or_init(|| {
        Regex::new(r"\[[\s\S]*\]")
            .unwrap_or_else(|error| panic!("JSON array regex failed to compile: {error}"))
    })
}

/// Pull the insight array out of free-form model text.
///
/// The span from the first `[` to the last `]` is parsed, so surrounding
/// prose or code fences are tolerated.
pub fn extract_insights(text: &str) -> Result<Vec<NewInsight>, Error> {
    let span = json_array_regex()
        .find(text)
        .ok_or_else(|| Error::internal(PARSE_FAILURE))?;
    serde_json::from_str(span.as_str()).map_err(|err| {
        warn!(error = %err, "model output was not a valid insight array");
        Error::internal(PARSE_FAILURE)
    })
}

/// Totals for a generation batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub generated: usize,
    pub failed: usize,
    pub total: usize,
}

/// Ports used by [`InsightService`].
pub struct InsightPorts {
    pub portfolio: PortfolioService,
    pub insights: Arc<dyn InsightRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub model: Arc<dyn InsightModel>,
    pub clock: Arc<dyn Clock>,
}

/// Generates and serves portfolio insights.
#[derive(Clone)]
pub struct InsightService {
    portfolio: PortfolioService,
    insights: Arc<dyn InsightRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    model: Arc<dyn InsightModel>,
    clock: Arc<dyn Clock>,
}

fn map_model_error(err: InsightModelError) -> Error {
    match err {
        InsightModelError::Transport { message } => {
            Error::service_unavailable(format!("insight model unavailable: {message}"))
        }
        other => Error::internal(other.to_string()),
    }
}

impl InsightService {
    /// Build the service from its ports.
    pub fn new(ports: InsightPorts) -> Self {
        let InsightPorts {
            portfolio,
            insights,
            subscriptions,
            model,
            clock,
        } = ports;
        Self {
            portfolio,
            insights,
            subscriptions,
            model,
            clock,
        }
    }

    /// Insights for `user_id`, newest first.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Insight>, Error> {
        Ok(self.insights.list_for_user(user_id).await?)
    }

    /// Ask the model for fresh insights and store them.
    ///
    /// Users without assets get an empty list and the model is not called.
    /// Before the new rows land, insights older than the retention window
    /// are purged.
    pub async fn generate(&self, user_id: &UserId) -> Result<Vec<NewInsight>, Error> {
        let context = self.portfolio.context(user_id).await?;
        if context.asset_count == 0 {
            return Ok(Vec::new());
        }

        let prompt = InsightPrompt {
            system: INSIGHT_SYSTEM_PROMPT.to_owned(),
            user: context.render_prompt(),
        };
        let reply = self.model.complete(&prompt).await.map_err(map_model_error)?;
        let generated = extract_insights(&reply)?;

        let now = self.clock.utc();
        let purged = self
            .insights
            .delete_created_before(user_id, retention_cutoff(now))
            .await?;
        for insight in &generated {
            self.insights.insert(user_id, insight, now).await?;
        }
        info!(%user_id, generated = generated.len(), purged, "stored insights");
        Ok(generated)
    }

    /// Generate insights for every user with an active or trialing
    /// subscription, continuing past individual failures.
    pub async fn generate_for_subscribers(&self) -> Result<GenerationReport, Error> {
        let user_ids = self.subscriptions.list_entitled_user_ids().await?;
        let mut report = GenerationReport {
            total: user_ids.len(),
            ..GenerationReport::default()
        };
        for user_id in &user_ids {
            match self.generate(user_id).await {
                Ok(_) => report.generated += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!(%user_id, error = %err, "insight generation failed");
                }
            }
        }
        info!(
            generated = report.generated,
            failed = report.failed,
            total = report.total,
            "insight batch finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "insight_service_tests.rs"]
mod tests;
