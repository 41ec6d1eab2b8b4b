//! MCP tool server
//!
//! Every tool call builds its own window from the current time and runs with a fresh
//! cancellation token. Results are returned as pretty-printed JSON text.

use crate::analyzer::Analyzer;
use crate::error::AnalysisError;
use crate::models::{
    AnalysisWindow, AuthorOpportunitiesParams, AuthorTrendsParams, CategoryOpportunitiesParams,
    EngagementStore, PostTrendsParams, SummaryParams, TimePatternParams, TopAuthorsParams,
    UnderperformersParams,
};
use crate::{patterns, trends};
use chrono::Utc;
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Body of the opportunity tools
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum OpportunityResponse<T> {
    Ok {
        window: AnalysisWindow,
        results: Vec<T>,
    },
    InsufficientPopulation {
        population: usize,
        required: usize,
        results: Vec<T>,
    },
}

impl<T> OpportunityResponse<T> {
    /// Turn an analysis outcome into a response, keeping a too-small population out of the
    /// error channel
    fn from_outcome(
        window: AnalysisWindow,
        outcome: Result<Vec<T>, AnalysisError>,
    ) -> Result<Self, AnalysisError> {
        match outcome {
            Ok(results) => Ok(OpportunityResponse::Ok { window, results }),
            Err(AnalysisError::InsufficientPopulation { size, required }) => {
                Ok(OpportunityResponse::InsufficientPopulation {
                    population: size,
                    required,
                    results: Vec::new(),
                })
            }
            Err(err) => Err(err),
        }
    }
}

/// Tool server over one analyzer and its store
#[derive(Clone)]
pub struct ReachServer {
    analyzer: Arc<Analyzer<dyn EngagementStore>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ReachServer {
    pub fn new(analyzer: Arc<Analyzer<dyn EngagementStore>>) -> Self {
        Self {
            analyzer,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Classify authors by posting volume against engagement quality over a trailing window. Labels: HIGH_VOLUME_LOW_ENGAGEMENT, HIGH_VOLUME_HIGH_ENGAGEMENT, LOW_VOLUME, MEDIUM."
    )]
    async fn reach_author_opportunities(
        &self,
        Parameters(params): Parameters<AuthorOpportunitiesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "reach_author_opportunities: lookback_days={}, min_posts={}",
            params.lookback_days,
            params.min_posts
        );
        let window =
            AnalysisWindow::trailing(params.lookback_days, Utc::now()).map_err(to_mcp_error)?;
        let outcome = self
            .analyzer
            .compute_author_opportunities(&window, params.min_posts, &CancellationToken::new())
            .await;
        json_result(&OpportunityResponse::from_outcome(window, outcome).map_err(to_mcp_error)?)
    }

    #[tool(
        description = "Classify post categories by posting volume against engagement quality over a trailing window."
    )]
    async fn reach_category_opportunities(
        &self,
        Parameters(params): Parameters<CategoryOpportunitiesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "reach_category_opportunities: lookback_days={}",
            params.lookback_days
        );
        let window =
            AnalysisWindow::trailing(params.lookback_days, Utc::now()).map_err(to_mcp_error)?;
        let outcome = self
            .analyzer
            .compute_category_opportunities(&window, &CancellationToken::new())
            .await;
        json_result(&OpportunityResponse::from_outcome(window, outcome).map_err(to_mcp_error)?)
    }

    #[tool(
        description = "List high-volume authors or categories whose engagement per post sits in the bottom quartile, with the thresholds they were judged against."
    )]
    async fn reach_underperformers(
        &self,
        Parameters(params): Parameters<UnderperformersParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "reach_underperformers: grouping={}, lookback_days={}",
            params.grouping,
            params.lookback_days
        );
        let window =
            AnalysisWindow::trailing(params.lookback_days, Utc::now()).map_err(to_mcp_error)?;
        let outcome = self
            .analyzer
            .detailed_underperformers(params.grouping, &window, &CancellationToken::new())
            .await;
        json_result(&OpportunityResponse::from_outcome(window, outcome).map_err(to_mcp_error)?)
    }

    #[tool(
        description = "Daily engagement counts for one post over the last `days` days, compared with the period before."
    )]
    async fn reach_post_trends(
        &self,
        Parameters(params): Parameters<PostTrendsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "reach_post_trends: post_id={}, days={}",
            params.post_id,
            params.days
        );
        let result = trends::post_trends(
            self.analyzer.store(),
            params.post_id,
            params.days,
            Utc::now(),
        )
        .await
        .map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(
        description = "Daily engagement counts across all posts of one author over the last `days` days, compared with the period before."
    )]
    async fn reach_author_trends(
        &self,
        Parameters(params): Parameters<AuthorTrendsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "reach_author_trends: author_id={}, days={}",
            params.author_id,
            params.days
        );
        let result = trends::author_trends(
            self.analyzer.store(),
            params.author_id,
            params.days,
            Utc::now(),
        )
        .await
        .map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Totals of authors, posts and engagements for posts published in the last `days` days.")]
    async fn reach_summary(
        &self,
        Parameters(params): Parameters<SummaryParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("reach_summary: days={}", params.days);
        let result = trends::summary(self.analyzer.store(), params.days, Utc::now())
            .await
            .map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Authors ranked by the engagements their posts received in the window.")]
    async fn reach_top_authors(
        &self,
        Parameters(params): Parameters<TopAuthorsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "reach_top_authors: lookback_days={}, limit={}",
            params.lookback_days,
            params.limit
        );
        let result = patterns::top_authors(
            self.analyzer.store(),
            params.lookback_days,
            params.limit,
            Utc::now(),
        )
        .await
        .map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Engagement counts per hour of day (UTC), all 24 hours listed.")]
    async fn reach_engagement_by_hour(
        &self,
        Parameters(params): Parameters<TimePatternParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "reach_engagement_by_hour: lookback_days={:?}",
            params.lookback_days
        );
        let result =
            patterns::engagement_by_hour(self.analyzer.store(), params.lookback_days, Utc::now())
                .await
                .map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(
        description = "Engagement counts per day of week (0 = Sunday) and hour of day (UTC), for cells with any engagement."
    )]
    async fn reach_engagement_heatmap(
        &self,
        Parameters(params): Parameters<TimePatternParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "reach_engagement_heatmap: lookback_days={:?}",
            params.lookback_days
        );
        let result =
            patterns::engagement_heatmap(self.analyzer.store(), params.lookback_days, Utc::now())
                .await
                .map_err(to_mcp_error)?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for ReachServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Engagement analytics over authors, posts and engagements. Opportunity tools \
                 classify authors or categories by posting volume against engagement per post; \
                 trend, summary and pattern tools report raw activity."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

fn to_mcp_error(err: AnalysisError) -> McpError {
    match err {
        AnalysisError::InputValidation { .. } | AnalysisError::NotFound { .. } => {
            tracing::warn!("Rejected tool call: {}", err);
            McpError::invalid_params(err.to_string(), None)
        }
        AnalysisError::InsufficientPopulation { .. }
        | AnalysisError::UpstreamUnavailable(_)
        | AnalysisError::Cancelled => {
            tracing::error!("Tool call failed: {}", err);
            McpError::internal_error(err.to_string(), None)
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("Failed to serialize response: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
