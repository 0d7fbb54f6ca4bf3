//! Mentor feedback: hints, recommendations and their rationale
//!
//! Every call to the text generator has a fixed local fallback, so a failing
//! or unconfigured service degrades the wording of a response, never its shape.

pub mod analyzer;
pub mod llm;

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    constants::{
        HINT_MAX_CHARS, HINT_MAX_TOKENS, RATIONALE_MAX_CHARS, RATIONALE_MAX_TOKENS,
        RECOMMENDATION_COUNT, fallbacks,
    },
    models::{PredictedProblem, SubmissionStatus},
    utils::truncate_chars,
};

pub use analyzer::analyze_mistake;
pub use llm::{AnthropicClient, LlmError, TextGenerator};

/// Text produced by the model, or the local substitute used when it failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated<T> {
    Model(T),
    Fallback(T),
}

impl<T> Generated<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Model(v) | Self::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Context for a hint request
#[derive(Debug, Clone, Copy)]
pub struct HintRequest<'a> {
    pub status: SubmissionStatus,
    pub analysis: &'a str,
    pub problem_title: &'a str,
    pub problem_tags: &'a str,
}

/// Context for a recommendation rationale
#[derive(Debug, Clone, Copy)]
pub struct RationaleRequest<'a> {
    pub accepted: bool,
    pub problem_title: &'a str,
    pub problem_tags: &'a str,
}

/// Pick the problems the user is most likely to pass next
///
/// Drops the problem just attempted and keeps the top entries by descending
/// pass probability.
pub fn select_recommendations(
    mut candidates: Vec<PredictedProblem>,
    current_problem: Uuid,
) -> Vec<PredictedProblem> {
    candidates.retain(|p| p.problem_id != current_problem);
    candidates.sort_by(|a, b| b.pass_probability.total_cmp(&a.pass_probability));
    candidates.truncate(RECOMMENDATION_COUNT);
    candidates
}

fn hint_prompt(req: &HintRequest<'_>) -> String {
    format!(
        r#"You are a competitive programming mentor. A student failed the problem "{title}" (tags: {tags}).

Failure type: {status}
Analysis: {analysis}

Generate a SHORT, NON-SPOILER mentor hint (max 2-3 sentences). Do NOT give code or solutions. Point them toward the right approach or concept to review.

Respond ONLY with valid JSON:
{{"hint": "your hint here"}}"#,
        title = req.problem_title,
        tags = req.problem_tags,
        status = req.status,
        analysis = req.analysis,
    )
}

fn rationale_prompt(req: &RationaleRequest<'_>, titles: &str) -> String {
    let context = if req.accepted { "solved" } else { "struggled with" };
    format!(
        r#"You are a competitive programming mentor. A student {context} "{title}" (tags: {tags}).

Recommend these problems as next steps: {titles}

Generate a brief explanation (EXACTLY 1 sentence, max 20 words) of WHY these problems help them improve. Focus on skills/concepts.

Respond ONLY with valid JSON:
{{"explanation": "your one sentence explanation"}}"#,
        title = req.problem_title,
        tags = req.problem_tags,
    )
}

/// Hint and rationale generation on top of a text generator
#[derive(Clone)]
pub struct MentorService {
    generator: Arc<dyn TextGenerator>,
}

impl MentorService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    async fn ask(&self, prompt: &str, max_tokens: u32, key: &str) -> Result<String, LlmError> {
        let reply = self.generator.complete(prompt, max_tokens).await?;
        llm::extract_json_field(&reply, key)
    }

    /// Short, non-spoiler hint for a failed attempt
    pub async fn generate_hint(&self, req: HintRequest<'_>) -> Generated<String> {
        match self.ask(&hint_prompt(&req), HINT_MAX_TOKENS, "hint").await {
            Ok(hint) => Generated::Model(truncate_chars(&hint, HINT_MAX_CHARS).to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Hint generation failed, using fallback");
                Generated::Fallback(fallbacks::HINT.to_string())
            }
        }
    }

    /// One-sentence reason for recommending `recommended`
    ///
    /// An empty recommendation list never reaches the generator.
    pub async fn explain_recommendations(
        &self,
        req: RationaleRequest<'_>,
        recommended: &[PredictedProblem],
    ) -> Generated<String> {
        if recommended.is_empty() {
            return Generated::Fallback(fallbacks::NO_RECOMMENDATIONS.to_string());
        }

        let titles = recommended
            .iter()
            .map(|p| p.title.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        match self
            .ask(&rationale_prompt(&req, &titles), RATIONALE_MAX_TOKENS, "explanation")
            .await
        {
            Ok(text) => Generated::Model(truncate_chars(&text, RATIONALE_MAX_CHARS).to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Rationale generation failed, using fallback");
                Generated::Fallback(fallbacks::RATIONALE.to_string())
            }
        }
    }
}
