//! Submission service
//!
//! One submission runs strictly in order: grade, store, update the profile,
//! refresh predictions, drop the solved problem's prediction, decide on a hint,
//! then pick recommendations.

use rand::{Rng, SeedableRng, rngs::StdRng};
use sqlx::PgPool;

use crate::{
    constants::{DEFAULT_PASS_PROBABILITY, HINT_THRESHOLD},
    db::repositories::{
        PredictionRepository, ProblemRepository, ProfileRepository, SubmissionRepository,
        UserRepository,
    },
    error::{AppError, AppResult},
    handlers::mentor::{
        request::SubmitSolutionRequest,
        response::{ProblemRecommendation, SubmissionResponse},
    },
    judge::CodeExecutor,
    mentor::{HintRequest, MentorService, RationaleRequest, analyze_mistake, select_recommendations},
    ml::{ModelRegistry, hint_features, simulate_edit_count},
    models::SubmissionStatus,
    services::PredictionService,
    state::AppState,
};

/// Collaborators the submission pipeline needs
#[derive(Clone, Copy)]
pub struct Pipeline<'a> {
    pub db: &'a PgPool,
    pub executor: &'a CodeExecutor,
    pub models: &'a ModelRegistry,
    pub mentor: &'a MentorService,
}

impl<'a> From<&'a AppState> for Pipeline<'a> {
    fn from(state: &'a AppState) -> Self {
        Self {
            db: state.db(),
            executor: state.executor(),
            models: state.models(),
            mentor: state.mentor(),
        }
    }
}

/// Submission service for business logic
pub struct SubmissionService;

impl SubmissionService {
    /// Run the full pipeline for one submission
    pub async fn submit(
        pipeline: Pipeline<'_>,
        payload: SubmitSolutionRequest,
    ) -> AppResult<SubmissionResponse> {
        let mut rng = StdRng::from_os_rng();
        Self::submit_with_rng(pipeline, payload, &mut rng).await
    }

    /// Pipeline with an explicit source of randomness for the simulated edit counts
    pub async fn submit_with_rng<R: Rng + Send>(
        pipeline: Pipeline<'_>,
        payload: SubmitSolutionRequest,
        rng: &mut R,
    ) -> AppResult<SubmissionResponse> {
        let pool = pipeline.db;
        let models = pipeline.models;

        models.refresh().await;

        let user = UserRepository::find_by_id(pool, &payload.user_id)
            .await?
            .ok_or_else(|| AppError::InvalidInput("User not found".to_string()))?;
        let problem = ProblemRepository::find_by_id(pool, &payload.problem_id)
            .await?
            .ok_or_else(|| AppError::InvalidInput("Problem not found".to_string()))?;

        let test_cases = ProblemRepository::get_test_cases(pool, &problem.id).await?;
        let tests: Vec<(&str, &str)> = test_cases.iter().map(|t| t.as_pair()).collect();

        let outcome = pipeline.executor.grade(&payload.code, &tests).await?;
        let accepted = outcome.status.is_accepted();

        tracing::info!(
            user_id = %user.id,
            problem_id = %problem.id,
            status = %outcome.status,
            tests = tests.len(),
            "Graded submission"
        );

        let submission = SubmissionRepository::create(
            pool,
            &user.id,
            &problem.id,
            &payload.code,
            outcome.status,
            &outcome.analysis,
            payload.time_spent_seconds,
        )
        .await?;

        let edits = simulate_edit_count(rng);
        ProfileRepository::record_attempt(
            pool,
            &user.id,
            accepted,
            payload.time_spent_seconds,
            edits,
        )
        .await?;

        PredictionService::refresh_for_user(pool, models, &user.id).await?;

        let pass_probability_on_this = if accepted {
            PredictionRepository::delete(pool, &user.id, &problem.id).await?;
            1.0
        } else {
            PredictionRepository::find(pool, &user.id, &problem.id)
                .await?
                .map(|p| p.pass_probability)
                .unwrap_or(DEFAULT_PASS_PROBABILITY)
        };

        let mut hint = String::new();
        let mut hint_given = false;

        if is_hintable(outcome.status) {
            let analysis = hint_analysis(
                outcome.status,
                &outcome.analysis,
                &payload.code,
                problem.reference_solution.as_deref(),
            );

            let features = hint_features(payload.time_spent_seconds, simulate_edit_count(rng));
            let hint_probability = models.hint_timing.predict(&features).await?;

            tracing::debug!(hint_probability, "Hint timing prediction");

            if hint_probability > HINT_THRESHOLD {
                let tags = problem.tags_display();
                hint = pipeline
                    .mentor
                    .generate_hint(HintRequest {
                        status: outcome.status,
                        analysis: &analysis,
                        problem_title: &problem.title,
                        problem_tags: &tags,
                    })
                    .await
                    .into_inner();
                hint_given = true;
                SubmissionRepository::set_hint_given(pool, &submission.id).await?;
            }
        }

        let candidates = PredictionRepository::list_for_user(pool, &user.id).await?;
        let recommended = select_recommendations(candidates, problem.id);
        let tags = problem.tags_display();
        let explanation = pipeline
            .mentor
            .explain_recommendations(
                RationaleRequest {
                    accepted,
                    problem_title: &problem.title,
                    problem_tags: &tags,
                },
                &recommended,
            )
            .await
            .into_inner();

        Ok(SubmissionResponse {
            success: true,
            status: outcome.status,
            hint,
            hint_given,
            pass_probability_on_this,
            recommendations: recommended
                .into_iter()
                .map(ProblemRecommendation::from)
                .collect(),
            explanation,
        })
    }
}

/// Hints are only considered for failures the user can reason about
fn is_hintable(status: SubmissionStatus) -> bool {
    !matches!(status, SubmissionStatus::Accepted | SubmissionStatus::Syntax)
}

/// Analysis text handed to the hint generator
///
/// With a reference solution the failure is explained against it; otherwise the
/// grader's own analysis is used.
fn hint_analysis(
    status: SubmissionStatus,
    grader_analysis: &str,
    code: &str,
    reference_solution: Option<&str>,
) -> String {
    match reference_solution {
        Some(reference) if !reference.trim().is_empty() => analyze_mistake(code, reference, status),
        _ => grader_analysis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hintable_statuses() {
        assert!(is_hintable(SubmissionStatus::WrongAnswer));
        assert!(is_hintable(SubmissionStatus::Runtime));
        assert!(is_hintable(SubmissionStatus::Tle));
        assert!(!is_hintable(SubmissionStatus::Syntax));
        assert!(!is_hintable(SubmissionStatus::Accepted));
    }

    #[test]
    fn test_hint_analysis_prefers_reference() {
        let analysis = hint_analysis(
            SubmissionStatus::Tle,
            "Code runs too slowly (timeout after 5s)",
            "while True: pass",
            Some("print(1)"),
        );
        assert!(analysis.starts_with("Algorithm is too slow"));
    }

    #[test]
    fn test_hint_analysis_without_reference() {
        let grader = "Line 1: got '4' but expected '5'";
        assert_eq!(
            hint_analysis(SubmissionStatus::WrongAnswer, grader, "print(4)", None),
            grader
        );
        assert_eq!(
            hint_analysis(SubmissionStatus::WrongAnswer, grader, "print(4)", Some("  ")),
            grader
        );
    }
}
