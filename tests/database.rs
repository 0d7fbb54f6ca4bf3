//! Repository and pipeline tests against a real Postgres
//!
//! A Postgres container is started lazily and shared by every test in this
//! file. Set `TEST_DATABASE_URL` to use an existing database instead.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use rand::{SeedableRng, rngs::StdRng};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use cpmentor::{
    config::ModelConfig,
    constants::fallbacks,
    db::{
        self,
        repositories::{
            PredictionRepository, ProblemRepository, ProfileRepository, SubmissionRepository,
            UserRepository,
        },
    },
    error::{AppError, AppResult},
    handlers::mentor::SubmitSolutionRequest,
    judge::{CodeExecutor, ExecutionResult, ProcessRunner},
    mentor::{LlmError, MentorService, TextGenerator},
    ml::{
        ModelRegistry,
        training::{LogisticTrainer, generate_training_data},
    },
    models::{Problem, SubmissionStatus, User},
    services::{Pipeline, PredictionService, SubmissionService},
};

const ECHO: &str = "print(input())";

/// Echoes stdin for `ECHO`, prints `0` for anything else
struct EchoRunner;

#[async_trait]
impl ProcessRunner for EchoRunner {
    async fn check_syntax(&self, code: &str) -> AppResult<Option<String>> {
        Ok(code
            .contains("def (")
            .then(|| "Line 1: invalid syntax".to_string()))
    }

    async fn execute(&self, code: &str, input: &str) -> ExecutionResult {
        let stdout = if code == ECHO { input } else { "0" };
        ExecutionResult::Success {
            stdout: format!("{}\n", stdout),
        }
    }

    fn timeout_secs(&self) -> u64 {
        5
    }
}

struct Offline;

#[async_trait]
impl TextGenerator for Offline {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String, LlmError> {
        Err(LlmError::MissingApiKey)
    }
}

struct Harness {
    pool: PgPool,
    models: ModelRegistry,
    executor: CodeExecutor,
    mentor: MentorService,
    _dir: tempfile::TempDir,
}

impl Harness {
    fn pipeline(&self) -> Pipeline<'_> {
        Pipeline {
            db: &self.pool,
            executor: &self.executor,
            models: &self.models,
            mentor: &self.mentor,
        }
    }
}

static POSTGRES: OnceLock<ContainerAsync<Postgres>> = OnceLock::new();
static DATABASE_URL: OnceCell<String> = OnceCell::const_new();

/// Get the test database URL, starting the container on first use
async fn database_url() -> &'static str {
    DATABASE_URL
        .get_or_init(|| async {
            if let Ok(url) = std::env::var("TEST_DATABASE_URL") {
                return url;
            }

            let container = Postgres::default()
                .with_user("cpmentor")
                .with_password("cpmentor_test")
                .with_db_name("cpmentor_test")
                .with_tag("16-alpine")
                .start()
                .await
                .expect("Failed to start PostgreSQL container");

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();
            let _ = POSTGRES.set(container);

            format!("postgres://cpmentor:cpmentor_test@{}:{}/cpmentor_test", host, port)
        })
        .await
}

async fn pool() -> PgPool {
    let pool = PgPool::connect(database_url().await).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = ModelConfig {
        difficulty_model_path: dir.path().join("difficulty.json"),
        hint_timing_model_path: dir.path().join("hint_timing.json"),
    };

    let data = generate_training_data(&mut StdRng::seed_from_u64(7), 300);
    let trainer = LogisticTrainer {
        epochs: 100,
        ..LogisticTrainer::default()
    };
    trainer
        .fit(&data.difficulty)
        .unwrap()
        .save(&config.difficulty_model_path)
        .unwrap();
    trainer
        .fit(&data.hint_timing)
        .unwrap()
        .save(&config.hint_timing_model_path)
        .unwrap();

    Harness {
        pool: pool().await,
        models: ModelRegistry::load(&config).unwrap(),
        executor: CodeExecutor::new(Arc::new(EchoRunner)),
        mentor: MentorService::new(Arc::new(Offline)),
        _dir: dir,
    }
}

async fn user(pool: &PgPool) -> User {
    let name = format!("user-{}", &Uuid::new_v4().simple().to_string()[..12]);
    UserRepository::create(pool, &name).await.unwrap()
}

async fn echo_problem(pool: &PgPool, title: &str, difficulty: &str) -> Problem {
    let tags = vec!["array".to_string(), "greedy".to_string()];
    let problem = ProblemRepository::create(pool, title, difficulty, &tags, None, Some(ECHO))
        .await
        .unwrap();
    ProblemRepository::add_test_case(pool, &problem.id, 0, "1", "1")
        .await
        .unwrap();
    ProblemRepository::add_test_case(pool, &problem.id, 1, "2", "2")
        .await
        .unwrap();
    problem
}

fn request(user: &User, problem: &Problem, code: &str, time: i32) -> SubmitSolutionRequest {
    SubmitSolutionRequest {
        user_id: user.id,
        problem_id: problem.id,
        code: code.to_string(),
        time_spent_seconds: time,
    }
}

#[tokio::test]
async fn test_profile_averages_accumulate() {
    let pool = pool().await;
    let user = user(&pool).await;

    ProfileRepository::record_attempt(&pool, &user.id, false, 40, 6)
        .await
        .unwrap();
    ProfileRepository::record_attempt(&pool, &user.id, true, 100, 0)
        .await
        .unwrap();
    let profile = ProfileRepository::record_attempt(&pool, &user.id, false, 40, 2)
        .await
        .unwrap();

    assert_eq!(profile.total_attempts, 3);
    assert_eq!(profile.total_solved, 1);
    assert_eq!(profile.avg_time_per_solve, 100.0);
    // 6 over one attempt, then 2 folded in as the third attempt
    assert!((profile.avg_edits - (6.0 * 2.0 + 2.0) / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_predictions_upsert_and_list_in_order() {
    let pool = pool().await;
    let user = user(&pool).await;
    let a = echo_problem(&pool, "Upsert A", "easy").await;
    let b = echo_problem(&pool, "Upsert B", "hard").await;

    PredictionRepository::upsert_all(&pool, &user.id, &[(a.id, 0.2), (b.id, 0.6)])
        .await
        .unwrap();
    PredictionRepository::upsert_all(&pool, &user.id, &[(a.id, 0.9)])
        .await
        .unwrap();

    let listed = PredictionRepository::list_for_user(&pool, &user.id)
        .await
        .unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|p| p.problem_id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
    assert_eq!(listed[0].pass_probability, 0.9);

    assert!(PredictionRepository::delete(&pool, &user.id, &a.id).await.unwrap());
    assert!(!PredictionRepository::delete(&pool, &user.id, &a.id).await.unwrap());
    assert!(
        PredictionRepository::find(&pool, &user.id, &a.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_accepted_problem_leaves_unsolved_list() {
    let pool = pool().await;
    let user = user(&pool).await;
    let problem = echo_problem(&pool, "Unsolved", "medium").await;

    SubmissionRepository::create(
        &pool,
        &user.id,
        &problem.id,
        "print(0)",
        SubmissionStatus::WrongAnswer,
        "Line 1: got '0' but expected '1'",
        10,
    )
    .await
    .unwrap();
    let unsolved = ProblemRepository::list_unsolved(&pool, &user.id).await.unwrap();
    assert!(unsolved.iter().any(|p| p.id == problem.id));

    SubmissionRepository::create(
        &pool,
        &user.id,
        &problem.id,
        ECHO,
        SubmissionStatus::Accepted,
        "All tests passed",
        30,
    )
    .await
    .unwrap();
    let unsolved = ProblemRepository::list_unsolved(&pool, &user.id).await.unwrap();
    assert!(unsolved.iter().all(|p| p.id != problem.id));
}

#[tokio::test]
async fn test_init_rejects_unknown_user() {
    let h = harness().await;
    let err = PredictionService::init_for_user(&h.pool, &h.models, &Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_wrong_answer_then_accepted() {
    let h = harness().await;
    let user = user(&h.pool).await;
    let target = echo_problem(&h.pool, "Echo target", "easy").await;
    let other = echo_problem(&h.pool, "Echo other", "medium").await;

    let rows = PredictionService::init_for_user(&h.pool, &h.models, &user.id)
        .await
        .unwrap();
    assert!(rows >= 2);
    let predicted = PredictionRepository::list_for_user(&h.pool, &user.id)
        .await
        .unwrap();
    assert_eq!(predicted.len(), rows);
    for problem in [&target, &other] {
        assert!(predicted.iter().any(|p| p.problem_id == problem.id));
    }

    let mut rng = StdRng::seed_from_u64(1);

    let failed = SubmissionService::submit_with_rng(
        h.pipeline(),
        request(&user, &target, "print(0)", 600),
        &mut rng,
    )
    .await
    .unwrap();
    assert_eq!(failed.status, SubmissionStatus::WrongAnswer);
    assert!((0.0..=1.0).contains(&failed.pass_probability_on_this));
    assert!(failed.recommendations.iter().all(|r| r.id != target.id));
    if failed.hint_given {
        assert_eq!(failed.hint, fallbacks::HINT);
    } else {
        assert!(failed.hint.is_empty());
    }

    let solved = SubmissionService::submit_with_rng(
        h.pipeline(),
        request(&user, &target, ECHO, 120),
        &mut rng,
    )
    .await
    .unwrap();
    assert_eq!(solved.status, SubmissionStatus::Accepted);
    assert_eq!(solved.pass_probability_on_this, 1.0);
    assert!(!solved.hint_given);
    assert!(
        PredictionRepository::find(&h.pool, &user.id, &target.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        PredictionRepository::find(&h.pool, &user.id, &other.id)
            .await
            .unwrap()
            .is_some()
    );

    let profile = ProfileRepository::find_by_user(&h.pool, &user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.total_attempts, 2);
    assert_eq!(profile.total_solved, 1);
    assert_eq!(profile.avg_time_per_solve, 120.0);
}

#[tokio::test]
async fn test_syntax_error_gets_no_hint() {
    let h = harness().await;
    let user = user(&h.pool).await;
    let problem = echo_problem(&h.pool, "Syntax target", "easy").await;

    let response = SubmissionService::submit_with_rng(
        h.pipeline(),
        request(&user, &problem, "def (", 900),
        &mut StdRng::seed_from_u64(3),
    )
    .await
    .unwrap();

    assert_eq!(response.status, SubmissionStatus::Syntax);
    assert!(!response.hint_given);
    assert!(response.hint.is_empty());
}

#[tokio::test]
async fn test_unknown_problem_is_input_error() {
    let h = harness().await;
    let user = user(&h.pool).await;

    let payload = SubmitSolutionRequest {
        user_id: user.id,
        problem_id: Uuid::new_v4(),
        code: ECHO.to_string(),
        time_spent_seconds: 0,
    };
    let err = SubmissionService::submit_with_rng(h.pipeline(), payload, &mut StdRng::seed_from_u64(4))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref m) if m == "Problem not found"));
}
