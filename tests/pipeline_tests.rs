//! End-to-end pipeline tests with fake collaborators
//!
//! The measurement tool and the analysis service are replaced by in-process
//! fakes so every failure path can be driven deterministically.

use async_trait::async_trait;
use network_speed_reporter::{
    analysis::AnalysisClient,
    error::{AppError, ErrorKind, Result},
    executor::{CommandExecutor, ProcessRunner},
    models::{ApiResponse, Config, ProcessOutcome, TestResult},
    App,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const REFERENCE_STDOUT: &str =
    "Testing...\n{\"download\": 50000000, \"upload\": 10000000, \"ping\": 20.3}\n";

/// Executor that returns the same outcome for every call
struct FakeExecutor {
    outcome: ProcessOutcome,
    calls: Mutex<Vec<(String, Vec<String>, Duration)>>,
}

impl FakeExecutor {
    fn new(outcome: ProcessOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn exited(code: i32, stdout: &str, stderr: &str) -> Arc<Self> {
        Self::new(ProcessOutcome::completed(
            Some(code),
            stdout.to_string(),
            stderr.to_string(),
            Duration::from_millis(5),
        ))
    }
}

#[async_trait]
impl CommandExecutor for FakeExecutor {
    async fn execute(&self, command: &str, args: &[String], timeout: Duration) -> Result<ProcessOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), args.to_vec(), timeout));
        Ok(self.outcome.clone())
    }
}

/// Executor that cannot start anything
struct BrokenExecutor;

#[async_trait]
impl CommandExecutor for BrokenExecutor {
    async fn execute(&self, command: &str, _args: &[String], _timeout: Duration) -> Result<ProcessOutcome> {
        Err(AppError::spawn(command, "No such file or directory (os error 2)"))
    }
}

/// Executor that sleeps and records how many calls overlap
struct SlowExecutor {
    active: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl CommandExecutor for SlowExecutor {
    async fn execute(&self, _command: &str, _args: &[String], _timeout: Duration) -> Result<ProcessOutcome> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        Ok(ProcessOutcome::completed(
            Some(0),
            REFERENCE_STDOUT.to_string(),
            String::new(),
            Duration::from_millis(50),
        ))
    }
}

/// Analysis service that records prompts and answers with canned text
struct FakeAnalyzer {
    answer: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeAnalyzer {
    fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisClient for FakeAnalyzer {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer.clone().map_err(AppError::analysis)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn app_with(executor: Arc<dyn CommandExecutor>, analyzer: Arc<FakeAnalyzer>) -> App {
    App::new(Config::default(), ProcessRunner::new(executor), analyzer)
}

#[tokio::test]
async fn test_reference_scenario_succeeds() {
    let executor = FakeExecutor::exited(0, REFERENCE_STDOUT, "");
    let analyzer = FakeAnalyzer::answering("<p>Fine for browsing.</p>");
    let app = app_with(executor.clone(), analyzer.clone());

    let result = app.run_test(Some("Working from home".to_string())).await;

    match &result {
        TestResult::Success { metrics, context, analysis } => {
            assert_eq!(metrics.download, "50.0 Mbit/s");
            assert_eq!(metrics.upload, "10.0 Mbit/s");
            assert_eq!(metrics.ping, "20 ms");
            assert_eq!(context.as_str(), "Working from home");
            assert_eq!(analysis, "<p>Fine for browsing.</p>");
        }
        other => panic!("expected success, got {:?}", other),
    }
    assert_eq!(result.exit_code(), 0);

    let prompts = analyzer.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Download speed: 50.0 Mbit/s"));
    assert!(prompts[0].contains("User context: Working from home"));

    let calls = executor.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "speedtest");
    assert_eq!(calls[0].1, vec!["--json".to_string()]);
    assert_eq!(calls[0].2, Duration::from_secs(30));
}

#[tokio::test]
async fn test_missing_context_uses_default() {
    let analyzer = FakeAnalyzer::answering("ok");
    let app = app_with(FakeExecutor::exited(0, REFERENCE_STDOUT, ""), analyzer.clone());

    for context in [None, Some(String::new()), Some("   ".to_string())] {
        let result = app.run_test(context).await;
        let response = ApiResponse::from(&result);
        assert_eq!(response.data.unwrap().context, "I'm just browsing the web.");
    }

    assert!(analyzer
        .prompts()
        .iter()
        .all(|p| p.contains("User context: I'm just browsing the web.")));
}

#[tokio::test]
async fn test_last_structured_line_wins() {
    let stdout = "{\"download\": 1000000, \"upload\": 1000000, \"ping\": 5}\n\
                  retrying...\n\
                  {\"download\": 93456789, \"upload\": 0, \"ping\": 15000}\n\
                  done\n";
    let app = app_with(FakeExecutor::exited(0, stdout, ""), FakeAnalyzer::answering("ok"));

    let result = app.run_test(None).await;
    let metrics = result.metrics().expect("success");
    assert_eq!(metrics.download, "93.46 Mbit/s");
    assert_eq!(metrics.upload, "0.0 Mbit/s");
    assert_eq!(metrics.ping, "Error/Too high");
}

#[tokio::test]
async fn test_sentinels_flow_through() {
    let stdout = "{\"download\": 0.0, \"upload\": 3200000, \"ping\": 0}";
    let app = app_with(FakeExecutor::exited(0, stdout, ""), FakeAnalyzer::answering("ok"));

    let metrics = app.run_test(None).await.metrics().cloned().expect("success");
    assert_eq!(metrics.download, "Unavailable");
    assert_eq!(metrics.upload, "3.2 Mbit/s");
    assert_eq!(metrics.ping, "Error/Too high");
}

#[tokio::test]
async fn test_non_zero_exit_is_process_error_with_verbatim_output() {
    let stdout = "Retrieving speedtest.net configuration...\n";
    let stderr = "ERROR: Unable to connect to servers to test latency.\n";
    let analyzer = FakeAnalyzer::answering("unused");
    let app = app_with(FakeExecutor::exited(1, stdout, stderr), analyzer.clone());

    let result = app.run_test(None).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Process));
    let message = result.message().unwrap();
    assert!(message.contains("Exit code: 1"));
    assert!(message.contains("Retrieving speedtest.net configuration..."));
    assert!(message.contains("Unable to connect to servers"));

    let diagnostics = result.diagnostics().unwrap();
    assert_eq!(diagnostics.exit_code, Some(1));
    assert_eq!(diagnostics.stdout.as_deref(), Some(stdout));
    assert_eq!(diagnostics.stderr.as_deref(), Some(stderr));

    assert_eq!(result.exit_code(), 6);
    assert!(analyzer.prompts().is_empty());
}

#[tokio::test]
async fn test_deadline_is_timeout_error() {
    let executor = FakeExecutor::new(ProcessOutcome::timed_out(Duration::from_secs(30)));
    let app = app_with(executor, FakeAnalyzer::answering("unused"));

    let result = app.run_test(None).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Timeout));
    assert_eq!(
        result.message(),
        Some("The speed test did not complete within 30 seconds. Please try again.")
    );
    assert_eq!(ApiResponse::status_for(&result), 500);
}

#[tokio::test]
async fn test_no_structured_line_is_extraction_error() {
    let stdout = "Testing download speed...\nTesting upload speed...\n";
    let app = app_with(FakeExecutor::exited(0, stdout, "warn"), FakeAnalyzer::answering("unused"));

    let result = app.run_test(None).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Extraction));
    assert!(result.message().unwrap().contains("Testing upload speed..."));
    assert_eq!(result.diagnostics().unwrap().stdout.as_deref(), Some(stdout));
}

#[tokio::test]
async fn test_malformed_line_is_parse_error() {
    let app = app_with(
        FakeExecutor::exited(0, "{\"download\": \"fast\"}\n", ""),
        FakeAnalyzer::answering("unused"),
    );

    let result = app.run_test(None).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Parse));
    assert!(result.message().unwrap().contains("{\"download\": \"fast\"}"));
    assert_eq!(
        result.diagnostics().unwrap().raw_line.as_deref(),
        Some("{\"download\": \"fast\"}")
    );
}

#[tokio::test]
async fn test_spawn_failure_is_unknown_error() {
    let app = app_with(Arc::new(BrokenExecutor), FakeAnalyzer::answering("unused"));

    let result = app.run_test(None).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Unknown));
    assert!(result.message().unwrap().contains("No such file or directory"));
    assert_eq!(result.exit_code(), 99);
}

#[tokio::test]
async fn test_analysis_failure_is_unknown_error() {
    let app = app_with(
        FakeExecutor::exited(0, REFERENCE_STDOUT, ""),
        FakeAnalyzer::failing("HTTP 503"),
    );

    let result = app.run_test(None).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Unknown));
    assert!(result.message().unwrap().contains("HTTP 503"));

    let response = ApiResponse::from(&result);
    assert!(!response.success);
    assert!(response.data.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_gate_bounds_concurrent_measurements() {
    let executor = Arc::new(SlowExecutor {
        active: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let config = Config {
        max_concurrent: 2,
        ..Default::default()
    };
    let app = App::new(config, ProcessRunner::new(executor.clone()), FakeAnalyzer::answering("ok"));

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move { app.run_test(Some(format!("request {}", i))).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_success());
    }

    let peak = executor.peak.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 2, "peak concurrency was {}", peak);
    assert_eq!(app.gate().available(), 2);
}

#[cfg(unix)]
#[tokio::test]
async fn test_real_process_killed_at_deadline() {
    let config = Config {
        command: "sleep".to_string(),
        command_args: vec!["5".to_string()],
        timeout_seconds: 1,
        ..Default::default()
    };
    let app = App::new(config, ProcessRunner::system(), FakeAnalyzer::answering("unused"));

    let started = std::time::Instant::now();
    let result = app.run_test(None).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Timeout));
    assert!(started.elapsed() < Duration::from_secs(4));
}
