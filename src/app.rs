//! Request-scoped pipeline orchestration

use crate::{
    analysis::{AnalysisClient, GeminiClient},
    error::{ErrorClassifier, Result},
    executor::{MeasurementGate, ProcessRunner},
    logging::{ErrorEventLogger, MeasurementLogger},
    models::{AnalysisContext, Config, NormalizedMetrics, TestResult},
    pipeline::{MetricNormalizer, MetricParser, OutputExtractor, ResultAssembler},
};
use std::sync::Arc;
use std::time::Instant;

/// Runs one measurement request from process spawn to final result
///
/// Cloning is cheap and clones share the admission gate, so a host can hand
/// a clone to every concurrent request.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

struct AppInner {
    config: Config,
    runner: ProcessRunner,
    analyzer: Arc<dyn AnalysisClient>,
    gate: MeasurementGate,
    measurement_log: MeasurementLogger,
    error_log: ErrorEventLogger,
}

impl App {
    /// Assemble an application from explicitly constructed parts
    pub fn new(config: Config, runner: ProcessRunner, analyzer: Arc<dyn AnalysisClient>) -> Self {
        let gate = MeasurementGate::new(config.max_concurrent);
        let measurement_log = MeasurementLogger::new(&config);
        let error_log = ErrorEventLogger::new(&config);

        Self {
            inner: Arc::new(AppInner {
                config,
                runner,
                analyzer,
                gate,
                measurement_log,
                error_log,
            }),
        }
    }

    /// Validate the configuration and build the real subprocess runner and
    /// Gemini client
    ///
    /// A missing API key fails here, before any request is served.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let analyzer = GeminiClient::new(&config)?;
        Ok(Self::new(config, ProcessRunner::system(), Arc::new(analyzer)))
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn gate(&self) -> &MeasurementGate {
        &self.inner.gate
    }

    /// Run one measurement and return its terminal result
    ///
    /// Never fails: every error is classified into [`TestResult::Failure`].
    pub async fn run_test(&self, context: Option<String>) -> TestResult {
        let started = Instant::now();
        let log = &self.inner.measurement_log;
        let correlation_id = log.logger().start_operation("run_test").await;

        let result = match self.measure(context, &correlation_id).await {
            Ok(result) => result,
            Err(error) => {
                self.inner
                    .error_log
                    .log_error(&error, Some("Measurement request failed"), Some(&correlation_id))
                    .await;
                ErrorClassifier::classify(&error)
            }
        };

        log.log_result(&result, started.elapsed(), &correlation_id).await;
        log.logger()
            .end_operation(&correlation_id, "run_test", result.is_success())
            .await;

        result
    }

    async fn measure(&self, context: Option<String>, correlation_id: &str) -> Result<TestResult> {
        let context = AnalysisContext::new(context, &self.inner.config.default_context);
        let metrics = self.measure_metrics(correlation_id).await?;

        let request = ResultAssembler::assemble(metrics, context);

        let analysis_started = Instant::now();
        let analysis = self.inner.analyzer.generate(&request.prompt).await;
        self.inner
            .measurement_log
            .log_analysis(
                self.inner.analyzer.name(),
                analysis_started.elapsed(),
                analysis.is_ok(),
                correlation_id,
            )
            .await;

        Ok(ResultAssembler::finalize(request, analysis?))
    }

    // The gate permit covers the process run through normalization and is
    // released before the analysis call.
    async fn measure_metrics(&self, correlation_id: &str) -> Result<NormalizedMetrics> {
        let log = &self.inner.measurement_log;
        let _permit = self.inner.gate.admit().await?;
        log.log_admitted(correlation_id, self.inner.gate.available()).await;

        let invocation = self.inner.config.invocation();
        log.log_invocation(&invocation, correlation_id).await;

        let outcome = self.inner.runner.run(&invocation).await?;
        log.log_outcome(&outcome, correlation_id).await;

        let line = OutputExtractor::extract(&outcome.stdout, &outcome.stderr)?;
        log.logger()
            .debug("Structured line located")
            .correlation_id(correlation_id)
            .field("line", &line)
            .log()
            .await;

        let raw = MetricParser::parse(&line)?;
        let normalized = MetricNormalizer::normalize(&raw);
        log.log_metrics(&raw, &normalized, correlation_id).await;

        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_api_key() {
        let config = Config::default();
        let error = App::from_config(config).err().unwrap();
        assert_eq!(error.category(), "CONFIG");
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let config = Config {
            timeout_seconds: 0,
            gemini_api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert!(App::from_config(config).is_err());
    }

    #[test]
    fn test_clones_share_gate() {
        let config = Config {
            max_concurrent: 3,
            gemini_api_key: Some("key".to_string()),
            ..Default::default()
        };
        let app = App::from_config(config).unwrap();
        let clone = app.clone();

        assert_eq!(clone.gate().capacity(), 3);
        assert!(Arc::ptr_eq(&app.inner, &clone.inner));
    }
}
