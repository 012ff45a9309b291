//! Fixture runner and statistics

use std::path::Path;

use sevm_evm::{Evm, EvmConfig, ExecutionResult, WorldState};

use crate::error::{FixtureError, FixtureResult};
use crate::report::{word_to_hex, ExecutionReport};
use crate::types::{Expectation, Fixture, FixtureFile, FixtureInput};

/// Aggregated fixture statistics
#[derive(Debug, Default)]
pub struct FixtureStats {
    /// Fixtures executed
    pub total: usize,
    /// Fixtures passed
    pub passed: usize,
    /// Fixtures failed
    pub failed: usize,
    /// Failed fixture names with reasons
    pub failures: Vec<(String, String)>,
}

impl FixtureStats {
    /// Create empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass rate as percentage
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.passed as f64 / self.total as f64) * 100.0
    }

    /// Whether every fixture passed
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, name: &str, outcome: FixtureResult<()>) {
        self.total += 1;
        match outcome {
            Ok(()) => self.passed += 1,
            Err(e) => {
                self.failed += 1;
                self.failures.push((name.to_string(), e.to_string()));
            }
        }
    }
}

/// Runs fixtures through the engine and compares against expectations
#[derive(Debug, Default)]
pub struct FixtureRunner {
    evm: Evm,
}

impl FixtureRunner {
    /// Create a runner with the given engine limits
    pub fn new(config: EvmConfig) -> Self {
        Self {
            evm: Evm::new(config),
        }
    }

    /// Parse a fixture array from a file
    pub fn load_file(path: &Path) -> FixtureResult<FixtureFile> {
        let content = std::fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Parse a fixture array from a JSON string
    pub fn load_str(json: &str) -> FixtureResult<FixtureFile> {
        Ok(serde_json::from_str(json)?)
    }

    /// Run every fixture in a file
    pub fn run_file(&self, path: &Path) -> FixtureResult<FixtureStats> {
        tracing::info!(path = %path.display(), "running fixtures");
        let fixtures = Self::load_file(path)?;
        Ok(self.run_all(&fixtures))
    }

    /// Run every fixture in a JSON string
    pub fn run_str(&self, json: &str) -> FixtureResult<FixtureStats> {
        let fixtures = Self::load_str(json)?;
        Ok(self.run_all(&fixtures))
    }

    /// Run a batch of fixtures, collecting statistics
    pub fn run_all(&self, fixtures: &[Fixture]) -> FixtureStats {
        let mut stats = FixtureStats::new();
        for fixture in fixtures {
            let outcome = self.run_fixture(fixture);
            match &outcome {
                Ok(()) => tracing::info!("PASS: {}", fixture.name),
                Err(e) if fixture.hint.is_empty() => tracing::warn!("FAIL: {} - {}", fixture.name, e),
                Err(e) => tracing::warn!("FAIL: {} - {} (hint: {})", fixture.name, e, fixture.hint),
            }
            stats.record(&fixture.name, outcome);
        }
        tracing::info!(
            total = stats.total,
            passed = stats.passed,
            failed = stats.failed,
            "fixtures done"
        );
        stats
    }

    /// Run one fixture and check its expectation
    pub fn run_fixture(&self, fixture: &Fixture) -> FixtureResult<()> {
        let (result, _) = self.execute(fixture.input.clone())?;
        check(&fixture.expect, &result)
    }

    /// Run a fixture input and return the raw result with the final state
    pub fn execute(&self, input: FixtureInput) -> FixtureResult<(ExecutionResult, WorldState)> {
        let (code, env, mut state) = input.into_parts()?;
        let result = self.evm.transact(code, &env, &mut state);
        Ok((result, state))
    }

    /// Run a fixture input and encode the outcome
    pub fn report(&self, input: FixtureInput) -> FixtureResult<ExecutionReport> {
        let (result, state) = self.execute(input)?;
        Ok(ExecutionReport::from_result(&result, &state))
    }
}

/// Compare a result against the fields present in `expect`
fn check(expect: &Expectation, result: &ExecutionResult) -> FixtureResult<()> {
    if let Some(success) = expect.success {
        if result.is_success() != success {
            return Err(FixtureError::Assertion(format!(
                "success mismatch: expected {}, got {} ({:?})",
                success,
                result.is_success(),
                result.status
            )));
        }
    }

    if let Some(stack) = &expect.stack {
        let expected: Vec<_> = stack.iter().map(|w| w.0).collect();
        if expected != result.stack {
            return Err(FixtureError::Assertion(format!(
                "stack mismatch: expected {:?}, got {:?}",
                expected.iter().map(word_to_hex).collect::<Vec<_>>(),
                result.stack.iter().map(word_to_hex).collect::<Vec<_>>()
            )));
        }
    }

    if let Some(logs) = &expect.logs {
        if logs.len() != result.logs.len() {
            return Err(FixtureError::Assertion(format!(
                "log count mismatch: expected {}, got {}",
                logs.len(),
                result.logs.len()
            )));
        }
        for (i, (want, got)) in logs.iter().zip(&result.logs).enumerate() {
            let topics: Vec<_> = got.topics.iter().map(|t| t.into_bytes()).collect();
            let want_topics: Vec<_> = want.topics.iter().map(|t| t.0).collect();
            if want.address != got.address || want.data.0 != got.data || want_topics != topics {
                return Err(FixtureError::Assertion(format!(
                    "log {} mismatch: expected {:?}, got {:?}",
                    i, want, got
                )));
            }
        }
    }

    if let Some(data) = &expect.return_data {
        if data.0 != result.output {
            return Err(FixtureError::Assertion(format!(
                "return mismatch: expected {}, got {}",
                hex::encode(&data.0),
                hex::encode(&result.output)
            )));
        }
    }

    Ok(())
}
