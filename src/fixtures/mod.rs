//! Fixture utilities for the deterministic CLI harness.
//!
//! This module discovers fixture recordings, decodes them, parses optional
//! expectation JSON, and runs the analysis pipeline against them. It backs
//! the `fixture` and `dump-fixtures` CLI commands used in CI.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::{analyze_with, Analysis, Category, ClassificationResult, FeatureExtractor};
use crate::audio::{self, Waveform};
use crate::config::{AppConfig, InputConfig};

/// Default location for fixture audio/JSON assets.
pub const DEFAULT_FIXTURE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

/// Metadata describing an available fixture.
#[derive(Clone, Debug)]
pub struct FixtureMetadata {
    pub name: String,
    pub audio_path: PathBuf,
    pub expect_path: Option<PathBuf>,
}

/// Loaded fixture data with the decoded waveform.
pub struct FixtureData {
    pub metadata: FixtureMetadata,
    pub waveform: Waveform,
    pub expectations: Option<FixtureExpectations>,
}

/// JSON expectation schema for fixture verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureExpectations {
    pub category: Category,
    /// Expected confidence percentage; unchecked when absent
    #[serde(default)]
    pub confidence: Option<u8>,
    /// Allowed confidence deviation in percentage points
    #[serde(default = "default_tolerance")]
    pub tolerance: u8,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_tolerance() -> u8 {
    5
}

impl FixtureExpectations {
    pub fn verify(&self, actual: &ClassificationResult) -> std::result::Result<(), ExpectationDiff> {
        let mut failures = Vec::new();

        if actual.category != self.category {
            failures.push(ExpectationFailure {
                field: "category",
                expected: serde_json::json!(self.category),
                actual: serde_json::json!(actual.category),
                delta: None,
            });
        }

        if let Some(expected) = self.confidence {
            let delta = expected.abs_diff(actual.confidence);
            if delta > self.tolerance {
                failures.push(ExpectationFailure {
                    field: "confidence",
                    expected: serde_json::json!(expected),
                    actual: serde_json::json!(actual.confidence),
                    delta: Some(delta),
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExpectationDiff { failures })
        }
    }
}

/// Outcome of comparing an actual result with expectations.
#[derive(Debug)]
pub struct ExpectationDiff {
    pub failures: Vec<ExpectationFailure>,
}

impl ExpectationDiff {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "failures": self.failures })
    }
}

/// Detailed diff entry for a single mismatching field.
#[derive(Debug, Serialize)]
pub struct ExpectationFailure {
    pub field: &'static str,
    pub expected: serde_json::Value,
    pub actual: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<u8>,
}

/// Catalog responsible for discovering fixtures on disk.
pub struct FixtureCatalog {
    root: PathBuf,
    input: InputConfig,
}

impl FixtureCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            input: InputConfig::default(),
        }
    }

    /// Use custom acceptance rules when discovering and decoding fixtures.
    pub fn with_input_config(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List all fixtures by their metadata.
    pub fn discover(&self) -> Result<Vec<FixtureMetadata>> {
        let mut fixtures = Vec::new();
        if !self.root.exists() {
            return Ok(fixtures);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let path = entry.path();
                let accepted = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| self.input.allows_extension(ext));
                if accepted {
                    fixtures.push(self.metadata_for_path(&path)?);
                }
            }
        }

        fixtures.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fixtures)
    }

    /// Load fixture waveform + expectations for provided name or path.
    pub fn load(&self, fixture: &str, override_expect: Option<PathBuf>) -> Result<FixtureData> {
        let audio_path = self.resolve_fixture_path(fixture)?;
        let metadata = self.metadata_for_path(&audio_path)?;
        let waveform = audio::load(&audio_path, &self.input)
            .with_context(|| format!("decoding fixture {}", audio_path.display()))?;

        let expectation_path = override_expect.or(metadata.expect_path.clone());
        let expectations = match expectation_path {
            Some(path) => {
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("reading expectation {}", path.display()))?;
                Some(
                    serde_json::from_str(&json)
                        .with_context(|| format!("parsing {}", path.display()))?,
                )
            }
            None => None,
        };

        Ok(FixtureData {
            metadata,
            waveform,
            expectations,
        })
    }

    fn resolve_fixture_path(&self, fixture: &str) -> Result<PathBuf> {
        let as_path = Path::new(fixture);
        if as_path.is_file() {
            return Ok(as_path.to_path_buf());
        }

        self.input
            .allowed_extensions
            .iter()
            .map(|ext| self.root.join(format!("{fixture}.{ext}")))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                anyhow!(
                    "Fixture '{fixture}' not found in {}",
                    self.root.display()
                )
            })
    }

    fn metadata_for_path(&self, audio_path: &Path) -> Result<FixtureMetadata> {
        let name = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("Invalid fixture name for {}", audio_path.display()))?
            .to_string();
        let expect_path = audio_path.with_extension("expect.json");
        Ok(FixtureMetadata {
            name,
            audio_path: audio_path.to_path_buf(),
            expect_path: expect_path.exists().then_some(expect_path),
        })
    }
}

impl Default for FixtureCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_FIXTURE_ROOT)
    }
}

/// Executes fixtures by feeding decoded waveforms through the analysis pipeline.
pub struct FixtureProcessor {
    app_config: AppConfig,
}

impl FixtureProcessor {
    pub fn new(app_config: AppConfig) -> Self {
        Self { app_config }
    }

    pub fn run(&self, data: &FixtureData) -> Result<Analysis> {
        let waveform = &data.waveform;
        let extractor = FeatureExtractor::with_config(waveform.sample_rate, &self.app_config.features)
            .with_context(|| format!("preparing extractor for {}", data.metadata.name))?;
        analyze_with(&extractor, &waveform.samples)
            .with_context(|| format!("analyzing fixture {}", data.metadata.name))
    }
}
