//! Dispatcher configuration and default limits
//!
//! Limits bound the resources a single run may consume. They are not
//! statements about program shape: a legitimate program that loops longer
//! than `max_steps` simply faults with `StepBudgetExhausted`.

use super::RuntimeError;
use serde::{Deserialize, Serialize};

/// Default number of local slots
pub const DEFAULT_LOCALS_CAPACITY: usize = 256;

/// Default maximum number of live frames
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Default initial arena size in bytes
pub const DEFAULT_ARENA_CAPACITY: usize = 2048;

/// Where `Load` and `Store` find their slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalsModel {
    /// One register file shared by every frame of a run
    #[default]
    Shared,
    /// Each frame gets fresh, isolated locals
    PerFrame,
}

/// Runtime limits and behaviour switches for a [`Dispatcher`](super::Dispatcher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of local slots (the same for every frame)
    pub locals_capacity: usize,

    /// Shared register file or per-frame locals
    pub locals_model: LocalsModel,

    /// Maximum instructions per run; `None` is unbounded
    pub max_steps: Option<u64>,

    /// Maximum number of live frames, including the top-level frame
    pub max_call_depth: usize,

    /// Bytes reserved up front for the run's arena
    pub arena_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            locals_capacity: DEFAULT_LOCALS_CAPACITY,
            locals_model: LocalsModel::Shared,
            max_steps: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            arena_capacity: DEFAULT_ARENA_CAPACITY,
        }
    }
}

impl Config {
    /// Create a new configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the JSON is malformed or fails validation
    pub fn from_json(json: &str) -> Result<Self, RuntimeError> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| RuntimeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_locals_capacity(mut self, capacity: usize) -> Self {
        self.locals_capacity = capacity;
        self
    }

    pub fn with_locals_model(mut self, model: LocalsModel) -> Self {
        self.locals_model = model;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_arena_capacity(mut self, bytes: usize) -> Self {
        self.arena_capacity = bytes;
        self
    }

    /// Check that the limits describe a runnable machine
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `max_call_depth` is zero
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.max_call_depth == 0 {
            return Err(RuntimeError::InvalidConfig(
                "max_call_depth must allow the top-level frame".to_string(),
            ));
        }
        Ok(())
    }
}
