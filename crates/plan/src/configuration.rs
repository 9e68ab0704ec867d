//! Configuration: the set of plans handed to the engine.

use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::plan::Plan;
use crate::validate::validate_configuration;

/// Name of the plan that always runs last and is always allowed to fail.
pub const PLAN_CLOSING: &str = "close";

/// An ordered list of plan names plus their definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Plans to run, in order.
    pub plan_names: Vec<String>,
    /// Plan definitions keyed by name.
    pub plans: HashMap<String, Plan>,
}

impl Configuration {
    /// Parse a configuration from a JSON string without validating it.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse a configuration from a JSON reader without validating it.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse and validate a configuration.
    ///
    /// `exec_exists` reports whether an exec name is registered.
    pub fn load<R, F>(reader: R, exec_exists: F) -> Result<Self, ConfigError>
    where
        R: Read,
        F: Fn(&str) -> bool,
    {
        let config = Self::from_json_reader(reader)?;
        let errors = validate_configuration(&config, exec_exists);
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Look up a plan by name.
    #[must_use]
    pub fn plan(&self, name: &str) -> Option<&Plan> {
        self.plans.get(name)
    }

    /// Add or replace a plan and append its name to the run order.
    #[must_use]
    pub fn with_plan(mut self, name: impl Into<String>, plan: Plan) -> Self {
        let name = name.into();
        if !self.plan_names.contains(&name) {
            self.plan_names.push(name.clone());
        }
        self.plans.insert(name, plan);
        self
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
