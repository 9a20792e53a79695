//! Compiler configuration

use super::error::{Error, Result};
use crate::codegen::defs::major_versions;

/// Environment variable holding extra known type names, colon separated
pub const KNOWN_TYPES_ENV: &str = "GETSET_KNOWN_TYPES";

/// Configuration settings for a compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Class file major version written into the header
    pub major_version: u16,
    /// Run the class file verifier before returning bytes
    pub verify: bool,
    /// Qualified type names accepted in addition to the platform catalog
    pub known_types: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            major_version: major_versions::JAVA_7,
            verify: true,
            known_types: Vec::new(),
        }
    }
}

impl Config {
    /// Lowest major version that carries StackMapTable frames
    pub const MIN_MAJOR_VERSION: u16 = major_versions::JAVA_6_0;
    /// Highest major version this compiler writes
    pub const MAX_MAJOR_VERSION: u16 = major_versions::JAVA_21;

    /// Add known types listed in `GETSET_KNOWN_TYPES`
    pub fn with_env_known_types(mut self) -> Self {
        if let Ok(value) = std::env::var(KNOWN_TYPES_ENV) {
            self.known_types.extend(split_known_types(&value));
        }
        self
    }

    /// Add a single known type
    pub fn with_known_type(mut self, name: impl Into<String>) -> Self {
        self.known_types.push(name.into());
        self
    }

    /// Check the settings before a compile uses them
    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_MAJOR_VERSION..=Self::MAX_MAJOR_VERSION).contains(&self.major_version) {
            return Err(Error::config_error(format!(
                "unsupported class file major version {} (expected {}..={})",
                self.major_version,
                Self::MIN_MAJOR_VERSION,
                Self::MAX_MAJOR_VERSION
            )));
        }
        Ok(())
    }
}

fn split_known_types(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
