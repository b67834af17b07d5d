//! # Accessor Configuration
//!
//! Runtime options for [`ThreadContext`](crate::accessor::ThreadContext).
//!
//! ## Environment Variables
//!
//! - `REGCTX_MISMATCH_POLICY`: `strict` (default) or `best-effort`

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{RegctxError, RegctxResult};

/// Environment variable read by [`AccessorConfig::from_env`].
pub const MISMATCH_POLICY_ENV: &str = "REGCTX_MISMATCH_POLICY";

/// What to do when the requested architecture may not be the one the thread runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MismatchPolicy
{
    /// Probe the thread first and refuse any other architecture
    ///
    /// The thread's state is never touched with a flavor it does not service.
    #[default]
    Strict,
    /// Pass the request to the kernel unchanged
    ///
    /// `ArchitectureMismatch` is reported only when the kernel refuses the flavor.
    BestEffort,
}

impl MismatchPolicy
{
    #[must_use]
    pub const fn as_str(self) -> &'static str
    {
        match self {
            MismatchPolicy::Strict => "strict",
            MismatchPolicy::BestEffort => "best-effort",
        }
    }
}

impl FromStr for MismatchPolicy
{
    type Err = RegctxError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(MismatchPolicy::Strict),
            "best-effort" | "best_effort" | "besteffort" | "lenient" => Ok(MismatchPolicy::BestEffort),
            _ => Err(RegctxError::InvalidConfig(format!(
                "unknown mismatch policy '{s}', use 'strict' or 'best-effort'"
            ))),
        }
    }
}

impl fmt::Display for MismatchPolicy
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.as_str())
    }
}

/// Options for thread-state access
///
/// ## Example
///
/// ```rust
/// use regctx_core::config::{AccessorConfig, MismatchPolicy};
///
/// let config = AccessorConfig::default().with_mismatch_policy(MismatchPolicy::BestEffort);
/// assert_eq!(config.mismatch_policy, MismatchPolicy::BestEffort);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessorConfig
{
    pub mismatch_policy: MismatchPolicy,
}

impl AccessorConfig
{
    /// Read the configuration from the environment, defaulting unset values
    ///
    /// ## Errors
    ///
    /// - `InvalidConfig`: a variable is set to a value that does not parse
    pub fn from_env() -> RegctxResult<Self>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// ## Errors
    ///
    /// - `InvalidConfig`: a variable is set to a value that does not parse
    pub fn from_lookup<F>(lookup: F) -> RegctxResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mismatch_policy = match lookup(MISMATCH_POLICY_ENV) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => MismatchPolicy::default(),
        };

        Ok(Self { mismatch_policy })
    }

    #[must_use]
    pub const fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self
    {
        self.mismatch_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_policy_parsing()
    {
        assert_eq!("strict".parse::<MismatchPolicy>(), Ok(MismatchPolicy::Strict));
        assert_eq!("Best-Effort".parse::<MismatchPolicy>(), Ok(MismatchPolicy::BestEffort));
        assert_eq!("best_effort".parse::<MismatchPolicy>(), Ok(MismatchPolicy::BestEffort));
        assert!(matches!("loose".parse::<MismatchPolicy>(), Err(RegctxError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_lookup_defaults_when_unset()
    {
        let config = AccessorConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.mismatch_policy, MismatchPolicy::Strict);

        let config = AccessorConfig::from_lookup(|_| Some("  ".to_string())).unwrap();
        assert_eq!(config.mismatch_policy, MismatchPolicy::Strict);
    }

    #[test]
    fn test_from_lookup_reads_policy()
    {
        let config = AccessorConfig::from_lookup(|key| (key == MISMATCH_POLICY_ENV).then(|| "best-effort".to_string())).unwrap();
        assert_eq!(config.mismatch_policy, MismatchPolicy::BestEffort);
    }

    #[test]
    fn test_from_lookup_rejects_garbage()
    {
        let err = AccessorConfig::from_lookup(|_| Some("sometimes".to_string())).unwrap_err();
        assert!(err.to_string().contains("sometimes"));
    }
}
