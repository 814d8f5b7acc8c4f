pub const ENV_STEP_LIMIT: &str = "HOLE_VM_STEP_LIMIT";
pub const ENV_SEED: &str = "HOLE_VM_SEED";
pub const ENV_TRACE: &str = "HOLE_VM_TRACE";
pub const ENV_STRICT: &str = "HOLE_VM_STRICT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: expected an unsigned integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmConfig {
    /// Fault with `StepLimitExceeded` once this many instructions have run.
    /// `None` runs without bound.
    pub step_limit: Option<u64>,
    /// Seed for the memory address generator. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Record a [`crate::TraceStep`] for every executed instruction.
    pub trace: bool,
    /// Reject programs with statically detectable faults before running.
    pub strict: bool,
}

impl VmConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from an arbitrary variable source; unset variables keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let number = |var: &'static str| -> Result<Option<u64>, ConfigError> {
            match lookup(var) {
                None => Ok(None),
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| ConfigError::InvalidNumber { var, value: v }),
            }
        };
        Ok(Self {
            step_limit: number(ENV_STEP_LIMIT)?,
            seed: number(ENV_SEED)?,
            trace: lookup(ENV_TRACE).map(|v| truthy(&v)).unwrap_or(false),
            strict: lookup(ENV_STRICT).map(|v| truthy(&v)).unwrap_or(false),
        })
    }

    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

fn truthy(v: &str) -> bool {
    matches!(v, "1" | "true" | "TRUE" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = VmConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, VmConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let cfg = VmConfig::from_lookup(lookup(&[
            (ENV_STEP_LIMIT, "1000"),
            (ENV_SEED, " 42 "),
            (ENV_TRACE, "yes"),
            (ENV_STRICT, "1"),
        ]))
        .unwrap();
        assert_eq!(cfg.step_limit, Some(1000));
        assert_eq!(cfg.seed, Some(42));
        assert!(cfg.trace);
        assert!(cfg.strict);
    }

    #[test]
    fn unknown_flag_values_are_false() {
        let cfg = VmConfig::from_lookup(lookup(&[(ENV_TRACE, "maybe")])).unwrap();
        assert!(!cfg.trace);
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = VmConfig::from_lookup(lookup(&[(ENV_STEP_LIMIT, "-5")])).unwrap_err();
        assert!(err.to_string().contains(ENV_STEP_LIMIT));
    }

    #[test]
    fn builders_override() {
        let cfg = VmConfig::default()
            .with_step_limit(10)
            .with_seed(1)
            .with_trace(true)
            .with_strict(true);
        assert_eq!(cfg.step_limit, Some(10));
        assert_eq!(cfg.seed, Some(1));
        assert!(cfg.trace && cfg.strict);
    }
}
