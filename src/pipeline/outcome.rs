// src/pipeline/outcome.rs

/// Result of a degrading stage: the stage always yields a usable value, but
/// records when that value is a fallback rather than the real output.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Success(T),
    Degraded { value: T, reason: String },
}

impl<T> StageOutcome<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        StageOutcome::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn into_value(self) -> T {
        match self {
            StageOutcome::Success(value) => value,
            StageOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_value_unwraps_both_variants() {
        assert_eq!(StageOutcome::Success(1).into_value(), 1);
        assert_eq!(StageOutcome::degraded(2, "fallback").into_value(), 2);
    }

    #[test]
    fn degraded_is_flagged() {
        assert!(StageOutcome::degraded((), "reason").is_degraded());
        assert!(!StageOutcome::Success(()).is_degraded());
    }
}
