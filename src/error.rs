use thiserror::Error;

/// Contractual failures of a scoring run.
///
/// Malformed individual values never reach here; they degrade to neutral
/// defaults inside the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("No usable statistics in {records} input records")]
    MissingInputs { records: usize },

    #[error("Invalid scoring configuration:\n  - {}", .0.join("\n  - "))]
    InvalidConfig(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_lists_every_error() {
        let err = ScoreError::InvalidConfig(vec!["first".to_string(), "second".to_string()]);
        let message = err.to_string();
        assert!(message.contains("  - first"));
        assert!(message.contains("  - second"));
    }

    #[test]
    fn test_missing_inputs_message() {
        let err = ScoreError::MissingInputs { records: 3 };
        assert_eq!(err.to_string(), "No usable statistics in 3 input records");
    }
}
