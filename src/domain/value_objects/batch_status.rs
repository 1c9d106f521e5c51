use serde::{Deserialize, Serialize};

/// Lifecycle of an embedding batch. A batch starts `Pending` while its
/// chunks are embedded and ends either `Complete` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Pending,
    Complete,
    Failed,
}

impl BatchStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, BatchStatus::Pending)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, BatchStatus::Complete)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchStatus::Failed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchStatus::Complete | BatchStatus::Failed)
    }

    pub fn can_transition_to(&self, new_status: &BatchStatus) -> bool {
        matches!(
            (self, new_status),
            (BatchStatus::Pending, BatchStatus::Complete) | (BatchStatus::Pending, BatchStatus::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Pending => "pending",
            BatchStatus::Complete => "complete",
            BatchStatus::Failed => "failed",
        }
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(BatchStatus::Pending),
            "complete" | "completed" => Ok(BatchStatus::Complete),
            "failed" => Ok(BatchStatus::Failed),
            _ => Err(format!("Invalid batch status: {}", s)),
        }
    }
}

impl Default for BatchStatus {
    fn default() -> Self {
        BatchStatus::Pending
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_checks() {
        assert!(BatchStatus::Pending.is_pending());
        assert!(BatchStatus::Complete.is_complete());
        assert!(BatchStatus::Failed.is_failed());

        assert!(!BatchStatus::Pending.is_terminal());
        assert!(BatchStatus::Complete.is_terminal());
        assert!(BatchStatus::Failed.is_terminal());
    }

    #[test]
    fn test_transitions() {
        assert!(BatchStatus::Pending.can_transition_to(&BatchStatus::Complete));
        assert!(BatchStatus::Pending.can_transition_to(&BatchStatus::Failed));

        assert!(!BatchStatus::Complete.can_transition_to(&BatchStatus::Failed));
        assert!(!BatchStatus::Failed.can_transition_to(&BatchStatus::Complete));
        assert!(!BatchStatus::Complete.can_transition_to(&BatchStatus::Pending));
    }

    #[test]
    fn test_string_conversion() {
        for status in [BatchStatus::Pending, BatchStatus::Complete, BatchStatus::Failed] {
            let parsed = BatchStatus::from_string(status.as_str()).unwrap();
            assert_eq!(status, parsed);
        }
        assert_eq!(
            BatchStatus::from_string("Completed").unwrap(),
            BatchStatus::Complete
        );
        assert!(BatchStatus::from_string("processing").is_err());
    }
}
