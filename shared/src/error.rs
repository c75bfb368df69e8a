use thiserror::Error;

/// Reasons [`reduce`](crate::reduce) refuses an event.
///
/// All of them are local to the event that caused them: the state passed in
/// is left as it was and the caller decides whether to log or drop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("player with name {0} is already logged in")]
    DuplicateParticipant(String),

    #[error("player with name {0} is not logged in")]
    UnknownParticipant(String),

    #[error("{0} is not a gesture that can be performed")]
    InvalidGesture(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_participant() {
        let err = StateError::DuplicateParticipant("Amy".to_string());
        assert_eq!(err.to_string(), "player with name Amy is already logged in");

        let err = StateError::UnknownParticipant("Kai".to_string());
        assert_eq!(err.to_string(), "player with name Kai is not logged in");

        let err = StateError::InvalidGesture("Moonwalk".to_string());
        assert!(err.to_string().contains("Moonwalk"));
    }
}
