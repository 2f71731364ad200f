//! Success-xor-failure container for collaborator calls.

use serde::Serialize;

use crate::envelope::HandlerResult;
use crate::error::HandlerError;

/// Result of a collaborating service call that did not fault: at most one of
/// the two arms is populated. A call-level fault is a separate
/// [`crate::error::ServiceError`], never an arm of this container.
#[derive(Debug, Clone)]
pub struct OperationResult<S, F> {
    /// The expected outcome.
    pub success: Option<S>,
    /// An expected business rejection.
    pub failure: Option<F>,
}

impl<S, F> OperationResult<S, F> {
    /// An operation result with the success arm populated.
    #[must_use]
    pub fn success(success: S) -> Self {
        Self {
            success: Some(success),
            failure: None,
        }
    }

    /// An operation result with the failure arm populated.
    #[must_use]
    pub fn failure(failure: F) -> Self {
        Self {
            success: None,
            failure: Some(failure),
        }
    }
}

/// Maps an operation result to exactly one outgoing topic+payload pair.
///
/// Both arms populated is a contract violation. Neither arm populated is
/// treated the same way: rejecting forces the dispatcher to leave the
/// inbound message for redelivery instead of silently dropping a saga's
/// continuation. The policy is uniform across every handler.
///
/// # Errors
///
/// Returns [`HandlerError::Contract`] when both or neither arm is populated.
pub fn map_operation_result<S: Serialize, F: Serialize>(
    result: OperationResult<S, F>,
    success_topic: &str,
    failure_topic: &str,
) -> Result<Vec<HandlerResult>, HandlerError> {
    match (result.success, result.failure) {
        (Some(_), Some(_)) => Err(HandlerError::Contract(
            "operation result populated both arms",
        )),
        (None, None) => Err(HandlerError::Contract(
            "operation result populated neither arm",
        )),
        (Some(success), None) => Ok(vec![HandlerResult::new(success_topic, &success)]),
        (None, Some(failure)) => Ok(vec![HandlerResult::new(failure_topic, &failure)]),
    }
}

/// Like [`map_operation_result`], but opts the success result into tenant
/// fan-out for `guild_id`. Failure results are never fanned out.
///
/// # Errors
///
/// Returns [`HandlerError::Contract`] when both or neither arm is populated.
pub fn map_operation_result_scoped<S: Serialize, F: Serialize>(
    result: OperationResult<S, F>,
    success_topic: &str,
    failure_topic: &str,
    guild_id: &str,
) -> Result<Vec<HandlerResult>, HandlerError> {
    match (result.success, result.failure) {
        (Some(_), Some(_)) => Err(HandlerError::Contract(
            "operation result populated both arms",
        )),
        (None, None) => Err(HandlerError::Contract(
            "operation result populated neither arm",
        )),
        (Some(success), None) => {
            Ok(vec![
                HandlerResult::new(success_topic, &success).guild_scoped(guild_id),
            ])
        }
        (None, Some(failure)) => Ok(vec![HandlerResult::new(failure_topic, &failure)]),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::{map_operation_result, map_operation_result_scoped, OperationResult};
    use crate::error::HandlerError;

    #[derive(Serialize)]
    struct Ok1 {
        id: u32,
    }

    #[derive(Serialize)]
    struct Err1 {
        error: String,
    }

    #[test]
    fn test_success_arm_maps_to_success_topic() {
        let result: OperationResult<Ok1, Err1> = OperationResult::success(Ok1 { id: 1 });

        let results = map_operation_result(result, "ok.topic", "err.topic").unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, "ok.topic");
        assert!(results[0].guild_scope.is_none());
    }

    #[test]
    fn test_failure_arm_maps_to_failure_topic() {
        let result: OperationResult<Ok1, Err1> = OperationResult::failure(Err1 {
            error: "rejected".to_owned(),
        });

        let results = map_operation_result(result, "ok.topic", "err.topic").unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, "err.topic");
    }

    #[test]
    fn test_both_arms_is_a_contract_violation() {
        let result = OperationResult {
            success: Some(Ok1 { id: 1 }),
            failure: Some(Err1 {
                error: "also".to_owned(),
            }),
        };

        let err = map_operation_result(result, "ok.topic", "err.topic").unwrap_err();
        assert!(matches!(err, HandlerError::Contract(_)));
    }

    #[test]
    fn test_neither_arm_is_a_contract_violation() {
        let result: OperationResult<Ok1, Err1> = OperationResult {
            success: None,
            failure: None,
        };

        let err = map_operation_result(result, "ok.topic", "err.topic").unwrap_err();
        assert!(matches!(err, HandlerError::Contract(_)));
    }

    #[test]
    fn test_scoped_mapping_fans_out_success_only() {
        let ok: OperationResult<Ok1, Err1> = OperationResult::success(Ok1 { id: 1 });
        let results = map_operation_result_scoped(ok, "ok.topic", "err.topic", "g1").unwrap();
        assert_eq!(results[0].guild_scope.as_deref(), Some("g1"));

        let err: OperationResult<Ok1, Err1> = OperationResult::failure(Err1 {
            error: "rejected".to_owned(),
        });
        let results = map_operation_result_scoped(err, "ok.topic", "err.topic", "g1").unwrap();
        assert!(results[0].guild_scope.is_none());
    }
}
