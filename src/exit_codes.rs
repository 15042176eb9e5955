//! Exit code constants for the buildgate CLI.
//!
//! Contention is reported apart from infrastructure failures so an operator
//! can tell "someone else is already building this" from "the lock backend
//! is unreachable":
//! - 0: Success
//! - 1: Lock already held (contention)
//! - 2: User error (bad args, malformed input, invalid config)
//! - 3: Lock store failure
//! - 4: Issue source failure
//! - 5: Dispatch failure (one or more events could not be sent)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// The requested lock is held by someone else.
pub const LOCK_HELD: i32 = 1;

/// User error: bad arguments, malformed identifiers, or invalid configuration.
pub const USER_ERROR: i32 = 2;

/// Lock store failure: I/O, corrupt records, unreachable backend.
pub const STORE_FAILURE: i32 = 3;

/// Issue source failure: unreadable snapshot or webhook event.
pub const SOURCE_FAILURE: i32 = 4;

/// Dispatch failure: at least one dispatch event could not be emitted.
pub const DISPATCH_FAILURE: i32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            LOCK_HELD,
            USER_ERROR,
            STORE_FAILURE,
            SOURCE_FAILURE,
            DISPATCH_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn acquire_contract_codes() {
        // `acquire` exits 0 on ACQUIRED and 1 on ALREADY_HELD.
        assert_eq!(SUCCESS, 0);
        assert_eq!(LOCK_HELD, 1);
    }
}
