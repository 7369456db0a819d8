/// Small resilience primitives shared by cache and bus callers:
/// deadline-bounded calls and bounded polling for lease contention.
pub mod poll;
pub mod timeout;

pub use poll::{poll_until, PollConfig};
pub use timeout::{with_timeout, with_timeout_result, TimeoutError};
