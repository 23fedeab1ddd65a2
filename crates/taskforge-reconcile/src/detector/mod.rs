//! Pure deadline detectors.
//!
//! Both detectors consume a flat snapshot plus an injected "now" and
//! return a decision; they never touch storage or the bus themselves.

pub mod overdue;
pub mod upcoming;

pub use overdue::OverdueDecision;
pub use upcoming::UpcomingDecision;
