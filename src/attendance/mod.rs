pub mod clock;
pub mod evaluator;
pub mod scheduler;

pub use clock::{Clock, SystemClock};
pub use evaluator::AttendanceEvaluator;
pub use scheduler::AutoAbsentScheduler;
