pub mod clock;
pub mod services;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use tracker::{BudgetTracker, RefreshReport};
