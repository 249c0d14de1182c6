//! Tracking a user's applications to jobs, with follow-up reminders.

pub mod domain;
pub mod repository;
pub mod router;
pub mod tracker;

pub use domain::{Application, ApplicationStatus};
pub use repository::{ApplicationRepository, InMemoryApplicationStore};
pub use router::{application_router, ApplicationDesk};
pub use tracker::{ApplicationError, ApplicationTracker, ReminderReport};
