//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Methods
//! that take part in a lifecycle transaction accept any [`sqlx::PgExecutor`]
//! so callers can pass either `&PgPool` or `&mut *tx`.

pub mod match_repo;
pub mod notification_repo;
pub mod package_repo;
pub mod payment_repo;
pub mod ride_repo;

pub use match_repo::MatchRepo;
pub use notification_repo::NotificationRepo;
pub use package_repo::PackageRepo;
pub use payment_repo::PaymentRepo;
pub use ride_repo::RideRepo;
