//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-row writes that must
//! succeed or fail together open their own transaction.

pub mod observation_repo;
pub mod prerequisite_repo;
pub mod progress_report_repo;
pub mod proposal_repo;
pub mod role_repo;
pub mod student_repo;
pub mod user_repo;

pub use observation_repo::ObservationRepo;
pub use prerequisite_repo::PrerequisiteRepo;
pub use progress_report_repo::ProgressReportRepo;
pub use proposal_repo::ProposalRepo;
pub use role_repo::RoleRepo;
pub use student_repo::StudentRepo;
pub use user_repo::UserRepo;
