//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must run
//! inside a caller-owned transaction take `&mut PgConnection` instead.

pub mod department_repo;
pub mod instance_repo;
pub mod node_repo;
pub mod role_repo;
pub mod stats_repo;
pub mod template_repo;
pub mod transition_repo;
pub mod user_repo;

pub use department_repo::DepartmentRepo;
pub use instance_repo::InstanceRepo;
pub use node_repo::NodeRepo;
pub use role_repo::RoleRepo;
pub use stats_repo::StatsRepo;
pub use template_repo::TemplateRepo;
pub use transition_repo::TransitionRepo;
pub use user_repo::UserRepo;
