//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept an executor as the first argument, so calls run equally
//! against the pool or inside a transaction.

pub mod domain_repo;
pub mod grant_repo;
pub mod https_cert_repo;
pub mod job_repo;
pub mod member_repo;
pub mod society_repo;

pub use domain_repo::DomainRepo;
pub use grant_repo::GrantRepo;
pub use https_cert_repo::HttpsCertRepo;
pub use job_repo::JobRepo;
pub use member_repo::MemberRepo;
pub use society_repo::SocietyRepo;
