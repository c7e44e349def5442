//! Shared database hosting for member and society accounts.
//!
//! The facility runs one MySQL and one PostgreSQL cluster; accounts get
//! a cluster login named after them and databases named `account` or
//! `account/suffix`. [`DbCluster`] abstracts over the two engines so
//! the job runner can treat them uniformly; [`MysqlCluster`] and
//! [`PgCluster`] hold an admin connection pool each.
//!
//! DDL statements cannot take bind parameters, so identifiers and
//! password literals are quoted by the helpers in [`ident`] before the
//! statement text is assembled.

pub mod cluster;
pub mod error;
pub mod ident;
pub mod mysql;
pub mod postgres;

pub use cluster::DbCluster;
pub use error::ProvisionError;
pub use mysql::MysqlCluster;
pub use postgres::PgCluster;
