//! Employee directory domain: the persistence-gateway contract and the
//! business-rule layer between the HTTP surface and the store.

pub mod error;
pub mod service;
pub mod store;

pub use error::{ServiceError, ServiceResult};
pub use service::{DirectoryService, EmployeeDirectory};
pub use store::{EmployeeStore, SeaOrmEmployeeStore};
