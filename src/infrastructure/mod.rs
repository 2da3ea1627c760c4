//! Infrastructure layer - services, repositories and external clients

pub mod api_key;
pub mod audit;
pub mod logging;
pub mod observability;
pub mod registration;
pub mod storage;
pub mod usage;
pub mod user;
pub mod vault;
