//! Ports the service layer depends on

mod cache;
mod repositories;

pub use cache::KeyValueCache;
pub use repositories::{
    OtpHistoryRepository, RepoResult, RoleExtensionRepository, UserRepository,
};
