pub mod config;
pub mod core_realm;
pub mod core_store;
pub mod logging;

pub use config::Config;
pub use core_realm::{
    tied_realm_id, ListManager, LocalListManager, Session, SharingManager, SharingState,
};
pub use core_store::model::{DeviceId, ItemId, ListId, MemberId, RealmId, UserId};
pub use core_store::store::{StoreError, StoreResult};
pub use core_store::sync::Replica;
pub use logging::{init_logging, LogLevel};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Ensure the main exports are accessible
        let _ = LogLevel::Info;
        let _ = SharingState::Private;
    }
}
