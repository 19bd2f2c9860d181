/*
    core_realm - Realm model and sharing operations

    Decides what "sharable" means for a list, derives tied realm ids, and
    implements the share / unshare / privatize / delete lifecycle on top
    of the store's transactions.
*/

pub mod manager;
pub mod manager_impl;
pub mod session;
pub mod state;
pub mod tied;

pub use manager::{ListManager, SharingManager};
pub use manager_impl::LocalListManager;
pub use session::Session;
pub use state::{SharingEvent, SharingState};
pub use tied::{is_sharable, tied_realm_id, TIED_REALM_PREFIX};
