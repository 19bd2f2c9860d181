/*
    Scenario tests - Sharing lifecycle, convergence, transactions,
    persistence

    Exercises the managers and the sync surface together, the way an
    application and its sync service would.
*/

pub mod convergence_tests;
pub mod transaction_tests;

use crate::core_realm::{LocalListManager, Session};
use crate::core_store::model::{DeviceId, UserId};
use crate::core_store::sync::Replica;

/// A manager over a fresh in-memory replica
pub fn manager_for(user: &str, device: &str) -> LocalListManager {
    let session = Session::new(UserId::new(user), DeviceId::new(device));
    LocalListManager::new(Replica::in_memory(session.device.clone()), session)
}

/// Two devices of the same user, each with an independent replica
pub fn device_pair(user: &str) -> (LocalListManager, LocalListManager) {
    (
        manager_for(user, &format!("{}-laptop", user)),
        manager_for(user, &format!("{}-phone", user)),
    )
}
