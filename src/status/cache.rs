use std::collections::HashMap;

use parking_lot::RwLock;

use super::EagleStatus;

/// Latest [`EagleStatus`] per device id.
///
/// Entries are written only by the dispatcher and are never expired; a stale
/// entry stays until the device reports again.
#[derive(Debug, Default)]
pub struct StatusCache {
    eagles: RwLock<HashMap<u64, EagleStatus>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, status: EagleStatus) -> Option<EagleStatus> {
        self.eagles.write().insert(status.device_id(), status)
    }

    pub fn get(&self, device_id: u64) -> Option<EagleStatus> {
        self.eagles.read().get(&device_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.eagles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.eagles.read().is_empty()
    }
}
