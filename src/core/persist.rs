//! Persisted wallet session hints.
//!
//! The connected flag and last account are written on connect and removed
//! on disconnect. They are display hints only: restoring a session still
//! requires the provider to report an authorized account.

use alloy_primitives::Address;

use crate::config::storage::{CONNECTED_ACCOUNT_KEY, WALLET_CONNECTED_KEY};
use crate::utils::dom;

pub trait SessionStore {
    fn save(&self, account: &Address);
    fn clear(&self);
    /// Last connected account, if the connected flag is set.
    fn load(&self) -> Option<Address>;
}

/// [`SessionStore`] backed by `window.localStorage`.
///
/// Storage failures (private mode, quota) are logged and otherwise ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageStore;

impl SessionStore for LocalStorageStore {
    fn save(&self, account: &Address) {
        let Some(storage) = dom::local_storage() else {
            log::debug!("localStorage unavailable; session not persisted");
            return;
        };
        let written = storage
            .set_item(WALLET_CONNECTED_KEY, "true")
            .and_then(|_| storage.set_item(CONNECTED_ACCOUNT_KEY, &account.to_string()));
        if written.is_err() {
            log::warn!("failed to persist wallet session");
        }
    }

    fn clear(&self) {
        let Some(storage) = dom::local_storage() else {
            log::debug!("localStorage unavailable; nothing to clear");
            return;
        };
        let removed = storage
            .remove_item(WALLET_CONNECTED_KEY)
            .and_then(|_| storage.remove_item(CONNECTED_ACCOUNT_KEY));
        if removed.is_err() {
            log::warn!("failed to clear persisted wallet session");
        }
    }

    fn load(&self) -> Option<Address> {
        let storage = dom::local_storage()?;
        let connected = storage.get_item(WALLET_CONNECTED_KEY).ok()??;
        if connected != "true" {
            return None;
        }
        storage
            .get_item(CONNECTED_ACCOUNT_KEY)
            .ok()??
            .parse()
            .ok()
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_clear_forgets_saved_account() {
        let account = Address::repeat_byte(0xaa);
        let store = LocalStorageStore;

        store.save(&account);
        assert_eq!(store.load(), Some(account));

        store.clear();
        assert_eq!(store.load(), None);
        let storage = dom::local_storage().unwrap();
        assert_eq!(storage.get_item(CONNECTED_ACCOUNT_KEY).unwrap(), None);
    }
}
