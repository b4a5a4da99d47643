//! Opaque wallet handles

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};
use uuid::Uuid;

use wallet_standard::IdentifierString;

pub(crate) struct HandleInner {
    id: Uuid,
    features: Vec<IdentifierString>,
}

/// An identity-stable token standing in for a wallet in UI code.
///
/// Handles are only created by the registry. Two handles are equal only if
/// they are clones of the same allocation.
#[derive(Clone)]
pub struct UiWalletHandle(Arc<HandleInner>);

impl UiWalletHandle {
    pub(crate) fn allocate(features: Vec<IdentifierString>) -> Self {
        Self(Arc::new(HandleInner {
            id: Uuid::new_v4(),
            features,
        }))
    }

    pub(crate) fn id(&self) -> Uuid {
        self.0.id
    }

    pub(crate) fn downgrade(&self) -> Weak<HandleInner> {
        Arc::downgrade(&self.0)
    }

    /// Feature identifiers of the wallet or account this handle stands for,
    /// as of when the handle was issued
    pub fn features(&self) -> &[IdentifierString] {
        &self.0.features
    }
}

impl PartialEq for UiWalletHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for UiWalletHandle {}

impl Hash for UiWalletHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl AsRef<UiWalletHandle> for UiWalletHandle {
    fn as_ref(&self) -> &UiWalletHandle {
        self
    }
}

impl fmt::Debug for UiWalletHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UiWalletHandle").field(&self.0.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_is_allocation_identity() {
        let features = vec!["standard:connect".to_string()];
        let a = UiWalletHandle::allocate(features.clone());
        let b = UiWalletHandle::allocate(features);

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.features(), b.features());
    }

    #[test]
    fn test_usable_as_set_key() {
        let a = UiWalletHandle::allocate(vec![]);
        let b = UiWalletHandle::allocate(vec![]);

        let set: HashSet<_> = [a.clone(), a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&a));
    }
}
