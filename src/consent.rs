//! Persisted consent decisions
//!
//! Two independent tri-state flags. Unset means "ask once"; once a value is
//! written it is never asked again.

use crate::error::DexResult;
use crate::store::Persistence;
use std::fmt;
use tracing::{debug, warn};

/// Persistence key for the offline install decision
pub const INSTALL_CONSENT_KEY: &str = "install_consent";

/// Persistence key for the image caching decision
pub const IMAGE_CONSENT_KEY: &str = "image_consent";

/// A persisted yes/no decision, or none yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consent {
    Unset,
    Yes,
    No,
}

impl Consent {
    /// Parse a stored value; anything other than yes/no reads as unset
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("yes") => Self::Yes,
            Some("no") => Self::No,
            None => Self::Unset,
            Some(other) => {
                warn!("Ignoring unrecognized consent value: {}", other);
                Self::Unset
            }
        }
    }

    /// Value written to storage
    pub fn as_stored(&self) -> Option<&'static str> {
        match self {
            Self::Unset => None,
            Self::Yes => Some("yes"),
            Self::No => Some("no"),
        }
    }

    pub fn from_bool(yes: bool) -> Self {
        if yes {
            Self::Yes
        } else {
            Self::No
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl fmt::Display for Consent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_stored().unwrap_or("unset"))
    }
}

/// Access to both consent flags
#[derive(Clone)]
pub struct ConsentFlags {
    store: Persistence,
}

impl ConsentFlags {
    pub fn new(store: Persistence) -> Self {
        Self { store }
    }

    pub async fn install(&self) -> DexResult<Consent> {
        self.read(INSTALL_CONSENT_KEY).await
    }

    pub async fn images(&self) -> DexResult<Consent> {
        self.read(IMAGE_CONSENT_KEY).await
    }

    pub async fn set_install(&self, consent: Consent) -> DexResult<()> {
        self.write(INSTALL_CONSENT_KEY, consent).await
    }

    pub async fn set_images(&self, consent: Consent) -> DexResult<()> {
        self.write(IMAGE_CONSENT_KEY, consent).await
    }

    async fn read(&self, key: &str) -> DexResult<Consent> {
        let value = self.store.get(key).await?;
        Ok(Consent::from_stored(value.as_deref()))
    }

    async fn write(&self, key: &str, consent: Consent) -> DexResult<()> {
        let _guard = self.store.lock(key).await;
        match consent.as_stored() {
            Some(value) => self.store.set(key, value).await?,
            None => self.store.remove(key).await?,
        }
        debug!("Consent {} = {}", key, consent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_values() {
        assert_eq!(Consent::from_stored(Some("yes")), Consent::Yes);
        assert_eq!(Consent::from_stored(Some("no")), Consent::No);
        assert_eq!(Consent::from_stored(None), Consent::Unset);
        assert_eq!(Consent::from_stored(Some("maybe")), Consent::Unset);
        assert_eq!(Consent::Yes.to_string(), "yes");
        assert_eq!(Consent::Unset.to_string(), "unset");
    }

    #[tokio::test]
    async fn flags_are_independent() {
        let flags = ConsentFlags::new(Persistence::in_memory());
        assert_eq!(flags.install().await.unwrap(), Consent::Unset);

        flags.set_install(Consent::Yes).await.unwrap();
        assert_eq!(flags.install().await.unwrap(), Consent::Yes);
        assert_eq!(flags.images().await.unwrap(), Consent::Unset);

        flags.set_images(Consent::No).await.unwrap();
        assert_eq!(flags.images().await.unwrap(), Consent::No);
    }

    #[tokio::test]
    async fn unset_removes_value() {
        let store = Persistence::in_memory();
        let flags = ConsentFlags::new(store.clone());
        flags.set_images(Consent::Yes).await.unwrap();
        flags.set_images(Consent::Unset).await.unwrap();
        assert!(store.get(IMAGE_CONSENT_KEY).await.unwrap().is_none());
    }
}
