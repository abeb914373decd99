//! Saved-number cache over a key-value capability.

use sos_core::{KeyValueStore, SaveError, SosNumber, SOS_NUMBER_KEY};
use std::sync::Arc;

/// Loads the saved SOS number once and persists explicit saves.
///
/// Read failures are logged and treated as "nothing saved". Write failures
/// leave the cached number untouched.
pub struct NumberStore {
    backend: Arc<dyn KeyValueStore>,
    saved: Option<SosNumber>,
}

impl NumberStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            saved: None,
        }
    }

    /// Read the persisted number into the cache.
    pub async fn load(&mut self) -> Option<SosNumber> {
        match self.backend.get(SOS_NUMBER_KEY).await {
            Ok(Some(raw)) => {
                let number = SosNumber::parse(&raw);
                if number.is_none() {
                    tracing::warn!("Ignoring blank stored SOS number");
                }
                self.saved = number.clone();
                number
            }
            Ok(None) => {
                tracing::debug!("No SOS number stored yet");
                None
            }
            Err(err) => {
                tracing::warn!("Failed to load stored number: {}", err);
                None
            }
        }
    }

    /// Validate, persist, then update the cache.
    pub async fn save(&mut self, raw: &str) -> Result<SosNumber, SaveError> {
        let number = SosNumber::parse(raw).ok_or(SaveError::Validation)?;

        if let Err(err) = self.backend.set(SOS_NUMBER_KEY, number.as_str()).await {
            tracing::warn!("Error saving phone number: {}", err);
            return Err(SaveError::Store(err));
        }

        tracing::info!(number = %number, "SOS number saved");
        self.saved = Some(number.clone());
        Ok(number)
    }

    pub fn saved(&self) -> Option<&SosNumber> {
        self.saved.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryKeyValueStore;

    fn store() -> (Arc<MemoryKeyValueStore>, NumberStore) {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let numbers = NumberStore::new(backend.clone());
        (backend, numbers)
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (backend, mut numbers) = store();
        for raw in ["+15551234567", "  0800 111 ", "ICE mum"] {
            let saved = numbers.save(raw).await.unwrap();
            assert_eq!(saved.as_str(), raw.trim());

            let mut fresh = NumberStore::new(backend.clone());
            assert_eq!(fresh.load().await.unwrap().as_str(), raw.trim());
            assert_eq!(fresh.saved().unwrap().as_str(), raw.trim());
        }
    }

    #[tokio::test]
    async fn test_blank_rejected_without_write() {
        let (backend, mut numbers) = store();
        assert!(matches!(numbers.save("").await, Err(SaveError::Validation)));
        assert!(matches!(numbers.save("   ").await, Err(SaveError::Validation)));
        assert_eq!(backend.write_count(), 0);
        assert!(numbers.saved().is_none());
    }

    #[tokio::test]
    async fn test_write_failure_keeps_previous() {
        let (backend, mut numbers) = store();
        numbers.save("111").await.unwrap();

        backend.set_failing(true);
        assert!(matches!(numbers.save("222").await, Err(SaveError::Store(_))));
        assert_eq!(numbers.saved().unwrap().as_str(), "111");
    }

    #[tokio::test]
    async fn test_load_missing_and_failing() {
        let (backend, mut numbers) = store();
        assert!(numbers.load().await.is_none());

        backend.set_failing(true);
        assert!(numbers.load().await.is_none());
        assert!(numbers.saved().is_none());
    }

    #[tokio::test]
    async fn test_blank_stored_value_is_absent() {
        let (backend, mut numbers) = store();
        backend.set(SOS_NUMBER_KEY, "  ").await.unwrap();
        assert!(numbers.load().await.is_none());
    }
}
