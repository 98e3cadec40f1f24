use async_trait::async_trait;
use std::sync::Arc;
use tether_core::{
    normalize_url, LinkRecord, LinkStore, ShortCode, Shortener, ShortenerError,
    StorageError,
};
use tether_generator::Generator;
use tracing::{debug, warn};

/// How many candidate codes `shorten` tries before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `LinkStore` and a `Generator` to handle:
/// - URL normalization and validation
/// - Short code allocation
///
/// Generated codes are only candidates. The store rejects a code that is
/// already taken, in which case a new candidate is drawn, up to
/// `max_attempts` times.
#[derive(Debug)]
pub struct ShortenerService<S, G> {
    store: Arc<S>,
    generator: Arc<G>,
    max_attempts: usize,
}

impl<S, G> Clone for ShortenerService<S, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            generator: Arc::clone(&self.generator),
            max_attempts: self.max_attempts,
        }
    }
}

impl<S: LinkStore, G: Generator> ShortenerService<S, G> {
    pub fn new(store: S, generator: G) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(generator))
    }

    /// Builds a service around a store the caller keeps a handle to.
    pub fn from_shared(store: Arc<S>, generator: Arc<G>) -> Self {
        Self {
            store,
            generator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the collision retry bound. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    fn next_candidate(&self) -> Result<ShortCode, ShortenerError> {
        self.generator
            .generate()
            .map(Into::into)
            .map_err(|e| ShortenerError::Generator(e.to_string()))
    }
}

#[async_trait]
impl<S: LinkStore, G: Generator> Shortener for ShortenerService<S, G> {
    async fn shorten(&self, url: &str) -> Result<LinkRecord, ShortenerError> {
        let target_url = normalize_url(url)?;

        for attempt in 1..=self.max_attempts {
            let code = self.next_candidate()?;
            match self.store.create(&code, &target_url).await {
                Ok(record) => {
                    debug!(code = %record.code, attempt, "link created");
                    return Ok(record);
                }
                Err(StorageError::Conflict(_)) => {
                    warn!(
                        code = %code,
                        attempt,
                        max_attempts = self.max_attempts,
                        "generated code already taken, regenerating"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ShortenerError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }

    async fn get(&self, code: &ShortCode) -> Result<LinkRecord, ShortenerError> {
        Ok(self.store.get(code).await?)
    }

    async fn update(&self, code: &ShortCode, url: &str) -> Result<LinkRecord, ShortenerError> {
        let target_url = normalize_url(url)?;
        Ok(self.store.update(code, &target_url).await?)
    }

    async fn delete(&self, code: &ShortCode) -> Result<(), ShortenerError> {
        Ok(self.store.delete(code).await?)
    }

    async fn increment_access(&self, code: &ShortCode) -> Result<u64, ShortenerError> {
        Ok(self.store.increment_access(code).await?)
    }

    async fn stats(&self, code: &ShortCode) -> Result<LinkRecord, ShortenerError> {
        Ok(self.store.stats(code).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tether_core::ReadLinkStore;
    use tether_generator::{Base62Generator, GeneratorError};
    use tether_sequence::CounterSequence;
    use tether_storage::InMemoryLinkStore;

    /// Hands out a fixed list of codes, then repeats the last one.
    struct ScriptedGenerator(Mutex<Vec<&'static str>>);

    impl ScriptedGenerator {
        fn new(mut codes: Vec<&'static str>) -> Self {
            codes.reverse();
            Self(Mutex::new(codes))
        }
    }

    impl Generator for ScriptedGenerator {
        type Output = ShortCode;

        fn generate(&self) -> Result<ShortCode, GeneratorError> {
            let mut codes = self.0.lock().unwrap();
            let code = if codes.len() > 1 {
                codes.pop().unwrap()
            } else {
                codes[0]
            };
            Ok(ShortCode::new_unchecked(code))
        }
    }

    fn test_service() -> ShortenerService<InMemoryLinkStore, Base62Generator<CounterSequence>> {
        let generator = Base62Generator::builder()
            .sequence(CounterSequence::new())
            .build();
        ShortenerService::new(InMemoryLinkStore::new(), generator)
    }

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn shorten_normalizes_and_allocates_a_code() {
        let service = test_service();

        let record = service.shorten("  example.com/a  ").await.unwrap();
        assert_eq!(record.target_url, "http://example.com/a");
        assert_eq!(record.access_count, 0);
        assert!(!record.code.as_str().is_empty());
    }

    #[tokio::test]
    async fn shorten_assigns_distinct_codes() {
        let service = test_service();

        let first = service.shorten("https://example.com").await.unwrap();
        let second = service.shorten("https://example.com").await.unwrap();
        assert_ne!(first.code, second.code);
    }

    #[tokio::test]
    async fn shorten_rejects_bad_input_before_touching_the_store() {
        let store = Arc::new(InMemoryLinkStore::new());
        let service = ShortenerService::from_shared(
            Arc::clone(&store),
            Arc::new(ScriptedGenerator::new(vec!["abc"])),
        );

        assert!(matches!(
            service.shorten("   ").await.unwrap_err(),
            ShortenerError::MissingUrl
        ));
        assert!(matches!(
            service.shorten("ftp://example.com").await.unwrap_err(),
            ShortenerError::InvalidUrl(_)
        ));
        assert!(matches!(
            service.shorten("not a url").await.unwrap_err(),
            ShortenerError::InvalidUrl(_)
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn shorten_retries_after_a_collision() {
        let store = Arc::new(InMemoryLinkStore::new());
        store
            .create(&code("taken"), "https://first.example")
            .await
            .unwrap();

        let service = ShortenerService::from_shared(
            Arc::clone(&store),
            Arc::new(ScriptedGenerator::new(vec!["taken", "free"])),
        );

        let record = service.shorten("https://second.com").await.unwrap();
        assert_eq!(record.code.as_str(), "free");

        let original = store.get(&code("taken")).await.unwrap();
        assert_eq!(original.target_url, "https://first.example");
    }

    #[tokio::test]
    async fn shorten_gives_up_after_max_attempts() {
        let store = Arc::new(InMemoryLinkStore::new());
        store
            .create(&code("taken"), "https://first.example")
            .await
            .unwrap();

        let service = ShortenerService::from_shared(
            Arc::clone(&store),
            Arc::new(ScriptedGenerator::new(vec!["taken"])),
        )
        .with_max_attempts(3);

        let err = service.shorten("https://second.com").await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::GenerationExhausted { attempts: 3 }
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn max_attempts_has_a_floor_of_one() {
        let service = test_service().with_max_attempts(0);
        assert_eq!(service.max_attempts(), 1);
        assert_eq!(test_service().max_attempts(), DEFAULT_MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn get_unknown_code_is_not_found() {
        let service = test_service();

        let err = service.get(&code("unknown")).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_normalizes_the_new_url() {
        let service = test_service();
        let created = service.shorten("https://old.com").await.unwrap();

        let updated = service
            .update(&created.code, "HTTPS://new.com/path")
            .await
            .unwrap();
        assert_eq!(updated.target_url, "https://new.com/path");

        let err = service.update(&created.code, "").await.unwrap_err();
        assert!(matches!(err, ShortenerError::MissingUrl));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let service = test_service();
        let created = service.shorten("https://example.com").await.unwrap();

        service.delete(&created.code).await.unwrap();
        assert!(matches!(
            service.get(&created.code).await.unwrap_err(),
            ShortenerError::NotFound(_)
        ));
        assert!(matches!(
            service.delete(&created.code).await.unwrap_err(),
            ShortenerError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn increments_are_visible_in_stats() {
        let service = test_service();
        let created = service.shorten("https://example.com").await.unwrap();

        let first = service.increment_access(&created.code).await.unwrap();
        let second = service.increment_access(&created.code).await.unwrap();
        assert_eq!(second, first + 1);

        let stats = service.stats(&created.code).await.unwrap();
        assert_eq!(stats.access_count, second);
    }
}
