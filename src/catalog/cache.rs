//! Read-through cache for catalog backends.
//!
//! The wizard re-requests catalog sections on every entry to the relevant
//! step. This wrapper memoizes successful lookups with a TTL so step
//! re-entry is served from memory; failures are never cached, so a failed
//! fetch can be retried immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use super::{CatalogError, CatalogService, Feature, Goal, Industry, Plan};

const DEFAULT_TTL: Duration = Duration::from_secs(300);
const MAX_GOAL_ENTRIES: u64 = 64;

pub struct CachedCatalog<C> {
    inner: C,
    industries: Cache<(), Arc<Vec<Industry>>>,
    goals: Cache<(), Arc<Vec<Goal>>>,
    features: Cache<(), Arc<Vec<Feature>>>,
    features_by_goal: Cache<String, Arc<Vec<Feature>>>,
    plans: Cache<(), Arc<Vec<Plan>>>,
}

impl<C> CachedCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    pub fn with_ttl(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            industries: single_entry_cache(ttl),
            goals: single_entry_cache(ttl),
            features: single_entry_cache(ttl),
            features_by_goal: Cache::builder()
                .max_capacity(MAX_GOAL_ENTRIES)
                .time_to_live(ttl)
                .build(),
            plans: single_entry_cache(ttl),
        }
    }

    /// Drop all cached sections; the next lookup hits the backend.
    pub fn invalidate_all(&self) {
        self.industries.invalidate_all();
        self.goals.invalidate_all();
        self.features.invalidate_all();
        self.features_by_goal.invalidate_all();
        self.plans.invalidate_all();
    }
}

fn single_entry_cache<V: Clone + Send + Sync + 'static>(ttl: Duration) -> Cache<(), V> {
    Cache::builder().max_capacity(1).time_to_live(ttl).build()
}

fn shared_error(err: Arc<CatalogError>) -> CatalogError {
    (*err).clone()
}

#[async_trait]
impl<C: CatalogService> CatalogService for CachedCatalog<C> {
    async fn industries(&self) -> Result<Vec<Industry>, CatalogError> {
        self.industries
            .try_get_with((), async { self.inner.industries().await.map(Arc::new) })
            .await
            .map(|v| (*v).clone())
            .map_err(shared_error)
    }

    async fn goals(&self) -> Result<Vec<Goal>, CatalogError> {
        self.goals
            .try_get_with((), async { self.inner.goals().await.map(Arc::new) })
            .await
            .map(|v| (*v).clone())
            .map_err(shared_error)
    }

    async fn features(&self) -> Result<Vec<Feature>, CatalogError> {
        self.features
            .try_get_with((), async { self.inner.features().await.map(Arc::new) })
            .await
            .map(|v| (*v).clone())
            .map_err(shared_error)
    }

    async fn features_by_goal(&self, goal_id: &str) -> Result<Vec<Feature>, CatalogError> {
        self.features_by_goal
            .try_get_with(goal_id.to_string(), async {
                self.inner.features_by_goal(goal_id).await.map(Arc::new)
            })
            .await
            .map(|v| (*v).clone())
            .map_err(shared_error)
    }

    async fn plans(&self) -> Result<Vec<Plan>, CatalogError> {
        self.plans
            .try_get_with((), async { self.inner.plans().await.map(Arc::new) })
            .await
            .map(|v| (*v).clone())
            .map_err(shared_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Counts backend hits and can be switched into a failing mode.
    struct CountingCatalog {
        hits: AtomicU32,
        fail: std::sync::atomic::AtomicBool,
    }

    impl CountingCatalog {
        fn new() -> Self {
            Self { hits: AtomicU32::new(0), fail: std::sync::atomic::AtomicBool::new(false) }
        }

        fn record(&self) -> Result<(), CatalogError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(CatalogError::Unavailable { reason: "backend down".to_string() })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CatalogService for CountingCatalog {
        async fn industries(&self) -> Result<Vec<Industry>, CatalogError> {
            self.record()?;
            Ok(vec![Industry { slug: "marketing".into(), name: "Marketing".into() }])
        }

        async fn goals(&self) -> Result<Vec<Goal>, CatalogError> {
            self.record()?;
            Ok(Vec::new())
        }

        async fn features(&self) -> Result<Vec<Feature>, CatalogError> {
            self.record()?;
            Ok(Vec::new())
        }

        async fn features_by_goal(&self, _goal_id: &str) -> Result<Vec<Feature>, CatalogError> {
            self.record()?;
            Ok(Vec::new())
        }

        async fn plans(&self) -> Result<Vec<Plan>, CatalogError> {
            self.record()?;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_repeat_lookups_hit_backend_once() {
        let cached = CachedCatalog::new(CountingCatalog::new());
        cached.industries().await.unwrap();
        cached.industries().await.unwrap();
        cached.industries().await.unwrap();
        assert_eq!(cached.inner.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cached = CachedCatalog::new(CountingCatalog::new());
        cached.inner.fail.store(true, Ordering::SeqCst);
        assert!(cached.industries().await.is_err());

        cached.inner.fail.store(false, Ordering::SeqCst);
        assert!(cached.industries().await.is_ok());
        assert_eq!(cached.inner.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_goal_feature_lookups_cache_per_goal() {
        let cached = CachedCatalog::new(CountingCatalog::new());
        cached.features_by_goal("a").await.unwrap();
        cached.features_by_goal("a").await.unwrap();
        cached.features_by_goal("b").await.unwrap();
        assert_eq!(cached.inner.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_refetch() {
        let cached = CachedCatalog::new(CountingCatalog::new());
        cached.industries().await.unwrap();
        cached.invalidate_all();
        cached.industries().await.unwrap();
        assert_eq!(cached.inner.hits.load(Ordering::SeqCst), 2);
    }
}
