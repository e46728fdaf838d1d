//! Redis-backed job-card cache layered over any `JobSearch` backend.
//!
//! Every card a search or details call returns is written under
//! `job_card:<job_id>`, so selecting a job from earlier results does not cost
//! another API call. Cache failures are logged and never fail the request, and
//! every Redis round trip (connect included) is bounded by a timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{ErrorKind, RedisError, RedisResult};
use tracing::{debug, warn};

use crate::jobs::cards::JobCard;
use crate::jobs::jsearch::{JobSearch, JobSearchError, SearchQuery};

/// Longest a cache read or write may take before the backend is used without it.
pub const REDIS_TIMEOUT: Duration = Duration::from_millis(500);

pub struct CachedJobSearch {
    inner: Arc<dyn JobSearch>,
    redis: redis::Client,
    ttl_secs: u64,
    timeout: Duration,
}

impl CachedJobSearch {
    pub fn new(inner: Arc<dyn JobSearch>, redis: redis::Client, ttl_secs: u64) -> Self {
        Self {
            inner,
            redis,
            ttl_secs,
            timeout: REDIS_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn bounded<T>(&self, op: impl Future<Output = RedisResult<T>>) -> RedisResult<T> {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(RedisError::from((
                ErrorKind::IoError,
                "Redis operation timed out",
            ))),
        }
    }

    async fn read(&self, job_id: &str) -> RedisResult<Option<JobCard>> {
        self.bounded(self.fetch(job_id)).await
    }

    async fn fetch(&self, job_id: &str) -> RedisResult<Option<JobCard>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(cache_key(job_id))
            .query_async(&mut conn)
            .await?;
        Ok(raw.and_then(|s| serde_json::from_str(&s).ok()))
    }

    async fn store(&self, cards: &[JobCard]) -> RedisResult<()> {
        let entries: Vec<(String, String)> = cards
            .iter()
            .filter(|c| !c.job_id.is_empty())
            .filter_map(|c| Some((cache_key(&c.job_id), serde_json::to_string(c).ok()?)))
            .collect();
        if entries.is_empty() {
            return Ok(());
        }

        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let mut pipe = redis::pipe();
        for (key, json) in entries {
            pipe.cmd("SET")
                .arg(key)
                .arg(json)
                .arg("EX")
                .arg(self.ttl_secs)
                .ignore();
        }
        pipe.query_async::<_, ()>(&mut conn).await
    }

    async fn remember(&self, cards: &[JobCard]) {
        if let Err(e) = self.bounded(self.store(cards)).await {
            warn!("Job card cache write failed: {e}");
        }
    }
}

#[async_trait]
impl JobSearch for CachedJobSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobCard>, JobSearchError> {
        let cards = self.inner.search(query).await?;
        self.remember(&cards).await;
        Ok(cards)
    }

    async fn job_details(
        &self,
        job_id: &str,
        country: &str,
    ) -> Result<Option<JobCard>, JobSearchError> {
        match self.read(job_id).await {
            Ok(Some(card)) => {
                debug!(job_id, "Job card cache hit");
                return Ok(Some(card));
            }
            Ok(None) => {}
            Err(e) => warn!("Job card cache read failed: {e}"),
        }

        let card = self.inner.job_details(job_id, country).await?;
        if let Some(card) = &card {
            self.remember(std::slice::from_ref(card)).await;
        }
        Ok(card)
    }
}

fn cache_key(job_id: &str) -> String {
    format!("job_card:{job_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Instant;

    struct StaticJobs(Vec<JobCard>);

    #[async_trait]
    impl JobSearch for StaticJobs {
        async fn search(&self, _query: &SearchQuery) -> Result<Vec<JobCard>, JobSearchError> {
            Ok(self.0.clone())
        }

        async fn job_details(
            &self,
            job_id: &str,
            _country: &str,
        ) -> Result<Option<JobCard>, JobSearchError> {
            Ok(self.0.iter().find(|c| c.job_id == job_id).cloned())
        }
    }

    /// A cache pointed at a non-routable address: connects either hang or fail fast.
    fn unreachable_cache() -> CachedJobSearch {
        let card = JobCard::from_raw(&json!({"job_id": "j1", "job_title": "Rust Engineer"}));
        let redis = redis::Client::open("redis://10.255.255.1:6379").unwrap();
        CachedJobSearch::new(Arc::new(StaticJobs(vec![card])), redis, 60)
            .with_timeout(Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_unreachable_redis_does_not_stall_search() {
        let cache = unreachable_cache();
        let started = Instant::now();
        let cards = cache.search(&SearchQuery::new("rust")).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_backend_for_details() {
        let cache = unreachable_cache();
        let started = Instant::now();
        let card = cache.job_details("j1", "us").await.unwrap().unwrap();
        assert_eq!(card.job_title, "Rust Engineer");
        assert!(cache.job_details("missing", "us").await.unwrap().is_none());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_cache_key_is_namespaced_by_job_id() {
        assert_eq!(cache_key("abc=="), "job_card:abc==");
    }
}
