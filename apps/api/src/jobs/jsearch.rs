//! JSearch (RapidAPI) client: job search and job-details lookup.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::jobs::cards::{cards_from_response, JobCard};

const JSEARCH_BASE_URL: &str = "https://jsearch.p.rapidapi.com";
const JSEARCH_HOST: &str = "jsearch.p.rapidapi.com";
const MAX_PAGES: u32 = 50;
const DATE_POSTED_VALUES: [&str; 5] = ["all", "today", "3days", "week", "month"];

#[derive(Debug, Error)]
pub enum JobSearchError {
    #[error("Job search API key not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Parameters of a `GET /search` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub page: u32,
    pub num_pages: u32,
    pub country: String,
    pub date_posted: String,
    pub employment_types: Option<String>,
    pub job_requirements: Option<String>,
    pub work_from_home: bool,
    pub radius: Option<u32>,
    pub exclude_job_publishers: Option<String>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            num_pages: 1,
            country: "us".to_string(),
            date_posted: "all".to_string(),
            employment_types: None,
            job_requirements: None,
            work_from_home: false,
            radius: None,
            exclude_job_publishers: None,
        }
    }

    /// Query-string pairs, with out-of-range values clamped to what the API accepts.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let date_posted = if DATE_POSTED_VALUES.contains(&self.date_posted.as_str()) {
            self.date_posted.clone()
        } else {
            "all".to_string()
        };

        let mut params = vec![
            ("query", self.query.clone()),
            ("page", self.page.clamp(1, MAX_PAGES).to_string()),
            ("num_pages", self.num_pages.clamp(1, MAX_PAGES).to_string()),
            ("country", self.country.to_lowercase()),
            ("date_posted", date_posted),
        ];

        let optional = [
            ("employment_types", &self.employment_types),
            ("job_requirements", &self.job_requirements),
            ("exclude_job_publishers", &self.exclude_job_publishers),
        ];
        for (key, value) in optional {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push((key, v.to_string()));
            }
        }
        if self.work_from_home {
            params.push(("work_from_home", "true".to_string()));
        }
        if let Some(radius) = self.radius.filter(|r| *r > 0) {
            params.push(("radius", radius.to_string()));
        }
        params
    }
}

/// Job search backend. Carried in `AppState` as `Arc<dyn JobSearch>`.
#[async_trait]
pub trait JobSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobCard>, JobSearchError>;

    async fn job_details(
        &self,
        job_id: &str,
        country: &str,
    ) -> Result<Option<JobCard>, JobSearchError>;
}

#[derive(Clone)]
pub struct JSearchClient {
    client: Client,
    api_key: Option<String>,
}

impl JSearchClient {
    pub fn new(api_key: Option<String>) -> Result<Self, JobSearchError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            api_key,
        })
    }

    async fn get_json(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, JobSearchError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            error!("RAPIDAPI_KEY not configured; job search unavailable");
            JobSearchError::MissingApiKey
        })?;

        let response = self
            .client
            .get(format!("{JSEARCH_BASE_URL}{path}"))
            .header("x-rapidapi-key", api_key)
            .header("x-rapidapi-host", JSEARCH_HOST)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("JSearch {path} failed: {status} - {body}");
            return Err(JobSearchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl JobSearch for JSearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobCard>, JobSearchError> {
        let body = self.get_json("/search", &query.to_params()).await?;
        let cards = cards_from_response(&body);
        info!(query = %query.query, found = cards.len(), "Job search successful");
        Ok(cards)
    }

    async fn job_details(
        &self,
        job_id: &str,
        country: &str,
    ) -> Result<Option<JobCard>, JobSearchError> {
        let params = [
            ("job_id", job_id.to_string()),
            ("country", country.to_lowercase()),
        ];
        let body = self.get_json("/job-details", &params).await?;
        info!(job_id, "Job details fetch successful");
        Ok(cards_from_response(&body).into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_default_query_params() {
        let params = SearchQuery::new("developer jobs in chicago").to_params();
        assert_eq!(param(&params, "query"), Some("developer jobs in chicago"));
        assert_eq!(param(&params, "page"), Some("1"));
        assert_eq!(param(&params, "num_pages"), Some("1"));
        assert_eq!(param(&params, "country"), Some("us"));
        assert_eq!(param(&params, "date_posted"), Some("all"));
        assert_eq!(param(&params, "work_from_home"), None);
        assert_eq!(param(&params, "radius"), None);
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn test_optional_filters_are_included_when_set() {
        let mut query = SearchQuery::new("python");
        query.employment_types = Some("FULLTIME,CONTRACTOR".to_string());
        query.job_requirements = Some("no_degree".to_string());
        query.work_from_home = true;
        query.radius = Some(25);
        query.exclude_job_publishers = Some(String::new());

        let params = query.to_params();
        assert_eq!(param(&params, "employment_types"), Some("FULLTIME,CONTRACTOR"));
        assert_eq!(param(&params, "job_requirements"), Some("no_degree"));
        assert_eq!(param(&params, "work_from_home"), Some("true"));
        assert_eq!(param(&params, "radius"), Some("25"));
        assert_eq!(param(&params, "exclude_job_publishers"), None);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let mut query = SearchQuery::new("rust");
        query.page = 0;
        query.num_pages = 99;
        query.date_posted = "yesterday".to_string();
        query.country = "GB".to_string();

        let params = query.to_params();
        assert_eq!(param(&params, "page"), Some("1"));
        assert_eq!(param(&params, "num_pages"), Some("50"));
        assert_eq!(param(&params, "date_posted"), Some("all"));
        assert_eq!(param(&params, "country"), Some("gb"));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let client = JSearchClient::new(None).unwrap();
        let err = client.search(&SearchQuery::new("rust")).await.unwrap_err();
        assert!(matches!(err, JobSearchError::MissingApiKey));
    }
}
