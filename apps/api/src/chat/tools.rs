//! Tools the chat model may call.

use serde::Deserialize;
use serde_json::json;

use crate::jobs::jsearch::SearchQuery;
use crate::llm_client::ToolSpec;

pub const SEARCH_JOBS_TOOL: &str = "search_jobs";

pub fn search_jobs_tool() -> ToolSpec {
    ToolSpec {
        name: SEARCH_JOBS_TOOL.to_string(),
        description: "Search live job postings. Use for any request to find, search or show \
                      jobs, or when the user changes their search criteria."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Free-form search text including role and location, e.g. \"python developer jobs in chicago\"."
                },
                "employment_types": {
                    "type": "string",
                    "description": "Comma-separated subset of FULLTIME, CONTRACTOR, PARTTIME, INTERN."
                },
                "job_requirements": {
                    "type": "string",
                    "description": "Comma-separated subset of under_3_years_experience, more_than_3_years_experience, no_experience, no_degree."
                },
                "work_from_home": {
                    "type": "boolean",
                    "description": "Only return remote jobs."
                },
                "date_posted": {
                    "type": "string",
                    "enum": ["all", "today", "3days", "week", "month"]
                },
                "country": {
                    "type": "string",
                    "description": "ISO 3166-1 alpha-2 country code."
                },
                "radius": {
                    "type": "integer",
                    "description": "Search radius in km from the location in the query."
                },
                "page": {
                    "type": "integer",
                    "description": "Result page, starting at 1. Use 2+ when the user asks for more results."
                }
            },
            "required": ["query"]
        }),
    }
}

/// Arguments of a `search_jobs` call as the model sends them.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchJobsArgs {
    pub query: String,
    pub employment_types: Option<String>,
    pub job_requirements: Option<String>,
    #[serde(default)]
    pub work_from_home: bool,
    pub date_posted: Option<String>,
    pub country: Option<String>,
    pub radius: Option<u32>,
    pub page: Option<u32>,
}

impl SearchJobsArgs {
    pub fn into_query(self, default_country: &str) -> SearchQuery {
        let mut query = SearchQuery::new(self.query.trim());
        query.employment_types = self.employment_types;
        query.job_requirements = self.job_requirements;
        query.work_from_home = self.work_from_home;
        query.radius = self.radius;
        query.country = self
            .country
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| default_country.to_string());
        if let Some(date_posted) = self.date_posted {
            query.date_posted = date_posted;
        }
        if let Some(page) = self.page {
            query.page = page;
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_schema_requires_query() {
        let tool = search_jobs_tool();
        assert_eq!(tool.name, "search_jobs");
        assert_eq!(tool.input_schema["required"], json!(["query"]));
    }

    #[test]
    fn test_args_map_onto_search_query() {
        let args: SearchJobsArgs = serde_json::from_value(json!({
            "query": " python developer ",
            "work_from_home": true,
            "employment_types": "FULLTIME",
            "page": 2
        }))
        .unwrap();
        let query = args.into_query("us");

        assert_eq!(query.query, "python developer");
        assert!(query.work_from_home);
        assert_eq!(query.employment_types.as_deref(), Some("FULLTIME"));
        assert_eq!(query.page, 2);
        assert_eq!(query.country, "us");
        assert_eq!(query.date_posted, "all");
    }

    #[test]
    fn test_args_without_query_are_rejected() {
        let parsed = serde_json::from_value::<SearchJobsArgs>(json!({"work_from_home": true}));
        assert!(parsed.is_err());
    }
}
