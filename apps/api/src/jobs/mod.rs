// Job search: JSearch client, job-card projection, Redis card cache.
// The chat engine and handlers only see the `JobSearch` trait.

pub mod cache;
pub mod cards;
pub mod handlers;
pub mod jsearch;
