// Chat: bounded context, tool-calling engine, session persistence and handlers.
// Handlers load a session, hand it to `engine::respond`, then save it back.

pub mod context;
pub mod engine;
pub mod handlers;
pub mod prompts;
pub mod session;
pub mod store;
pub mod tools;
