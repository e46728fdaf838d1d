// User documents: profile reads and partial updates, saved/applied job lists.

pub mod handlers;
pub mod store;
