//! # GraphQL Resolvers
//!
//! Root objects. Each resolver parses IDs, calls one `Operations` service and
//! converts the result into schema types.

pub mod mutation;
pub mod query;
pub mod subscription;

pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use subscription::SubscriptionRoot;
