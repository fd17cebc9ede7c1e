//! Collaborator interfaces consumed by the kernel.
//!
//! Both traits are blocking. The TUI only ever calls them from worker threads,
//! never from the thread that services key events.

use crate::error::ApiError;
use crate::model::{FormSubmission, Mutation, Query, Row, Summary, ViewName};

/// Access to the remote API on behalf of a grant.
pub trait ApiClient: Send + Sync {
    /// List the records of a resource.
    fn list(&self, grant: &str, resource: ViewName, query: &Query) -> Result<Vec<Row>, ApiError>;

    /// Fetch the dashboard counts.
    fn summary(&self, grant: &str) -> Result<Summary, ApiError>;

    /// Apply a mutation to a single record.
    fn mutate(
        &self,
        grant: &str,
        resource: ViewName,
        id: &str,
        mutation: &Mutation,
    ) -> Result<(), ApiError>;

    /// Create or update a record from a form, or send a message.
    fn submit(&self, grant: &str, submission: &FormSubmission) -> Result<(), ApiError>;
}

/// Persistent store of the default grant.
pub trait GrantStore: Send + Sync {
    fn set_default_grant(&self, id: &str) -> Result<(), ApiError>;
}
