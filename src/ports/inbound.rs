//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: UI/CLI invokes application use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the interactive assignment flow (configure, confirm, assign,
    /// display report).
    async fn run(&self) -> Result<(), DomainError>;
}
