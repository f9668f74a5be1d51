//! # Dialect Resolver
//!
//! Chooses the [`Dialect`] of an execution environment by asking an ordered
//! chain of providers.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  resolve(configuration)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  provider[0].probe() ── Some(d) ──► return d                            │
//! │       │ None                                                            │
//! │       ▼                                                                 │
//! │  provider[1].probe() ── Some(d) ──► return d                            │
//! │       │ None                                                            │
//! │       ▼                                                                 │
//! │      ...                                                                │
//! │       │ exhausted                                                       │
//! │       ▼                                                                 │
//! │  DbError::NoDialect { environment }                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! First match wins; registration order is priority. A provider that cannot
//! reach the database reports "no match" so later providers still get a turn.

use async_trait::async_trait;
use batis_core::dialect::{self, Dialect};
use tracing::{debug, error, info};

use crate::error::{DbError, DbResult};
use crate::session::EngineConfiguration;

/// One strategy for recognising a database.
#[async_trait]
pub trait DialectProvider: Send + Sync {
    /// Returns a dialect when this provider recognises the environment.
    async fn probe(&self, configuration: &EngineConfiguration) -> Option<&'static dyn Dialect>;
}

// =============================================================================
// Default Provider
// =============================================================================

/// Classifies the database by the product name of a live connection.
///
/// ## Matching
/// The product name is lower-cased and matched by substring, first fragment
/// wins: `hsql`, `h2`, `sqlite`, `postgres`, `mysql`, `mariadb`, `oracle`,
/// `sql server`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDialectProvider;

#[async_trait]
impl DialectProvider for DefaultDialectProvider {
    async fn probe(&self, configuration: &EngineConfiguration) -> Option<&'static dyn Dialect> {
        let environment = configuration.environment();

        let product_name = {
            let mut connection = match environment.data_source().acquire().await {
                Ok(connection) => connection,
                Err(e) => {
                    error!(
                        environment = %environment.id(),
                        error = %e,
                        "Failed to acquire connection for dialect probe"
                    );
                    return None;
                }
            };
            match connection.database_product_name().await {
                Ok(name) => name,
                Err(e) => {
                    error!(
                        environment = %environment.id(),
                        error = %e,
                        "Failed to read database product name"
                    );
                    return None;
                }
            }
        };

        match dialect::for_product_name(&product_name) {
            Some(found) => {
                debug!(
                    product = %product_name,
                    dialect = found.name(),
                    "Classified database product"
                );
                Some(found)
            }
            None => {
                info!(
                    product = %product_name.to_lowercase(),
                    "Couldn't determine dialect for database product"
                );
                None
            }
        }
    }
}

/// Returns a fixed dialect without touching the database.
#[derive(Debug, Clone, Copy)]
pub struct StaticDialectProvider(pub &'static dyn Dialect);

#[async_trait]
impl DialectProvider for StaticDialectProvider {
    async fn probe(&self, _configuration: &EngineConfiguration) -> Option<&'static dyn Dialect> {
        Some(self.0)
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// An ordered chain of dialect providers.
///
/// ## Example
/// ```rust,ignore
/// let resolver = DialectResolver::new(vec![
///     Box::new(MyVendorProvider),
///     Box::new(DefaultDialectProvider),
/// ]);
/// let dialect = resolver.resolve(&configuration).await?;
/// ```
pub struct DialectResolver {
    providers: Vec<Box<dyn DialectProvider>>,
}

impl DialectResolver {
    /// Creates a resolver that consults `providers` in order.
    pub fn new(providers: Vec<Box<dyn DialectProvider>>) -> Self {
        DialectResolver { providers }
    }

    /// Appends a provider with the lowest priority so far.
    pub fn with_provider(mut self, provider: impl DialectProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Resolves the dialect of the configured environment.
    ///
    /// ## Errors
    /// [`DbError::NoDialect`] when no provider matches.
    pub async fn resolve(
        &self,
        configuration: &EngineConfiguration,
    ) -> DbResult<&'static dyn Dialect> {
        let environment = configuration.environment().id();
        for (index, provider) in self.providers.iter().enumerate() {
            if let Some(found) = provider.probe(configuration).await {
                info!(
                    environment = %environment,
                    dialect = found.name(),
                    provider = index,
                    "Dialect resolved"
                );
                return Ok(found);
            }
        }
        Err(DbError::no_dialect(environment))
    }
}

impl Default for DialectResolver {
    fn default() -> Self {
        DialectResolver::new(vec![Box::new(DefaultDialectProvider)])
    }
}

impl std::fmt::Debug for DialectResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectResolver")
            .field("providers", &self.providers.len())
            .finish()
    }
}
