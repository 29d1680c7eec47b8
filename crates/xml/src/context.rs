//! Shared binding contexts.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::engine::{BindingEngine, Marshaller, Unmarshaller};
use crate::error::EngineError;
use crate::quick::QuickXmlEngine;
use crate::schema::SchemaSet;

/// The schema-to-shape mapping plus the engine that honors it.
///
/// A context is read-only after construction and safe to share across
/// codec instances and threads, assuming the installed engine upholds its
/// own `Send + Sync` contract. Contexts typically outlive every codec
/// using them; hand them around as `Arc<BindingContext>`.
pub struct BindingContext {
    schema: Arc<SchemaSet>,
    engine: Arc<dyn BindingEngine>,
}

static SHARED: Lazy<Arc<BindingContext>> =
    Lazy::new(|| Arc::new(BindingContext::new(SchemaSet::relationships())));

impl BindingContext {
    /// Creates a context over the default quick-xml engine.
    pub fn new(schema: SchemaSet) -> Self {
        Self::with_engine(schema, Arc::new(QuickXmlEngine::new()))
    }

    /// Creates a context over an explicit engine. This is the seam tests
    /// use to substitute engines with a different capability surface.
    pub fn with_engine(schema: SchemaSet, engine: Arc<dyn BindingEngine>) -> Self {
        Self {
            schema: Arc::new(schema),
            engine,
        }
    }

    /// The process-wide default context: the built-in relationships
    /// schema over the default engine, lazily constructed once.
    pub fn shared() -> Arc<BindingContext> {
        Arc::clone(&SHARED)
    }

    /// The schema set this context binds against.
    pub fn schema(&self) -> &SchemaSet {
        &self.schema
    }

    /// Creates a marshaller scoped to one marshal call.
    pub fn create_marshaller(&self) -> Result<Box<dyn Marshaller>, EngineError> {
        self.engine.create_marshaller(Arc::clone(&self.schema))
    }

    /// Creates an unmarshaller scoped to one unmarshal call.
    pub fn create_unmarshaller(&self) -> Result<Box<dyn Unmarshaller>, EngineError> {
        self.engine.create_unmarshaller(Arc::clone(&self.schema))
    }
}

impl fmt::Debug for BindingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingContext")
            .field("schema_elements", &self.schema.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_context_is_one_instance() {
        let a = BindingContext::shared();
        let b = BindingContext::shared();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!a.schema().is_empty());
    }
}
