//! The default quick-xml binding engine.
//!
//! One engine instance is shared freely; every marshal or unmarshal call
//! gets a fresh marshaller/unmarshaller resource scoped to that call.
//!
//! The engine accepts the standards-track prefix-mapper property and the
//! indent switch. The vendor-internal prefix-mapper spelling is not
//! understood here and is rejected as unsupported; callers fall back
//! through their negotiation chain.

mod de;
mod ser;

pub use de::QuickXmlUnmarshaller;
pub use ser::QuickXmlMarshaller;

use std::sync::Arc;

use crate::engine::{BindingEngine, Marshaller, Unmarshaller};
use crate::error::EngineError;
use crate::schema::SchemaSet;

/// quick-xml implementation of [`BindingEngine`].
#[derive(Debug, Default, Clone)]
pub struct QuickXmlEngine;

impl QuickXmlEngine {
    /// Creates the engine.
    pub fn new() -> Self {
        Self
    }
}

impl BindingEngine for QuickXmlEngine {
    fn create_marshaller(
        &self,
        schema: Arc<SchemaSet>,
    ) -> Result<Box<dyn Marshaller>, EngineError> {
        Ok(Box::new(QuickXmlMarshaller::new(schema)))
    }

    fn create_unmarshaller(
        &self,
        schema: Arc<SchemaSet>,
    ) -> Result<Box<dyn Unmarshaller>, EngineError> {
        Ok(Box::new(QuickXmlUnmarshaller::new(schema)))
    }
}
