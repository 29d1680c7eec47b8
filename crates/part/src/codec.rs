//! The XML part codec.

use std::io::{BufRead, Write};
use std::sync::Arc;

use carton_xml::{
    BindingContext, ContentTree, Element, EventRecorder, LenientHandler, Marshaller,
    ValidationEvent, XmlNode,
};

use crate::error::{ConfigurationError, DeserializationError, PartError, SerializationError};
use crate::name::{ContentType, PartName};
use crate::negotiate::PrefixMapperNegotiator;
use crate::prefix::PrefixMappingStrategy;

/// Binds one part's content tree to its XML form and back.
///
/// A codec owns at most one current [`ContentTree`]. Unmarshalling
/// replaces it wholesale on success and leaves it untouched on failure,
/// so the owning container can retry from an alternate source without
/// corrupting previously valid state. The codec never mutates the tree
/// itself; editing part content between unmarshal and marshal is the
/// container's business.
///
/// Calls on one codec instance are not synchronized internally; give each
/// worker its own codec or serialize access externally. The shared
/// [`BindingContext`] is read-only and safe to hand to any number of
/// codecs.
pub struct XmlPartCodec {
    part_name: PartName,
    content_type: Option<ContentType>,
    context: Option<Arc<BindingContext>>,
    content: Option<ContentTree>,
    validation_events: Vec<ValidationEvent>,
}

impl XmlPartCodec {
    /// Creates a codec bound to an explicit context.
    pub fn new(part_name: PartName, context: Arc<BindingContext>) -> Self {
        Self {
            part_name,
            content_type: None,
            context: Some(context),
            content: None,
            validation_events: Vec::new(),
        }
    }

    /// Creates a codec bound to the process-wide default context.
    pub fn with_shared_context(part_name: PartName) -> Self {
        Self::new(part_name, BindingContext::shared())
    }

    /// Creates a codec with no context yet. Containers use this when the
    /// context choice depends on content-type resolution that has not
    /// happened; every marshal/unmarshal before [`set_binding_context`]
    /// fails with [`ConfigurationError::UnboundContext`].
    ///
    /// [`set_binding_context`]: XmlPartCodec::set_binding_context
    pub fn unbound(part_name: PartName) -> Self {
        Self {
            part_name,
            content_type: None,
            context: None,
            content: None,
            validation_events: Vec::new(),
        }
    }

    /// The part identity used in diagnostics.
    pub fn part_name(&self) -> &PartName {
        &self.part_name
    }

    /// The stored content-type association, if any.
    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }

    /// Stores a content-type association. Never interpreted here.
    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.content_type = Some(content_type);
    }

    /// The installed binding context, if any.
    pub fn binding_context(&self) -> Option<&Arc<BindingContext>> {
        self.context.as_ref()
    }

    /// Installs the context used by subsequent marshal/unmarshal calls.
    pub fn set_binding_context(&mut self, context: Arc<BindingContext>) {
        self.context = Some(context);
    }

    /// The current content tree, if any.
    pub fn content_tree(&self) -> Option<&ContentTree> {
        self.content.as_ref()
    }

    /// Replaces the current content tree.
    pub fn set_content_tree(&mut self, tree: ContentTree) {
        self.content = Some(tree);
    }

    /// Removes and returns the current content tree.
    pub fn take_content_tree(&mut self) -> Option<ContentTree> {
        self.content.take()
    }

    /// Validation events recorded by the most recent unmarshal attempt.
    pub fn validation_events(&self) -> &[ValidationEvent] {
        &self.validation_events
    }

    /// Serializes the current tree into the given container node with the
    /// neutral default prefix strategy.
    pub fn marshal_to_node(&self, target: &mut XmlNode) -> Result<(), PartError> {
        self.marshal_to_node_with(target, &PrefixMappingStrategy::EngineDefault)
    }

    /// Serializes the current tree as children appended to `target`,
    /// which must be a node kind that accepts children (document,
    /// fragment or element).
    pub fn marshal_to_node_with(
        &self,
        target: &mut XmlNode,
        strategy: &PrefixMappingStrategy,
    ) -> Result<(), PartError> {
        let context = self.require_context()?;
        let tree = self.require_tree()?;
        if !target.accepts_children() {
            return Err(SerializationError::TargetNotContainer {
                part: self.part_name.clone(),
                kind: target.kind(),
            }
            .into());
        }
        let mut marshaller = self.configure_marshaller(context, strategy)?;
        marshaller
            .marshal_to_node(tree, target)
            .map_err(|e| SerializationError::Engine {
                part: self.part_name.clone(),
                source: e,
            })?;
        tracing::debug!(part = %self.part_name, "part marshalled to node");
        Ok(())
    }

    /// Serializes the current tree to a byte stream with the neutral
    /// default prefix strategy.
    pub fn marshal_to_stream<W: Write>(&self, out: W) -> Result<(), PartError> {
        self.marshal_to_stream_with(out, &PrefixMappingStrategy::EngineDefault)
    }

    /// Serializes the current tree to a byte stream. Serialization runs
    /// into an internal buffer first, so a failing marshal writes nothing
    /// to the caller's stream.
    pub fn marshal_to_stream_with<W: Write>(
        &self,
        mut out: W,
        strategy: &PrefixMappingStrategy,
    ) -> Result<(), PartError> {
        let context = self.require_context()?;
        let tree = self.require_tree()?;
        let mut marshaller = self.configure_marshaller(context, strategy)?;
        let mut buffer = Vec::new();
        marshaller
            .marshal(tree, &mut buffer)
            .map_err(|e| SerializationError::Engine {
                part: self.part_name.clone(),
                source: e,
            })?;
        out.write_all(&buffer).map_err(|e| SerializationError::Io {
            part: self.part_name.clone(),
            source: e,
        })?;
        tracing::debug!(part = %self.part_name, bytes = buffer.len(), "part marshalled");
        Ok(())
    }

    /// Parses bytes into a new content tree, replacing the current one on
    /// success only, and returns it.
    pub fn unmarshal_from_stream<R: BufRead>(
        &mut self,
        mut input: R,
    ) -> Result<&ContentTree, PartError> {
        let context = Arc::clone(self.require_context()?);
        let mut unmarshaller =
            context
                .create_unmarshaller()
                .map_err(|e| DeserializationError::from_engine(self.part_name.clone(), e))?;
        let recorder = EventRecorder::new();
        unmarshaller.set_event_handler(Box::new(LenientHandler::new(
            self.part_name.as_str(),
            recorder.clone(),
        )));
        let result = unmarshaller.unmarshal(&mut input);
        self.validation_events = recorder.take();
        match result {
            Ok(tree) => {
                tracing::debug!(part = %self.part_name, "part unmarshalled");
                Ok(self.content.insert(tree))
            }
            Err(e) => Err(DeserializationError::from_engine(self.part_name.clone(), e).into()),
        }
    }

    /// Binds an already-parsed element into a new content tree, replacing
    /// the current one on success only, and returns it.
    pub fn unmarshal_from_element(&mut self, element: &Element) -> Result<&ContentTree, PartError> {
        let context = Arc::clone(self.require_context()?);
        let mut unmarshaller =
            context
                .create_unmarshaller()
                .map_err(|e| DeserializationError::from_engine(self.part_name.clone(), e))?;
        let recorder = EventRecorder::new();
        unmarshaller.set_event_handler(Box::new(LenientHandler::new(
            self.part_name.as_str(),
            recorder.clone(),
        )));
        let result = unmarshaller.unmarshal_element(element);
        self.validation_events = recorder.take();
        match result {
            Ok(tree) => {
                tracing::debug!(part = %self.part_name, "part unmarshalled from element");
                Ok(self.content.insert(tree))
            }
            Err(e) => Err(DeserializationError::from_engine(self.part_name.clone(), e).into()),
        }
    }

    fn require_context(&self) -> Result<&Arc<BindingContext>, ConfigurationError> {
        self.context
            .as_ref()
            .ok_or_else(|| ConfigurationError::UnboundContext {
                part: self.part_name.clone(),
            })
    }

    fn require_tree(&self) -> Result<&ContentTree, SerializationError> {
        self.content
            .as_ref()
            .ok_or_else(|| SerializationError::NoContentTree {
                part: self.part_name.clone(),
            })
    }

    /// Creates a marshaller scoped to this call and runs the prefix
    /// negotiation on it. Capability rejections are absorbed inside the
    /// negotiator; only hard property faults surface.
    fn configure_marshaller(
        &self,
        context: &BindingContext,
        strategy: &PrefixMappingStrategy,
    ) -> Result<Box<dyn Marshaller>, PartError> {
        let mut marshaller =
            context
                .create_marshaller()
                .map_err(|e| SerializationError::Engine {
                    part: self.part_name.clone(),
                    source: e,
                })?;
        PrefixMapperNegotiator::new(&self.part_name)
            .resolve(strategy, marshaller.as_mut())
            .map_err(|e| SerializationError::Property {
                part: self.part_name.clone(),
                source: e,
            })?;
        Ok(marshaller)
    }
}
