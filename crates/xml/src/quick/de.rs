//! Streaming deserialization and binding of XML input.
//!
//! Parsing builds the element tree with prefixes resolved to expanded
//! names; binding then checks the tree against the schema set, reporting
//! findings through the installed validation policy. The policy decides
//! whether a finding aborts the call.

use std::io::BufRead;
use std::str;
use std::sync::Arc;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::engine::Unmarshaller;
use crate::error::EngineError;
use crate::event::{Severity, ValidationEvent, ValidationEventHandler};
use crate::name::QName;
use crate::node::{ContentTree, Element, XmlNode};
use crate::ns;
use crate::schema::{ContentModel, ElementDecl, SchemaSet};

/// In-scope namespace bindings, one frame per open element.
#[derive(Default)]
struct NamespaceScopes {
    frames: Vec<Vec<(Option<String>, String)>>,
}

impl NamespaceScopes {
    fn push(&mut self, frame: Vec<(Option<String>, String)>) {
        self.frames.push(frame);
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    /// Resolves a prefix to its in-scope URI. `None` as a prefix looks up
    /// the default namespace; an `xmlns=""` binding undeclares it.
    fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(ns::XML);
        }
        for frame in self.frames.iter().rev() {
            for (bound, uri) in frame.iter().rev() {
                if bound.as_deref() == prefix {
                    if uri.is_empty() {
                        return None;
                    }
                    return Some(uri);
                }
            }
        }
        None
    }
}

/// The default unmarshaller: one resource per unmarshal call.
pub struct QuickXmlUnmarshaller {
    schema: Arc<SchemaSet>,
    handler: Option<Box<dyn ValidationEventHandler>>,
}

impl QuickXmlUnmarshaller {
    pub(crate) fn new(schema: Arc<SchemaSet>) -> Self {
        Self {
            schema,
            handler: None,
        }
    }

    /// Runs one event past the installed policy; without a handler only
    /// fatal events abort.
    fn dispatch(&mut self, event: ValidationEvent) -> Result<(), EngineError> {
        let keep_going = match self.handler.as_mut() {
            Some(handler) => handler.handle_event(&event),
            None => event.severity != Severity::Fatal,
        };
        if keep_going {
            Ok(())
        } else {
            Err(EngineError::Aborted { event })
        }
    }

    fn open_element(
        &mut self,
        start: &BytesStart<'_>,
        scopes: &mut NamespaceScopes,
        offset: u64,
    ) -> Result<Element, EngineError> {
        let mut frame: Vec<(Option<String>, String)> = Vec::new();
        let mut plain: Vec<(Option<String>, String, String)> = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| EngineError::Content(format!("bad attribute: {e}")))?;
            let key = str::from_utf8(attr.key.as_ref())
                .map_err(|e| EngineError::Content(format!("non-UTF-8 attribute name: {e}")))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| EngineError::Content(e.to_string()))?
                .into_owned();
            if key == "xmlns" {
                frame.push((None, value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                frame.push((Some(prefix.to_string()), value));
            } else {
                let (prefix, local) = split_qualified(&key);
                plain.push((prefix, local, value));
            }
        }

        scopes.push(frame.clone());

        let raw_name = str::from_utf8(start.name().as_ref())
            .map_err(|e| EngineError::Content(format!("non-UTF-8 element name: {e}")))?
            .to_string();
        let (el_prefix, el_local) = split_qualified(&raw_name);
        let namespace = match el_prefix.as_deref() {
            Some(prefix) => match scopes.resolve(Some(prefix)) {
                Some(uri) => Some(uri.to_string()),
                None => {
                    self.dispatch(
                        ValidationEvent::new(
                            Severity::Error,
                            format!("undeclared namespace prefix {prefix:?} on element {el_local}"),
                        )
                        .at_offset(offset),
                    )?;
                    None
                }
            },
            None => scopes.resolve(None).map(str::to_owned),
        };

        let mut element = Element::new(match namespace {
            Some(uri) => QName::new(uri, el_local),
            None => QName::local(el_local),
        });
        element.set_prefix(el_prefix);
        for (prefix, uri) in frame {
            element.declare_namespace(prefix, uri);
        }

        for (prefix, local, value) in plain {
            let name = match prefix.as_deref() {
                None => QName::local(local),
                Some(prefix) => match scopes.resolve(Some(prefix)) {
                    Some(uri) => QName::new(uri.to_string(), local),
                    None => {
                        self.dispatch(
                            ValidationEvent::new(
                                Severity::Error,
                                format!(
                                    "undeclared namespace prefix {prefix:?} on attribute {local}"
                                ),
                            )
                            .at_offset(offset),
                        )?;
                        QName::local(local)
                    }
                },
            };
            element.set_attribute(name, value);
        }

        Ok(element)
    }

    fn read_tree(&mut self, reader: &mut Reader<&mut dyn BufRead>) -> Result<Element, EngineError> {
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut scopes = NamespaceScopes::default();
        loop {
            let event = reader.read_event_into(&mut buf)?;
            let offset = reader.buffer_position() as u64;
            match event {
                Event::Decl(_) | Event::DocType(_) | Event::PI(_) => {}
                Event::Start(start) => {
                    let element = self.open_element(&start, &mut scopes, offset)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = self.open_element(&start, &mut scopes, offset)?;
                    scopes.pop();
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.push_element(element);
                        }
                        None => return Ok(element),
                    }
                }
                Event::End(_) => {
                    scopes.pop();
                    let element = match stack.pop() {
                        Some(element) => element,
                        None => {
                            return Err(EngineError::Content("unmatched end tag".to_string()));
                        }
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.push_element(element),
                        None => return Ok(element),
                    }
                }
                Event::Text(text) => {
                    let value = text
                        .xml_content()
                        .map_err(|e| EngineError::Content(e.to_string()))?
                        .into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.push_text(value),
                        None => {
                            self.dispatch(
                                ValidationEvent::new(
                                    Severity::Fatal,
                                    "text content outside the root element",
                                )
                                .at_offset(offset),
                            )?;
                        }
                    }
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(value);
                    }
                }
                Event::Comment(comment) => {
                    let value = String::from_utf8_lossy(comment.as_ref()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.append_child(XmlNode::Comment(value));
                    }
                }
                Event::GeneralRef(_) => {
                    self.dispatch(
                        ValidationEvent::new(
                            Severity::Error,
                            "unresolved general entity reference",
                        )
                        .at_offset(offset),
                    )?;
                }
                Event::Eof => {
                    let message = if stack.is_empty() {
                        "no root element in input"
                    } else {
                        "unexpected end of input inside an open element"
                    };
                    return Err(EngineError::Content(message.to_string()));
                }
            }
            buf.clear();
        }
    }

    fn bind(&mut self, root: &Element) -> Result<(), EngineError> {
        let schema = Arc::clone(&self.schema);
        let decl = schema
            .element(root.name())
            .ok_or_else(|| EngineError::UnboundRoot {
                name: root.name().clone(),
            })?;
        self.validate_element(&schema, root, decl)
    }

    fn validate_element(
        &mut self,
        schema: &SchemaSet,
        element: &Element,
        decl: &ElementDecl,
    ) -> Result<(), EngineError> {
        for attr in element.attributes() {
            if !decl.attributes.iter().any(|a| a.name == attr.name) {
                self.dispatch(ValidationEvent::new(
                    Severity::Warning,
                    format!(
                        "undeclared attribute {} on element {}",
                        attr.name,
                        element.name()
                    ),
                ))?;
            }
        }
        for required in decl.attributes.iter().filter(|a| a.required) {
            if element
                .attribute(required.name.namespace.as_deref(), &required.name.local)
                .is_none()
            {
                self.dispatch(ValidationEvent::new(
                    Severity::Error,
                    format!(
                        "missing required attribute {} on element {}",
                        required.name,
                        element.name()
                    ),
                ))?;
            }
        }

        match &decl.content {
            ContentModel::Any => {}
            ContentModel::Empty => {
                if !element.children().is_empty() {
                    self.dispatch(ValidationEvent::new(
                        Severity::Error,
                        format!("element {} is declared empty but has content", element.name()),
                    ))?;
                }
            }
            ContentModel::Text => {
                if element.elements().next().is_some() {
                    self.dispatch(ValidationEvent::new(
                        Severity::Error,
                        format!(
                            "element {} is declared text-only but has child elements",
                            element.name()
                        ),
                    ))?;
                }
            }
            ContentModel::Elements(allowed) => {
                for child in element.elements() {
                    if !allowed.contains(child.name()) {
                        self.dispatch(ValidationEvent::new(
                            Severity::Warning,
                            format!(
                                "undeclared child element {} in {}",
                                child.name(),
                                element.name()
                            ),
                        ))?;
                    }
                }
                let has_text = element
                    .children()
                    .iter()
                    .any(|c| matches!(c, XmlNode::Text(t) if !t.trim().is_empty()));
                if has_text {
                    self.dispatch(ValidationEvent::new(
                        Severity::Error,
                        format!(
                            "unexpected text content in element-only {}",
                            element.name()
                        ),
                    ))?;
                }
            }
        }

        for child in element.elements() {
            if let Some(child_decl) = schema.element(child.name()) {
                self.validate_element(schema, child, child_decl)?;
            }
        }
        Ok(())
    }
}

impl Unmarshaller for QuickXmlUnmarshaller {
    fn set_event_handler(&mut self, handler: Box<dyn ValidationEventHandler>) {
        self.handler = Some(handler);
    }

    fn unmarshal(&mut self, input: &mut dyn BufRead) -> Result<ContentTree, EngineError> {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);
        let root = self.read_tree(&mut reader)?;
        self.bind(&root)?;
        Ok(ContentTree::new(root))
    }

    fn unmarshal_element(&mut self, element: &Element) -> Result<ContentTree, EngineError> {
        self.bind(element)?;
        Ok(ContentTree::new(element.clone()))
    }
}

fn split_qualified(name: &str) -> (Option<String>, String) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, name.to_string()),
    }
}
