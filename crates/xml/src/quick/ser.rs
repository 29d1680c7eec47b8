//! Streaming serialization of content trees through quick-xml.
//!
//! Prefix assignment is a pure fold over the tree in order of first
//! namespace occurrence, so output is deterministic for a fixed tree and
//! mapper. All namespace declarations are emitted on the root element of
//! the marshalled fragment.

use std::io::Write;
use std::sync::Arc;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::engine::{Marshaller, PrefixMapper, PropertyValue, property};
use crate::error::{EngineError, PropertyError};
use crate::name::QName;
use crate::node::{ContentTree, Element, XmlNode};
use crate::ns;
use crate::schema::SchemaSet;

/// One namespace-to-prefix decision; an empty prefix is the default
/// namespace.
#[derive(Debug, Clone, PartialEq)]
struct Assignment {
    uri: String,
    prefix: String,
}

/// Deterministic assignment of prefixes to every namespace URI a tree
/// uses.
struct PrefixPlan {
    assignments: Vec<Assignment>,
    allow_default: bool,
    counter: usize,
}

impl PrefixPlan {
    fn build(root: &Element, mapper: Option<&dyn PrefixMapper>) -> Self {
        let mut plan = Self {
            assignments: Vec::new(),
            // The default namespace would capture unqualified elements,
            // so it is only usable when the tree has none.
            allow_default: !has_unqualified_element(root),
            counter: 0,
        };
        plan.visit(root, mapper);
        plan
    }

    fn visit(&mut self, element: &Element, mapper: Option<&dyn PrefixMapper>) {
        if let Some(uri) = element.name().namespace.as_deref() {
            self.assign(uri, element.prefix(), mapper, false);
        }
        for attr in element.attributes() {
            if let Some(uri) = attr.name.namespace.as_deref() {
                if uri != ns::XML {
                    self.assign(uri, None, mapper, true);
                }
            }
        }
        for child in element.elements() {
            self.visit(child, mapper);
        }
    }

    fn assign(
        &mut self,
        uri: &str,
        suggestion: Option<&str>,
        mapper: Option<&dyn PrefixMapper>,
        require_prefix: bool,
    ) {
        let satisfied = self
            .assignments
            .iter()
            .any(|a| a.uri == uri && (!require_prefix || !a.prefix.is_empty()));
        if satisfied {
            return;
        }

        let mut candidate = match mapper {
            Some(mapper) => mapper.preferred_prefix(uri, suggestion, require_prefix),
            None => suggestion.map(str::to_owned),
        };
        if candidate.as_deref() == Some("") && (require_prefix || !self.allow_default) {
            candidate = None;
        }
        let prefix = match candidate {
            Some(p) if self.unclaimed(&p) => p,
            _ => self.generate(require_prefix),
        };
        self.assignments.push(Assignment {
            uri: uri.to_string(),
            prefix,
        });
    }

    fn unclaimed(&self, prefix: &str) -> bool {
        !self.assignments.iter().any(|a| a.prefix == prefix)
    }

    fn generate(&mut self, require_prefix: bool) -> String {
        if !require_prefix && self.allow_default && self.unclaimed("") {
            return String::new();
        }
        loop {
            self.counter += 1;
            let generated = format!("ns{}", self.counter);
            if self.unclaimed(&generated) {
                return generated;
            }
        }
    }

    fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    fn element_prefix(&self, uri: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.uri == uri)
            .map(|a| a.prefix.as_str())
    }

    /// Attributes never use the default namespace, so only a non-empty
    /// assignment qualifies.
    fn attribute_prefix(&self, uri: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.uri == uri && !a.prefix.is_empty())
            .map(|a| a.prefix.as_str())
    }

    fn qualified_element_name(&self, element: &Element) -> String {
        match element
            .name()
            .namespace
            .as_deref()
            .and_then(|uri| self.element_prefix(uri))
        {
            Some("") | None => element.name().local.clone(),
            Some(prefix) => format!("{}:{}", prefix, element.name().local),
        }
    }

    fn qualified_attribute_name(&self, name: &QName) -> String {
        match name.namespace.as_deref() {
            None => name.local.clone(),
            Some(uri) if uri == ns::XML => format!("xml:{}", name.local),
            Some(uri) => match self.attribute_prefix(uri) {
                Some(prefix) => format!("{}:{}", prefix, name.local),
                None => name.local.clone(),
            },
        }
    }
}

fn has_unqualified_element(element: &Element) -> bool {
    element.name().namespace.is_none() || element.elements().any(has_unqualified_element)
}

/// The default marshaller: streams quick-xml events, one resource per
/// marshal call.
pub struct QuickXmlMarshaller {
    schema: Arc<SchemaSet>,
    mapper: Option<Arc<dyn PrefixMapper>>,
    indent: bool,
}

impl QuickXmlMarshaller {
    pub(crate) fn new(schema: Arc<SchemaSet>) -> Self {
        Self {
            schema,
            mapper: None,
            indent: false,
        }
    }

    fn require_binding(&self, root: &Element) -> Result<(), EngineError> {
        if self.schema.element(root.name()).is_none() {
            return Err(EngineError::UnboundRoot {
                name: root.name().clone(),
            });
        }
        Ok(())
    }

    fn write_document<W: Write>(
        &self,
        writer: &mut Writer<W>,
        root: &Element,
        plan: &PrefixPlan,
    ) -> Result<(), EngineError> {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        write_element(writer, root, plan, true)
    }
}

impl Marshaller for QuickXmlMarshaller {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            property::PREFIX_MAPPER => match value {
                PropertyValue::PrefixMapper(mapper) => {
                    self.mapper = Some(mapper);
                    Ok(())
                }
                other => Err(PropertyError::Invalid {
                    name: name.to_string(),
                    reason: format!("expected a prefix mapper, got a {}", other.kind()),
                }),
            },
            property::INDENT_OUTPUT => match value {
                PropertyValue::Indent(on) => {
                    self.indent = on;
                    Ok(())
                }
                other => Err(PropertyError::Invalid {
                    name: name.to_string(),
                    reason: format!("expected a boolean switch, got a {}", other.kind()),
                }),
            },
            other => Err(PropertyError::Unsupported {
                name: other.to_string(),
            }),
        }
    }

    fn marshal(&mut self, tree: &ContentTree, out: &mut dyn Write) -> Result<(), EngineError> {
        let root = tree.root();
        self.require_binding(root)?;
        let plan = PrefixPlan::build(root, self.mapper.as_deref());
        if self.indent {
            let mut writer = Writer::new_with_indent(out, b' ', 2);
            self.write_document(&mut writer, root, &plan)
        } else {
            let mut writer = Writer::new(out);
            self.write_document(&mut writer, root, &plan)
        }
    }

    fn marshal_to_node(
        &mut self,
        tree: &ContentTree,
        target: &mut XmlNode,
    ) -> Result<(), EngineError> {
        let root = tree.root();
        self.require_binding(root)?;
        let plan = PrefixPlan::build(root, self.mapper.as_deref());
        let rendered = render_element(root, &plan, true)?;
        if !target.append_child(XmlNode::Element(rendered)) {
            return Err(EngineError::Tree {
                reason: format!("target {} node cannot hold children", target.kind()),
            });
        }
        Ok(())
    }
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &Element,
    plan: &PrefixPlan,
    is_root: bool,
) -> Result<(), EngineError> {
    let name = plan.qualified_element_name(element);
    let mut start = BytesStart::new(name.as_str());
    if is_root {
        for assignment in plan.assignments() {
            if assignment.prefix.is_empty() {
                start.push_attribute(("xmlns", assignment.uri.as_str()));
            } else {
                start.push_attribute((
                    format!("xmlns:{}", assignment.prefix).as_str(),
                    assignment.uri.as_str(),
                ));
            }
        }
    }
    for attr in element.attributes() {
        start.push_attribute((
            plan.qualified_attribute_name(&attr.name).as_str(),
            attr.value.as_str(),
        ));
    }

    if element.children().is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in element.children() {
        match child {
            XmlNode::Element(child) => write_element(writer, child, plan, false)?,
            XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            XmlNode::Comment(comment) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?
            }
            other => {
                return Err(EngineError::Tree {
                    reason: format!("{} node inside element content", other.kind()),
                });
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

/// Materializes the plan into a detached element: prefixes set as hints,
/// declarations carried on the root of the rendered fragment.
fn render_element(
    element: &Element,
    plan: &PrefixPlan,
    is_root: bool,
) -> Result<Element, EngineError> {
    let mut out = Element::new(element.name().clone());
    let prefix = element
        .name()
        .namespace
        .as_deref()
        .and_then(|uri| plan.element_prefix(uri))
        .filter(|p| !p.is_empty());
    out.set_prefix(prefix.map(str::to_owned));
    if is_root {
        for assignment in plan.assignments() {
            let prefix = if assignment.prefix.is_empty() {
                None
            } else {
                Some(assignment.prefix.clone())
            };
            out.declare_namespace(prefix, assignment.uri.clone());
        }
    }
    for attr in element.attributes() {
        out.set_attribute(attr.name.clone(), attr.value.clone());
    }
    for child in element.children() {
        match child {
            XmlNode::Element(child) => out.push_element(render_element(child, plan, false)?),
            XmlNode::Text(text) => out.push_text(text.clone()),
            XmlNode::Comment(comment) => {
                out.append_child(XmlNode::Comment(comment.clone()));
            }
            other => {
                return Err(EngineError::Tree {
                    reason: format!("{} node inside element content", other.kind()),
                });
            }
        }
    }
    Ok(out)
}
