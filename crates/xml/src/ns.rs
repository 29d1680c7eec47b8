//! Well-known package namespace URIs.

/// Namespace of the package relationships part.
pub const RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Namespace of the `[Content_Types].xml` stream.
pub const CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Namespace of the core document properties part.
pub const CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";

/// Dublin Core elements, used inside core properties.
pub const DUBLIN_CORE: &str = "http://purl.org/dc/elements/1.1/";

/// Markup-compatibility namespace.
pub const MARKUP_COMPATIBILITY: &str =
    "http://schemas.openxmlformats.org/markup-compatibility/2006";

/// The `xml:` namespace, bound by definition and never declared.
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
