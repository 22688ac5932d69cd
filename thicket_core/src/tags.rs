// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element name tables, namespaces, and the xlink attribute convention.
//!
//! Hosts use these to decide how a [`Tag`](crate::vnode::Tag) becomes a
//! concrete node: HTML elements are created plainly, SVG and MathML
//! elements are created in their namespace, and attribute keys of the form
//! `xlink:<local>` are written in the xlink namespace.

/// Known HTML element names.
///
/// Unknown names still produce plain elements; the table exists so hosts can
/// distinguish HTML from SVG names that would otherwise be ambiguous.
pub const HTML_TAGS: &[&str] = &[
    "html", "body", "base", "head", "link", "meta", "style", "title", "address", "article",
    "aside", "footer", "header", "h1", "h2", "h3", "h4", "h5", "h6", "nav", "section", "div",
    "dd", "dl", "dt", "figcaption", "figure", "picture", "hr", "img", "li", "main", "ol", "p",
    "pre", "ul", "a", "b", "abbr", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em", "i",
    "kbd", "mark", "q", "rp", "rt", "ruby", "s", "samp", "small", "span", "strong", "sub", "sup",
    "time", "u", "var", "wbr", "area", "audio", "map", "track", "video", "embed", "object",
    "param", "source", "canvas", "script", "noscript", "del", "ins", "caption", "col",
    "colgroup", "table", "thead", "tbody", "td", "th", "tr", "button", "datalist", "fieldset",
    "form", "input", "label", "legend", "meter", "optgroup", "option", "output", "progress",
    "select", "textarea", "details", "dialog", "menu", "summary", "template", "blockquote",
    "iframe", "tfoot",
];

/// Known SVG element names.
pub const SVG_TAGS: &[&str] = &[
    "svg",
    "animate",
    "circle",
    "clippath",
    "cursor",
    "image",
    "defs",
    "desc",
    "ellipse",
    "filter",
    "font-face",
    "foreignobject",
    "g",
    "glyph",
    "line",
    "marker",
    "mask",
    "missing-glyph",
    "path",
    "pattern",
    "polygon",
    "polyline",
    "rect",
    "switch",
    "symbol",
    "text",
    "textpath",
    "tspan",
    "use",
    "view",
    "feBlend",
    "feColorMatrix",
    "feComponentTransfer",
    "feComposite",
    "feConvolveMatrix",
    "feDiffuseLighting",
    "feDisplacementMap",
    "feFlood",
    "feGaussianBlur",
    "feImage",
    "feMerge",
    "feMorphology",
    "feOffset",
    "feSpecularLighting",
    "feTile",
    "feTurbulence",
    "feDistantLight",
    "fePointLight",
    "feSpotLight",
    "linearGradient",
    "stop",
    "radialGradient",
    "animateTransform",
    "animateMotion",
];

/// The xlink namespace URI.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

const XLINK_PREFIX: &str = "xlink:";

/// Element namespace families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// The default (HTML) namespace.
    Html,
    /// SVG elements.
    Svg,
    /// MathML elements.
    MathMl,
}

impl Namespace {
    /// Returns the namespace URI, or `None` for plain HTML creation.
    #[must_use]
    pub const fn uri(self) -> Option<&'static str> {
        match self {
            Self::Html => None,
            Self::Svg => Some("http://www.w3.org/2000/svg"),
            Self::MathMl => Some("http://www.w3.org/1998/Math/MathML"),
        }
    }
}

/// Returns whether `tag` is a known HTML element name.
#[must_use]
pub fn is_html_tag(tag: &str) -> bool {
    HTML_TAGS.contains(&tag)
}

/// Returns whether `tag` is a known SVG element name.
#[must_use]
pub fn is_svg_tag(tag: &str) -> bool {
    SVG_TAGS.contains(&tag)
}

/// Resolves the namespace an element named `tag` is created in.
///
/// The HTML table is consulted first. Names found in neither table are
/// created as plain HTML elements (custom elements included).
#[must_use]
pub fn namespace_of(tag: &str) -> Namespace {
    if is_html_tag(tag) {
        Namespace::Html
    } else if is_svg_tag(tag) {
        Namespace::Svg
    } else if tag == "math" {
        Namespace::MathMl
    } else {
        Namespace::Html
    }
}

/// An attribute key, split by namespace convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrName<'a> {
    /// A plain attribute.
    Plain(&'a str),
    /// An attribute in the [xlink namespace](XLINK_NS).
    XLink {
        /// The full key, e.g. `xlink:href`. Used when setting.
        qualified: &'a str,
        /// The local name, e.g. `href`. Used when removing.
        local: &'a str,
    },
}

impl<'a> AttrName<'a> {
    /// Classifies a prop key.
    #[must_use]
    pub fn parse(key: &'a str) -> Self {
        match key.strip_prefix(XLINK_PREFIX) {
            Some(local) => Self::XLink {
                qualified: key,
                local,
            },
            None => Self::Plain(key),
        }
    }

    /// Returns the key as written in props.
    #[must_use]
    pub const fn qualified(self) -> &'a str {
        match self {
            Self::Plain(name) => name,
            Self::XLink { qualified, .. } => qualified,
        }
    }
}
