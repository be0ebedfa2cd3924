//! Document hosting: parse HTML into an arena tree and write it back out.
//!
//! The chapter and xref passes never parse or serialize; this module plays
//! the part of the page that loads the document and hands the tree over.
//!
//! ```
//! use chapter_xref::dom::{parse_html, to_html};
//!
//! let dom = parse_html(r#"<h1 class="chapter">Intro</h1>"#);
//! assert!(to_html(&dom).contains("<h1 class=\"chapter\">Intro</h1>"));
//! ```

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{
    ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute, html_element_name, html_name,
};
pub use serialize::SerializableNode;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::serialize::{SerializeOpts, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;

use crate::error::Result;
use tree_sink::ArenaSink;

/// Parse an HTML document into an arena tree.
pub fn parse_html(html: &str) -> ArenaDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };
    parse_document(ArenaSink::new(), opts)
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

/// Parse raw HTML bytes, detecting the character encoding.
///
/// UTF-8 is tried first, then the encoding named by an XML declaration,
/// then Windows-1252.
pub fn parse_html_bytes(html: &[u8]) -> ArenaDom {
    let hint = crate::util::extract_xml_encoding(html);
    let text = crate::util::decode_text(html, hint);
    parse_html(&text)
}

/// Serialize the whole tree back to HTML.
pub fn write_html<W: std::io::Write>(dom: &ArenaDom, writer: W) -> Result<()> {
    let root = SerializableNode {
        dom,
        node: dom.document(),
    };
    serialize(writer, &root, SerializeOpts::default())?;
    Ok(())
}

/// Serialize the whole tree to a string.
pub fn to_html(dom: &ArenaDom) -> String {
    let mut bytes = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_html(dom, &mut bytes);
    String::from_utf8_lossy(&bytes).into_owned()
}
