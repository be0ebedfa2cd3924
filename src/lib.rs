//! # chapter-xref
//!
//! Post-processing for rendered HTML documents: chapter numbering and
//! cross-reference text.
//!
//! ## Features
//!
//! - Number `<h1 class="chapter">` headings 1, 2, 3, ... with a leading
//!   `<span>` marker, skipping `nonumber` headings
//! - Letter `appendix` chapters A, B, C, ... on a separate counter
//! - Fill empty `<a href="#id"></a>` links with the target's title or number
//! - Works on any tree implementing [`DocumentTree`]; an arena DOM backed by
//!   html5ever is included
//!
//! ## Quick Start
//!
//! ```
//! use chapter_xref::{Options, process_html};
//!
//! let html = r##"<h1 id="intro" class="chapter">Intro</h1><p>See <a href="#intro"></a>.</p>"##;
//! let out = process_html(html, &Options::default());
//!
//! assert!(out.contains("<h1 id=\"intro\" class=\"chapter\"><span>1</span>Intro</h1>"));
//! assert!(out.contains("<a href=\"#intro\">1</a>"));
//! ```
//!
//! ## Working with a Tree
//!
//! The passes mutate a parsed tree in place and return counts:
//!
//! ```
//! use chapter_xref::dom::parse_html;
//! use chapter_xref::{Options, number_chapters, resolve_xrefs};
//!
//! let mut dom = parse_html(r#"<h1 class="chapter appendix">Glossary</h1>"#);
//! let options = Options::default();
//!
//! let numbering = number_chapters(&mut dom, &options);
//! assert_eq!(numbering.appendices, 1);
//!
//! let xrefs = resolve_xrefs(&mut dom, &options);
//! assert_eq!(xrefs.resolved, 0);
//! ```

pub mod document;
pub mod dom;
pub mod error;
pub mod options;
pub mod transform;
pub(crate) mod util;

pub use document::{ChildNode, DocumentTree};
pub use error::{Error, Result};
pub use options::{MarkerFormat, Options};
pub use transform::{
    ChapterNumberer, NumberingReport, Passes, ProcessReport, XrefReport, XrefResolver,
    number_chapters, process, process_passes, resolve_xrefs,
};

/// Parse `html`, run both passes, and serialize the result.
pub fn process_html(html: &str, options: &Options) -> String {
    let mut dom = dom::parse_html(html);
    process(&mut dom, options);
    dom::to_html(&dom)
}
