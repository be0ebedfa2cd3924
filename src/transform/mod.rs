//! The post-processing passes.
//!
//! - Chapters: number `h1.chapter` headings
//! - Xrefs: fill empty `#fragment` links from their targets
//!
//! Both run against any [`DocumentTree`]. Resolution shows chapter numbers
//! only if numbering ran first, which is the order [`process`] uses.

mod chapters;
mod xrefs;

pub use chapters::{ChapterNumberer, NumberingReport, appendix_letter, number_chapters};
pub use xrefs::{XrefReport, XrefResolver, resolve_xrefs};

use serde::Serialize;

use crate::document::DocumentTree;
use crate::options::Options;

/// Which passes to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Passes {
    #[default]
    All,
    Numbers,
    Xrefs,
}

/// Counts from [`process`]. A pass that did not run reports `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub numbering: Option<NumberingReport>,
    pub xrefs: Option<XrefReport>,
}

/// Number chapters, then resolve cross-references.
pub fn process<T: DocumentTree>(tree: &mut T, options: &Options) -> ProcessReport {
    process_passes(tree, options, Passes::All)
}

pub fn process_passes<T: DocumentTree>(
    tree: &mut T,
    options: &Options,
    passes: Passes,
) -> ProcessReport {
    let numbering = matches!(passes, Passes::All | Passes::Numbers)
        .then(|| number_chapters(tree, options));
    let xrefs = matches!(passes, Passes::All | Passes::Xrefs).then(|| resolve_xrefs(tree, options));
    ProcessReport { numbering, xrefs }
}
