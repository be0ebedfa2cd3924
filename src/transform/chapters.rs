//! Chapter numbering.
//!
//! Every `h1` whose classes include `chapter` (and not `nonumber`) gets a
//! `span` marker as its first child holding the chapter number, or an
//! appendix letter when it also carries `appendix`.

use serde::Serialize;
use tracing::{debug, trace};

use crate::document::DocumentTree;
use crate::options::Options;

const CHAPTER_CLASS: &str = "chapter";
const NONUMBER_CLASS: &str = "nonumber";
const APPENDIX_CLASS: &str = "appendix";

const APPENDIX_LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Counts from one numbering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NumberingReport {
    /// Headings given a number.
    pub chapters: usize,
    /// Headings given a letter.
    pub appendices: usize,
    /// `h1` elements left alone.
    pub skipped: usize,
}

/// Numbers chapter headings in document order.
#[derive(Debug, Clone, Default)]
pub struct ChapterNumberer {
    options: Options,
}

impl ChapterNumberer {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Insert numbering markers into every qualifying heading of `tree`.
    ///
    /// Counters start fresh on each call. Markers are not detected, so a
    /// second run on the same tree inserts a second set.
    pub fn run<T: DocumentTree>(&self, tree: &mut T) -> NumberingReport {
        let mut report = NumberingReport::default();
        let mut chapter_count: usize = 1;
        let mut appendix_count: usize = 0;

        for heading in tree.query_all(&|tag| tag == "h1") {
            let (qualifies, appendix) = {
                let classes = tree.class_tokens(heading);
                (
                    classes.contains(&CHAPTER_CLASS) && !classes.contains(&NONUMBER_CLASS),
                    classes.contains(&APPENDIX_CLASS),
                )
            };
            if !qualifies {
                report.skipped += 1;
                continue;
            }

            let label = if appendix && self.options.appendix_mode {
                let letter = appendix_letter(appendix_count);
                appendix_count += 1;
                report.appendices += 1;
                self.options.marker_format.label(letter)
            } else {
                let number = chapter_count;
                chapter_count += 1;
                report.chapters += 1;
                self.options.marker_format.label(number)
            };
            trace!(%label, "numbering chapter heading");

            let marker = match &self.options.marker_class {
                Some(class) => tree.create_element("span", &[("class", class.as_str())]),
                None => tree.create_element("span", &[]),
            };
            let text = tree.create_text(&label);
            tree.append_child(marker, text);
            tree.prepend_child(heading, marker);
        }

        debug!(
            chapters = report.chapters,
            appendices = report.appendices,
            skipped = report.skipped,
            "numbered chapters"
        );
        report
    }
}

/// Letter for the `index`-th appendix, wrapping after `Z`.
pub fn appendix_letter(index: usize) -> char {
    APPENDIX_LETTERS[index % APPENDIX_LETTERS.len()] as char
}

/// Number the chapters of `tree` with the given options.
pub fn number_chapters<T: DocumentTree>(tree: &mut T, options: &Options) -> NumberingReport {
    ChapterNumberer::new(options.clone()).run(tree)
}
