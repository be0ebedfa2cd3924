//! Cross-reference resolution.
//!
//! An empty `<a href="#id"></a>` takes its text from the element it points
//! at: the target's leading text, or the content of its numbering marker when
//! the target is a numbered chapter heading.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use tracing::{debug, trace};

use crate::document::{ChildNode, DocumentTree};
use crate::options::Options;

/// Counts from one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct XrefReport {
    /// Links whose text was filled in.
    pub resolved: usize,
    /// Empty in-document links left empty: missing target or a target
    /// starting with something other than text or a marker span.
    pub unresolved: usize,
    /// Links that were not candidates (external href or existing text).
    pub skipped: usize,
}

/// Fills empty in-document links with their target's title or number.
#[derive(Debug, Clone, Default)]
pub struct XrefResolver {
    options: Options,
}

impl XrefResolver {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn run<T: DocumentTree>(&self, tree: &mut T) -> XrefReport {
        let mut report = XrefReport::default();

        for link in tree.query_all(&|tag| tag == "a") {
            let Some(fragment) = tree
                .attribute(link, "href")
                .and_then(|href| href.strip_prefix('#'))
                .map(str::to_string)
            else {
                report.skipped += 1;
                continue;
            };
            if !tree.text_content(link).is_empty() {
                report.skipped += 1;
                continue;
            }

            match self.link_text(tree, &fragment) {
                Some(text) => {
                    trace!(%fragment, %text, "resolved cross-reference");
                    tree.set_text_content(link, &text);
                    report.resolved += 1;
                }
                None => report.unresolved += 1,
            }
        }

        debug!(
            resolved = report.resolved,
            unresolved = report.unresolved,
            skipped = report.skipped,
            "resolved cross-references"
        );
        report
    }

    /// Text for a link to `#fragment`, if the target can supply one.
    fn link_text<T: DocumentTree>(&self, tree: &T, fragment: &str) -> Option<String> {
        let Some(target) = self.lookup(tree, fragment) else {
            debug!(%fragment, "cross-reference target not found");
            return None;
        };

        match tree.first_child(target) {
            Some(ChildNode::Text(text)) => Some(text.to_string()),
            Some(ChildNode::Element { tag: "span", handle }) => Some(
                self.options
                    .marker_format
                    .link_text(&tree.text_content(handle)),
            ),
            other => {
                debug!(%fragment, ?other, "cross-reference target has no usable first child");
                None
            }
        }
    }

    fn lookup<T: DocumentTree>(&self, tree: &T, fragment: &str) -> Option<T::Handle> {
        if let Some(target) = tree.get_by_id(fragment) {
            return Some(target);
        }
        if !self.options.decode_fragments {
            return None;
        }
        match percent_decode_str(fragment).decode_utf8() {
            Ok(Cow::Owned(decoded)) => tree.get_by_id(&decoded),
            // Borrowed means nothing was decoded; that lookup already missed.
            _ => None,
        }
    }
}

/// Resolve the empty in-document links of `tree` with the given options.
pub fn resolve_xrefs<T: DocumentTree>(tree: &mut T, options: &Options) -> XrefReport {
    XrefResolver::new(options.clone()).run(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ArenaDom, parse_html};
    use crate::options::MarkerFormat;
    use crate::transform::number_chapters;

    fn link_text(dom: &ArenaDom, id: &str) -> String {
        dom.collect_text(dom.get_by_id(id).expect("link id"))
    }

    #[test]
    fn test_resolves_to_target_text() {
        let mut dom = parse_html(r##"<h1 id="sec1">Intro</h1><a id="l" href="#sec1"></a>"##);
        let report = resolve_xrefs(&mut dom, &Options::default());

        assert_eq!(link_text(&dom, "l"), "Intro");
        assert_eq!(report.resolved, 1);
    }

    #[test]
    fn test_target_text_is_verbatim() {
        let mut dom = parse_html(
            r##"<h2 id="s">  Spaced <em>title</em></h2><a id="l" href="#s"></a>"##,
        );
        resolve_xrefs(&mut dom, &Options::default());

        // Only the leading text node, whitespace included.
        assert_eq!(link_text(&dom, "l"), "  Spaced ");
    }

    #[test]
    fn test_resolves_to_chapter_number() {
        let mut dom = parse_html(
            r##"<h1 id="sec1" class="chapter">Intro</h1><p><a id="l" href="#sec1"></a></p>"##,
        );
        number_chapters(&mut dom, &Options::default());
        resolve_xrefs(&mut dom, &Options::default());

        assert_eq!(link_text(&dom, "l"), "1");
    }

    #[test]
    fn test_period_format_trims_suffix() {
        let options = Options {
            marker_format: MarkerFormat::NumberedWithPeriod,
            ..Options::default()
        };
        let mut dom = parse_html(
            r##"<h1 class="chapter">Pre</h1><h1 id="sec2" class="chapter">Intro</h1><a id="l" href="#sec2"></a>"##,
        );
        number_chapters(&mut dom, &options);
        resolve_xrefs(&mut dom, &options);

        assert_eq!(link_text(&dom, "l"), "2");
    }

    #[test]
    fn test_appendix_letter() {
        let mut dom = parse_html(
            r##"<h1 id="g" class="chapter appendix">Glossary</h1><a id="l" href="#g"></a>"##,
        );
        number_chapters(&mut dom, &Options::default());
        resolve_xrefs(&mut dom, &Options::default());

        assert_eq!(link_text(&dom, "l"), "A");
    }

    #[test]
    fn test_existing_text_is_kept() {
        let mut dom = parse_html(
            r##"<h1 id="x">Target</h1><a id="l" href="#x">Already set</a><a id="m" href="#x"><b>bold</b></a>"##,
        );
        let report = resolve_xrefs(&mut dom, &Options::default());

        assert_eq!(link_text(&dom, "l"), "Already set");
        assert_eq!(link_text(&dom, "m"), "bold");
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_missing_target_left_empty() {
        let mut dom = parse_html(r##"<a id="l" href="#missing"></a>"##);
        let report = resolve_xrefs(&mut dom, &Options::default());

        assert_eq!(link_text(&dom, "l"), "");
        assert_eq!(report.unresolved, 1);
    }

    #[test]
    fn test_external_and_missing_href_skipped() {
        let mut dom = parse_html(
            r##"<h1 id="x">T</h1><a id="l" href="page.html#x"></a><a id="m"></a><a id="n" href="https://example.com"></a>"##,
        );
        let report = resolve_xrefs(&mut dom, &Options::default());

        assert_eq!(link_text(&dom, "l"), "");
        assert_eq!(link_text(&dom, "m"), "");
        assert_eq!(report.skipped, 3);
        assert_eq!(report.resolved, 0);
    }

    #[test]
    fn test_unsupported_first_child() {
        let mut dom = parse_html(
            r##"<div id="d"><p>Para</p></div><div id="c"><!-- note -->Text</div><div id="e"></div>
                <a id="l1" href="#d"></a><a id="l2" href="#c"></a><a id="l3" href="#e"></a>"##,
        );
        let report = resolve_xrefs(&mut dom, &Options::default());

        for id in ["l1", "l2", "l3"] {
            assert_eq!(link_text(&dom, id), "");
        }
        assert_eq!(report.unresolved, 3);
    }

    #[test]
    fn test_any_span_counts_as_marker() {
        let mut dom = parse_html(
            r##"<h3 id="s"><span>§4</span> Rules</h3><a id="l" href="#s"></a>"##,
        );
        resolve_xrefs(&mut dom, &Options::default());

        assert_eq!(link_text(&dom, "l"), "§4");
    }

    #[test]
    fn test_empty_fragment_matches_nothing() {
        let mut dom = parse_html(r##"<a id="l" href="#"></a>"##);
        let report = resolve_xrefs(&mut dom, &Options::default());

        assert_eq!(link_text(&dom, "l"), "");
        assert_eq!(report.unresolved, 1);
    }

    #[test]
    fn test_percent_encoded_fragment() {
        let html = r##"<h1 id="café">Coffee</h1><a id="l" href="#caf%C3%A9"></a>"##;

        let mut dom = parse_html(html);
        resolve_xrefs(&mut dom, &Options::default());
        assert_eq!(link_text(&dom, "l"), "Coffee");

        let mut dom = parse_html(html);
        let options = Options {
            decode_fragments: false,
            ..Options::default()
        };
        resolve_xrefs(&mut dom, &options);
        assert_eq!(link_text(&dom, "l"), "");
    }

    #[test]
    fn test_raw_fragment_wins_over_decoded() {
        let mut dom = parse_html(
            r##"<h1 id="a%20b">Raw</h1><h1 id="a b">Decoded</h1><a id="l" href="#a%20b"></a>"##,
        );
        resolve_xrefs(&mut dom, &Options::default());

        assert_eq!(link_text(&dom, "l"), "Raw");
    }

    #[test]
    fn test_link_to_resolved_link() {
        // Links are visited in document order, so the second sees the first
        // already filled in.
        let mut dom = parse_html(
            r##"<h1 id="t">Title</h1><a id="first" href="#t"></a><a id="second" href="#first"></a>"##,
        );
        resolve_xrefs(&mut dom, &Options::default());

        assert_eq!(link_text(&dom, "second"), "Title");
    }
}
