//! Training text and test cases derived from converted `<ab>` documents.
//!
//! Training text keeps every restoration bracketed: `abc[def]ghi`. A test
//! case hides exactly one of those spans behind dots and drops the brackets
//! of all the others: `abc[...]ghi`.

use std::ops::Range;

use indextree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::tree::{Document, Item};
use crate::util::mode_length;

static BRACKETED_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\[\]]+\]").unwrap());

/// Candidate readings of a converted `<supplied>` element: its own text, or
/// the text of each `<alt>` child. An `<alt>` without text counts as empty.
pub fn supplied_texts(doc: &Document, id: NodeId) -> Vec<String> {
    doc.items(id)
        .map(|item| match item {
            Item::Text(text) => text.to_string(),
            Item::Element(alt) => doc.element(alt).text.clone().unwrap_or_default(),
        })
        .collect()
}

/// Replaces every `<supplied>` below the root with its first non-empty
/// candidate in brackets, or with nothing when it has none.
///
/// Whitespace-only leading text is cleared beforehand, so a supplied span
/// holding only whitespace has no candidates. Empty readings are passed over
/// because `[]` would never become a test case.
pub fn create_training_text(doc: &mut Document) -> crate::Result<()> {
    clear_blank_text(doc);

    for supplied in doc.find_all(doc.root(), "supplied") {
        let first = supplied_texts(doc, supplied)
            .into_iter()
            .find(|text| !text.is_empty());
        let replacement = match first {
            Some(first) => format!("[{first}]"),
            None => String::new(),
        };
        doc.replace_with_text(supplied, &replacement, true)?;
    }

    Ok(())
}

/// Plain text of the root's content. Text is written as is; elements still in
/// the tree, `<gap />` markers mostly, are written as XML.
pub fn training_text(doc: &Document) -> String {
    let mut out = String::new();
    for item in doc.items(doc.root()) {
        match item {
            Item::Text(text) => out.push_str(text),
            Item::Element(child) => out.push_str(&doc.to_xml(child)),
        }
    }
    out
}

/// One test case per non-empty bracketed span of `text`, left to right.
///
/// Every bracket pair counts, not only those written by
/// [`create_training_text`]. Literal brackets in the transcription, such as
/// an editorial `[sic]` left in plain text, become test cases of their own.
pub fn create_test_cases(text: &str) -> TestCases {
    TestCases::new(text)
}

/// Lazily masks one bracketed span at a time.
///
/// Spans are located up front; each case string is built only when it is
/// pulled. Cloning gives an independent cursor over the same spans.
#[derive(Debug, Clone)]
pub struct TestCases {
    text: String,
    spans: Vec<Range<usize>>,
    next: usize,
}

impl TestCases {
    pub fn new(text: &str) -> Self {
        let spans = BRACKETED_SPAN
            .find_iter(text)
            .map(|m| m.range())
            .collect();

        TestCases {
            text: text.to_string(),
            spans,
            next: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte ranges of every bracketed span, brackets included.
    pub fn spans(&self) -> &[Range<usize>] {
        &self.spans
    }

    pub fn restart(&mut self) {
        self.next = 0;
    }

    /// The test case that masks the span at `index`.
    pub fn case(&self, index: usize) -> Option<String> {
        self.spans.get(index).map(|span| self.mask(span))
    }

    fn mask(&self, span: &Range<usize>) -> String {
        let inner = &self.text[span.start + 1..span.end - 1];

        let mut out = String::with_capacity(self.text.len());
        push_unbracketed(&mut out, &self.text[..span.start]);
        out.push('[');
        out.push_str(&".".repeat(inner.chars().count()));
        out.push(']');
        push_unbracketed(&mut out, &self.text[span.end..]);
        out
    }
}

impl Iterator for TestCases {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let case = self.case(self.next)?;
        self.next += 1;
        Some(case)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.spans.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TestCases {}

/// A test case built from the converted tree, keeping the candidate readings
/// of the masked span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationCase {
    /// The target span as `[` + dots + `]`; every other supplied span is
    /// reduced to its own run of dots.
    pub text: String,
    /// Mode of the non-empty candidate lengths.
    pub mask_len: usize,
    pub alternatives: Vec<String>,
}

/// One [`EvaluationCase`] per `<supplied>` element with at least one
/// non-empty reading, in document order. Mask lengths come from the most
/// common candidate length, so a span with readings of different length is
/// masked at its typical size. Empty readings are left out of that count.
/// Spans without a reading still count when masking the others, at zero
/// length.
pub fn create_evaluation_cases(doc: &Document) -> crate::Result<Vec<EvaluationCase>> {
    let mut base = doc.clone();
    clear_blank_text(&mut base);

    let supplied = base.find_all(base.root(), "supplied");
    let candidates: Vec<Vec<String>> = supplied
        .iter()
        .map(|&id| supplied_texts(&base, id))
        .collect();
    let lengths: Vec<usize> = candidates
        .iter()
        .map(|texts| {
            let readings: Vec<&str> = texts
                .iter()
                .map(String::as_str)
                .filter(|text| !text.is_empty())
                .collect();
            mode_length(&readings).unwrap_or(0)
        })
        .collect();

    let mut cases = Vec::with_capacity(supplied.len());
    for (target, alternatives) in candidates.iter().enumerate() {
        if alternatives.iter().all(|text| text.is_empty()) {
            continue;
        }

        let mut case = base.clone();
        for (index, &id) in supplied.iter().enumerate() {
            let dots = ".".repeat(lengths[index]);
            if index == target {
                case.replace_with_text(id, &format!("[{dots}]"), true)?;
            } else {
                case.replace_with_text(id, &dots, true)?;
            }
        }

        cases.push(EvaluationCase {
            text: training_text(&case),
            mask_len: lengths[target],
            alternatives: alternatives.clone(),
        });
    }

    tracing::debug!("created {} evaluation cases", cases.len());
    Ok(cases)
}

fn clear_blank_text(doc: &mut Document) {
    let ids: Vec<NodeId> = doc.descendants(doc.root()).collect();
    for id in ids {
        let element = doc.element_mut(id);
        if element.text.as_deref().is_some_and(|text| text.trim().is_empty()) {
            element.text = None;
        }
    }
}

fn push_unbracketed(out: &mut String, text: &str) {
    out.extend(text.chars().filter(|c| !matches!(c, '[' | ']')));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training(xml: &str) -> String {
        let mut doc = Document::parse(xml).unwrap();
        create_training_text(&mut doc).unwrap();
        training_text(&doc)
    }

    #[test]
    fn test_supplied_texts() {
        let doc = Document::parse(
            "<ab><supplied>abc</supplied><supplied><alt>d</alt><alt/><alt>ef</alt></supplied></ab>",
        )
        .unwrap();
        let supplied = doc.find_all(doc.root(), "supplied");
        assert_eq!(supplied_texts(&doc, supplied[0]), ["abc"]);
        assert_eq!(supplied_texts(&doc, supplied[1]), ["d", "", "ef"]);
    }

    #[test]
    fn test_create_training_text() {
        assert_eq!(training("<ab>abc<supplied>def</supplied>ghi</ab>"), "abc[def]ghi");
        assert_eq!(
            training("<ab>a<supplied><alt>bc</alt><alt>d</alt></supplied>e</ab>"),
            "a[bc]e"
        );
        assert_eq!(training("<ab><supplied>x</supplied>y</ab>"), "[x]y");
        assert_eq!(
            training("<ab>a<supplied>b</supplied>c<supplied>d</supplied>e</ab>"),
            "a[b]c[d]e"
        );
    }

    #[test]
    fn test_create_training_text_without_candidates() {
        assert_eq!(training("<ab>a<supplied/>b</ab>"), "ab");
        assert_eq!(training("<ab>a<supplied> </supplied>b</ab>"), "ab");
    }

    #[test]
    fn test_empty_readings_agree_across_generators() {
        let xml = "<ab>x<supplied><alt/><alt>bc</alt></supplied>y<supplied><alt/></supplied>z</ab>";
        let doc = Document::parse(xml).unwrap();

        let evaluation = create_evaluation_cases(&doc).unwrap();
        assert_eq!(evaluation.len(), 1);
        assert_eq!(evaluation[0].alternatives, ["", "bc"]);
        assert_eq!(evaluation[0].text, "x[..]yz");
        assert_eq!(evaluation[0].mask_len, 2);

        let training = training(xml);
        assert_eq!(training, "x[bc]yz");
        assert_eq!(create_test_cases(&training).count(), evaluation.len());
    }

    #[test]
    fn test_literal_brackets_become_cases() {
        let cases: Vec<String> = create_test_cases("a [sic] b[cd]").collect();
        assert_eq!(cases, ["a [...] bcd", "a sic b[..]"]);
    }

    #[test]
    fn test_training_text_keeps_gaps_and_unescapes() {
        assert_eq!(
            training("<ab>a &amp; b<gap />c<supplied>d</supplied></ab>"),
            "a & b<gap />c[d]"
        );
    }

    #[test]
    fn test_create_test_cases() {
        let cases: Vec<String> = create_test_cases("a[bc]d[e]f").collect();
        assert_eq!(cases, ["a[..]def", "abcd[.]f"]);
    }

    #[test]
    fn test_create_test_cases_counts_chars() {
        let cases: Vec<String> = create_test_cases("[ὠν]ουμένη").collect();
        assert_eq!(cases, ["[..]ουμένη"]);
    }

    #[test]
    fn test_create_test_cases_without_spans() {
        assert_eq!(create_test_cases("abc").count(), 0);
        assert_eq!(create_test_cases("a[]b").count(), 0);
    }

    #[test]
    fn test_test_cases_are_restartable() {
        let mut cases = create_test_cases("[a]b[c]");
        assert_eq!(cases.len(), 2);
        assert_eq!(cases.next().as_deref(), Some("[.]bc"));
        assert_eq!(cases.len(), 1);

        let rest: Vec<String> = cases.clone().collect();
        assert_eq!(rest, ["ab[.]"]);
        assert_eq!(cases.len(), 1);

        cases.restart();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases.next().as_deref(), Some("[.]bc"));
        assert_eq!(cases.spans(), &[0..3, 4..7]);
    }

    #[test]
    fn test_create_evaluation_cases() {
        let doc = Document::parse(
            "<ab>a<supplied><alt>bc</alt><alt>de</alt><alt>f</alt></supplied>g<supplied>hij</supplied></ab>",
        )
        .unwrap();
        let cases = create_evaluation_cases(&doc).unwrap();

        assert_eq!(
            cases,
            [
                EvaluationCase {
                    text: "a[..]g...".to_string(),
                    mask_len: 2,
                    alternatives: vec!["bc".to_string(), "de".to_string(), "f".to_string()],
                },
                EvaluationCase {
                    text: "a..g[...]".to_string(),
                    mask_len: 3,
                    alternatives: vec!["hij".to_string()],
                },
            ]
        );

        // The source document is left untouched.
        assert_eq!(doc.find_all(doc.root(), "supplied").len(), 2);
    }

    #[test]
    fn test_evaluation_case_serializes() {
        let doc = Document::parse("<ab>x<supplied>yz</supplied></ab>").unwrap();
        let cases = create_evaluation_cases(&doc).unwrap();
        let value = serde_json::to_value(&cases[0]).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"text": "x[..]", "mask_len": 2, "alternatives": ["yz"]})
        );
    }
}
