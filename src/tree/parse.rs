use std::borrow::Cow;

use indextree::{Arena, NodeId};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use super::{Document, Element, Error, push_run};

/// How forgiving [`Document::parse_with`] should be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep going past malformed input: unclosed elements are closed at the
    /// end of input, a mismatched end tag closes up to the nearest open
    /// element with that name, stray end tags and undecodable entities are
    /// tolerated, and a syntax error ends the document where it occurs.
    pub recover: bool,
    /// Drop whitespace-only runs between element boundaries. A run survives
    /// when it is an element's only content, or when the element has
    /// non-blank leading text (mixed content).
    pub remove_blank_text: bool,
}

impl ParseOptions {
    pub fn lenient() -> Self {
        ParseOptions {
            recover: true,
            remove_blank_text: true,
        }
    }
}

pub(super) fn parse(src: &str, options: ParseOptions) -> Result<Document, Error> {
    let src = normalize_line_endings(src);
    let mut reader = Reader::from_str(&src);
    reader.config_mut().check_end_names = !options.recover;

    let mut builder = Builder::new(options.recover);

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) if options.recover => {
                tracing::debug!(
                    "recovering from XML error at byte {}: {}",
                    reader.buffer_position(),
                    e
                );
                break;
            }
            Err(e) => return Err(e.into()),
        };

        match event {
            Event::Start(e) => {
                let element = builder.element(&e)?;
                builder.open(element)?;
            }
            Event::Empty(e) => {
                let element = builder.element(&e)?;
                builder.open(element)?;
                builder.stack.pop();
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                builder.close(&name);
            }
            Event::Text(e) => {
                let text = match e.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(_) if options.recover => String::from_utf8_lossy(&e).into_owned(),
                    Err(err) => return Err(err.into()),
                };
                builder.text(&text)?;
            }
            Event::CData(e) => {
                builder.text(&String::from_utf8_lossy(&e))?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes
            // carry no text.
            _ => {}
        }
    }

    let mut doc = builder.finish()?;
    if options.remove_blank_text {
        remove_blank_text(&mut doc);
    }
    Ok(doc)
}

struct Builder {
    arena: Arena<Element>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
    recover: bool,
}

impl Builder {
    fn new(recover: bool) -> Self {
        Builder {
            arena: Arena::new(),
            stack: Vec::new(),
            root: None,
            recover,
        }
    }

    fn element(&self, start: &BytesStart<'_>) -> Result<Element, Error> {
        let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));

        for attr in start.attributes() {
            let attr = match attr {
                Ok(attr) => attr,
                Err(_) if self.recover => continue,
                Err(e) => return Err(e.into()),
            };
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) if self.recover => String::from_utf8_lossy(&attr.value).into_owned(),
                Err(e) => return Err(e.into()),
            };
            element.attributes.push((key, value));
        }

        Ok(element)
    }

    fn open(&mut self, element: Element) -> Result<(), Error> {
        let id = self.arena.new_node(element);

        match self.stack.last() {
            Some(&parent) => parent.append(id, &mut self.arena),
            None if self.root.is_none() => self.root = Some(id),
            // A second top-level element. Recovery keeps it out of the tree
            // while still consuming its content.
            None if self.recover => {}
            None => return Err(Error::TrailingContent),
        }

        self.stack.push(id);
        Ok(())
    }

    fn close(&mut self, name: &str) {
        let open = self
            .stack
            .iter()
            .rposition(|&id| self.arena[id].get().name == name);

        match open {
            Some(position) => self.stack.truncate(position),
            None => tracing::debug!("ignoring stray end tag </{}>", name),
        }
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        let Some(&current) = self.stack.last() else {
            if text.trim().is_empty() || self.recover {
                return Ok(());
            }
            return Err(Error::TrailingContent);
        };

        match self.arena[current].last_child() {
            Some(child) => push_run(&mut self.arena[child].get_mut().tail, text),
            None => push_run(&mut self.arena[current].get_mut().text, text),
        }
        Ok(())
    }

    fn finish(self) -> Result<Document, Error> {
        if !self.recover {
            if let Some(&open) = self.stack.last() {
                return Err(Error::Unclosed(self.arena[open].get().name.clone()));
            }
        }

        let root = self.root.ok_or(Error::Empty)?;
        Ok(Document::from_parts(self.arena, root))
    }
}

/// Rewrites `\r\n` and lone `\r` as `\n` before parsing, so line breaks
/// written as character references (`&#13;`) are the only carriage returns
/// that survive.
fn normalize_line_endings(src: &str) -> Cow<'_, str> {
    if !src.contains('\r') {
        return Cow::Borrowed(src);
    }
    Cow::Owned(src.replace("\r\n", "\n").replace('\r', "\n"))
}

fn is_blank(run: &Option<String>) -> bool {
    run.as_deref().is_some_and(|text| text.trim().is_empty())
}

fn remove_blank_text(doc: &mut Document) {
    let ids: Vec<NodeId> = doc.descendants(doc.root()).collect();

    for id in ids {
        let children: Vec<NodeId> = doc.children(id).collect();
        if children.is_empty() {
            continue;
        }

        let element = doc.element(id);
        let mixed = element
            .text
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty());
        if mixed {
            continue;
        }

        doc.element_mut(id).text = None;
        for child in children {
            if is_blank(&doc.element(child).tail) {
                doc.element_mut(child).tail = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_whitespace_by_default() {
        let doc = Document::parse(
            "<ab xmlns=\"http://www.tei-c.org/ns/1.0\" xml:space=\"preserve\">\n    Text\n</ab>",
        )
        .unwrap();
        assert_eq!(doc.local_name(doc.root()), "ab");
        assert_eq!(doc.element(doc.root()).text.as_deref(), Some("\n    Text\n"));
        assert_eq!(doc.attribute(doc.root(), "xml:space"), Some("preserve"));
    }

    #[test]
    fn test_parse_unescapes_entities() {
        let doc = Document::parse("<ab>a &amp; b &lt;c&gt;</ab>").unwrap();
        assert_eq!(doc.text_content(doc.root()), "a & b <c>");
    }

    #[test]
    fn test_parse_cdata_is_text() {
        let doc = Document::parse("<ab>a<![CDATA[<b>]]>c</ab>").unwrap();
        assert_eq!(doc.text_content(doc.root()), "a<b>c");
    }

    #[test]
    fn test_parse_normalizes_line_endings() {
        let doc = Document::parse("<ab n=\"a\r\nb\">\r\nabc\rdef<lb/>g\r\n</ab>").unwrap();
        assert_eq!(doc.element(doc.root()).text.as_deref(), Some("\nabc\ndef"));
        assert_eq!(doc.text_content(doc.root()), "\nabc\ndefg\n");
        assert!(!doc.attribute(doc.root(), "n").unwrap().contains('\r'));

        let doc = Document::parse("<ab>a&#13;b</ab>").unwrap();
        assert_eq!(doc.text_content(doc.root()), "a\rb");
    }

    #[test]
    fn test_strict_rejects_mismatched_end() {
        assert!(Document::parse("<ab><a>x</b></ab>").is_err());
    }

    #[test]
    fn test_strict_rejects_unclosed() {
        assert!(Document::parse("<ab><a>x").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(Document::parse("   "), Err(Error::Empty)));
    }

    #[test]
    fn test_recover_mismatched_end() {
        let doc = Document::parse_with(
            "<ab><supplied>a<alt>x</supplied>.<supplied>y</alt></supplied></ab>",
            ParseOptions::lenient(),
        )
        .unwrap();
        assert_eq!(
            doc.to_xml(doc.root()),
            "<ab><supplied>a<alt>x</alt></supplied>.<supplied>y</supplied></ab>"
        );
    }

    #[test]
    fn test_recover_unclosed() {
        let doc = Document::parse_with("<ab><hi>text", ParseOptions::lenient()).unwrap();
        assert_eq!(doc.to_xml(doc.root()), "<ab><hi>text</hi></ab>");
    }

    #[test]
    fn test_remove_blank_text() {
        let options = ParseOptions {
            recover: false,
            remove_blank_text: true,
        };

        let doc = Document::parse_with("<ab>\n  <a>x</a>\n  <b/>\n</ab>", options).unwrap();
        assert_eq!(doc.to_xml(doc.root()), "<ab><a>x</a><b /></ab>");

        // Mixed content keeps its blanks.
        let doc = Document::parse_with("<ab>t<a>x</a> <b/></ab>", options).unwrap();
        assert_eq!(doc.to_xml(doc.root()), "<ab>t<a>x</a> <b /></ab>");

        // A blank run that is the only content survives.
        let doc = Document::parse_with("<ab> </ab>", options).unwrap();
        assert_eq!(doc.to_xml(doc.root()), "<ab> </ab>");
    }
}
