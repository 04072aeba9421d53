use indextree::NodeId;

use super::Document;

pub(super) fn write_element(doc: &Document, id: NodeId, out: &mut String) {
    let element = doc.element(id);

    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_attribute(value, out);
        out.push('"');
    }

    let text = element.text.as_deref().unwrap_or("");
    let mut children = doc.children(id).peekable();

    if text.is_empty() && children.peek().is_none() {
        out.push_str(" />");
        return;
    }

    out.push('>');
    escape_text(text, out);
    for child in children {
        write_element(doc, child, out);
        if let Some(tail) = &doc.element(child).tail {
            escape_text(tail, out);
        }
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

pub(crate) fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}
