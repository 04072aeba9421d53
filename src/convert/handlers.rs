use indextree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{ConversionContext, ConvertError, Converter, Handler, normalize_supplied_brackets};
use crate::tree::Document;

pub(crate) const GAP_MARKER: &str = "<gap />";

/// Largest character gap written out as dots. Anything above it is treated as
/// an invalid quantity.
pub const MAX_GAP_QUANTITY: usize = 10_000;

const APP_READINGS: &[&str] = &["lem", "rdg"];
const CHOICE_READINGS: &[&str] = &["abbr", "choice", "orig", "sic", "unclear"];

static BRACKET_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]").unwrap());

/// Every TEI tag the converter understands. Anything else is reported and
/// treated as a transparent container.
pub(super) const TAG_HANDLERS: &[(&str, Handler)] = &[
    ("ab", transparent),
    ("abbr", transparent),
    ("add", transparent),
    ("app", app),
    ("certainty", discard),
    ("choice", choice),
    ("del", discard),
    ("ex", discard),
    ("expan", transparent),
    ("figure", discard),
    ("foreign", transparent),
    ("g", discard),
    ("gap", gap),
    ("handShift", discard),
    ("hi", transparent),
    ("lb", line_break),
    ("lem", transparent),
    ("milestone", discard),
    ("note", discard),
    ("num", transparent),
    ("orig", transparent),
    ("q", transparent),
    ("rdg", transparent),
    ("seg", transparent),
    ("sic", transparent),
    ("subst", transparent),
    ("supplied", supplied),
    ("surplus", transparent),
    ("unclear", transparent),
];

fn transparent(conv: &mut Converter, doc: &Document, id: NodeId) -> Result<String, ConvertError> {
    conv.default_text(doc, id)
}

fn discard(_conv: &mut Converter, _doc: &Document, _id: NodeId) -> Result<String, ConvertError> {
    Ok(String::new())
}

fn line_break(_conv: &mut Converter, _doc: &Document, _id: NodeId) -> Result<String, ConvertError> {
    Ok("\n".to_string())
}

fn gap(conv: &mut Converter, doc: &Document, id: NodeId) -> Result<String, ConvertError> {
    if doc.attribute(id, "unit") == Some("line") {
        return Ok(GAP_MARKER.to_string());
    }

    let quantity = match doc.attribute(id, "quantity") {
        None | Some("unknown") => return Ok(GAP_MARKER.to_string()),
        Some(quantity) => quantity,
    };

    match quantity.trim().parse::<i64>() {
        Ok(n) if n <= MAX_GAP_QUANTITY as i64 => Ok(".".repeat(n.max(0) as usize)),
        _ => {
            conv.error(ConvertError::InvalidQuantity {
                quantity: quantity.to_string(),
                context: doc.path(id),
            })?;
            Ok(GAP_MARKER.to_string())
        }
    }
}

fn app(conv: &mut Converter, doc: &Document, id: NodeId) -> Result<String, ConvertError> {
    if doc.attribute(id, "type") != Some("alternative") {
        return Ok(String::new());
    }
    text_from_acceptable_children(conv, doc, id, APP_READINGS)
}

fn choice(conv: &mut Converter, doc: &Document, id: NodeId) -> Result<String, ConvertError> {
    text_from_acceptable_children(conv, doc, id, CHOICE_READINGS)
}

fn supplied(conv: &mut Converter, doc: &Document, id: NodeId) -> Result<String, ConvertError> {
    // Other reasons, `omitted` and `undefined` mostly, are not restorations.
    if !matches!(doc.attribute(id, "reason"), Some("lost" | "illegible")) {
        return Ok(String::new());
    }

    let inner = conv.default_text(doc, id)?;
    let normalized =
        normalize_supplied_brackets(&format!("[{inner}]")).map_err(|e| e.at(doc.path(id)))?;

    Ok(BRACKET_GROUP
        .replace_all(&normalized, "<supplied>${1}</supplied>")
        .into_owned())
}

/// Shared by `app` and `choice`. Outside a supplied span only the first
/// acceptable reading matters; inside one every reading is a candidate and
/// several are kept as `<alt>` runs.
fn text_from_acceptable_children(
    conv: &mut Converter,
    doc: &Document,
    id: NodeId,
    accepted: &[&str],
) -> Result<String, ConvertError> {
    let readings: Vec<NodeId> = doc
        .children(id)
        .filter(|&child| accepted.contains(&doc.local_name(child)))
        .collect();

    match ConversionContext::of(doc, id) {
        ConversionContext::Context => match readings.first() {
            Some(&first) => conv.convert_node(doc, first),
            None => {
                conv.error(ConvertError::NoAcceptableChoice {
                    tag: doc.local_name(id).to_string(),
                    accepted: accepted.join(", "),
                    context: doc.path(id),
                })?;
                Ok(String::new())
            }
        },
        ConversionContext::Evaluation => {
            let mut converted = readings
                .into_iter()
                .map(|reading| conv.convert_node(doc, reading))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(match converted.len() {
                0 => String::new(),
                1 => converted.remove(0),
                _ => format!("<alt>{}</alt>", converted.join("</alt><alt>")),
            })
        }
    }
}
