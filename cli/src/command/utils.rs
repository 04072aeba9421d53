use std::path::Path;

use anyhow::Context;
use maat::{Converter, Document, NodeId};

use crate::{config::Config, shell::Shell};

/// Top-most elements named `select`, in document order. When there are none
/// the document root is the only block.
pub fn select_blocks(doc: &Document, select: &str) -> Vec<NodeId> {
    let root = doc.root();
    if doc.local_name(root) == select {
        return vec![root];
    }

    let blocks: Vec<NodeId> = doc
        .find_all(root, select)
        .into_iter()
        .filter(|&id| !doc.parent(id).is_some_and(|parent| doc.is_inside(parent, select)))
        .collect();

    if blocks.is_empty() { vec![root] } else { blocks }
}

/// Reads the TEI file at `path` and converts each selected block. Recorded
/// conversion errors are reported as warnings.
pub fn convert_file(shell: &mut Shell, config: &Config, path: &Path) -> anyhow::Result<Vec<Document>> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let tei: Document = src
        .parse()
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let mut converter = Converter::with_config(config.converter_config());
    let mut converted = Vec::new();

    for block in select_blocks(&tei, &config.select) {
        let doc = match converter.convert(&tei, block) {
            Ok(doc) => doc,
            Err(e) => {
                shell.error(format!("{}: {}", tei.path(block), e))?;
                return Err(e).with_context(|| format!("failed to convert {}", path.display()));
            }
        };

        for error in converter.take_errors() {
            shell.warn(format!("{} (at {})", error, error.context()))?;
        }
        converted.push(doc);
    }

    tracing::debug!("converted {} blocks from {}", converted.len(), path.display());
    shell.status("Converted", format!("{} block(s) from {}", converted.len(), path.display()))?;

    Ok(converted)
}
