//! Reduces annotated TEI transcriptions to plain text for training and
//! evaluating text-restoration models.
//!
//! The pipeline has two stages. [`convert::Converter`] collapses editorial
//! markup into an `<ab>` document that keeps only `<supplied>`, `<alt>` and
//! `<gap />`. [`create`] then turns that document into bracketed training
//! text and a sequence of masked test cases.
//!
//! ```
//! use maat::{Converter, Document, create};
//!
//! let tei: Document = r#"<ab>abc<supplied reason="lost">def</supplied>ghi</ab>"#.parse()?;
//! let mut converted = Converter::new().convert(&tei, tei.root())?;
//! create::create_training_text(&mut converted)?;
//!
//! let training = create::training_text(&converted);
//! assert_eq!(training, "abc[def]ghi");
//! assert_eq!(create::create_test_cases(&training).collect::<Vec<_>>(), ["abc[...]ghi"]);
//! # Ok::<(), maat::Error>(())
//! ```

pub mod convert;
pub mod create;
pub mod tree;
pub mod util;

pub use convert::{ConvertError, Converter, ConverterConfig};
pub use tree::{Document, Element, NodeId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tree(#[from] tree::Error),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub fn print_version(verbose: bool) {
    println!("maat {}", env!("CARGO_PKG_VERSION"));

    if verbose {
        let tags: Vec<&str> = convert::handled_tags().collect();
        println!("handled tags: {}", tags.join(", "));
    }
}
