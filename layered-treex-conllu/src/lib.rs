#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]
//! CoNLL-U input and output for [`layered_treex`] documents.
//!
//! Each sentence maps to one bundle holding an a-tree in a single zone.
//!
//! ```
//! use layered_treex_conllu::{ConlluReader, ConlluWriter};
//!
//! let text = "1\tDogs\tdog\tNOUN\t_\t_\t2\tnsubj\t_\t_\n\
//!             2\tbark\tbark\tVERB\t_\t_\t0\troot\t_\t_\n\n";
//! let doc = ConlluReader::new("en").read_str(text).unwrap();
//! assert_eq!(ConlluWriter::new("en").write_string(&doc).unwrap(), text);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{ConlluError, ConlluResult};
pub use reader::ConlluReader;
pub use writer::ConlluWriter;
