//! Command-line application helpers.
//!
//! Input reading, URL normalization, Ctrl-C handling and the final
//! statistics printout used by the binary.

pub mod input;
pub mod shutdown;
pub mod statistics;
pub mod url;

pub use input::{parse_url_lines, read_url_list};
pub use shutdown::cancel_on_ctrl_c;
pub use statistics::{print_batch_statistics, print_error_statistics};
pub use url::validate_and_normalize_url;
