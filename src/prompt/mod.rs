// Declare submodules
mod common;
mod detection;
mod rewrite;

pub use common::current_date;
pub use detection::{detection_transcript, DATE_EXAMPLES};
pub use rewrite::{rewrite_transcript, REWRITE_EXAMPLES};
