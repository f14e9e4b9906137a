pub mod loader;
pub mod utils;
pub mod writer;

pub use loader::{load_input, load_reference, BODY_COLUMN, CODE_COLUMN, RECOMMENDATION_COLUMN};
pub use writer::write_xlsx;
