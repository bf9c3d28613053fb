//! Object keys and envelope save strategies.

mod object_key;
mod save_strategy;

pub use object_key::ObjectKey;
pub use save_strategy::{INSTRUCTION_SUFFIX, SaveStrategy};
