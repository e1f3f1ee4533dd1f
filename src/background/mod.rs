pub mod cleaner;

pub use cleaner::{spawn_cleaner, Cleaner};
