pub mod completion;

pub use completion::{Changes, CompletionTracker};
