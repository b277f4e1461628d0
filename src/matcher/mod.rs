// Matcher module: scoring of names against patterns and best-profile selection.

pub mod scorer;
pub mod resolver;

// Re-export the entry points for ease of use.
pub use resolver::resolve;
