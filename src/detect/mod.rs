//! Rule-based detection over chat text.
//!
//! - `whereabout`: "I'm going to X" style self-reports (English and Malay)
//! - `query`: "where is X?" style questions about someone else
//!
//! Both are pure: same text in, same answer out, no I/O.

mod query;
mod whereabout;

pub use query::*;
pub use whereabout::*;

#[cfg(test)]
mod tests;
