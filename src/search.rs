//! Paginated album search with optimistic row updates and a keyboard focus
//! marker.

mod session;
mod summary;

pub use session::{ResultSet, SearchSession};
pub use summary::summarize;

#[cfg(test)]
mod tests;
