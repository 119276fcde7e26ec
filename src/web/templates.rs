//! HTML templates for the browser front end.
//!
//! Templates are embedded at compile time using `include_str!`.

/// The single page: add form on the left, recent tasks on the right.
pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");
