//! Request handler module
//!
//! Responsible for turning hyper requests into page operations: the request
//! entry point and the view/edit/save page handlers.

mod pages;
pub mod router;


// Re-export main entry points
pub use pages::page_routes;
pub use router::handle_request;
