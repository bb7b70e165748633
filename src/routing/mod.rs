//! Routing module
//!
//! Path validation and dispatch of `/view/`, `/edit/` and `/save/` requests:
//! - Title validation against the route grammar
//! - Adapters turning title handlers into request handlers
//! - The route table with the root redirect

mod dispatcher;
mod validator;

pub use dispatcher::{wrap, HandlerFuture, PageRequest, Route, RouteTable, TitleHandler};
pub use validator::{Action, TitleValidator};
