pub mod contracts;
pub mod dispatcher;
pub mod http;
pub mod service;

pub use contracts::*;
pub use dispatcher::*;
pub use http::*;
pub use service::*;
