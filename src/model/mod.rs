mod configuration;
mod context;
mod entities;
mod error;
mod request;
mod response;

pub use configuration::*;
pub use context::*;
pub use entities::*;
pub use error::*;
pub use request::*;
pub use response::*;
