mod fetcher_auth_fallback;
mod fetcher_http;
mod fetcher_timeout;
mod lookup_controller;
mod lookup_orchestrator;
mod presenter_terminal;

pub use fetcher_auth_fallback::*;
pub use fetcher_http::*;
pub use fetcher_timeout::*;
pub use lookup_controller::*;
pub use lookup_orchestrator::*;
pub use presenter_terminal::*;
