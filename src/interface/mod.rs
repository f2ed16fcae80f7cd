mod fetcher;
mod lookup;
mod presenter;

pub use fetcher::*;
pub use lookup::*;
pub use presenter::*;
