mod config;
mod error;
mod gate;
mod renderer;
mod request;
mod session;

pub use config::*;
pub use error::*;
pub use gate::*;
pub use renderer::*;
pub use request::*;
pub use session::*;
