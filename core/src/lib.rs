mod ast;
mod commands;
mod edit;
mod fingerprint;
mod io_json;
mod selection;
mod validate;

pub use ast::*;
pub use commands::*;
pub use fingerprint::*;
pub use io_json::*;
pub use selection::*;
pub use validate::*;
