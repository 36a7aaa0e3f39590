pub mod cli;
pub mod render;
pub mod session;

pub use cli::*;
pub use render::*;
pub use session::*;
