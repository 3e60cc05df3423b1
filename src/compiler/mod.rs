pub mod validator;
pub mod view_compiler;

pub use validator::*;
pub use view_compiler::*;
