pub mod compiler;
pub mod config;
pub mod contracts;
pub mod error;
pub mod semantic;
pub mod workspace;

pub use compiler::{check_view_statement, ViewCompiler};
pub use config::CompilerConfig;
pub use contracts::{CompileRequest, CompileResponse};
pub use error::{Result, SemanticError};
pub use workspace::Workspace;
