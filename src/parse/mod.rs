/// Pipeline builder: token stream → stages with opened redirections.
pub mod builder;
/// Tilde expansion against an environment snapshot.
pub mod expand;
/// The word scanner state machine.
pub mod scanner;
/// Tokens, operators, stages, pipelines.
pub mod types;

pub use builder::build;
pub use expand::expand;
pub use scanner::{scan_token, tokens};
pub use types::{Operator, Pipeline, Stage, Token};
