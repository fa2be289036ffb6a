//! SQL front end
//!
//! Statement text flows through `normalize`, `classify`, the `Lexer` and the
//! `Parser`, producing a typed `Statement`.

pub mod ast;
pub mod classifier;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Statement;
pub use classifier::{classify, normalize, split_statements, StatementKind};
pub use lexer::Lexer;
pub use parser::{parse, Parser};
pub use token::{Keyword, Token};
