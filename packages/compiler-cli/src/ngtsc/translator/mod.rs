//! Translation of output-level expressions into the TypeScript syntax tree.

pub mod src {
    pub mod import_manager;
    pub mod translator;
    pub mod ts_util;
}

pub use src::import_manager::{Import, ImportManager, NamedImport};
pub use src::translator::{translate_expression, translate_type, ExpressionType};
pub use src::ts_util::ts_numeric_expression;
