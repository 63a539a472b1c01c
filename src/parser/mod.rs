//! 组件源码的轻量解析：导入改写与顶层声明扫描

pub mod bindings;
pub mod imports;

pub use bindings::{top_level_declarations, DeclarationKind, DeclarationScanner, TopLevelDeclaration};
pub use imports::{ImportBinding, ImportDeclaration, ImportForm, ImportRewriter, RewrittenSource, REGISTRY_IDENT};
