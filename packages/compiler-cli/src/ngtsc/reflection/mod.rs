pub mod src;

pub use src::host::{
    ClassDeclaration, Declaration, DeclarationKind, DeclarationNode, ReflectionHost,
};
