//! Filesystem side of Lumen: path confinement, identifiers, directory
//! listings and sibling navigation.

pub mod guard;
pub mod identity;
pub mod library;
pub mod lister;
pub mod navigator;
pub mod text;
pub mod tree;

pub use guard::PathGuard;
pub use identity::{identifier_of, ResolvedItem};
pub use library::Library;
pub use lister::Listing;
pub use navigator::Adjacent;
