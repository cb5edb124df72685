//! Facade wrappers over raw nodes.
//!
//! Callers never hold raw-node handles directly; they hold facade nodes.
//! Exactly one live wrapper exists per raw node, kept in an
//! identity-keyed registry. An edit never replaces wrappers wholesale:
//! the reconciliation layer rebinds surviving wrappers to their
//! counterparts in the new tree and forgets the rest, so caller-held
//! references stay valid exactly as long as the node they describe
//! exists.

mod error;
mod node;
mod registry;

pub use error::ForgottenNodeError;
pub use node::{CommentFacadeNode, FacadeElement, FacadeNode};
pub use registry::Registry;
