//! Stale-reference error.

use thiserror::Error;

use crate::base::FileId;
use crate::syntax::SyntaxKind;

/// An operation was attempted on a facade node after it was forgotten.
///
/// Always recoverable: re-fetch a fresh wrapper from the current tree.
/// The last-known kind and owning file are retained for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("node of kind {kind:?} in {file} was forgotten; re-fetch it from the current tree")]
pub struct ForgottenNodeError {
    pub kind: SyntaxKind,
    pub file: FileId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_kind_and_file() {
        let err = ForgottenNodeError {
            kind: SyntaxKind::ClassDeclaration,
            file: FileId::new(3),
        };
        let message = err.to_string();
        assert!(message.contains("ClassDeclaration"));
        assert!(message.contains("file(3)"));
    }
}
