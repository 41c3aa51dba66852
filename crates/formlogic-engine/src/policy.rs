//! Context policy -- which opcodes each execution context may run.

use crate::types::{ContextKind, Opcode};

/// Permitted opcodes per context, indexed by [`Opcode::index`].
///
/// Validation runs must not touch the field store or bound components, so
/// `s` and `sp` are absent there.
const POLICY: [(ContextKind, [bool; 4]); 2] = [
    //                         jrgt   s      sp     setres
    (ContextKind::Propagation, [true, true, true, false]),
    (ContextKind::Validation, [true, false, false, true]),
];

/// Returns `true` if `opcode` may run in `kind`.
pub fn permits(kind: ContextKind, opcode: Opcode) -> bool {
    POLICY
        .iter()
        .find(|(k, _)| *k == kind)
        .is_some_and(|(_, allowed)| allowed[opcode.index()])
}
