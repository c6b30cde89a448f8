use netsynth_ir::PropKind;

/// Errors the SVA compiler can raise. All are fatal: they abort the whole
/// pass; no partial compilation of a single property is attempted once one
/// of these fires.
#[derive(Debug, thiserror::Error)]
pub enum SvaError {
    #[error("SVA primitive {0:?} is currently unsupported in this context")]
    UnsupportedPrimitive(PropKind),

    #[error("non-linear consequent not supported in SVA assumptions")]
    NonLinearConsequentInAssume,

    #[error(
        "only simple expression properties are supported as the first operand of {0:?}"
    )]
    NonExpressionUntilOperand(PropKind),

    #[error("malformed property root: expected a clocking '@' node as the immediate child")]
    MalformedPropertyRoot,
}
