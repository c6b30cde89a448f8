/// Errors the recovery passes can raise. All are internal-consistency
/// assertions — a well-formed chain produced by the expected upstream
/// bit-blasting step should never trigger one.
#[derive(Debug, thiserror::Error)]
pub enum RecoverError {
    #[error("__XOR3_ cell {0} has no operand matching the previous chain stage's carry-out")]
    Xor3CarryMismatch(String),
}
