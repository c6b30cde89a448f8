/// Which verification cell family a property root will eventually drive.
/// Determined once, from the property root's own kind, and threaded through
/// preprocessing and compilation — it changes which rewrites apply and which
/// errors are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Assert,
    Assume,
    Cover,
}
