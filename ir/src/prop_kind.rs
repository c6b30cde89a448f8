/// The closed set of SVA primitive kinds the compiler understands.
///
/// The front-end delivers a property as a tree of cells whose type is one of
/// these 53 variants (mirrored as [`CellType::Sva`](crate::CellType::Sva));
/// a driver of any other cell type terminates AST traversal and is treated as
/// an opaque Boolean expression leaf. This is a closed, tagged universe on
/// purpose: unknown drivers degrade gracefully into leaves instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropKind {
    AssertImmediate,
    AssertDeferred,
    AssumeImmediate,
    AssumeDeferred,
    CoverImmediate,
    CoverDeferred,
    Expect,
    Restrict,

    Clock,
    DisableIff,

    Not,
    And,
    Or,
    Implies,
    Iff,

    SeqAnd,
    SeqOr,
    SeqConcat,

    ConsecutiveRepeat,
    NonConsecutiveRepeat,
    GotoRepeat,

    ImplicationOverlapped,
    ImplicationNonOverlapped,

    FollowedByOverlapped,
    FollowedByNonOverlapped,

    Intersect,
    Throughout,
    Within,

    Until,
    SUntil,
    UntilWith,
    SUntilWith,

    NextTime,
    SNextTime,

    Always,
    SAlways,

    Eventually,
    SEventually,

    AcceptOn,
    RejectOn,
    SyncAcceptOn,
    SyncRejectOn,

    GlobalClockingRef,
    GlobalClockingDef,

    Sampled,
    Stable,
    Rose,
    Fell,
    Past,

    FirstMatch,
    Matched,
    Ended,

    EventOr,
}

impl PropKind {
    /// `rose`, `fell`, `stable`, `past` and the operator-form `stable` are
    /// always leaves: the compiler never recurses into their operands, it
    /// samples them as opaque Boolean expressions.
    pub fn is_always_leaf(self) -> bool {
        matches!(
            self,
            PropKind::Rose | PropKind::Fell | PropKind::Stable | PropKind::Past
        )
    }

    pub fn is_verification_root(self) -> bool {
        matches!(
            self,
            PropKind::AssertImmediate
                | PropKind::AssertDeferred
                | PropKind::AssumeImmediate
                | PropKind::AssumeDeferred
                | PropKind::CoverImmediate
                | PropKind::CoverDeferred
        )
    }

    pub fn is_immediate(self) -> bool {
        matches!(
            self,
            PropKind::AssertImmediate | PropKind::AssumeImmediate | PropKind::CoverImmediate
        )
    }
}
