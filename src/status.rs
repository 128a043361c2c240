// Copyright (C) 2026 The etalu developers

use std::fmt;

/// Outcome of an update of the factorization.
///
/// Update outcomes are returned rather than raised so that the calling
/// simplex loop can decide whether to continue, perturb or refactorize.
/// Only `Ok` and `ProbablyOk` change the factorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The update was applied and the new pivot is accurate.
    Ok,

    /// The update was applied but the new pivot is small or disagrees
    /// slightly with its expected value. Accuracy should be monitored.
    ProbablyOk,

    /// The updated basis would be (numerically) singular. Nothing was changed.
    Singular,

    /// A storage area ran out of space. Nothing was changed; refactorize,
    /// possibly with a larger area factor.
    NoRoom,

    /// The number of updates reached the maximum. Nothing was changed.
    TooManyPivots,
}

impl Status {
    /// True when the update was applied.
    pub fn is_accepted(self) -> bool {
        matches!(self, Status::Ok | Status::ProbablyOk)
    }

    /// True when the caller has to refactorize before updating again.
    pub fn needs_refactorization(self) -> bool {
        !self.is_accepted()
    }

    /// Numeric code of the status: 0 ok, 1 probably ok, 2 singular,
    /// 3 no room, 5 too many pivots.
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::ProbablyOk => 1,
            Status::Singular => 2,
            Status::NoRoom => 3,
            Status::TooManyPivots => 5,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ok => "ok",
            Status::ProbablyOk => "probably ok",
            Status::Singular => "singular",
            Status::NoRoom => "no room",
            Status::TooManyPivots => "too many pivots",
        };
        f.write_str(s)
    }
}
