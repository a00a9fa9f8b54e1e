use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Consensus or wall-clock time with nanosecond resolution.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl Timestamp {
    pub const fn from_secs(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    pub fn plus_secs(self, secs: i64) -> Self {
        Self {
            seconds: self.seconds.saturating_add(secs),
            nanos: self.nanos,
        }
    }

    pub fn minus_secs(self, secs: i64) -> Self {
        self.plus_secs(secs.saturating_neg())
    }

    /// Whole seconds from `earlier` to `self`, negative if `earlier` is later.
    pub fn secs_since(self, earlier: Timestamp) -> i64 {
        self.seconds.saturating_sub(earlier.seconds)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}
