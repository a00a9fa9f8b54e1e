use {
    crate::error::{Result, ScheduleError},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    simplefees_types::{Timestamp, TINYBARS_PER_HBAR, TINYCENTS_PER_CENT},
};

/// Tinycents in one US dollar.
pub const TINYCENTS_PER_USD: u64 = 10_000_000_000;

/// `hbar_equiv` HBAR are worth `cent_equiv` US cents until `expiration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ExchangeRate {
    pub hbar_equiv: u32,
    pub cent_equiv: u32,
    pub expiration: Timestamp,
}

impl ExchangeRate {
    pub const fn new(hbar_equiv: u32, cent_equiv: u32, expiration: Timestamp) -> Self {
        Self {
            hbar_equiv,
            cent_equiv,
            expiration,
        }
    }

    /// Rejects rates with a zero side.
    pub fn validate(&self) -> Result<()> {
        if self.hbar_equiv == 0 || self.cent_equiv == 0 {
            return Err(ScheduleError::InvalidExchangeRate {
                hbar_equiv: self.hbar_equiv,
                cent_equiv: self.cent_equiv,
            });
        }
        Ok(())
    }

    /// ```text
    /// tinybars = tinycents · hbar_equiv / cent_equiv
    /// ```
    ///
    /// Rounds down. Saturates at `u64::MAX`, which a zero `cent_equiv` also
    /// yields.
    pub fn tinycents_to_tinybars(&self, tinycents: u64) -> u64 {
        if self.cent_equiv == 0 {
            return u64::MAX;
        }
        let tinybars = (tinycents as u128)
            .saturating_mul(self.hbar_equiv as u128)
            .checked_div(self.cent_equiv as u128)
            .unwrap_or(u128::MAX);
        u64::try_from(tinybars).unwrap_or(u64::MAX)
    }

    pub fn tinybars_to_tinycents(&self, tinybars: u64) -> u64 {
        if self.hbar_equiv == 0 {
            return u64::MAX;
        }
        let tinycents = (tinybars as u128)
            .saturating_mul(self.cent_equiv as u128)
            .checked_div(self.hbar_equiv as u128)
            .unwrap_or(u128::MAX);
        u64::try_from(tinycents).unwrap_or(u64::MAX)
    }

    /// USD value of `tinybars` at this rate; zero for a zero `hbar_equiv`.
    ///
    /// ```text
    /// usd = tinybars / 10^8 / hbar_equiv · cent_equiv / 100
    /// ```
    pub fn tinybars_to_usd(&self, tinybars: u64) -> f64 {
        if self.hbar_equiv == 0 {
            return 0.0;
        }
        tinybars as f64 / TINYBARS_PER_HBAR as f64 / self.hbar_equiv as f64
            * self.cent_equiv as f64
            / 100.0
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self {
            hbar_equiv: 1,   // 1 HBAR
            cent_equiv: 12,  // = 12 cents
            expiration: Timestamp::from_secs(i64::MAX),
        }
    }
}

/// The current rate and the one that replaces it at expiry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ExchangeRateSet {
    pub current: ExchangeRate,
    pub next: ExchangeRate,
}

impl ExchangeRateSet {
    pub fn fixed(rate: ExchangeRate) -> Self {
        Self {
            current: rate,
            next: rate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.current.validate()?;
        self.next.validate()
    }

    /// Rate in effect at `now`.
    pub fn active(&self, now: Timestamp) -> &ExchangeRate {
        if now < self.current.expiration {
            &self.current
        } else {
            &self.next
        }
    }
}

pub fn tinycents_to_usd(tinycents: u64) -> f64 {
    tinycents as f64 / TINYCENTS_PER_USD as f64
}

/// Rounded to the nearest tinycent; negative inputs yield zero.
pub fn usd_to_tinycents(usd: f64) -> u64 {
    (usd * TINYCENTS_PER_USD as f64).round().max(0.0) as u64
}

pub fn tinycents_to_cents(tinycents: u64) -> f64 {
    tinycents as f64 / TINYCENTS_PER_CENT as f64
}
