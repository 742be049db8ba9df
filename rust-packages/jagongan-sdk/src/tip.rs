//! Tip amounts and the royalty split the program applies.

use solana_program::native_token::LAMPORTS_PER_SOL;

use crate::constants::{ROYALTY_DENOMINATOR, ROYALTY_NUMERATOR, TIP_PRESETS_SOL};

/// Convert a SOL amount typed by the user into lamports, rounding down.
///
/// Negative, NaN or infinite input yields 0, which the dispatcher then rejects.
pub fn sol_to_lamports(sol: f64) -> u64 {
    if !sol.is_finite() || sol <= 0.0 {
        return 0;
    }
    (sol * LAMPORTS_PER_SOL as f64).floor() as u64
}

/// Quick-tip presets in lamports.
pub fn preset_amounts() -> [u64; 3] {
    TIP_PRESETS_SOL.map(sol_to_lamports)
}

/// How the program splits a tip between the post author and the treasury.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipSplit {
    pub author: u64,
    pub treasury: u64,
}

impl TipSplit {
    /// `None` when the author share would be zero, which the program rejects.
    pub fn for_amount(amount: u64) -> Option<Self> {
        let treasury = amount.checked_mul(ROYALTY_NUMERATOR)? / ROYALTY_DENOMINATOR;
        let author = amount.checked_sub(treasury)?;
        (author > 0).then_some(Self { author, treasury })
    }
}
