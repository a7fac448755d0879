//! Credit and currency conversion

use crate::error::{EvalError, EvalResult, checked_mul};
use crate::win::WinOutcome;

fn check(denomination: u64) -> EvalResult<()> {
    if denomination == 0 {
        return Err(EvalError::precondition("denomination must be positive"));
    }
    Ok(())
}

/// Currency units for an amount in credits
pub fn credits_to_currency(credits: u64, denomination: u64) -> EvalResult<u64> {
    check(denomination)?;
    checked_mul(credits, denomination, "credits to currency")
}

/// Whole credits for a currency amount, rounded down
pub fn currency_to_credits(currency: u64, denomination: u64) -> EvalResult<u64> {
    check(denomination)?;
    Ok(currency / denomination)
}

/// Convert every win of a credit outcome to currency
pub fn apply_denomination(outcome: WinOutcome, denomination: u64) -> EvalResult<WinOutcome> {
    check(denomination)?;
    let items = outcome
        .items
        .into_iter()
        .map(|mut win| {
            win.win_amount = credits_to_currency(win.win_amount, denomination)?;
            Ok(win)
        })
        .collect::<EvalResult<Vec<_>>>()?;
    WinOutcome::from_items(items)
}
