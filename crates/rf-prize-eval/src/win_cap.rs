//! Win cap enforcement

use log::debug;

use crate::error::{EvalError, EvalResult, checked_add};
use crate::win::WinOutcome;

/// Limit the wins of an outcome to what is left under the cap
///
/// `total_win` is what the round already paid before this outcome. Wins are
/// walked in outcome order; the win crossing the cap is reduced, or removed
/// when the excess covers its whole amount. When the cap is reached exactly,
/// every remaining trigger is stripped. Returns the capped outcome and whether
/// the cap was reached. A `limit` of zero or less disables the cap.
pub fn apply_win_cap(
    outcome: WinOutcome,
    limit: i64,
    total_win: u64,
) -> EvalResult<(WinOutcome, bool)> {
    let Ok(limit) = u64::try_from(limit) else {
        return Ok((outcome, false));
    };
    if limit == 0 {
        return Ok((outcome, false));
    }

    let available = limit.saturating_sub(total_win);
    let before = outcome.total_win;

    let mut running = 0u64;
    let mut items = Vec::with_capacity(outcome.len());
    for mut win in outcome.items {
        let reached = checked_add(running, win.win_amount, "capped total")?;
        if reached > available {
            let deduction = reached - available;
            if deduction >= win.win_amount {
                debug!("Win cap removed {} ({})", win.name, win.win_amount);
                continue;
            }
            win.win_amount -= deduction;
            debug!("Win cap reduced {} by {}", win.name, deduction);
        }
        running = checked_add(running, win.win_amount, "capped total")?;
        items.push(win);
    }

    let mut capped = WinOutcome::from_items(items)?;
    if capped.total_win > available {
        return Err(EvalError::evaluation(format!(
            "capped total {} still exceeds available {}",
            capped.total_win, available
        )));
    }

    let reached = capped.total_win == available;
    if reached {
        for win in &mut capped.items {
            win.triggers.clear();
        }
        debug!(
            "Win cap {} reached: {} -> {} (previously paid {})",
            limit, before, capped.total_win, total_win
        );
    }
    Ok((capped, reached))
}
