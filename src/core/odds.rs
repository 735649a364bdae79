//! Odds format conversion
//!
//! Decimal odds are the canonical form used in all arithmetic. Fractional
//! (UK-style) odds are produced for display only.
//!
//! Fractions come from the continued-fraction expansion of `decimal - 1`,
//! which yields the simplest fraction close to the price rather than an
//! arbitrary large-denominator approximation (1.91 → 10/11, not 91/100).

/// Shown when odds cannot be represented
pub const NO_ODDS: &str = "—";

/// Fractional notation for decimal 2.00
pub const EVENS: &str = "EVS";

/// Default bound on the fraction's denominator
pub const DEFAULT_MAX_DENOMINATOR: u64 = 1000;

const MAX_ITERATIONS: usize = 20;

/// Distance from a whole number treated as exact
const WHOLE_EPSILON: f64 = 1e-10;

/// Decimal odds are quoted to two places, so a convergent within half a
/// hundredth of the price is indistinguishable from it.
const DISPLAY_TOLERANCE: f64 = 0.005;

/// Convert decimal odds to fractional notation with the default denominator bound
///
/// # Examples
/// ```
/// use edges::core::odds::decimal_to_fractional;
/// assert_eq!(decimal_to_fractional(1.91), "10/11");
/// assert_eq!(decimal_to_fractional(2.0), "EVS");
/// ```
pub fn decimal_to_fractional(decimal: f64) -> String {
    decimal_to_fractional_bounded(decimal, DEFAULT_MAX_DENOMINATOR)
}

/// Convert decimal odds to fractional notation
///
/// Never panics: prices that are not finite or not above 1.0 give `"—"`.
pub fn decimal_to_fractional_bounded(decimal: f64, max_denominator: u64) -> String {
    if !decimal.is_finite() || decimal <= 1.0 {
        return NO_ODDS.to_string();
    }

    let net = decimal - 1.0;
    let whole = net.round();
    if (net - whole).abs() < WHOLE_EPSILON {
        if whole == 0.0 {
            return NO_ODDS.to_string();
        }
        if whole == 1.0 {
            return EVENS.to_string();
        }
        return format!("{:.0}/1", whole);
    }

    let (numerator, denominator) = best_convergent(net, max_denominator);
    if numerator == 0 || denominator == 0 {
        return NO_ODDS.to_string();
    }

    let divisor = gcd(numerator, denominator);
    let (numerator, denominator) = (numerator / divisor, denominator / divisor);

    if numerator == 1 && denominator == 1 {
        EVENS.to_string()
    } else {
        format!("{}/{}", numerator, denominator)
    }
}

/// Walk the convergents of `value`, stopping at the first one that matches
/// it at display precision or before the denominator bound is exceeded.
///
/// Returns `(numerator, 0)` when no convergent fits.
fn best_convergent(value: f64, max_denominator: u64) -> (u64, u64) {
    // h(-2)/k(-2) = 0/1, h(-1)/k(-1) = 1/0
    let (mut h_prev, mut h) = (0u64, 1u64);
    let (mut k_prev, mut k) = (1u64, 0u64);
    let mut remainder = value;

    for _ in 0..MAX_ITERATIONS {
        let term = remainder.floor();
        let a = term as u64;

        let next_h = a.checked_mul(h).and_then(|v| v.checked_add(h_prev));
        let next_k = a.checked_mul(k).and_then(|v| v.checked_add(k_prev));
        let (next_h, next_k) = match (next_h, next_k) {
            (Some(nh), Some(nk)) if nk <= max_denominator => (nh, nk),
            _ => break,
        };

        h_prev = h;
        h = next_h;
        k_prev = k;
        k = next_k;

        if h > 0 && (h as f64 / k as f64 - value).abs() <= DISPLAY_TOLERANCE + WHOLE_EPSILON {
            break;
        }

        let fraction = remainder - term;
        if fraction < WHOLE_EPSILON {
            break;
        }
        remainder = 1.0 / fraction;
    }

    (h, k)
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}

/// Render decimal and fractional odds together, e.g. `1.91 (10/11)`
pub fn format_odds_both(decimal: f64) -> String {
    if !decimal.is_finite() {
        return NO_ODDS.to_string();
    }
    format!("{:.2} ({})", decimal, decimal_to_fractional(decimal))
}

/// Parse fractional notation back into decimal odds
///
/// Accepts `EVS`/`evens` and `a/b`. Returns `None` for anything else.
pub fn fractional_to_decimal(fractional: &str) -> Option<f64> {
    let trimmed = fractional.trim();
    if ["evs", "evens", "even"]
        .iter()
        .any(|e| trimmed.eq_ignore_ascii_case(e))
    {
        return Some(2.0);
    }

    let (num, den) = trimmed.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if !num.is_finite() || !den.is_finite() || num < 0.0 || den <= 0.0 {
        return None;
    }

    Some(1.0 + num / den)
}

/// Probability implied by decimal odds (bookmaker margin included)
pub fn implied_probability(decimal: f64) -> Option<f64> {
    if !decimal.is_finite() || decimal <= 1.0 {
        return None;
    }
    Some(1.0 / decimal)
}
