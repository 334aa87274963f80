//! Pricing policy plug-ins
//!
//! Thin, swappable arithmetic layered on top of the orchestration core: the
//! core moves prices, these functions decide them. All float math happens
//! here; the resulting [`Price`] strings are the unit of idempotent truth
//! the dispatcher submits verbatim.

use priceloom_domain::{Price, PriceloomError, Result, SurchargeTable};

/// Variant label whose surcharge is always zero: its price is the base price.
pub const ZERO_SURCHARGE_LABEL: &str = "Forsat S";

/// Round to the nearest "tidy" endpoint: `x00`, `x90` or `(x+1)00`.
pub fn round_to_tidy(price: f64) -> Price {
    #[allow(clippy::cast_possible_truncation)]
    let price_int = price.round() as i64;
    let rem = price_int.rem_euclid(100);
    let base = price_int - rem;
    let options = [base, base + 90, base + 100];
    let tidy = options
        .into_iter()
        .min_by_key(|option| (price_int - option).abs())
        .unwrap_or(base)
        .max(0);
    price_from_int(tidy)
}

/// Round to `.00` when the fraction is below one half, `.90` otherwise.
pub fn smart_round(value: f64) -> f64 {
    value.floor() + if value.fract() >= 0.5 { 0.9 } else { 0.0 }
}

/// Scale a price by a percentage (e.g. `10` or `-5`) and tidy-round it.
pub fn apply_percentage(original: &Price, percent: f64) -> Result<Price> {
    let base = parse_numeric(original)?;
    Ok(round_to_tidy(base * (1.0 + percent / 100.0)))
}

/// Ensemble pricing: base price plus the option surcharges, tidy-rounded.
/// `option1` selects from the necklace table, `option2` from the bracelet
/// table; missing or unknown labels add nothing.
pub fn ensemble_price(
    base: f64,
    surcharges: &SurchargeTable,
    option1: Option<&str>,
    option2: Option<&str>,
) -> Price {
    let mut price = base;
    if let Some(label) = option1 {
        price += surcharges.amount("colliers", label);
    }
    if let Some(label) = option2 {
        price += surcharges.amount("bracelets", label);
    }
    round_to_tidy(price)
}

/// Chain surcharge lookup with the zero-surcharge override applied.
pub fn chain_surcharge(surcharges: &SurchargeTable, category: &str, chain: &str) -> f64 {
    if chain == ZERO_SURCHARGE_LABEL {
        0.0
    } else {
        surcharges.amount(category, chain)
    }
}

/// Parse a validated price string into a float for policy arithmetic.
pub fn parse_numeric(price: &Price) -> Result<f64> {
    price
        .as_str()
        .parse::<f64>()
        .map_err(|_| PriceloomError::InvalidInput(format!("price '{price}' is not numeric")))
}

fn price_from_int(value: i64) -> Price {
    // A non-negative integer formatted with two decimals always validates.
    Price::parse(&format!("{value}.00")).unwrap_or_default()
}
