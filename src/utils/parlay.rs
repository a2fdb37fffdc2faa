/// Convert American odds to implied probability
/// Positive odds (+150) mean you win $150 on a $100 bet
/// Negative odds (-150) mean you need to bet $150 to win $100
pub fn american_odds_to_probability(odds: i32) -> f64 {
    if odds > 0 {
        // For positive odds: 100 / (odds + 100)
        100.0 / (odds as f64 + 100.0)
    } else {
        // For negative odds: |odds| / (|odds| + 100)
        let abs_odds = odds.abs() as f64;
        abs_odds / (abs_odds + 100.0)
    }
}

/// Convert American odds to decimal odds (stake included in the payout)
pub fn american_odds_to_decimal(odds: i32) -> f64 {
    if odds > 0 {
        1.0 + odds as f64 / 100.0
    } else {
        1.0 + 100.0 / odds.abs() as f64
    }
}

/// Convert decimal odds back to American odds
pub fn decimal_odds_to_american(decimal: f64) -> i32 {
    if decimal >= 2.0 {
        ((decimal - 1.0) * 100.0).round() as i32
    } else {
        (-100.0 / (decimal - 1.0)).round() as i32
    }
}

/// Combined decimal odds of a parlay: the product of the leg odds.
/// An empty parlay has odds 1.0 (a push).
pub fn parlay_decimal_odds(legs: &[i32]) -> f64 {
    legs.iter()
        .map(|&odds| american_odds_to_decimal(odds))
        .product()
}

/// Total payout (stake included) for a parlay at the given stake.
pub fn parlay_payout(legs: &[i32], stake: f64) -> f64 {
    stake * parlay_decimal_odds(legs)
}

/// Naive win probability of a parlay: the product of the legs' implied
/// probabilities. The bookmaker's vig is left in, so this understates the
/// true probability slightly on every leg.
pub fn parlay_probability(legs: &[i32]) -> f64 {
    legs.iter()
        .map(|&odds| american_odds_to_probability(odds))
        .product()
}

/// Render odds the way books print them: "+150", "-110".
pub fn format_american_odds(odds: i32) -> String {
    format!("{:+}", odds)
}
