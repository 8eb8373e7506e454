//! MIST <-> SUI conversion. 1 SUI = 10^9 MIST.

use crate::constants::MIST_PER_SUI;

/// Display units to base units. The amount must be finite and strictly
/// positive; conversion is exact for decimal inputs a float can represent
/// and rounds to the nearest base unit otherwise.
pub fn to_mist(sui: f64) -> Option<u64> {
    if !sui.is_finite() || sui <= 0.0 {
        return None;
    }
    let mist = (sui * MIST_PER_SUI as f64).round();
    if mist >= u64::MAX as f64 {
        return None;
    }
    Some(mist as u64)
}

/// Base units to the four-decimal display string, e.g. 2500000000 -> "2.5000".
pub fn format_sui(mist: u64) -> String {
    let mut whole = mist / MIST_PER_SUI;
    let frac = mist % MIST_PER_SUI;
    let mut frac4 = (frac + 50_000) / 100_000;
    if frac4 == 10_000 {
        whole += 1;
        frac4 = 0;
    }
    format!("{}.{:04}", whole, frac4)
}
