//! odds that contacting members goes unreported

use crate::{Error, Result};

/// `(1 − p)^k` for `k` in `0..=k_max`: every one of `k` contacted members
/// stays silent when each reports independently with probability `p`
pub fn exposure_curve(report_probability: f64, k_max: usize) -> Result<Vec<f64>> {
    if !(0.0..=1.0).contains(&report_probability) {
        return Err(Error::invalid(format!(
            "report probability {report_probability} outside [0, 1]"
        )));
    }
    let silent = 1.0 - report_probability;
    let mut acc = 1.0;
    Ok((0..=k_max)
        .map(|_| {
            let v = acc;
            acc *= silent;
            v
        })
        .collect())
}
