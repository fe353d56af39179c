use super::types::BattingLine;
use serde::Serialize;

/// Rate statistics derived from a batting line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RateStats {
    /// Hits per at-bat (AVG).
    pub hit_rate: f64,
    /// (Hits + walks) per plate appearance (OBP, no sacrifice-fly correction).
    pub on_base_rate: f64,
    /// Total bases per at-bat (SLG).
    pub power_rate: f64,
}

/// `n / d`, or exactly 0 when the denominator is 0.
pub fn safe_div(n: f64, d: f64) -> f64 {
    if d == 0.0 {
        0.0
    } else {
        n / d
    }
}

pub fn singles(line: &BattingLine) -> f64 {
    line.h() - line.doubles() - line.triples() - line.hr()
}

pub fn total_bases(line: &BattingLine) -> f64 {
    singles(line) + 2.0 * line.doubles() + 3.0 * line.triples() + 4.0 * line.hr()
}

pub fn derive_rates(line: &BattingLine) -> RateStats {
    RateStats {
        hit_rate: safe_div(line.h(), line.ab()),
        on_base_rate: safe_div(line.h() + line.bb(), line.pa()),
        power_rate: safe_div(total_bases(line), line.ab()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(pa: f64, ab: f64, h: f64, d: f64, t: f64, hr: f64, bb: f64) -> BattingLine {
        BattingLine {
            plate_appearances: Some(pa),
            at_bats: Some(ab),
            hits: Some(h),
            doubles: Some(d),
            triples: Some(t),
            home_runs: Some(hr),
            walks: Some(bb),
            ..Default::default()
        }
    }

    #[test]
    fn test_total_bases() {
        // 10 hits: 5 singles, 2 doubles, 1 triple, 2 home runs
        let l = line(50.0, 40.0, 10.0, 2.0, 1.0, 2.0, 8.0);
        assert_eq!(singles(&l), 5.0);
        assert_eq!(total_bases(&l), 5.0 + 4.0 + 3.0 + 8.0);
    }

    #[test]
    fn test_rates() {
        let l = line(50.0, 40.0, 10.0, 2.0, 1.0, 2.0, 8.0);
        let rates = derive_rates(&l);
        assert_eq!(rates.hit_rate, 0.25);
        assert_eq!(rates.on_base_rate, 18.0 / 50.0);
        assert_eq!(rates.power_rate, 20.0 / 40.0);
    }

    #[test]
    fn test_zero_denominators_yield_zero() {
        let l = line(0.0, 0.0, 3.0, 0.0, 0.0, 1.0, 2.0);
        let rates = derive_rates(&l);
        assert_eq!(rates, RateStats::default());
    }

    #[test]
    fn test_missing_line_yields_zero() {
        assert_eq!(derive_rates(&BattingLine::default()), RateStats::default());
    }
}
