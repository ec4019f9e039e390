//! Tick placement and tick label formatting.

/// How the ticks of an axis are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum Ticks {
    /// Explicit positions with their labels (e.g. `xtick` / `xtickstr`).
    Fixed {
        positions: Vec<f64>,
        labels: Vec<String>,
    },
    /// Every multiple of `major`, with unlabeled minor ticks every `minor`.
    Multiple { major: f64, minor: Option<f64> },
    /// At most `bins` intervals on "nice" steps; optionally drop the lowest tick.
    MaxN { bins: usize, prune_lower: bool },
    /// `count` evenly spaced ticks from the lower to the upper limit.
    Linspace { count: usize },
    /// Decades on a logarithmic axis with 2..9 minor ticks.
    Decades,
}

/// A tick resolved against an axis range.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    /// `None` for minor ticks.
    pub label: Option<String>,
}

impl Tick {
    pub fn is_major(&self) -> bool {
        self.label.is_some()
    }
}

const EPS: f64 = 1e-9;

fn within(value: f64, lo: f64, hi: f64) -> bool {
    let slack = (hi - lo).abs() * EPS;
    value >= lo.min(hi) - slack && value <= lo.max(hi) + slack
}

/// Most ticks one locator places on an axis.
pub const MAX_TICKS: usize = 1000;

/// Indices `first..=last` of the multiples of `step` inside `lo..=hi`.
fn multiple_indices(step: f64, lo: f64, hi: f64) -> Option<(i64, i64)> {
    if !(step > 0.0) || !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let first = (lo / step - EPS).ceil() as i64;
    let last = (hi / step + EPS).floor() as i64;
    (first <= last).then_some((first, last))
}

fn index_count((first, last): (i64, i64)) -> u128 {
    (last as i128 - first as i128 + 1) as u128
}

/// Multiples of `step` inside `lo..=hi`. Past [`MAX_TICKS`] only every
/// n-th multiple is kept.
pub fn multiples(step: f64, lo: f64, hi: f64) -> Vec<f64> {
    let Some((first, last)) = multiple_indices(step, lo, hi) else {
        return Vec::new();
    };
    let count = index_count((first, last));
    let stride = count.div_ceil(MAX_TICKS as u128).max(1) as i64;
    if stride > 1 {
        log::warn!("{count} ticks every {step} exceed {MAX_TICKS}, keeping every {stride}th");
    }
    let start = first.saturating_add((stride - first.rem_euclid(stride)) % stride);
    (start..=last)
        .step_by(stride as usize)
        .map(|k| k as f64 * step)
        .collect()
}

/// Minor multiples of `minor` that do not fall on a multiple of `major`.
/// Skipped entirely when they would push the axis past [`MAX_TICKS`].
fn minor_multiples(major: f64, minor: f64, lo: f64, hi: f64, placed: usize) -> Vec<f64> {
    let Some((first, last)) = multiple_indices(minor, lo, hi) else {
        return Vec::new();
    };
    let count = index_count((first, last));
    if count + placed as u128 > MAX_TICKS as u128 {
        log::warn!("{count} minor ticks every {minor} exceed {MAX_TICKS}, leaving them out");
        return Vec::new();
    }
    let ratio = major / minor;
    let every = ratio.round();
    let aligned = every >= 1.0 && (ratio - every).abs() < every * EPS;
    (first..=last)
        .filter(|k| match aligned {
            true => k % every as i64 != 0,
            false => {
                let value = *k as f64 * minor;
                (value - (value / major).round() * major).abs() >= minor * EPS
            }
        })
        .map(|k| k as f64 * minor)
        .collect()
}

/// `count` evenly spaced values from `lo` to `hi`, both included.
pub fn linspace(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![lo],
        n => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// Smallest "nice" step (1, 2, 2.5, 5 × 10^k) splitting the range into at
/// most `bins` intervals.
pub fn nice_step(lo: f64, hi: f64, bins: usize) -> f64 {
    let span = (hi - lo).abs();
    if span == 0.0 || !span.is_finite() || bins == 0 {
        return 1.0;
    }
    let raw = span / bins as f64;
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|step| *step >= raw * (1.0 - EPS))
        .unwrap_or(10.0 * magnitude)
}

/// Format tick values with the fewest decimals that keep every value exact.
pub fn format_ticks(values: &[f64]) -> Vec<String> {
    let largest = values.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let smallest = values
        .iter()
        .filter(|v| **v != 0.0)
        .fold(f64::INFINITY, |m, v| m.min(v.abs()));
    if largest >= 1e5 || (smallest.is_finite() && largest < 1e-3) {
        return values.iter().map(|v| format!("{v:e}")).collect();
    }

    let decimals = (0..=6)
        .find(|d| {
            let scale = 10f64.powi(*d);
            values
                .iter()
                .all(|v| ((v * scale).round() - v * scale).abs() < 1e-6 * scale.max(1.0))
        })
        .unwrap_or(6) as usize;
    values
        .iter()
        .map(|v| {
            let s = format!("{v:.decimals$}");
            // avoid "-0"
            if s.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
                s.trim_start_matches('-').to_string()
            } else {
                s
            }
        })
        .collect()
}

/// `10` with a superscript exponent, as used on log axes.
pub fn format_decade(exponent: i32) -> String {
    const SUPERSCRIPT: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    let mut out = String::from("10");
    if exponent < 0 {
        out.push('⁻');
    }
    for digit in exponent.unsigned_abs().to_string().bytes() {
        out.push(SUPERSCRIPT[(digit - b'0') as usize]);
    }
    out
}

impl Ticks {
    /// Resolve the locator against the visible range `lo..=hi` (data units).
    pub fn resolve(&self, lo: f64, hi: f64) -> Vec<Tick> {
        match self {
            Ticks::Fixed { positions, labels } => positions
                .iter()
                .zip(labels.iter().map(Some).chain(std::iter::repeat(None)))
                .filter(|(p, _)| within(**p, lo, hi))
                .map(|(p, label)| Tick {
                    value: *p,
                    label: Some(label.cloned().unwrap_or_default()),
                })
                .collect(),
            Ticks::Multiple { major, minor } => {
                let majors = multiples(*major, lo, hi);
                let labels = format_ticks(&majors);
                let mut ticks: Vec<Tick> = majors
                    .iter()
                    .zip(labels)
                    .map(|(v, l)| Tick {
                        value: *v,
                        label: Some(l),
                    })
                    .collect();
                if let Some(minor) = minor {
                    ticks.extend(
                        minor_multiples(*major, *minor, lo, hi, ticks.len())
                            .into_iter()
                            .map(|value| Tick { value, label: None }),
                    );
                }
                ticks
            }
            Ticks::MaxN { bins, prune_lower } => {
                let step = nice_step(lo, hi, *bins);
                let mut values = multiples(step, lo, hi);
                if *prune_lower && !values.is_empty() {
                    values.remove(0);
                }
                labeled(values)
            }
            Ticks::Linspace { count } => labeled(linspace(lo, hi, *count)),
            Ticks::Decades => {
                if !(lo > 0.0 && hi > 0.0) {
                    return Vec::new();
                }
                let (lo, hi) = (lo.min(hi), lo.max(hi));
                let first = (lo.log10() - EPS).floor() as i32;
                let last = (hi.log10() + EPS).ceil() as i32;
                let mut ticks = Vec::new();
                for exponent in first..=last {
                    let decade = 10f64.powi(exponent);
                    if within(decade, lo, hi) {
                        ticks.push(Tick {
                            value: decade,
                            label: Some(format_decade(exponent)),
                        });
                    }
                    for m in 2..=9 {
                        let value = decade * m as f64;
                        if within(value, lo, hi) {
                            ticks.push(Tick { value, label: None });
                        }
                    }
                }
                ticks
            }
        }
    }
}

fn labeled(values: Vec<f64>) -> Vec<Tick> {
    let labels = format_ticks(&values);
    values
        .into_iter()
        .zip(labels)
        .map(|(value, l)| Tick {
            value,
            label: Some(l),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn majors(ticks: &[Tick]) -> Vec<f64> {
        ticks.iter().filter(|t| t.is_major()).map(|t| t.value).collect()
    }

    #[test]
    fn multiple_locator() {
        let ticks = Ticks::Multiple {
            major: 500.0,
            minor: Some(100.0),
        }
        .resolve(0.0, 3000.0);
        assert_eq!(majors(&ticks), vec![0.0, 500.0, 1000.0, 1500.0, 2000.0, 2500.0, 3000.0]);
        assert_eq!(ticks.len(), 31);
        assert_eq!(ticks[1].label.as_deref(), Some("500"));
    }

    #[test]
    fn minors_skip_the_majors() {
        let ticks = Ticks::Multiple {
            major: 1.0,
            minor: Some(0.25),
        }
        .resolve(-1.0, 1.0);
        let minors: Vec<f64> = ticks.iter().filter(|t| !t.is_major()).map(|t| t.value).collect();
        assert_eq!(minors, vec![-0.75, -0.5, -0.25, 0.25, 0.5, 0.75]);

        let uneven = Ticks::Multiple {
            major: 1.0,
            minor: Some(0.4),
        }
        .resolve(0.0, 2.0);
        let minors: Vec<f64> = uneven.iter().filter(|t| !t.is_major()).map(|t| t.value).collect();
        assert_eq!(minors.len(), 4);
        assert!(minors.iter().all(|m| (m - m.round()).abs() > 0.1));
    }

    #[test]
    fn huge_ranges_stay_within_the_tick_cap() {
        let ticks = Ticks::Multiple {
            major: 2500.0,
            minor: Some(500.0),
        }
        .resolve(0.0, 5e8);
        assert!(!ticks.is_empty());
        assert!(ticks.len() <= MAX_TICKS);
        assert!(ticks.iter().all(Tick::is_major));
        let values = majors(&ticks);
        assert_eq!(values[0], 0.0);
        assert!(values.iter().all(|v| v % 2500.0 == 0.0));
        assert!(*values.last().unwrap() > 4.9e8);

        assert!(multiples(1e-300, 0.0, 1e300).len() <= MAX_TICKS);
    }

    #[test]
    fn max_n_prunes_lowest() {
        let ticks = Ticks::MaxN {
            bins: 9,
            prune_lower: true,
        }
        .resolve(0.0, 100.0);
        let values = majors(&ticks);
        assert_eq!(values.first(), Some(&20.0));
        assert_eq!(values.last(), Some(&100.0));
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(0.0, 100.0, 9), 20.0);
        assert_eq!(nice_step(0.0, 2.0, 4), 0.5);
        assert_eq!(nice_step(0.0, 0.4, 8), 0.05);
    }

    #[test]
    fn fixed_ticks_keep_their_labels() {
        let ticks = Ticks::Fixed {
            positions: vec![0.0, 0.5, 1.0, 2.0],
            labels: vec!["00:00".into(), "".into(), "24:00".into(), "x".into()],
        }
        .resolve(0.0, 1.0);
        let labels: Vec<_> = ticks.iter().map(|t| t.label.clone().unwrap()).collect();
        assert_eq!(labels, vec!["00:00", "", "24:00"]);
    }

    #[test]
    fn decades_on_log_axis() {
        let ticks = Ticks::Decades.resolve(1e-2, 1e3);
        assert_eq!(majors(&ticks).len(), 6);
        assert_eq!(ticks[0].label.as_deref(), Some("10⁻²"));
        assert!(Ticks::Decades.resolve(-1.0, 10.0).is_empty());
    }

    #[test]
    fn tick_label_precision() {
        assert_eq!(format_ticks(&[0.0, 0.5, 1.0]), vec!["0.0", "0.5", "1.0"]);
        assert_eq!(format_ticks(&[0.0, 0.05, 0.1]), vec!["0.00", "0.05", "0.10"]);
        assert_eq!(format_ticks(&[-0.0, 2000.0]), vec!["0", "2000"]);
        assert_eq!(format_ticks(&[2e13, 4e13]), vec!["2e13", "4e13"]);
    }

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace(0.0, 2.0, 5), vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
