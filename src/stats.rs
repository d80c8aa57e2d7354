use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub min: f64,
    pub avg: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    pub max: f64,
    pub cnt: usize,
}

fn median_of_sorted(data: &[f64]) -> f64 {
    let n = data.len();
    match n % 2 {
        0 => (data[n / 2 - 1] + data[n / 2]) / 2.0,
        _ => data[n / 2],
    }
}

pub fn statistics_from_sorted(data: &[f64]) -> Statistics {
    let (first, last) = match (data.first(), data.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Statistics {
                min: f64::NAN,
                avg: f64::NAN,
                p10: f64::NAN,
                p50: f64::NAN,
                p90: f64::NAN,
                p99: f64::NAN,
                max: f64::NAN,
                cnt: 0,
            }
        }
    };

    let cnt = data.len();
    let sum: f64 = data.iter().sum();
    let avg = (sum / (cnt as f64) * 100.0).round() / 100.0;
    let pick = |q: f64| -> f64 {
        let idx = ((cnt - 1) as f64 * q) as usize;
        data[idx.min(cnt - 1)]
    };

    Statistics {
        min: first,
        avg,
        p10: pick(0.1),
        // box-plot median: average of the two middle values on even counts
        p50: median_of_sorted(data),
        p90: pick(0.9),
        p99: pick(0.99),
        max: last,
        cnt,
    }
}

pub fn statistics_from_vec(mut data: Vec<f64>) -> Statistics {
    data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    statistics_from_sorted(&data)
}

pub fn statistics_from_ints(data: &[i64]) -> Statistics {
    statistics_from_vec(data.iter().map(|v| *v as f64).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_nan() {
        let s = statistics_from_vec(Vec::new());
        assert_eq!(s.cnt, 0);
        assert!(s.avg.is_nan());
        assert!(s.p50.is_nan());
    }

    #[test]
    fn test_odd_and_even_median() {
        let odd = statistics_from_ints(&[30, 5, 10]);
        assert_eq!(odd.p50, 10.0);
        assert_eq!(odd.min, 5.0);
        assert_eq!(odd.max, 30.0);
        assert_eq!(odd.avg, 15.0);

        let even = statistics_from_ints(&[1, 2, 3, 4]);
        assert_eq!(even.p50, 2.5);
        assert_eq!(even.cnt, 4);
    }

    #[test]
    fn test_avg_rounded_to_two_decimals() {
        let s = statistics_from_ints(&[1, 1, 2]);
        assert_eq!(s.avg, 1.33);
    }
}
