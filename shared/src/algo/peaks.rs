//! 1-D peak detection
//!
//! Local maxima are found with plateau handling (a flat top reports its
//! midpoint, and the first and last samples are never peaks). The optional
//! distance filter then keeps the highest peaks first and discards any peak
//! closer than `min_distance` samples to one already kept.

use std::cmp::Ordering;

/// Indices of all local maxima of `x`, in ascending order.
pub fn find_local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }

    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut i_ahead = i + 1;
            while i_ahead < i_max && x[i_ahead] == x[i] {
                i_ahead += 1;
            }

            if x[i_ahead] < x[i] {
                let left = i;
                let right = i_ahead - 1;
                peaks.push((left + right) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Filter `peaks` so that no two retained peaks are closer than
/// `min_distance` samples. Taller peaks win; equal heights favour the lower
/// index.
pub fn select_by_distance(peaks: &[usize], x: &[f64], min_distance: usize) -> Vec<usize> {
    if min_distance <= 1 || peaks.len() < 2 {
        return peaks.to_vec();
    }

    let mut priority: Vec<usize> = (0..peaks.len()).collect();
    priority.sort_by(|&a, &b| match x[peaks[b]].total_cmp(&x[peaks[a]]) {
        Ordering::Equal => a.cmp(&b),
        other => other,
    });

    let mut keep = vec![true; peaks.len()];
    for &j in &priority {
        if !keep[j] {
            continue;
        }

        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < min_distance {
            keep[k - 1] = false;
            k -= 1;
        }

        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < min_distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}

/// Local maxima of `x` separated by at least `min_distance` samples.
pub fn find_peaks(x: &[f64], min_distance: usize) -> Vec<usize> {
    let candidates = find_local_maxima(x);
    select_by_distance(&candidates, x, min_distance)
}
