//! 1-D Gaussian smoothing
//!
//! Matches the common `gaussian_filter1d` definition: a normalized Gaussian
//! kernel truncated at four standard deviations, applied with half-sample
//! symmetric ("reflect") boundary handling.

/// Number of standard deviations at which the kernel is truncated
pub const TRUNCATE_SIGMAS: f64 = 4.0;

/// Build a normalized 1-D Gaussian kernel for the given sigma.
///
/// The kernel has `2 * radius + 1` taps where
/// `radius = floor(TRUNCATE_SIGMAS * sigma + 0.5)`. A non-positive sigma
/// yields the identity kernel `[1.0]`.
pub fn gaussian_kernel1d(sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 || !sigma.is_finite() {
        return vec![1.0];
    }

    let radius = (TRUNCATE_SIGMAS * sigma + 0.5).floor() as isize;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x * x) as f64 / (sigma * sigma)).exp())
        .collect();

    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Map an out-of-range index back into `0..len` by mirror reflection
/// about the array edges (`d c b a | a b c d | d c b a`).
fn reflect_index(index: isize, len: usize) -> usize {
    let period = 2 * len as isize;
    let m = index.rem_euclid(period);
    if m >= len as isize {
        (period - 1 - m) as usize
    } else {
        m as usize
    }
}

/// Smooth a 1-D signal with a Gaussian kernel of width `sigma`.
///
/// # Arguments
/// * `input` - Signal samples
/// * `sigma` - Kernel standard deviation in samples
///
/// # Returns
/// Smoothed signal, same length as the input
pub fn gaussian_filter1d(input: &[f64], sigma: f64) -> Vec<f64> {
    if input.is_empty() {
        return Vec::new();
    }

    let kernel = gaussian_kernel1d(sigma);
    let radius = (kernel.len() / 2) as isize;
    let len = input.len();

    (0..len as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let offset = k as isize - radius;
                    weight * input[reflect_index(i + offset, len)]
                })
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_sums_to_one() {
        for sigma in [0.5, 1.0, 2.0, 7.3] {
            let kernel = gaussian_kernel1d(sigma);
            let sum: f64 = kernel.iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
            assert_eq!(kernel.len() % 2, 1);
        }
        assert_eq!(gaussian_kernel1d(2.0).len(), 17);
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let signal = vec![3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(gaussian_filter1d(&signal, 0.0), signal);
    }

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        assert_eq!(reflect_index(2, 4), 2);
        assert_eq!(reflect_index(-9, 4), 0);
    }

    #[test]
    fn test_constant_signal_unchanged() {
        let signal = vec![5.0; 20];
        for value in gaussian_filter1d(&signal, 2.0) {
            assert_relative_eq!(value, 5.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_smoothing_preserves_mass_of_centered_impulse() {
        let mut signal = vec![0.0; 41];
        signal[20] = 10.0;
        let smoothed = gaussian_filter1d(&signal, 2.0);
        let total: f64 = smoothed.iter().sum();
        assert_relative_eq!(total, 10.0, epsilon = 1e-9);
        assert!(smoothed[20] < 10.0);
        assert_relative_eq!(smoothed[18], smoothed[22], epsilon = 1e-12);
    }

    #[test]
    fn test_empty_input() {
        assert!(gaussian_filter1d(&[], 2.0).is_empty());
    }
}
