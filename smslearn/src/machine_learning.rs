// machine_learning.rs
pub mod data_error;
pub mod dataloader;
pub mod design_matrix;
pub mod dimensions;
pub mod linear_classifier;
pub mod pipeline;
pub mod text;

#[cfg(test)]
fn compare_outputs(a: &[f64], b: &[f64]) -> bool {
    use float_cmp::{ApproxEq, F64Margin};

    if a.len() != b.len() {
        return false;
    }
    let lax_margin = F64Margin {
        epsilon: 1e-9, // Allows for small numerical errors in very small numbers
        ulps: 50,      // Tolerates rounding errors for larger numbers
    };
    for (&a, &b) in a.iter().zip(b) {
        if !a.approx_eq(b, lax_margin) {
            return false;
        }
    }
    true
}

#[cfg(test)]
/// Samples `points` 2D points from independent normal distributions per axis.
/// The two axes get different fixed seeds so the same call always returns the same points.
fn generate_data(mean: (f64, f64), std: (f64, f64), points: usize) -> Vec<(f64, f64)> {
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};
    use rand_xorshift::XorShiftRng;

    let (Ok(norm_dist_x), Ok(norm_dist_y)) = (Normal::new(mean.0, std.0), Normal::new(mean.1, std.1))
    else {
        return Vec::new();
    };
    let mut x_rand = XorShiftRng::from_seed(*b"MyFragileSeed123");
    let mut y_rand = XorShiftRng::from_seed(*b"MyFragileSeed321");
    let x_iter = norm_dist_x.sample_iter(&mut x_rand);
    let y_iter = norm_dist_y.sample_iter(&mut y_rand);
    x_iter.zip(y_iter).take(points).collect::<Vec<_>>()
}

#[cfg(test)]
/// Two gaussian blobs labelled 0 and 1, interleaved row by row, as raw feature rows
/// without the bias column.
fn generate_blobs(points_per_class: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let class0 = generate_data((-1.0, -1.0), (0.3, 0.3), points_per_class);
    let class1 = generate_data((1.0, 1.0), (0.3, 0.3), points_per_class);
    let mut features = Vec::with_capacity(points_per_class * 2);
    let mut labels = Vec::with_capacity(points_per_class * 2);
    for (a, b) in class0.into_iter().zip(class1) {
        features.push(vec![a.0, a.1]);
        labels.push(0.0);
        features.push(vec![b.0, b.1]);
        labels.push(1.0);
    }
    (features, labels)
}

#[cfg(test)]
fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    if num == 0 {
        return Vec::new();
    }
    let step = if num == 1 {
        0.0
    } else {
        (end - start) / (num - 1) as f64
    };
    (0..num).map(|i| start + step * i as f64).collect()
}
