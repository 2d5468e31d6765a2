//! Starting-grid construction preserving the target's bulk statistics.

use rand_distr::{Distribution, Poisson};
use remat_core::errors::{ErrorInfo, RematError};
use remat_core::tracker::Descriptor;
use remat_core::{PhaseGrid, RngHandle, Tracker};

/// Builds a uniformly random grid with exactly the target's solid fraction
/// (floored to whole sites) and wraps it like the target.
pub fn initialize_random<T: Tracker>(
    target: &T,
    shape: Option<&[usize]>,
    rng: &mut RngHandle,
) -> Result<T, RematError> {
    let shape = match shape {
        Some(shape) => shape,
        None => target.shape(),
    };
    let mut grid = PhaseGrid::new(shape, target.is_periodic())?;
    let fraction = target.grid().phase_count(1) as f64 / target.len() as f64;
    let quota = (fraction * grid.len() as f64).floor() as usize;
    let mut placed = 0usize;
    while placed < quota {
        let index = rng.next_index(grid.len());
        if grid.get(index) == 0 {
            grid.set(index, 1);
            placed += 1;
        }
    }
    target.construct_like(grid)
}

/// Builds a Boolean-model grid of solid spheres whose void-phase two-point
/// curve approximates the target's, and wraps it like the target.
///
/// The `(radius, intensity)` pair is fitted from the starting guess
/// `(radius0, intensity0)` against the target's direction-averaged void
/// two-point curve; the sphere count is then drawn from a Poisson law with
/// mean `intensity * sites`. The solid fraction is only matched in
/// expectation.
pub fn initialize_spheres<T: Tracker>(
    target: &T,
    shape: Option<&[usize]>,
    radius0: f64,
    intensity0: f64,
    rng: &mut RngHandle,
) -> Result<T, RematError> {
    let (radius, intensity) = fit_boolean_model(target, radius0, intensity0)?;
    let shape = match shape {
        Some(shape) => shape,
        None => target.shape(),
    };
    let mut grid = PhaseGrid::new(shape, target.is_periodic())?;

    let expected = intensity * grid.len() as f64;
    let poisson = Poisson::new(expected).map_err(|_| {
        RematError::Config(
            ErrorInfo::new("bad-intensity", "sphere intensity yields no Poisson law")
                .with_context("expected-centers", expected.to_string()),
        )
    })?;
    let centers = poisson.sample(rng.inner_mut()) as usize;

    for _ in 0..centers {
        let mut center = [0.0f64; 3];
        for (axis, &extent) in shape.iter().enumerate() {
            center[axis] = rng.next_f64() * extent as f64;
        }
        render_sphere(&mut grid, center, radius);
    }
    target.construct_like(grid)
}

/// Fits a Boolean sphere model `(radius, intensity)` whose closed-form
/// void-phase two-point curve best matches the target's direction-averaged
/// one, by bounded pattern search from the starting guess.
pub fn fit_boolean_model<T: Tracker>(
    target: &T,
    radius0: f64,
    intensity0: f64,
) -> Result<(f64, f64), RematError> {
    if !(radius0 > 0.0 && radius0.is_finite()) || !(intensity0 > 0.0 && intensity0.is_finite()) {
        return Err(RematError::Config(
            ErrorInfo::new("bad-guess", "sphere fit needs positive starting parameters")
                .with_context("radius0", radius0.to_string())
                .with_context("intensity0", intensity0.to_string()),
        ));
    }
    let observed = target.correlation(Descriptor::two_point(0))?.mean();
    let ndim = target.grid().ndim();

    let loss = |radius: f64, intensity: f64| -> f64 {
        observed
            .iter()
            .enumerate()
            .map(|(lag, &probability)| {
                let model = void_two_point(lag as f64, radius, intensity, ndim);
                (model - probability) * (model - probability)
            })
            .sum()
    };

    let mut radius = radius0;
    let mut intensity = intensity0;
    let mut best = loss(radius, intensity);
    let mut factor = 1.05;
    let mut budget = 10_000usize;
    while factor - 1.0 > 1e-5 && budget > 0 {
        budget -= 1;
        let mut improved = false;
        let candidates = [
            (radius * factor, intensity),
            (radius / factor, intensity),
            (radius, intensity * factor),
            (radius, intensity / factor),
        ];
        for (candidate_radius, candidate_intensity) in candidates {
            let candidate = loss(candidate_radius, candidate_intensity);
            if candidate < best {
                best = candidate;
                radius = candidate_radius;
                intensity = candidate_intensity;
                improved = true;
            }
        }
        if !improved {
            factor = 1.0 + (factor - 1.0) / 2.0;
        }
    }
    Ok((radius, intensity))
}

/// Closed-form void-phase two-point probability of a Boolean sphere model
/// at lag `r`: `exp(-intensity * union_volume(r))`.
fn void_two_point(lag: f64, radius: f64, intensity: f64, ndim: usize) -> f64 {
    let single = sphere_volume(radius, ndim);
    let union = 2.0 * single - sphere_intersection(lag, radius, ndim);
    (-intensity * union).exp()
}

fn sphere_volume(radius: f64, ndim: usize) -> f64 {
    if ndim == 2 {
        std::f64::consts::PI * radius * radius
    } else {
        4.0 / 3.0 * std::f64::consts::PI * radius.powi(3)
    }
}

/// Overlap volume of two equal spheres with centers `lag` apart.
fn sphere_intersection(lag: f64, radius: f64, ndim: usize) -> f64 {
    if lag >= 2.0 * radius {
        return 0.0;
    }
    if ndim == 2 {
        2.0 * radius * radius * (lag / (2.0 * radius)).acos()
            - 0.5 * lag * (4.0 * radius * radius - lag * lag).sqrt()
    } else {
        std::f64::consts::PI * (2.0 * radius - lag).powi(2) * (4.0 * radius + lag) / 12.0
    }
}

fn render_sphere(grid: &mut PhaseGrid, center: [f64; 3], radius: f64) {
    let ndim = grid.ndim();
    let mut low = [0isize; 3];
    let mut high = [0isize; 3];
    for axis in 0..ndim {
        low[axis] = (center[axis] - radius).floor() as isize;
        high[axis] = (center[axis] + radius).ceil() as isize;
    }
    let z_range = if ndim == 3 { low[2]..=high[2] } else { 0..=0 };
    for z in z_range {
        for y in low[1]..=high[1] {
            for x in low[0]..=high[0] {
                let dx = x as f64 - center[0];
                let dy = y as f64 - center[1];
                let dz = if ndim == 3 { z as f64 - center[2] } else { 0.0 };
                if dx * dx + dy * dy + dz * dz <= radius * radius {
                    if let Some(index) = grid.resolve([x, y, z]) {
                        grid.set(index, 1);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_model_curves_behave_like_void_statistics() {
        let radius = 3.0;
        let intensity = 0.01;
        // Volume identities the closed form relies on: full overlap at lag
        // zero, no overlap beyond the diameter.
        assert!((sphere_intersection(0.0, radius, 2) - sphere_volume(radius, 2)).abs() < 1e-12);
        assert!((sphere_intersection(0.0, radius, 3) - sphere_volume(radius, 3)).abs() < 1e-9);
        assert_eq!(sphere_intersection(6.0, radius, 2), 0.0);

        // At lag zero the curve is the void fraction; it then decays
        // monotonically toward the independent-points square.
        let fraction = (-intensity * sphere_volume(radius, 2)).exp();
        assert!((void_two_point(0.0, radius, intensity, 2) - fraction).abs() < 1e-12);
        let curve: Vec<f64> = (0..10)
            .map(|lag| void_two_point(lag as f64, radius, intensity, 2))
            .collect();
        assert!(curve.windows(2).all(|pair| pair[1] <= pair[0]));
        assert!((curve[9] - fraction * fraction).abs() < 1e-9);
    }

    #[test]
    fn rendered_spheres_wrap_on_periodic_grids() {
        let mut grid = PhaseGrid::new(&[10, 10], true).unwrap();
        render_sphere(&mut grid, [0.5, 0.5, 0.0], 2.2);
        // The disk centered near the corner spills into all four corners.
        assert_eq!(grid.get(grid.index_of([0, 0, 0])), 1);
        assert_eq!(grid.get(grid.index_of([9, 0, 0])), 1);
        assert_eq!(grid.get(grid.index_of([0, 9, 0])), 1);
        assert_eq!(grid.get(grid.index_of([9, 9, 0])), 1);
        assert_eq!(grid.get(grid.index_of([5, 5, 0])), 0);
    }

    #[test]
    fn rendered_spheres_clip_on_clamped_grids() {
        let mut grid = PhaseGrid::new(&[10, 10], false).unwrap();
        render_sphere(&mut grid, [0.0, 0.0, 0.0], 1.5);
        assert_eq!(grid.get(grid.index_of([0, 0, 0])), 1);
        assert_eq!(grid.get(grid.index_of([9, 9, 0])), 0);
        assert!(grid.phase_count(1) < 8);
    }
}
