/// Floating point type used throughout system
pub type Real = f64;

/// Stefan-Boltzmann constant, W/(m^2 K^4)
pub const STEFAN_BOLTZMANN: Real = 5.67e-8;

/// Celsius -> Kelvin offset
pub const KELVIN_OFFSET: Real = 273.15;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-9,
            rel: 1e-6,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Linear interpolation of y at x between sorted (x, y) breakpoints,
/// clamped to the end values outside the table.
pub fn interp_clamped(table: &[(Real, Real)], x: Real) -> Option<Real> {
    let first = table.first()?;
    let last = table.last()?;
    if x <= first.0 {
        return Some(first.1);
    }
    if x >= last.0 {
        return Some(last.1);
    }
    for pair in table.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x >= x0 && x <= x1 {
            if x1 == x0 {
                return Some(y0);
            }
            let f = (x - x0) / (x1 - x0);
            return Some(y0 + f * (y1 - y0));
        }
    }
    None
}

/// Ordinary least-squares line y = slope*x + intercept.
/// Returns None for fewer than two points or a degenerate x spread.
pub fn linear_fit(xs: &[Real], ys: &[Real]) -> Option<(Real, Real)> {
    if xs.len() < 2 || xs.len() != ys.len() {
        return None;
    }
    let n = xs.len() as Real;
    let sx: Real = xs.iter().sum();
    let sy: Real = ys.iter().sum();
    let sxx: Real = xs.iter().map(|x| x * x).sum();
    let sxy: Real = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    let denom = n * sxx - sx * sx;
    if denom.abs() < 1e-12 {
        return None;
    }
    let slope = (n * sxy - sx * sy) / denom;
    let intercept = (sy - slope * sx) / n;
    Some((slope, intercept))
}
