//! Distance-based perturbation functions.
//!
//! A perturbation maps an interatomic distance to an energy contribution. The accumulator
//! always calls it with the distance itself (never the squared distance), once per
//! contributing distance record. Zero distances are excluded upstream; the built-ins below do
//! not guard against them and return non-finite values at `r == 0`.

/// A scalar function of distance used as an energy perturbation.
///
/// Implemented for every `Fn(f64) -> f64 + Sync`, so plain closures and function items can be
/// passed wherever a perturbation is expected.
pub trait Perturbation: Sync {
    fn energy(&self, distance: f64) -> f64;
}

impl<F> Perturbation for F
where
    F: Fn(f64) -> f64 + Sync,
{
    #[inline]
    fn energy(&self, distance: f64) -> f64 {
        self(distance)
    }
}

#[inline]
pub fn lennard_jones_perturbation(r: f64, epsilon: f64, sigma: f64) -> f64 {
    let rho6 = (sigma / r).powi(6);
    4.0 * epsilon * (rho6 * rho6 - rho6)
}

#[inline]
pub fn poly_decay_perturbation(r: f64, n: i32) -> f64 {
    1.0 / r.powi(n)
}

#[inline]
pub fn gaussian_decay_perturbation(r: f64, alpha: f64, beta: f64) -> f64 {
    beta * (-alpha * r * r).exp()
}

pub fn lennard_jones(epsilon: f64, sigma: f64) -> impl Fn(f64) -> f64 + Send + Sync + Copy {
    move |r| lennard_jones_perturbation(r, epsilon, sigma)
}

pub fn poly_decay(n: i32) -> impl Fn(f64) -> f64 + Send + Sync + Copy {
    move |r| poly_decay_perturbation(r, n)
}

pub fn gaussian_decay(alpha: f64, beta: f64) -> impl Fn(f64) -> f64 + Send + Sync + Copy {
    move |r| gaussian_decay_perturbation(r, alpha, beta)
}
