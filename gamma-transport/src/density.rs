//! Scalar density fields within a sector, with analytic column-density
//! integrals where possible.

use crate::geometry::Vector3;
use enum_dispatch::enum_dispatch;
use std::sync::Arc;

/// Capability shared by every density model: evaluate `rho(x)` and the
/// analytic (or numeric) column density `integral_0^t rho(x + s d) ds`.
#[enum_dispatch]
pub trait Density {
    /// Density at `x`, g/cm^3. Must be strictly positive and finite.
    fn density_at(&self, x: Vector3) -> f64;

    /// `integral_0^t rho(x + s d) ds`, g/cm^2, for `t >= 0`.
    fn column_density(&self, x: Vector3, d: Vector3, t: f64) -> f64;

    /// Smallest `t >= 0` such that `column_density(x, d, t) == target`, or
    /// `None` if `target` exceeds the integral available along the ray
    /// (the caller is expected to clamp `t` to the distance to the next
    /// boundary before calling this).
    fn inverse_column_density(&self, x: Vector3, d: Vector3, target: f64) -> Option<f64>;
}

/// A spatially uniform density.
#[derive(Clone, Copy, Debug)]
pub struct Uniform {
    /// Density, g/cm^3.
    pub rho0: f64,
}

impl Density for Uniform {
    fn density_at(&self, _x: Vector3) -> f64 {
        self.rho0
    }

    fn column_density(&self, _x: Vector3, _d: Vector3, t: f64) -> f64 {
        self.rho0 * t
    }

    fn inverse_column_density(&self, _x: Vector3, _d: Vector3, target: f64) -> Option<f64> {
        if target < 0.0 {
            return Some(0.0);
        }
        Some(target / self.rho0)
    }
}

/// An exponential density gradient, `rho(x) = rho0 * exp(-(x . axis) / h)`,
/// e.g. a barometric atmosphere. `axis` must be a unit vector and `h > 0`.
#[derive(Clone, Copy, Debug)]
pub struct Gradient {
    /// Reference density at `x . axis == 0`, g/cm^3.
    pub rho0: f64,
    /// Scale height, cm.
    pub h: f64,
    /// Unit gradient axis.
    pub axis: Vector3,
}

impl Gradient {
    fn s(&self, x: Vector3, d: Vector3, t: f64) -> f64 {
        (x + d * t).dot(self.axis)
    }
}

impl Density for Gradient {
    fn density_at(&self, x: Vector3) -> f64 {
        self.rho0 * (-(x.dot(self.axis)) / self.h).exp()
    }

    fn column_density(&self, x: Vector3, d: Vector3, t: f64) -> f64 {
        let cos_a = d.dot(self.axis);
        let s0 = x.dot(self.axis);
        if cos_a.abs() < 1.0e-12 {
            // Ray perpendicular to the gradient: density is constant along it.
            return self.rho0 * (-s0 / self.h).exp() * t;
        }
        let s1 = self.s(x, d, t);
        self.rho0 * self.h / cos_a * ((-s0 / self.h).exp() - (-s1 / self.h).exp())
    }

    fn inverse_column_density(&self, x: Vector3, d: Vector3, target: f64) -> Option<f64> {
        if target < 0.0 {
            return Some(0.0);
        }
        let cos_a = d.dot(self.axis);
        let s0 = x.dot(self.axis);
        if cos_a.abs() < 1.0e-12 {
            let rho = self.rho0 * (-s0 / self.h).exp();
            return Some(target / rho);
        }
        // Lambda(t) = rho0 h / cos_a * (exp(-s0/h) - exp(-(s0 + cos_a t)/h))
        let e0 = (-s0 / self.h).exp();
        let rhs = target * cos_a / (self.rho0 * self.h);
        let e1 = e0 - rhs;
        if e1 <= 0.0 {
            // Target exceeds the integral all the way to +infinity along this ray.
            return None;
        }
        let s1 = -self.h * e1.ln();
        Some((s1 - s0) / cos_a)
    }
}

/// A user-supplied density functor, for scenarios not covered by
/// [`Uniform`] or [`Gradient`]. The column density is evaluated by
/// Simpson's rule and inverted by bisection, since no analytic form is
/// assumed.
#[derive(Clone)]
pub struct Functor {
    /// The density field.
    pub rho: Arc<dyn Fn(Vector3) -> f64 + Send + Sync>,
}

impl std::fmt::Debug for Functor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Functor").finish_non_exhaustive()
    }
}

impl Density for Functor {
    fn density_at(&self, x: Vector3) -> f64 {
        (self.rho)(x)
    }

    fn column_density(&self, x: Vector3, d: Vector3, t: f64) -> f64 {
        const N: usize = 64;
        let h = t / N as f64;
        let mut acc = self.density_at(x) + self.density_at(x + d * t);
        for i in 1..N {
            let weight = if i % 2 == 0 { 2.0 } else { 4.0 };
            acc += weight * self.density_at(x + d * (h * i as f64));
        }
        acc * h / 3.0
    }

    fn inverse_column_density(&self, x: Vector3, d: Vector3, target: f64) -> Option<f64> {
        if target < 0.0 {
            return Some(0.0);
        }
        // Bisect on an exponentially growing bracket, since the caller is
        // expected to clamp the result against the true segment length.
        let mut hi = 1.0;
        while self.column_density(x, d, hi) < target && hi < 1.0e12 {
            hi *= 2.0;
        }
        if self.column_density(x, d, hi) < target {
            return None;
        }
        let mut lo = 0.0;
        for _ in 0..64 {
            let mid = 0.5 * (lo + hi);
            if self.column_density(x, d, mid) < target {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(0.5 * (lo + hi))
    }
}

/// Tagged union of the density models a sector may carry. Dispatch happens
/// once per step on this enum rather than through a `dyn Density` in the
/// inner loop (`spec.md` §9, "no inheritance hierarchy").
#[enum_dispatch(Density)]
#[derive(Clone, Debug)]
pub enum DensityModel {
    /// Spatially constant density.
    Uniform,
    /// Exponential gradient.
    Gradient,
    /// User-supplied functor.
    Functor,
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn uniform_column_density_is_linear() {
        let rho = Uniform { rho0: 2.0 };
        let x = Vector3::new(0.0, 0.0, 0.0);
        let d = Vector3::new(0.0, 0.0, 1.0);
        assert_approx_eq!(f64, rho.column_density(x, d, 3.0), 6.0);
    }

    #[test]
    fn uniform_inverse_column_density_round_trips() {
        let rho = Uniform { rho0: 1.225e-3 };
        let x = Vector3::new(0.0, 0.0, 0.0);
        let d = Vector3::new(0.0, 0.0, 1.0);
        let t = rho.inverse_column_density(x, d, 10.0).unwrap();
        assert_approx_eq!(f64, rho.column_density(x, d, t), 10.0, epsilon = 1.0e-9);
    }

    #[test]
    fn gradient_column_density_round_trips() {
        let gradient = Gradient {
            rho0: 1.225e-3,
            h: 1.04e6,
            axis: Vector3::new(0.0, 0.0, 1.0),
        };
        let x = Vector3::new(0.0, 0.0, 0.0);
        let d = Vector3::new(0.0, 0.0, 1.0);
        let lambda = gradient.column_density(x, d, 2.0e4);
        let t = gradient.inverse_column_density(x, d, lambda).unwrap();
        assert_approx_eq!(f64, t, 2.0e4, epsilon = 1.0e-3);
    }

    #[test]
    fn gradient_matches_closed_form() {
        let gradient = Gradient {
            rho0: 1.0,
            h: 2.0,
            axis: Vector3::new(0.0, 0.0, 1.0),
        };
        let x = Vector3::new(0.0, 0.0, 0.0);
        let d = Vector3::new(0.0, 0.0, 1.0);
        let t = 3.0;
        let expected = gradient.rho0 * gradient.h * (1.0 - (-t / gradient.h).exp());
        assert_approx_eq!(f64, gradient.column_density(x, d, t), expected, epsilon = 1.0e-9);
    }

    #[test]
    fn functor_matches_uniform_for_constant_field() {
        let functor = Functor { rho: Arc::new(|_| 1.5) };
        let x = Vector3::new(0.0, 0.0, 0.0);
        let d = Vector3::new(1.0, 0.0, 0.0);
        assert_approx_eq!(f64, functor.column_density(x, d, 4.0), 6.0, epsilon = 1.0e-9);
    }
}
