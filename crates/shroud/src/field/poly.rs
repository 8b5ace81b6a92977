//! polynomials and lagrange interpolation at zero
//!
//! the lagrange weights use the common denominator technique so a whole
//! interpolation costs one field inversion:
//!
//! λ_i = Π_{j ≠ i} x_j / (x_j - x_i) = ξ · ρ_i · d̄^{-1}
//!
//! with ξ = Π x_j, d_i = x_i · Π_{j ≠ i} (x_j - x_i), ρ_i = Π_{j ≠ i} d_j and
//! d̄ = Π d_i.

use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use super::FieldBackend;
use crate::{Error, Result};

/// polynomial with coefficients in ascending degree order
#[derive(Clone, Debug)]
pub struct Polynomial<F: FieldBackend> {
    coeffs: Vec<F>,
}

impl<F: FieldBackend> Polynomial<F> {
    /// random polynomial of `degree` whose constant term is `constant`
    pub fn random<R: RngCore + CryptoRng>(constant: F, degree: usize, rng: &mut R) -> Result<Self> {
        let mut coeffs = Vec::with_capacity(degree + 1);
        coeffs.push(constant);
        for _ in 0..degree {
            coeffs.push(F::random(rng)?);
        }
        Ok(Self { coeffs })
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn constant(&self) -> F {
        self.coeffs[0]
    }

    /// horner evaluation at an embedded x-coordinate
    pub fn evaluate(&self, x: u32) -> F {
        let x = F::from_u32(x);
        self.coeffs
            .iter()
            .rev()
            .fold(F::zero(), |acc, c| acc.mul(&x).add(c))
    }
}

impl<F: FieldBackend> Drop for Polynomial<F> {
    fn drop(&mut self) {
        self.coeffs.zeroize();
    }
}

/// lagrange weights for evaluating at zero from the given x-coordinates
pub fn lagrange_coefficients<F: FieldBackend>(xs: &[u32]) -> Result<Vec<F>> {
    let k = xs.len();
    if k == 0 {
        return Err(Error::NotEnoughPoints { have: 0, need: 1 });
    }

    for &x in xs {
        if x == 0 {
            return Err(Error::ZeroCoordinate);
        }
    }

    let mut sorted = xs.to_vec();
    sorted.sort_unstable();
    for w in sorted.windows(2) {
        if w[0] == w[1] {
            return Err(Error::DuplicateCoordinate(w[0]));
        }
    }

    if k == 1 {
        return Ok(vec![F::one()]);
    }

    let points: Vec<F> = xs.iter().map(|&x| F::from_u32(x)).collect();

    let xi = points.iter().fold(F::one(), |acc, x| acc.mul(x));

    let mut d_values = Vec::with_capacity(k);
    for i in 0..k {
        let mut d = points[i];
        for j in 0..k {
            if i != j {
                d = d.mul(&points[j].sub(&points[i]));
            }
        }
        d_values.push(d);
    }

    // forward pass: rho[i] = Π_{j < i} d_j
    let mut rho = vec![F::one(); k];
    for i in 1..k {
        rho[i] = rho[i - 1].mul(&d_values[i - 1]);
    }

    // backward pass folds in Π_{j > i} d_j
    let mut suffix = F::one();
    for i in (0..k).rev() {
        rho[i] = rho[i].mul(&suffix);
        suffix = suffix.mul(&d_values[i]);
    }

    let d_bar_inv = suffix.invert().ok_or(Error::ZeroInverse)?;
    let delta = xi.mul(&d_bar_inv);
    Ok(rho.iter().map(|r| delta.mul(r)).collect())
}

/// constant term of the unique polynomial through `points`
pub fn interpolate<F: FieldBackend>(points: &[(u32, F)]) -> Result<F> {
    let xs: Vec<u32> = points.iter().map(|(x, _)| *x).collect();
    let weights = lagrange_coefficients::<F>(&xs)?;
    Ok(points
        .iter()
        .zip(weights.iter())
        .fold(F::zero(), |acc, ((_, y), w)| acc.add(&y.mul(w))))
}
