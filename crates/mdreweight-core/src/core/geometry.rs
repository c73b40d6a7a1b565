use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

const RIGHT_ANGLE_TOLERANCE_DEG: f64 = 1e-6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Unit cell lengths must be positive and finite, got ({a}, {b}, {c})")]
    InvalidLengths { a: f64, b: f64, c: f64 },
    #[error(
        "Unit cell angles must lie strictly between 0 and 180 degrees, got ({alpha}, {beta}, {gamma})"
    )]
    InvalidAngles { alpha: f64, beta: f64, gamma: f64 },
    #[error("Unit cell matrix is singular or contains non-finite entries")]
    DegenerateMatrix,
}

#[derive(Debug, Clone, PartialEq)]
enum CellShape {
    NonPeriodic,
    Orthorhombic(Vector3<f64>),
    Triclinic {
        matrix: Matrix3<f64>,
        inverse: Matrix3<f64>,
    },
}

/// The periodic cell of a single trajectory frame.
///
/// A cell is stored either as three orthogonal box lengths or as a full matrix whose columns
/// are the cell vectors. Distances between atoms are always measured between the closest
/// periodic images (minimum-image convention).
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCell {
    shape: CellShape,
}

impl UnitCell {
    /// Creates a rectangular box with the given edge lengths.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidLengths`] if any length is not positive and finite.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<Self, GeometryError> {
        validate_lengths(a, b, c)?;
        Ok(Self {
            shape: CellShape::Orthorhombic(Vector3::new(a, b, c)),
        })
    }

    /// Creates a cell from edge lengths and the angles between edges, in degrees.
    ///
    /// `alpha` is the angle between `b` and `c`, `beta` between `a` and `c`, and `gamma`
    /// between `a` and `b`. The `a` vector is placed along x and `b` in the xy-plane.
    /// A cell with three right angles is stored as an orthorhombic box.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive lengths, angles outside `(0, 180)`, or angle
    /// combinations that do not describe a cell with positive volume.
    pub fn from_lengths_and_angles(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Result<Self, GeometryError> {
        validate_lengths(a, b, c)?;
        let angles = [alpha, beta, gamma];
        if angles
            .iter()
            .any(|&angle| !angle.is_finite() || angle <= 0.0 || angle >= 180.0)
        {
            return Err(GeometryError::InvalidAngles { alpha, beta, gamma });
        }
        if angles
            .iter()
            .all(|&angle| (angle - 90.0).abs() < RIGHT_ANGLE_TOLERANCE_DEG)
        {
            return Self::orthorhombic(a, b, c);
        }

        let (cos_alpha, cos_beta) = (alpha.to_radians().cos(), beta.to_radians().cos());
        let (sin_gamma, cos_gamma) = gamma.to_radians().sin_cos();
        let cy = (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let cz_squared = 1.0 - cos_beta * cos_beta - cy * cy;
        if cz_squared <= 0.0 {
            return Err(GeometryError::InvalidAngles { alpha, beta, gamma });
        }

        let matrix = Matrix3::from_columns(&[
            Vector3::new(a, 0.0, 0.0),
            Vector3::new(b * cos_gamma, b * sin_gamma, 0.0),
            Vector3::new(c * cos_beta, c * cy, c * cz_squared.sqrt()),
        ]);
        Self::from_matrix(matrix)
    }

    /// Creates a cell from a matrix whose columns are the three cell vectors.
    ///
    /// A diagonal matrix is stored as an orthorhombic box.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateMatrix`] if the matrix has non-finite entries or
    /// cannot be inverted.
    pub fn from_matrix(matrix: Matrix3<f64>) -> Result<Self, GeometryError> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::DegenerateMatrix);
        }
        let is_diagonal = (0..3).all(|i| (0..3).all(|j| i == j || matrix[(i, j)] == 0.0));
        if is_diagonal {
            let diagonal = matrix.diagonal();
            return Self::orthorhombic(diagonal.x, diagonal.y, diagonal.z)
                .map_err(|_| GeometryError::DegenerateMatrix);
        }
        let inverse = matrix.try_inverse().ok_or(GeometryError::DegenerateMatrix)?;
        Ok(Self {
            shape: CellShape::Triclinic { matrix, inverse },
        })
    }

    /// Creates a cell without periodicity; distances are plain Euclidean distances.
    pub fn non_periodic() -> Self {
        Self {
            shape: CellShape::NonPeriodic,
        }
    }

    /// Returns `true` if the cell applies periodic boundary conditions.
    pub fn is_periodic(&self) -> bool {
        !matches!(self.shape, CellShape::NonPeriodic)
    }

    /// Returns the cell vectors as matrix columns, or `None` for a non-periodic cell.
    pub fn matrix(&self) -> Option<Matrix3<f64>> {
        match &self.shape {
            CellShape::NonPeriodic => None,
            CellShape::Orthorhombic(lengths) => Some(Matrix3::from_diagonal(lengths)),
            CellShape::Triclinic { matrix, .. } => Some(*matrix),
        }
    }

    /// Maps a displacement vector onto its shortest periodic image.
    ///
    /// For triclinic cells the fractional rounding is followed by a scan of the 26
    /// neighboring images, which keeps the result exact for skewed cells as long as the
    /// displacement is not many cells long.
    pub fn minimum_image(&self, delta: Vector3<f64>) -> Vector3<f64> {
        match &self.shape {
            CellShape::NonPeriodic => delta,
            CellShape::Orthorhombic(lengths) => {
                let mut d = delta;
                for k in 0..3 {
                    d[k] -= lengths[k] * (d[k] / lengths[k]).round();
                }
                d
            }
            CellShape::Triclinic { matrix, inverse } => {
                let fractional = inverse * delta;
                let wrapped = matrix * fractional.map(|f| f - f.round());
                let mut best = wrapped;
                let mut best_norm = wrapped.norm_squared();
                for i in -1..=1 {
                    for j in -1..=1 {
                        for k in -1..=1 {
                            let shift = Vector3::new(i as f64, j as f64, k as f64);
                            let candidate = wrapped + matrix * shift;
                            let norm = candidate.norm_squared();
                            if norm < best_norm {
                                best = candidate;
                                best_norm = norm;
                            }
                        }
                    }
                }
                best
            }
        }
    }

    /// Squared length of the minimum image of a displacement.
    #[inline]
    pub fn distance_squared(&self, delta: Vector3<f64>) -> f64 {
        self.minimum_image(delta).norm_squared()
    }

    /// Half of the smallest perpendicular width of the cell.
    ///
    /// Cutoffs above this value may see more than one periodic image of the same atom, of
    /// which only the closest is counted. Non-periodic cells return infinity.
    pub fn max_cutoff(&self) -> f64 {
        match &self.shape {
            CellShape::NonPeriodic => f64::INFINITY,
            CellShape::Orthorhombic(lengths) => lengths.x.min(lengths.y).min(lengths.z) / 2.0,
            CellShape::Triclinic { matrix, .. } => {
                let a: Vector3<f64> = matrix.column(0).into_owned();
                let b: Vector3<f64> = matrix.column(1).into_owned();
                let c: Vector3<f64> = matrix.column(2).into_owned();
                let volume = a.dot(&b.cross(&c)).abs();
                let widths = [
                    volume / b.cross(&c).norm(),
                    volume / c.cross(&a).norm(),
                    volume / a.cross(&b).norm(),
                ];
                widths.iter().copied().fold(f64::INFINITY, f64::min) / 2.0
            }
        }
    }
}

fn validate_lengths(a: f64, b: f64, c: f64) -> Result<(), GeometryError> {
    if [a, b, c].iter().all(|&l| l.is_finite() && l > 0.0) {
        Ok(())
    } else {
        Err(GeometryError::InvalidLengths { a, b, c })
    }
}
