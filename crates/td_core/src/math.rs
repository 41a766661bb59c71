//! Fixed-point math utilities for deterministic simulation.
//!
//! All simulation state uses fixed-point arithmetic so that the same
//! inputs produce bit-identical results on every platform. Floats only
//! appear at the edges: configuration files and render snapshots.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Stats are authored per frame at this rate; per-second motion is
/// `speed * elapsed_seconds * REFERENCE_FRAME_RATE`.
pub const REFERENCE_FRAME_RATE: i32 = 60;

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for human-authored decimals.
///
/// Data files write `1.5` rather than raw bits. The value is converted to
/// fixed-point once at load time, after which all math stays fixed.
pub mod decimal_serde {
    use super::Fixed;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| D::Error::custom(format!("{value} is out of fixed-point range")))
    }
}

/// Serde support for `Option<Fixed>` authored as a decimal.
pub mod option_decimal_serde {
    use super::Fixed;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional fixed-point number as a decimal.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&v.to_num::<f64>()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<f64>::deserialize(deserializer)? {
            Some(value) => Fixed::checked_from_num(value)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("{value} is out of fixed-point range"))),
            None => Ok(None),
        }
    }
}

/// Serde support for a list of points authored as `(x, y)` decimal pairs.
pub mod points_decimal_serde {
    use super::{Fixed, Vec2Fixed};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize points as `(x, y)` decimal tuples.
    pub fn serialize<S>(points: &[Vec2Fixed], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let pairs: Vec<(f64, f64)> = points
            .iter()
            .map(|p| (p.x.to_num::<f64>(), p.y.to_num::<f64>()))
            .collect();
        pairs.serialize(serializer)
    }

    /// Deserialize points from `(x, y)` decimal tuples.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec2Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(f64, f64)>::deserialize(deserializer)?;
        pairs
            .into_iter()
            .map(|(x, y)| match (Fixed::checked_from_num(x), Fixed::checked_from_num(y)) {
                (Some(x), Some(y)) => Ok(Vec2Fixed::new(x, y)),
                _ => Err(D::Error::custom(format!(
                    "point ({x}, {y}) is out of fixed-point range"
                ))),
            })
            .collect()
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer coordinates.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared(other))
    }

    /// Length of the vector.
    #[must_use]
    pub fn length(self) -> Fixed {
        fixed_sqrt(self.dot(self))
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x * other.x + self.y * other.y
    }

    /// Linearly interpolate between two vectors.
    #[must_use]
    pub fn lerp(self, other: Self, t: Fixed) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Scale by a scalar.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Move toward `target` by at most `step`, never overshooting.
    #[must_use]
    pub fn move_towards(self, target: Self, step: Fixed) -> Self {
        let distance = self.distance(target);
        if distance <= step || distance == Fixed::ZERO {
            return target;
        }
        self.lerp(target, step / distance)
    }

    /// Coordinates as floats, for render-side consumers.
    #[must_use]
    pub fn to_f32(self) -> (f32, f32) {
        (self.x.to_num::<f32>(), self.y.to_num::<f32>())
    }
}

/// Computes the square root of a non-negative fixed-point number.
///
/// Works on the raw bits: for `I32F32`, `sqrt(bits << 32)` is exactly the
/// bit pattern of the root, truncated. Negative inputs yield zero.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let scaled = (value.to_bits() as u128) << 32;
    let root = isqrt_u128(scaled);
    Fixed::from_bits(root as i64)
}

fn isqrt_u128(n: u128) -> u128 {
    if n < 2 {
        return n;
    }

    let bits = 128 - n.leading_zeros();
    let mut x = 1u128 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Round a non-negative fixed-point amount to the nearest whole unit.
///
/// Halves round up, negative values clamp to zero.
#[must_use]
pub fn round_to_u32(value: Fixed) -> u32 {
    if value <= Fixed::ZERO {
        return 0;
    }
    value.round().saturating_to_num::<u32>()
}

/// Centre of the grid cell of size `grid` that contains `point`.
///
/// A non-positive `grid` returns the point unchanged.
#[must_use]
pub fn snap_to_grid(point: Vec2Fixed, grid: Fixed) -> Vec2Fixed {
    if grid <= Fixed::ZERO {
        return point;
    }
    let half = grid / Fixed::from_num(2);
    let snap = |value: Fixed| (value / grid).floor() * grid + half;
    Vec2Fixed::new(snap(point.x), snap(point.y))
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
