//! Whiteness threshold

use std::fmt;
use std::str::FromStr;

/// How close to pure white a pixel must be to count as background.
///
/// A pixel is background when each of its red, green and blue channels is
/// strictly greater than `255 - tolerance`. Any integer is accepted: a
/// negative tolerance matches nothing, and a tolerance of 256 or more
/// matches every pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tolerance(i32);

impl Tolerance {
    pub const DEFAULT: Tolerance = Tolerance(30);

    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    /// Channel values must be above this to count as white.
    ///
    /// Widened so the whole `i32` range of tolerances stays exact.
    pub fn threshold(&self) -> i64 {
        255 - i64::from(self.0)
    }

    /// True when all three color channels clear the threshold.
    pub fn is_white(&self, r: u8, g: u8, b: u8) -> bool {
        let t = self.threshold();
        i64::from(r) > t && i64::from(g) > t && i64::from(b) > t
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i32> for Tolerance {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Tolerance {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
