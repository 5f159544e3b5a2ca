/*!
    Rational numbers for time bases and frame rates.
*/

use std::fmt;

/**
    A rational number, as used by containers for time bases and frame rates.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /**
        Returns true if both parts are non-zero and the value is positive.
    */
    pub const fn is_valid(self) -> bool {
        self.num != 0 && self.den != 0 && (self.num > 0) == (self.den > 0)
    }

    /**
        Returns the reciprocal, e.g. a frame rate turned into a frame duration.
    */
    pub const fn invert(self) -> Self {
        Self::new(self.den, self.num)
    }

    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            return 0.0;
        }
        self.num as f64 / self.den as f64
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity() {
        assert!(Rational::new(1, 25).is_valid());
        assert!(Rational::new(-1, -25).is_valid());
        assert!(!Rational::new(0, 1).is_valid());
        assert!(!Rational::new(1, 0).is_valid());
        assert!(!Rational::new(-1, 25).is_valid());
    }

    #[test]
    fn invert_and_convert() {
        let fps = Rational::new(30000, 1001);
        assert_eq!(fps.invert(), Rational::new(1001, 30000));
        assert!((fps.to_f64() - 29.97).abs() < 0.01);
        assert_eq!(Rational::new(1, 0).to_f64(), 0.0);
    }
}
