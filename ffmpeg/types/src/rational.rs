use std::fmt;

/**
    A rational number, used for frame rates and time bases.
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
        Returns true if both terms are positive.

        Containers report unknown rates as `0/0` or `0/1`.
    */
    pub const fn is_valid(self) -> bool {
        self.num > 0 && self.den > 0
    }

    /**
        Returns the value as a float, or 0.0 if the denominator is zero.
    */
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            self.num as f64 / self.den as f64
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}
