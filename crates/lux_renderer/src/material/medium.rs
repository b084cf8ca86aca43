//! Refractive media on either side of a surface.

use crate::Side;

/// A homogeneous medium described by its index of refraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Medium {
    pub ior: f32,
}

impl Medium {
    pub const VACUUM: Medium = Medium { ior: 1.0 };

    pub fn new(ior: f32) -> Self {
        Self { ior }
    }
}

impl Default for Medium {
    fn default() -> Self {
        Self::VACUUM
    }
}

/// The pair of media a surface separates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Interface {
    pub outside: Medium,
    pub inside: Medium,
}

impl Interface {
    pub fn medium(&self, side: Side) -> Medium {
        match side {
            Side::Outside => self.outside,
            Side::Inside => self.inside,
        }
    }

    /// Indices of refraction `(on side, across the surface)`.
    pub fn etas(&self, side: Side) -> (f32, f32) {
        (self.medium(side).ior, self.medium(side.flip()).ior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etas_follow_side() {
        let glass = Interface {
            outside: Medium::VACUUM,
            inside: Medium::new(1.5),
        };
        assert_eq!(glass.etas(Side::Outside), (1.0, 1.5));
        assert_eq!(glass.etas(Side::Inside), (1.5, 1.0));
        assert_eq!(glass.medium(Side::Inside).ior, 1.5);
    }
}
