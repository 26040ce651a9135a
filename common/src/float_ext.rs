pub trait FloatExt: Copy {
    /// Absolute difference below [`crate::EPSILON`].
    fn approximately_eq(self, other: Self) -> bool;

    /// Absolute difference below `tolerance`.
    fn approximately_eq_eps(self, other: Self, tolerance: Self) -> bool;
}

impl FloatExt for f32 {
    fn approximately_eq(self, other: Self) -> bool {
        self.approximately_eq_eps(other, crate::EPSILON as f32)
    }

    fn approximately_eq_eps(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() < tolerance
    }
}

impl FloatExt for f64 {
    fn approximately_eq(self, other: Self) -> bool {
        self.approximately_eq_eps(other, crate::EPSILON)
    }

    fn approximately_eq_eps(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() < tolerance
    }
}
