use std::rc::Rc;
use std::sync::Arc;

/// Identity comparison for selected snapshots.
///
/// Shared pointers compare by address, scalars by value. Floats compare by
/// bit pattern, so `NaN` is identical to itself and `0.0` is not identical
/// to `-0.0`.
pub trait Identical {
    fn identical(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identical for Arc<T> {
    fn identical(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Identical for Rc<T> {
    fn identical(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl Identical for &'static str {
    fn identical(&self, other: &Self) -> bool {
        self.as_ptr() == other.as_ptr() && self.len() == other.len()
    }
}

impl<T> Identical for &'static [T] {
    fn identical(&self, other: &Self) -> bool {
        self.as_ptr() == other.as_ptr() && self.len() == other.len()
    }
}

macro_rules! identical_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identical for $ty {
                fn identical(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

identical_by_value!(
    (), bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, String,
);

impl Identical for f32 {
    fn identical(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl Identical for f64 {
    fn identical(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl<T: Identical> Identical for Option<T> {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.identical(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Identical, E: Identical> Identical for Result<T, E> {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Ok(a), Ok(b)) => a.identical(b),
            (Err(a), Err(b)) => a.identical(b),
            _ => false,
        }
    }
}

macro_rules! identical_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Identical),+> Identical for ($($name,)+) {
            fn identical(&self, other: &Self) -> bool {
                $(self.$idx.identical(&other.$idx))&&+
            }
        }
    };
}

identical_tuple!(A: 0);
identical_tuple!(A: 0, B: 1);
identical_tuple!(A: 0, B: 1, C: 2);
identical_tuple!(A: 0, B: 1, C: 2, D: 3);
