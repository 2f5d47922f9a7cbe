// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checked numeric casts.
//!
//! Numbers are stored either as `i64` (Integer) or as `f64` (FloatingPoint).
//! Reading them as another primitive type, or writing a number into a parameter of
//! the other numeric kind, is only allowed if the value is **exactly**
//! representable by the target type. Nothing is silently truncated or rounded.

/// A primitive numeric type that stored numbers can be cast to.
///
/// # Examples
///
/// ```
/// use cfgtree::domain::casts::Numeric;
///
/// assert_eq!(<u8 as Numeric>::from_integer(255), Some(255u8));
/// assert_eq!(<u8 as Numeric>::from_integer(256), None);
/// assert_eq!(<i32 as Numeric>::from_float(-3.0), Some(-3));
/// assert_eq!(<i32 as Numeric>::from_float(1.5), None);
/// assert_eq!(<f64 as Numeric>::from_integer(42), Some(42.0));
/// ```
pub trait Numeric: Copy {
    /// Human-readable type name used in error messages.
    const NAME: &'static str;

    /// Converts a stored integer, returning `None` on overflow or precision loss.
    fn from_integer(value: i64) -> Option<Self>;

    /// Converts a stored floating point number, returning `None` if the value
    /// cannot be represented exactly.
    fn from_float(value: f64) -> Option<Self>;
}

// Floats inside this range convert to i128 without saturation.
const I128_SAFE_BOUND: f64 = 1.0e38;

fn float_to_i128_exact(value: f64) -> Option<i128> {
    if !value.is_finite() || value.fract() != 0.0 || value.abs() >= I128_SAFE_BOUND {
        return None;
    }
    Some(value as i128)
}

macro_rules! impl_numeric_integer {
    ($($t:ty),*) => {
        $(
            impl Numeric for $t {
                const NAME: &'static str = stringify!($t);

                fn from_integer(value: i64) -> Option<Self> {
                    <$t>::try_from(value).ok()
                }

                fn from_float(value: f64) -> Option<Self> {
                    float_to_i128_exact(value).and_then(|v| <$t>::try_from(v).ok())
                }
            }
        )*
    };
}

impl_numeric_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl Numeric for f64 {
    const NAME: &'static str = "f64";

    fn from_integer(value: i64) -> Option<Self> {
        let converted = value as f64;
        if float_to_i128_exact(converted) == Some(value as i128) {
            Some(converted)
        } else {
            None
        }
    }

    fn from_float(value: f64) -> Option<Self> {
        Some(value)
    }
}

impl Numeric for f32 {
    const NAME: &'static str = "f32";

    fn from_integer(value: i64) -> Option<Self> {
        let converted = value as f32;
        if float_to_i128_exact(converted as f64) == Some(value as i128) {
            Some(converted)
        } else {
            None
        }
    }

    fn from_float(value: f64) -> Option<Self> {
        let converted = value as f32;
        if value.is_nan() || converted as f64 == value {
            Some(converted)
        } else {
            None
        }
    }
}
