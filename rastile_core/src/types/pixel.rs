use std::fmt::Debug;

/// Element type of a tile payload.
pub trait Pixel: Copy + Default + Debug + PartialOrd + Send + Sync + 'static {
	/// Lossy conversion used for statistics and debugging output.
	fn to_f64(self) -> f64;
}

macro_rules! impl_pixel {
	($($ty:ty),*) => {
		$(
			impl Pixel for $ty {
				#[inline]
				fn to_f64(self) -> f64 {
					self as f64
				}
			}
		)*
	};
}

impl_pixel!(u8, u16, i16, u32, i32, f32, f64);
