//! Float functions that resolve to `std` inherent methods or to `libm`

/// `unary!(name, std_method, libm_fn)` defines `name(x)` for both targets.
macro_rules! unary {
    ($name:ident, $method:ident, $libm:ident) => {
        #[cfg(feature = "std")]
        #[inline]
        pub(crate) fn $name(x: f64) -> f64 {
            x.$method()
        }

        #[cfg(not(feature = "std"))]
        #[inline]
        pub(crate) fn $name(x: f64) -> f64 {
            libm::$libm(x)
        }
    };
}

unary!(ln, ln, log);
unary!(exp, exp, exp);
unary!(sqrt, sqrt, sqrt);
unary!(ceil, ceil, ceil);
unary!(round, round, round);

#[cfg(feature = "std")]
#[inline]
pub(crate) fn powi(x: f64, n: i32) -> f64 {
    x.powi(n)
}

#[cfg(not(feature = "std"))]
#[inline]
pub(crate) fn powi(x: f64, n: i32) -> f64 {
    libm::pow(x, n as f64)
}
