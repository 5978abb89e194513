//! Fixed-point building blocks shared by the encoder and decoder.
//!
//! The whole signal path works on `i32`. Angles use a 14-bit turn
//! ([`T14_2PI`] counts per revolution) with 15-bit amplitudes, and the
//! exponential is Q11 ([`EXP_ONE`] is 1.0).

/// One full revolution of the 14-bit angle format.
pub const T14_2PI: i32 = 16384;
pub const T14_MASK: i32 = T14_2PI - 1;
pub const T14_PI: i32 = T14_2PI / 2;

/// Q11 shift used by [`expx`] and the low-pass coefficient derivation.
pub const EXP_P: i32 = 11;
pub const EXP_ONE: i32 = 1 << EXP_P;
pub const EXP_MASK: i32 = EXP_ONE - 1;
/// pi in Q11.
pub const EXP_PI: i32 = 6434;

/// significant points on sine wave (15-bit)
const SIGPSIN15: [i32; 18] = [
    0x0000, 0x0c88, 0x18f8, 0x2528, 0x30f8, 0x3c50, 0x4718, 0x5130, 0x5a80, 0x62f0, 0x6a68, 0x70e0,
    0x7640, 0x7a78, 0x7d88, 0x7f60, 0x8000, 0x7f60,
];

fn sintabil8(n: i32) -> i32 {
    // n is a quarter wave at most, so the table index stays below 17
    let f = n & 0xff;
    let i = ((n >> 8) & 0xff) as usize;
    let a = SIGPSIN15[i];
    let b = SIGPSIN15[i + 1];
    a + (((b - a) * f) >> 8)
}

/// 14-bit interpolated sine/cosine.
///
/// `n` is an angle where [`T14_2PI`] is one revolution; only its low 14 bits
/// matter. Returns `(sin, cos)` in `[-0x8000, 0x8000]`.
pub fn sincos14(n: i32) -> (i32, i32) {
    let n = n & T14_MASK;
    let h = n & ((T14_2PI >> 1) - 1);

    let (mut sn, mut cs) = if h > (T14_2PI >> 2) - 1 {
        (sintabil8((T14_2PI >> 1) - h), -sintabil8(h - (T14_2PI >> 2)))
    }
    else {
        (sintabil8(h), sintabil8((T14_2PI >> 2) - h))
    };
    if n > (T14_2PI >> 1) - 1 {
        cs = -cs;
        sn = -sn;
    }
    (sn, cs)
}

#[inline]
pub(crate) fn exp_mul(x: i32, y: i32) -> i32 {
    (x * y) >> EXP_P
}

#[inline]
fn exp_div(x: i32, y: i32) -> i32 {
    (x << EXP_P) / y
}

/// powers of e in Q11
const E11: [i32; 5] = [
    EXP_ONE,
    5567,   // e
    15133,  // e^2
    41135,  // e^3
    111817, // e^4
];

/// Q11 fixed-point `e^x`.
pub fn expx(n: i32) -> i32 {
    if n == 0 {
        return EXP_ONE;
    }
    let neg = n < 0;
    let mut n = n.abs();

    let mut idx = n >> EXP_P;
    let mut res = EXP_ONE;
    for _ in 0..idx / 4 {
        res = exp_mul(res, E11[4]);
    }
    idx &= 3;
    if idx > 0 {
        res = exp_mul(res, E11[idx as usize]);
    }

    // Maclaurin series over the fractional part, stopped once the terms
    // underflow
    n &= EXP_MASK;
    let mut nxt = EXP_ONE;
    let mut acc = 0;
    let mut del = 1;
    for i in 1..17 {
        acc += nxt / del;
        nxt = exp_mul(nxt, n);
        del *= i;
        if del > nxt || nxt <= 0 {
            break;
        }
    }
    res = exp_mul(res, acc);

    if neg {
        res = exp_div(EXP_ONE, res);
    }
    res
}

/// Mathematical modulus; the result is non-negative for any `x`.
#[inline]
pub fn posmod(x: i32, n: i32) -> i32 {
    x.rem_euclid(n)
}
