//! The band-shaping filters: a three-band equalizer used on the decoded
//! Y/I/Q signals and a one-pole low-pass used to bandlimit them before
//! modulation.
//!
//! Both are plain per-sample state machines; the device owns one instance
//! per channel and resets them at line (equalizer) or row (low-pass)
//! boundaries.

use crate::fixed::{
    EXP_ONE,
    EXP_PI,
    T14_PI,
    exp_mul,
    expx,
    sincos14,
};

const HISTLEN: usize = 3;

/// Q16 shift for the equalizer coefficients. The band gains handed to
/// [`Equalizer::new`] are calibrated against this exact value; it is not a
/// tunable.
pub const EQ_P: i32 = 16;
const EQ_R: i32 = 1 << (EQ_P - 1);

/// Three-band equalizer.
///
/// Four cascaded one-pole sections per cutoff; the mid band is the
/// difference of the two cascade outputs and the top band is the difference
/// between the 3-sample-delayed input and the high cascade.
#[derive(Clone, Debug, Default)]
pub struct Equalizer {
    lf: i32,
    hf: i32,
    g: [i32; 3],
    f_lo: [i32; 4],
    f_hi: [i32; 4],
    history: [i32; HISTLEN],
}

impl Equalizer {
    /// `f_lo`/`f_hi` are the cutoffs and `rate` the sampling rate, all in
    /// line samples; `g_lo`/`g_mid`/`g_hi` are Q16 band gains.
    pub fn new(f_lo: i32, f_hi: i32, rate: i32, g_lo: i32, g_mid: i32, g_hi: i32) -> Self {
        let coefficient = |f: i32| {
            // 2 sin(pi f / rate), widened from 15-bit to Q16
            let (sn, _) = sincos14(T14_PI * f / rate);
            2 * (sn << (EQ_P - 15))
        };

        Self {
            lf: coefficient(f_lo),
            hf: coefficient(f_hi),
            g: [g_lo, g_mid, g_hi],
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        self.f_lo = [0; 4];
        self.f_hi = [0; 4];
        self.history = [0; HISTLEN];
    }

    pub fn step(&mut self, s: i32) -> i32 {
        self.f_lo[0] += (self.lf * (s - self.f_lo[0]) + EQ_R) >> EQ_P;
        self.f_hi[0] += (self.hf * (s - self.f_hi[0]) + EQ_R) >> EQ_P;
        for i in 1..4 {
            self.f_lo[i] += (self.lf * (self.f_lo[i - 1] - self.f_lo[i]) + EQ_R) >> EQ_P;
            self.f_hi[i] += (self.hf * (self.f_hi[i - 1] - self.f_hi[i]) + EQ_R) >> EQ_P;
        }

        let bands = [
            self.f_lo[3],
            self.f_hi[3] - self.f_lo[3],
            self.history[HISTLEN - 1] - self.f_hi[3],
        ];

        for i in (1..HISTLEN).rev() {
            self.history[i] = self.history[i - 1];
        }
        self.history[0] = s;

        bands
            .iter()
            .zip(&self.g)
            .map(|(band, gain)| (band * gain) >> EQ_P)
            .sum()
    }
}

/// One-pole infinite impulse response low-pass, used for bandlimiting Y/I/Q.
#[derive(Clone, Debug, Default)]
pub struct LowPass {
    c: i32,
    h: i32,
}

impl LowPass {
    /// `freq` is the total bandwidth and `limit` the cutoff, in the same
    /// unit (the codec passes Hz-scaled line constants).
    pub fn new(freq: i32, limit: i32) -> Self {
        let rate = (freq << 9) / limit;
        Self {
            c: EXP_ONE - expx(-((EXP_PI << 9) / rate)),
            h: 0,
        }
    }

    pub fn reset(&mut self) {
        self.h = 0;
    }

    #[inline]
    pub fn step(&mut self, s: i32) -> i32 {
        self.h += exp_mul(s - self.h, self.c);
        self.h
    }
}

#[cfg(test)]
mod tests {
    use crate::filter::{
        Equalizer,
        LowPass,
    };

    #[test]
    fn equalizer_converges_to_dc_gain() {
        // unity low gain passes DC through unchanged once the cascades have
        // settled
        let mut eq = Equalizer::new(95, 190, 910, 65536, 8192, 9175);
        let mut out = 0;
        for _ in 0..2000 {
            out = eq.step(100);
        }
        assert!((out - 100).abs() <= 1, "dc response was {out}");
    }

    #[test]
    fn equalizer_reset_clears_state() {
        let mut eq = Equalizer::new(5, 73, 910, 65536, 65536, 1311);
        for _ in 0..50 {
            eq.step(90);
        }
        eq.reset();
        let mut quiet = eq.clone();
        assert_eq!(eq.step(0), quiet.step(0));
        eq.reset();
        assert_eq!(eq.step(42), {
            let mut fresh = Equalizer::new(5, 73, 910, 65536, 65536, 1311);
            fresh.step(42)
        });
    }

    #[test]
    fn low_pass_steps_toward_input() {
        let mut lp = LowPass::new(1431818, 420000);
        let mut prev = 0;
        for _ in 0..100 {
            let out = lp.step(100);
            assert!(out >= prev);
            assert!(out <= 100);
            prev = out;
        }
        assert!(prev >= 95, "settled at {prev}");
        lp.reset();
        assert_eq!(lp.step(0), 0);
    }
}
