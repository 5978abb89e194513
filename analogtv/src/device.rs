//! The device: one simulated CRT with its signal buffers, sync estimates,
//! filter bank and viewer adjustments.

use crate::{
    config::Config,
    decode::Yiq,
    filter::{
        Equalizer,
        LowPass,
    },
    fixed::posmod,
    noise::Noise,
    timing::{
        I_FREQ,
        L_FREQ,
        Q_FREQ,
        Y_FREQ,
        Timing,
    },
};

/// An NTSC encode/decode device.
///
/// The device is long-lived: the composite frame buffer, the sync estimates
/// and the recovered burst reference all carry across frames, which is what
/// gives the picture its inertia under noise. Per frame, encode with one of
/// the [`encode_rgb`](Crt::encode_rgb) / [`encode_nes`](Crt::encode_nes)
/// family and then [`decode`](Crt::decode) into the output raster.
pub struct Crt {
    pub(crate) config: Config,
    pub(crate) timing: Timing,

    /// One field of composite signal, written by the encoder. Not zeroed
    /// between frames; an encoder overwrites every sample it cares about or
    /// accepts ghosting.
    pub(crate) analog: Vec<i8>,
    /// The decoder's noisy copy of `analog`.
    pub(crate) inp: Vec<i8>,

    /// Sample offsets of the last locked-in syncs.
    pub(crate) hsync: i32,
    pub(crate) vsync: i32,
    /// Last four color burst samples, handed from the NES encoder to the
    /// decoder's burst PLL.
    pub(crate) ccf: [i32; 4],
    pub(crate) noise_gen: Noise,

    // viewer adjustments
    pub(crate) hue: i32,
    pub(crate) brightness: i32,
    pub(crate) contrast: i32,
    pub(crate) saturation: i32,
    pub(crate) black_point: i32,
    pub(crate) white_point: i32,
    pub(crate) noise: i32,

    pub(crate) eq_y: Equalizer,
    pub(crate) eq_i: Equalizer,
    pub(crate) eq_q: Equalizer,
    pub(crate) iir_y: LowPass,
    pub(crate) iir_i: LowPass,
    pub(crate) iir_q: LowPass,

    /// Demodulated scanline scratch, `av_len + 1` entries.
    pub(crate) yiq: Vec<Yiq>,

    pub(crate) outw: usize,
    pub(crate) outh: usize,
    /// Output raster, packed `0x00RRGGBB`.
    pub(crate) out: Vec<u32>,
}

impl Crt {
    /// Creates a device decoding into a `w` x `h` raster.
    pub fn new(config: Config, w: usize, h: usize) -> Self {
        assert!(w > 0 && h > 0, "output raster must not be empty");

        let timing = Timing::new(&config);
        let input_size = timing.input_size();

        // the band gains are Q16 and calibrated against these exact cutoffs
        let eq_y = Equalizer::new(
            timing.khz_to_line(1500),
            timing.khz_to_line(3000),
            timing.hres,
            65536,
            8192,
            9175,
        );
        let eq_i = Equalizer::new(
            timing.khz_to_line(80),
            timing.khz_to_line(1150),
            timing.hres,
            65536,
            65536,
            1311,
        );
        let eq_q = Equalizer::new(
            timing.khz_to_line(80),
            timing.khz_to_line(1000),
            timing.hres,
            65536,
            65536,
            0,
        );

        let mut crt = Self {
            config,
            timing,
            analog: vec![0; input_size],
            inp: vec![0; input_size],
            hsync: 0,
            vsync: 0,
            ccf: [0; 4],
            noise_gen: Noise::default(),
            hue: 0,
            brightness: 0,
            contrast: 0,
            saturation: 0,
            black_point: 0,
            white_point: 0,
            noise: 0,
            eq_y,
            eq_i,
            eq_q,
            iir_y: LowPass::new(L_FREQ, Y_FREQ),
            iir_i: LowPass::new(L_FREQ, I_FREQ),
            iir_q: LowPass::new(L_FREQ, Q_FREQ),
            yiq: vec![Yiq::default(); timing.av_len as usize + 1],
            outw: 0,
            outh: 0,
            out: Vec::new(),
        };
        crt.resize(w, h);
        crt.reset();
        crt
    }

    /// Restores the viewer adjustments and sync estimates to their
    /// defaults. Signal buffers are left alone.
    pub fn reset(&mut self) {
        self.hue = 0;
        self.saturation = 18;
        self.brightness = 0;
        self.contrast = 179;
        self.black_point = 0;
        self.white_point = 100;
        self.noise = 0;
        self.hsync = 0;
        self.vsync = 0;
    }

    /// Rebinds the output raster. Everything else, signal state included,
    /// is untouched.
    pub fn resize(&mut self, w: usize, h: usize) {
        assert!(w > 0 && h > 0, "output raster must not be empty");
        self.outw = w;
        self.outh = h;
        self.out = vec![0; w * h];
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The output raster, `out_height` rows of `out_width` packed
    /// `0x00RRGGBB` pixels.
    #[inline]
    pub fn output(&self) -> &[u32] {
        &self.out
    }

    #[inline]
    pub fn output_mut(&mut self) -> &mut [u32] {
        &mut self.out
    }

    #[inline]
    pub fn out_width(&self) -> usize {
        self.outw
    }

    #[inline]
    pub fn out_height(&self) -> usize {
        self.outh
    }

    /// The composite signal of the last encoded field.
    #[inline]
    pub fn analog(&self) -> &[i8] {
        &self.analog
    }

    #[inline]
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Line the last vertical sync locked on.
    #[inline]
    pub fn vsync(&self) -> i32 {
        self.vsync
    }

    /// Sample offset the last horizontal sync locked on.
    #[inline]
    pub fn hsync(&self) -> i32 {
        self.hsync
    }

    /// Hue adjustment in degrees, wrapped to `0..360`.
    pub fn set_hue(&mut self, hue: i32) {
        self.hue = posmod(hue, 360);
    }

    pub fn set_brightness(&mut self, brightness: i32) {
        self.brightness = brightness;
    }

    pub fn set_contrast(&mut self, contrast: i32) {
        self.contrast = contrast.clamp(0, 255);
    }

    /// Saturation scales the demodulated carrier amplitude. Kept within a
    /// range the fixed-point demodulator cannot overflow at.
    pub fn set_saturation(&mut self, saturation: i32) {
        self.saturation = saturation.clamp(0, 64);
    }

    pub fn set_black_point(&mut self, black_point: i32) {
        self.black_point = black_point;
    }

    /// White point in percent; 100 is the calibrated white level.
    pub fn set_white_point(&mut self, white_point: i32) {
        self.white_point = white_point.clamp(0, 115);
    }

    #[inline]
    pub fn hue(&self) -> i32 {
        self.hue
    }

    #[inline]
    pub fn brightness(&self) -> i32 {
        self.brightness
    }

    #[inline]
    pub fn contrast(&self) -> i32 {
        self.contrast
    }

    #[inline]
    pub fn saturation(&self) -> i32 {
        self.saturation
    }

    #[inline]
    pub fn black_point(&self) -> i32 {
        self.black_point
    }

    #[inline]
    pub fn white_point(&self) -> i32 {
        self.white_point
    }

    /// Reads a decoder input sample, wrapping at the end of the frame the
    /// way the sync windows expect.
    #[inline]
    pub(crate) fn inp_at(&self, index: i32) -> i32 {
        i32::from(self.inp[index as usize % self.inp.len()])
    }
}
