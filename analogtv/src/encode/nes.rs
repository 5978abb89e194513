//! The NES encoder.
//!
//! The PPU never produces RGB; each pixel selects a two-level square wave
//! whose polarity against the subcarrier encodes the hue and whose levels
//! encode the brightness, with three emphasis bits that attenuate the
//! signal on four of the twelve subcarrier phases. The encoder samples that
//! waveform directly instead of round-tripping through YIQ.
//!
//! <https://www.nesdev.org/wiki/NTSC_video>

use crate::{
    config::SystemKind,
    device::Crt,
    encode::{
        Subcarrier,
        fill,
    },
    fixed::posmod,
};

/// One field of NES PPU pixels plus its encoding options.
#[derive(Clone, Copy, Debug)]
pub struct NesField<'a> {
    /// 9-bit PPU pixels: 6-bit color index plus 3 emphasis bits, row major,
    /// `w * h` entries.
    pub data: &'a [u16],
    pub w: i32,
    pub h: i32,
    /// Don't rescale; clip to the active video dimensions instead.
    pub raw: bool,
    /// Phase of the three-field dot crawl cycle, 0..=2.
    pub dot_crawl_offset: i32,
    /// The PPU skipped one dot this frame (odd rendered frames).
    pub dot_skipped: bool,
    /// Pixel shown outside the 256-pixel picture area.
    pub border: u16,
    pub subcarrier: Subcarrier,
}

/// Emphasis bit masks active at each of the six subcarrier phase pairs;
/// red is 0x040, green 0x080, blue 0x100.
const ACTIVE: [i32; 6] = [0x0c0, 0x040, 0x140, 0x100, 0x180, 0x080];

/// Low and high waveform levels for each of the 64 base colors, normal and
/// attenuated, in IRE.
///
/// <https://www.nesdev.org/wiki/NTSC_video#Brightness_Levels>
#[rustfmt::skip]
const IRE_LEVELS: [[[i32; 0x40]; 2]; 2] = [
    // waveform low
    [
        // normal
        [
            43, -12, -12, -12, -12, -12, -12, -12, -12, -12, -12, -12, -12, -12, 0, 0,
            74, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            110, 34, 34, 34, 34, 34, 34, 34, 34, 34, 34, 34, 34, 34, 0, 0,
            110, 80, 80, 80, 80, 80, 80, 80, 80, 80, 80, 80, 80, 80, 0, 0,
        ],
        // attenuated
        [
            26, -17, -17, -17, -17, -17, -17, -17, -17, -17, -17, -17, -17, -17, 0, 0,
            51, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, 0, 0,
            82, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 0, 0,
            82, 56, 56, 56, 56, 56, 56, 56, 56, 56, 56, 56, 56, 56, 0, 0,
        ],
    ],
    // waveform high
    [
        // normal
        [
            43, 43, 43, 43, 43, 43, 43, 43, 43, 43, 43, 43, 43, -12, 0, 0,
            74, 74, 74, 74, 74, 74, 74, 74, 74, 74, 74, 74, 74, 0, 0, 0,
            110, 110, 110, 110, 110, 110, 110, 110, 110, 110, 110, 110, 110, 34, 0, 0,
            110, 110, 110, 110, 110, 110, 110, 110, 110, 110, 110, 110, 110, 80, 0, 0,
        ],
        // attenuated
        [
            26, 26, 26, 26, 26, 26, 26, 26, 26, 26, 26, 26, 26, -17, 0, 0,
            51, 51, 51, 51, 51, 51, 51, 51, 51, 51, 51, 51, 51, -8, 0, 0,
            82, 82, 82, 82, 82, 82, 82, 82, 82, 82, 82, 82, 82, 19, 0, 0,
            82, 82, 82, 82, 82, 82, 82, 82, 82, 82, 82, 82, 82, 56, 0, 0,
        ],
    ],
];

/// One sample of the square wave for a 9-bit pixel at the given subcarrier
/// phase (twelfths of a cycle).
fn square_sample(p: i32, phase: i32) -> i32 {
    let index = p & 0x3f;
    let hue = index & 0x0f;

    // the last two palette columns are black
    if hue >= 0x0e {
        return 0;
    }

    let level = match hue {
        0x00 => 1,
        0x0d => 0,
        _ => usize::from((hue + phase) % 12 < 6),
    };
    let emphasis = usize::from(((p & 0x1c0) & ACTIVE[((phase >> 1) % 6) as usize]) != 0);

    IRE_LEVELS[level][emphasis][index as usize]
}

impl Crt {
    /// Encodes NES pixel data (generally 256x240) into the analog buffer.
    /// Always progressive.
    pub fn encode_nes(&mut self, s: &NesField) {
        assert!(s.w > 0 && s.h > 0, "source image must not be empty");
        assert!(s.data.len() >= (s.w * s.h) as usize);
        assert!(s.subcarrier.ccs > 0);

        let tm = self.timing;

        let (destw, desth) = if self.config.bloom() {
            let destw = (tm.av_len * 55500) >> 16;
            let desth = (tm.lines * 63500) >> 16;
            if s.raw {
                (s.w.min(destw), s.h.min(desth))
            }
            else {
                (destw, desth)
            }
        }
        else if s.raw {
            (s.w.min(tm.av_len), s.h.min((tm.lines * 64500) >> 16))
        }
        else {
            (tm.av_len, tm.lines)
        };

        // align to the subcarrier quadrant
        let xo = tm.ppu_av_beg & !3;
        let yo = tm.top;

        // line and burst phase offsets for the three-field dot crawl cycle
        let (lo, po) = match self.config.system() {
            SystemKind::NesHires => match posmod(s.dot_crawl_offset, 3) {
                0 => (1, 3),
                1 => (3, 1),
                _ => (2, 0),
            },
            _ => {
                let o = posmod(s.dot_crawl_offset, 3);
                (if o == 1 { 3 } else { o }, o)
            }
        };

        let mut phase = (1 + po) * 3;

        for n in 0..tm.vres {
            let base = (n * tm.hres) as usize;
            let line = &mut self.analog[base..base + tm.hres as usize];

            if n >= 259 {
                // abbreviated vertical sync pulse
                fill(line, 0, tm.sync_beg, tm.levels.blank);
                fill(line, tm.sync_beg, tm.nes_vsync_end, tm.levels.sync);
                fill(line, tm.nes_vsync_end, tm.hres, tm.levels.blank);
                continue;
            }

            fill(line, 0, tm.sync_beg, tm.levels.blank);
            fill(line, tm.sync_beg, tm.bw_beg, tm.levels.sync);
            fill(line, tm.bw_beg, tm.cb_beg, tm.levels.blank);

            // burst, one PPU pixel short on line 14 when the dot was skipped
            let skip = if n == 14 && s.dot_skipped {
                tm.ppu_px(1)
            }
            else {
                0
            };
            let mut t = tm.cb_beg;
            while t < tm.cb_beg + tm.cb_cycles * tm.cb_freq - skip {
                let cb = s.subcarrier.cc[((t + po) & 3) as usize];
                let sample = tm.levels.blank + cb * tm.levels.burst / s.subcarrier.ccs;
                line[t as usize] = sample as i8;
                // hand the burst to the decoder's phase-locked loop
                self.ccf[(t & 3) as usize] = sample;
                t += 1;
            }
            fill(line, t, tm.av_beg, tm.levels.blank);
            phase += tm.av_beg * 3;

            if (tm.top..=tm.bot + 2).contains(&n) {
                // border color fills the line out to the right edge; the
                // column right after the back porch reads as color 0x30
                let mut t = tm.av_beg;
                while t < tm.hres {
                    let p = if t == tm.av_beg {
                        0xf0
                    }
                    else {
                        i32::from(s.border)
                    };
                    let mut ire = tm.levels.black;
                    ire += square_sample(p, phase);
                    ire += square_sample(p, phase + 1);
                    ire += square_sample(p, phase + 2);
                    ire += square_sample(p, phase + 3);
                    ire >>= 2;
                    line[t as usize] = ire as i8;
                    phase += 3;
                    t += 1;
                }
            }
            else {
                fill(line, tm.av_beg, tm.hres, tm.levels.blank);
                phase += (tm.hres - tm.av_beg) * 3;
            }
            // reduce at the line boundary so a long line can't overflow it
            phase = posmod(phase, 12);
        }

        let mut phase = 3;

        for y in lo - 3..desth {
            let sy = ((y * s.h) / desth).clamp(0, s.h - 1);
            let row = sy * s.w;
            phase += xo * 3;
            for x in 0..destw {
                let p = i32::from(s.data[((x * s.w) / destw + row) as usize]);
                let mut ire = tm.levels.blank;
                ire += square_sample(p, phase);
                ire += square_sample(p, phase + 1);
                ire += square_sample(p, phase + 2);
                ire += square_sample(p, phase + 3);
                ire = (ire * self.white_point / 100) >> 2;
                let index = ((x + xo) + (y + yo) * tm.hres) as usize;
                self.analog[index] = ire.clamp(-128, 127) as i8;
                phase += 3;
            }
            phase = posmod(phase + (tm.hres - destw) * 3, 12);
        }
    }
}
