//! The generic RGB encoder: packed RGB in, one field of quadrature
//! modulated composite signal out.

use crate::{
    device::Crt,
    encode::{
        Subcarrier,
        unpack,
        write_rgb_blanking,
    },
};

/// One field of RGB source plus its encoding options.
#[derive(Clone, Copy, Debug)]
pub struct RgbField<'a> {
    /// Packed `0x00RRGGBB`, row major, `w * h` entries.
    pub rgb: &'a [u32],
    pub w: i32,
    pub h: i32,
    /// Don't rescale; present the image at its natural size, clipped to the
    /// active video dimensions. Needed for images that use artifact colors.
    pub raw: bool,
    /// Full color when set; otherwise no burst is inserted and the decoder
    /// stays monochrome.
    pub as_color: bool,
    /// 0 = even, 1 = odd.
    pub field: i32,
    pub subcarrier: Subcarrier,
}

impl Crt {
    /// Encodes an RGB field into the analog buffer, scaled to fit the
    /// active video region.
    pub fn encode_rgb(&mut self, s: &RgbField) {
        assert!(s.w > 0 && s.h > 0, "source image must not be empty");
        assert!(s.rgb.len() >= (s.w * s.h) as usize);
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
            (tm.av_len, (tm.lines * 64500) >> 16)
        };

        let field = s.field & 1;
        // align to the subcarrier quadrant
        let xo = (tm.av_beg + 4 + (tm.av_len - destw) / 2) & !3;
        let yo = tm.top + 4 + (tm.lines - desth) / 2;

        write_rgb_blanking(&mut self.analog, &tm, field, s.as_color, &s.subcarrier);

        for y in 0..desth {
            let field_offset = (field * s.h + desth) / desth / 2;
            let sy_a = ((y * s.h) / desth + field_offset).min(s.h - 1);
            let sy_b = ((y * s.h + desth / 2) / desth + field_offset).min(s.h - 1);
            let row_a = sy_a * s.w;
            let row_b = sy_b * s.w;

            self.iir_y.reset();
            self.iir_i.reset();
            self.iir_q.reset();

            let ph = tm.cc_phase(y + yo);
            let white = tm.levels.white * self.white_point / 100;

            for x in 0..destw {
                let sx = (x * s.w) / destw;
                let (ra, ga, ba) = unpack(s.rgb[(row_a + sx) as usize]);
                let (rb, gb, bb) = unpack(s.rgb[(row_b + sx) as usize]);

                // RGB to YIQ, blended with the row half a scan further down
                let fy =
                    (19595 * ra + 38470 * ga + 7471 * ba + 19595 * rb + 38470 * gb + 7471 * bb)
                        >> 15;
                let fi =
                    (39059 * ra - 18022 * ga - 21103 * ba + 39059 * rb - 18022 * gb - 21103 * bb)
                        >> 15;
                let fq =
                    (13894 * ra - 34275 * ga + 20382 * ba + 13894 * rb - 34275 * gb + 20382 * bb)
                        >> 15;

                // bandlimit, then ride I and Q on the carrier in quadrature
                let fy = self.iir_y.step(fy);
                let fi =
                    self.iir_i.step(fi) * ph * s.subcarrier.cc[(x & 3) as usize] / s.subcarrier.ccs;
                let fq = self.iir_q.step(fq) * ph * s.subcarrier.cc[((x + 3) & 3) as usize]
                    / s.subcarrier.ccs;

                let ire = tm.levels.black + self.black_point + (((fy + fi + fq) * white) >> 10);
                let ire = ire.clamp(0, 110);

                // the bottom edge of the default geometry projects a couple
                // of samples past the frame; those are dropped
                let index = ((x + xo) + (y + yo) * tm.hres) as usize;
                if let Some(sample) = self.analog.get_mut(index) {
                    *sample = ire as i8;
                }
            }
        }
    }

    /// Like [`encode_rgb`](Crt::encode_rgb) but stretches the source over
    /// the entire active video portion and skips the vertical blend. Good
    /// for looking at test patterns; `raw` is ignored.
    pub fn encode_rgb_fullscreen(&mut self, s: &RgbField) {
        assert!(s.w > 0 && s.h > 0, "source image must not be empty");
        assert!(s.rgb.len() >= (s.w * s.h) as usize);
        assert!(s.subcarrier.ccs > 0);

        let tm = self.timing;
        let destw = tm.av_len;
        let desth = tm.lines;

        let field = s.field & 1;
        let xo = tm.av_beg & !3;
        let yo = tm.top;

        write_rgb_blanking(&mut self.analog, &tm, field, s.as_color, &s.subcarrier);

        for y in 0..desth {
            let field_offset = (field * s.h + desth) / desth / 2;
            let sy = ((y * s.h) / desth + field_offset).min(s.h - 1);
            let row = sy * s.w;

            self.iir_y.reset();
            self.iir_i.reset();
            self.iir_q.reset();

            let ph = tm.cc_phase(y + yo);
            let white = tm.levels.white * self.white_point / 100;

            for x in 0..destw {
                let sx = (x * s.w) / destw;
                let (r, g, b) = unpack(s.rgb[(row + sx) as usize]);

                let fy = (19595 * r + 38470 * g + 7471 * b) >> 14;
                let fi = (39059 * r - 18022 * g - 21103 * b) >> 14;
                let fq = (13894 * r - 34275 * g + 20382 * b) >> 14;

                let fy = self.iir_y.step(fy);
                let fi =
                    self.iir_i.step(fi) * ph * s.subcarrier.cc[(x & 3) as usize] / s.subcarrier.ccs;
                let fq = self.iir_q.step(fq) * ph * s.subcarrier.cc[((x + 3) & 3) as usize]
                    / s.subcarrier.ccs;

                let ire = tm.levels.black + self.black_point + (((fy + fi + fq) * white) >> 10);
                let ire = ire.clamp(0, 110);

                let index = ((x + xo) + (y + yo) * tm.hres) as usize;
                if let Some(sample) = self.analog.get_mut(index) {
                    *sample = ire as i8;
                }
            }
        }
    }
}
