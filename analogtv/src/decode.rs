//! The decoder: noisy composite signal in, RGB raster out.
//!
//! Sync recovery works by integrating the signal and watching for the
//! running sum to cross a threshold; sync tips are the only thing negative
//! enough for long enough, which makes the search naturally noise
//! tolerant. Chroma comes back through a leaky-integrator phase lock on
//! the color burst followed by quadrature differences, so hue errors in
//! the signal show up as hue errors on screen, exactly like the hardware.

use crate::{
    config::SystemKind,
    device::Crt,
    fixed::{
        posmod,
        sincos14,
    },
};

/// One demodulated sample on the scanline scratch.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Yiq {
    pub y: i32,
    pub i: i32,
    pub q: i32,
}

/// search windows, in samples
const NTSC_SYNC_WINDOW: i32 = 8;
const NES_SYNC_WINDOW: i32 = 6;

impl Crt {
    /// Decodes the field most recently written to the analog buffer into
    /// the output raster, adding `noise` worth of signal noise on the way.
    ///
    /// Never fails: when a sync search comes up empty the previous
    /// estimate is kept, which is what holds the picture together through
    /// noise bursts.
    pub fn decode(&mut self, noise: i32) {
        self.noise = noise.max(0);

        let tm = self.timing;
        let system = self.config.system();

        let (hsync_window, vsync_window) = match system {
            SystemKind::NtscRgb => (NTSC_SYNC_WINDOW, NTSC_SYNC_WINDOW),
            SystemKind::Nes | SystemKind::NesHires => (NES_SYNC_WINDOW, NES_SYNC_WINDOW),
        };
        // the vsync pulse is much longer than hsync, so it integrates much
        // further before crossing; hi-res lines hold more samples still
        let vsync_threshold = match system {
            SystemKind::NesHires => 150 * tm.levels.sync,
            _ => 100 * tm.levels.sync,
        };
        let (scan_beg, xnudge, ynudge) = match system {
            SystemKind::NtscRgb => (tm.av_beg, 0, 0),
            SystemKind::Nes | SystemKind::NesHires => (tm.ppu_av_beg, -3, 3),
        };
        let (hsync_fallback, vsync_fallback) = match system {
            SystemKind::NtscRgb => (0, 0),
            SystemKind::Nes | SystemKind::NesHires => (3, -3),
        };

        let bright = self.brightness - (tm.levels.black + self.black_point);

        let (huesn, huecs) = {
            let (sn, cs) = sincos14((posmod(self.hue, 360) + 90) * 8192 / 180);
            (sn >> 11, cs >> 11)
        };

        let mut ccref = match system {
            SystemKind::NtscRgb => [0; 4],
            // seeded from the burst quartet the NES encoder saved; the
            // decoder cannot recover the carrier phase on its own there
            SystemKind::Nes | SystemKind::NesHires => [
                self.ccf[0] << 7,
                self.ccf[1] << 7,
                self.ccf[2] << 7,
                self.ccf[3] << 7,
            ],
        };

        // signal + noise
        for i in 0..tm.input_size() {
            let r = self.noise_gen.step();
            let sample = i32::from(self.analog[i]) + (((r - 0x7f) * self.noise) >> 8);
            self.inp[i] = sample.clamp(-127, 127) as i8;
        }

        let (vsync_line, crossing) = self.find_vsync(vsync_window, vsync_threshold);
        self.vsync = if self.config.vsync_search() {
            vsync_line
        }
        else {
            vsync_fallback
        };
        // a crossing in the second half of the line means an odd field
        let field = i32::from(crossing > tm.hres / 2);
        tracing::debug!(vsync = self.vsync, field, "vertical sync");

        // approximate maximum beam energy over a scan line
        let max_e = (128 + self.noise / 2) * tm.av_len;
        let mut prev_e = 16384 / 8;

        let outw = self.outw as i32;
        let outh = self.outh as i32;
        // ratio of output height to active video lines in the signal
        let ratio = (((outh << 16) / tm.lines) + 32768) >> 16;
        let field = field * (ratio / 2);

        let mut yiq = std::mem::take(&mut self.yiq);
        let mut out = std::mem::take(&mut self.out);

        for line in tm.top..tm.bot {
            let beg = (line - tm.top) * outh / tm.lines + field;
            let end = ((line - tm.top + 1) * outh / tm.lines + field).min(outh);
            if beg >= outh {
                continue;
            }

            let ln = posmod(line + self.vsync, tm.vres) * tm.hres;

            let offset = self.find_hsync(ln, hsync_window);
            self.hsync = if self.config.hsync_search() {
                posmod(offset + self.hsync, tm.hres)
            }
            else {
                hsync_fallback
            };
            tracing::trace!(line, hsync = self.hsync, "horizontal sync");

            // burst phase lock: a leaky integrator per subcarrier quadrant
            // sample, tolerant of noise in any one line
            let burst_base = ln + (self.hsync & !3);
            for i in tm.cb_beg..tm.cb_beg + tm.cb_cycles * tm.cb_freq {
                let held = ccref[(i & 3) as usize] * 127 / 128;
                ccref[(i & 3) as usize] = held + self.inp_at(burst_base + i);
            }

            let xpos = posmod(scan_beg + self.hsync + xnudge, tm.hres);
            let ypos = posmod(line + self.vsync + ynudge, tm.vres);
            let pos = xpos + ypos * tm.hres;
            let phasealign = (pos & 3) as usize;

            // carrier amplitude carries saturation, phase difference hue
            let dci = ccref[(phasealign + 1) & 3] - ccref[(phasealign + 3) & 3];
            let dcq = ccref[(phasealign + 2) & 3] - ccref[phasealign & 3];

            // rotate by the hue adjustment angle
            let wave = {
                let w0 = ((dci * huecs - dcq * huesn) >> 4) * self.saturation;
                let w1 = ((dcq * huecs + dci * huesn) >> 4) * self.saturation;
                [w0, w1, -w0, -w1]
            };

            let (scan_l, scan_r, dx, eq_lo, eq_hi) = if self.config.bloom() {
                let mut e = 0;
                for i in 0..tm.av_len {
                    e += self.inp_at(pos + i);
                }
                // beam energy feedback: a bright line starves the beam and
                // narrows, a dark one widens
                prev_e = prev_e * 123 / 128 + (((max_e >> 1) - e) << 10) / max_e;
                let line_w = tm.av_len * 112 / 128 + (prev_e >> 9);

                let scan_l = (tm.av_len / 2 - (line_w >> 1) + 8) << 12;
                let scan_r = (tm.av_len - 1) << 12;
                let dx = (line_w << 12) / outw;
                (scan_l, scan_r, dx, scan_l >> 12, tm.av_len - 1)
            }
            else {
                let scan_r = (tm.av_len - 1) << 12;
                (0, scan_r, scan_r / outw, 0, tm.av_len)
            };

            // a contracted beam can push the scan start off the left edge;
            // the line is not redrawn, whatever the raster held there stays
            if scan_l < 0 {
                continue;
            }

            self.eq_y.reset();
            self.eq_i.reset();
            self.eq_q.reset();

            for i in eq_lo..eq_hi {
                let sig = self.inp_at(pos + i);
                yiq[i as usize] = Yiq {
                    y: self.eq_y.step(sig + bright) << 4,
                    i: self.eq_i.step((sig * wave[(i & 3) as usize]) >> 9) >> 3,
                    q: self.eq_q.step((sig * wave[((i + 3) & 3) as usize]) >> 9) >> 3,
                };
            }

            let row = &mut out[(beg * outw) as usize..((beg + 1) * outw) as usize];
            let mut col = 0;
            let mut spos = scan_l;
            while spos < scan_r && col < row.len() {
                let rf = spos & 0xfff;
                let lf = 0xfff - rf;
                let at = (spos >> 12) as usize;
                let near = yiq[at];
                let far = yiq[at + 1];

                // interpolate between samples if needed
                let y = ((near.y * lf) >> 2) + ((far.y * rf) >> 2);
                let i = ((near.i * lf) >> 14) + ((far.i * rf) >> 14);
                let q = ((near.q * lf) >> 14) + ((far.q * rf) >> 14);

                let r = (((y + 3879 * i + 2556 * q) >> 12) * self.contrast) >> 8;
                let g = (((y - 1126 * i - 2605 * q) >> 12) * self.contrast) >> 8;
                let b = (((y - 4530 * i + 7021 * q) >> 12) * self.contrast) >> 8;

                let rgb = ((r.clamp(0, 255) as u32) << 16)
                    | ((g.clamp(0, 255) as u32) << 8)
                    | b.clamp(0, 255) as u32;
                // blend with what the phosphor still shows there
                let faded = row[col];
                row[col] = ((rgb & 0x00fe_feff) >> 1) + ((faded & 0x00fe_feff) >> 1);

                col += 1;
                spos += dx;
            }

            // duplicate the scanline over the extra rows it covers
            for extra in beg + 1..end {
                let src = ((extra - 1) * outw) as usize;
                let dst = (extra * outw) as usize;
                out.copy_within(src..src + outw as usize, dst);
            }
        }

        self.yiq = yiq;
        self.out = out;
    }

    /// Integrates candidate lines around the previous vertical sync until
    /// one crosses the threshold. Returns the line and the sample at which
    /// it crossed; on a miss, the last candidate and the line length.
    fn find_vsync(&self, window: i32, threshold: i32) -> (i32, i32) {
        let tm = &self.timing;
        let mut line = 0;
        for i in -window..window {
            line = posmod(self.vsync + i, tm.vres);
            let base = line * tm.hres;
            let mut sum = 0;
            for j in 0..tm.hres {
                sum += self.inp_at(base + j);
                if sum <= threshold {
                    return (line, j);
                }
            }
        }
        (line, tm.hres)
    }

    /// Integrates a short window around the previous horizontal sync.
    /// Returns the signed offset of the crossing, or the window size on a
    /// miss.
    fn find_hsync(&self, ln: i32, window: i32) -> i32 {
        let tm = &self.timing;
        let base = ln + self.hsync + tm.sync_beg;
        let mut sum = 0;
        let mut i = -window;
        while i < window {
            sum += self.inp_at(base + i);
            if sum <= 4 * tm.levels.sync {
                break;
            }
            i += 1;
        }
        i
    }
}
