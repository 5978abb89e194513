//! Composite waveform synthesis.
//!
//! Two encoder families share the device's analog buffer contract: the
//! generic RGB encoder (conversion through YIQ and quadrature modulation)
//! and the NES encoder (direct three-level square-wave model of the PPU
//! output). Both leave a full field of signal in the device for
//! [`decode`](crate::Crt::decode) to chew on.

mod nes;
mod rgb;

pub use nes::NesField;
pub use rgb::RgbField;

use crate::timing::{
    Levels,
    Timing,
};

/// Four samples of the color carrier plus their scale.
///
/// The carrier template encodes the encoder's choice of subcarrier phase
/// without any trigonometry: `{0, 1, 0, -1}` is the reference phase and
/// rotating the template by one slot is a 90 degree shift.
#[derive(Clone, Copy, Debug)]
pub struct Subcarrier {
    pub cc: [i32; 4],
    /// Scale of the `cc` values; `{0, 16, 0, -16}` needs `ccs = 16`. Keep
    /// it at 16 or below.
    pub ccs: i32,
}

impl Subcarrier {
    /// The reference carrier rotated by `offset` quarter cycles.
    pub fn with_phase(offset: i32) -> Self {
        const PHASE_REF: [i32; 4] = [0, 1, 0, -1];

        let offset = offset & 3;
        let mut cc = [0; 4];
        for (i, slot) in cc.iter_mut().enumerate() {
            *slot = PHASE_REF[(offset as usize + i) & 3];
        }
        Self { cc, ccs: 1 }
    }
}

impl Default for Subcarrier {
    #[inline]
    fn default() -> Self {
        Self::with_phase(0)
    }
}

#[inline]
pub(crate) fn unpack(p: u32) -> (i32, i32, i32) {
    (
        ((p >> 16) & 0xff) as i32,
        ((p >> 8) & 0xff) as i32,
        (p & 0xff) as i32,
    )
}

pub(crate) fn fill(line: &mut [i8], from: i32, to: i32, level: i32) {
    line[from as usize..to as usize].fill(level as i8);
}

/// Sync/blank/sync/blank segments at percentages of the line.
fn write_pulse_line(line: &mut [i8], hres: i32, levels: &Levels, offs: [i32; 4]) {
    let mut t = 0;
    for (k, off) in offs.iter().enumerate() {
        let stop = off * hres / 100;
        let level = if k & 1 == 0 { levels.sync } else { levels.blank };
        fill(line, t, stop, level);
        t = stop;
    }
}

/// Writes the blanking intervals of all 262 lines of a generic NTSC field:
/// equalizing pulses, the vertical sync serration, and per-line front
/// porch / sync tip / breezeway / burst / back porch.
pub(crate) fn write_rgb_blanking(
    analog: &mut [i8],
    tm: &Timing,
    field: i32,
    as_color: bool,
    sc: &Subcarrier,
) {
    let hres = tm.hres as usize;
    for n in 0..tm.vres {
        let line = &mut analog[n as usize * hres..(n as usize + 1) * hres];

        if n <= 3 || (7..=9).contains(&n) {
            // equalizing pulses: small blips of sync, mostly blank
            write_pulse_line(line, tm.hres, &tm.levels, [4, 50, 54, 100]);
        }
        else if (4..=6).contains(&n) {
            // vertical sync pulse: small blips of blank, mostly sync
            let offs = if field == 1 {
                [4, 50, 96, 100]
            }
            else {
                [46, 50, 96, 100]
            };
            write_pulse_line(line, tm.hres, &tm.levels, offs);
        }
        else {
            fill(line, 0, tm.sync_beg, tm.levels.blank);
            fill(line, tm.sync_beg, tm.bw_beg, tm.levels.sync);
            fill(line, tm.bw_beg, tm.av_beg, tm.levels.blank);
            if n < tm.top {
                fill(line, tm.av_beg, tm.hres, tm.levels.blank);
            }
            if as_color {
                // CB_CYCLES of color burst at 3.579545 MHz
                for t in tm.cb_beg..tm.cb_beg + tm.cb_cycles * tm.cb_freq {
                    let cb = sc.cc[(t & 3) as usize];
                    line[t as usize] = (tm.levels.blank + cb * tm.levels.burst / sc.ccs) as i8;
                }
            }
        }
    }
}
