//! Line timing geometry.
//!
//! A scanline is partitioned into front porch, sync tip, breezeway, color
//! burst, back porch and active video. The generic NTSC system measures the
//! partition in nanoseconds of the ~63500 ns line; the NES systems measure
//! it in the 341 PPU pixels of a PPU scanline. Either way the partition is
//! projected onto the sampled line once, at device construction.

use crate::config::{
    ChromaPattern,
    Config,
    SystemKind,
};

/// Full line bandwidth reference, 14.31818 MHz in Hz/10.
pub(crate) const L_FREQ: i32 = 1431818;
/// Luma bandwidth, 4.2 MHz on the same scale.
pub(crate) const Y_FREQ: i32 = 420000;
/// Chroma I bandwidth, 1.5 MHz.
pub(crate) const I_FREQ: i32 = 150000;
/// Chroma Q bandwidth, 0.55 MHz.
pub(crate) const Q_FREQ: i32 = 55000;

/// Signal levels in IRE-like units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Levels {
    pub white: i32,
    pub burst: i32,
    pub black: i32,
    pub blank: i32,
    pub sync: i32,
}

/// Sample offsets of every pulse on a scanline, plus the frame geometry
/// they are embedded in.
#[derive(Clone, Copy, Debug)]
pub struct Timing {
    /// Samples per line.
    pub hres: i32,
    /// Lines per field.
    pub vres: i32,
    /// First and one-past-last line with active video.
    pub top: i32,
    pub bot: i32,
    /// Active video lines (`bot - top`).
    pub lines: i32,
    /// Start of the sync tip.
    pub sync_beg: i32,
    /// Start of the breezeway.
    pub bw_beg: i32,
    /// Start of the color burst.
    pub cb_beg: i32,
    /// Start of the back porch.
    pub bp_beg: i32,
    /// Start and length of active video.
    pub av_beg: i32,
    pub av_len: i32,
    /// Start of the PPU picture area (NES); `av_beg` elsewhere.
    pub ppu_av_beg: i32,
    /// End of the abbreviated NES vertical sync pulse.
    pub nes_vsync_end: i32,
    /// Burst cycles inserted in the burst window.
    pub cb_cycles: i32,
    /// Subcarrier samples per cycle.
    pub cb_freq: i32,
    pub levels: Levels,
    checkered: bool,
}

/// somewhere between 7 and 12 cycles
const CB_CYCLES: i32 = 10;

const CRT_VRES: i32 = 262;
const CRT_TOP: i32 = 21;
const CRT_BOT: i32 = 261;

// generic NTSC line partition in nanoseconds; the line is ~63500 ns
const FP_NS: i32 = 1500;
const SYNC_NS: i32 = 4700;
const BW_NS: i32 = 600;
const CB_NS: i32 = 2500;
const BP_NS: i32 = 1600;
const AV_NS: i32 = 52600;
const HB_NS: i32 = FP_NS + SYNC_NS + BW_NS + CB_NS + BP_NS;
const LINE_NS: i32 = HB_NS + AV_NS;

// NES line partition in PPU pixels; one PPU scanline is 341 pixels
const FP_PX: i32 = 9;
const SYNC_PX: i32 = 25;
const BW_PX: i32 = 4;
const CB_PX: i32 = 15;
const BP_PX: i32 = 5;
const PS_PX: i32 = 1;
const LB_PX: i32 = 15;
const AV_PX: i32 = 256;
const RB_PX: i32 = 11;
const HB_PX: i32 = FP_PX + SYNC_PX + BW_PX + CB_PX + BP_PX;
const LINE_PX: i32 = HB_PX + PS_PX + LB_PX + AV_PX + RB_PX;
/// PPU pixel at which the abbreviated vertical sync pulse ends.
const NES_VSYNC_END_PX: i32 = 327;

impl Timing {
    pub fn new(config: &Config) -> Self {
        let cc_line = config.chroma_pattern().cc_line();
        let cb_freq = config.cb_freq();
        // an integer number of subcarrier samples fits in each line
        let hres = cc_line * cb_freq / 10;
        let checkered = config.chroma_pattern() == ChromaPattern::Checkered;

        match config.system() {
            SystemKind::NtscRgb => {
                let pos = |ns: i32| ns * hres / LINE_NS;
                Self {
                    hres,
                    vres: CRT_VRES,
                    top: CRT_TOP,
                    bot: CRT_BOT,
                    lines: CRT_BOT - CRT_TOP,
                    sync_beg: pos(FP_NS),
                    bw_beg: pos(FP_NS + SYNC_NS),
                    cb_beg: pos(FP_NS + SYNC_NS + BW_NS),
                    bp_beg: pos(FP_NS + SYNC_NS + BW_NS + CB_NS),
                    av_beg: pos(HB_NS),
                    av_len: pos(AV_NS),
                    ppu_av_beg: pos(HB_NS),
                    nes_vsync_end: 0,
                    cb_cycles: CB_CYCLES,
                    cb_freq,
                    levels: Levels {
                        white: 100,
                        burst: 20,
                        black: 7,
                        blank: 0,
                        sync: -40,
                    },
                    checkered,
                }
            }
            SystemKind::Nes | SystemKind::NesHires => {
                let pos = |px: i32| px * hres / LINE_PX;
                Self {
                    hres,
                    vres: CRT_VRES,
                    top: CRT_TOP,
                    bot: CRT_BOT,
                    lines: CRT_BOT - CRT_TOP,
                    sync_beg: pos(FP_PX),
                    bw_beg: pos(FP_PX + SYNC_PX),
                    cb_beg: pos(FP_PX + SYNC_PX + BW_PX),
                    bp_beg: pos(HB_PX - BP_PX),
                    av_beg: pos(HB_PX),
                    av_len: pos(AV_PX),
                    ppu_av_beg: pos(HB_PX + PS_PX + LB_PX),
                    nes_vsync_end: pos(NES_VSYNC_END_PX),
                    cb_cycles: CB_CYCLES,
                    cb_freq,
                    // https://www.nesdev.org/wiki/NTSC_video#Terminated_measurement
                    levels: Levels {
                        white: 110,
                        burst: 30,
                        black: 0,
                        blank: 0,
                        sync: -37,
                    },
                    checkered,
                }
            }
        }
    }

    /// Samples in one field of signal.
    #[inline]
    pub fn input_size(&self) -> usize {
        (self.hres * self.vres) as usize
    }

    /// Per-line chroma carrier polarity; reverses on odd lines under the
    /// checkered pattern.
    #[inline]
    pub fn cc_phase(&self, line: i32) -> i32 {
        if self.checkered && line & 1 == 1 {
            -1
        }
        else {
            1
        }
    }

    /// Converts a PPU pixel count to line samples.
    #[inline]
    pub(crate) fn ppu_px(&self, px: i32) -> i32 {
        px * self.hres / LINE_PX
    }

    /// A kilohertz figure expressed in line samples, for the equalizer
    /// cutoffs.
    #[inline]
    pub(crate) fn khz_to_line(&self, khz: i32) -> i32 {
        self.hres * (khz * 100) / L_FREQ
    }
}
