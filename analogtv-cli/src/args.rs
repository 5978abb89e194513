use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
#[clap(about = "Run a still image through the NTSC composite codec")]
pub struct Args {
    /// Output image width.
    #[clap(long, default_value = "832")]
    pub width: usize,

    /// Output image height.
    #[clap(long, default_value = "624")]
    pub height: usize,

    /// Noise amplitude added to the composite signal.
    #[clap(short, long, default_value = "24")]
    pub noise: i32,

    /// Color carrier phase offset in quarter cycles; +1 shifts the chroma
    /// phase by 90 degrees.
    #[clap(short, long, default_value = "0")]
    pub phase_offset: i32,

    /// Encode without color (no burst, luma only).
    #[clap(short, long)]
    pub monochrome: bool,

    /// Start on the odd field. Only meaningful together with --progressive.
    #[clap(short, long)]
    pub field: bool,

    /// Progressive scan instead of interlaced.
    #[clap(long)]
    pub progressive: bool,

    /// Don't rescale the source to the active video region. Needed for
    /// images that use artifact colors.
    #[clap(short, long)]
    pub raw: bool,

    /// Frames to accumulate on the simulated phosphor before saving.
    #[clap(long, default_value = "4")]
    pub frames: u32,

    /// Source image.
    pub input: PathBuf,

    /// Destination image.
    pub output: PathBuf,
}
