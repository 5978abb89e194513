mod args;

use analogtv::{
    Config,
    Crt,
    RgbField,
    Subcarrier,
};
use clap::Parser;
use color_eyre::eyre::{
    Error,
    bail,
};
use image::RgbImage;
use tracing_subscriber::EnvFilter;

use crate::args::Args;

fn main() -> Result<(), Error> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!(?args);

    if args.width == 0 || args.height == 0 {
        bail!("output dimensions must be nonzero");
    }
    if args.frames == 0 {
        bail!("at least one frame must be accumulated");
    }

    let source = image::open(&args.input)?.to_rgb8();
    let (w, h) = source.dimensions();
    tracing::info!(width = w, height = h, "loaded source image");

    let rgb: Vec<u32> = source
        .pixels()
        .map(|p| u32::from(p.0[0]) << 16 | u32::from(p.0[1]) << 8 | u32::from(p.0[2]))
        .collect();

    let mut crt = Crt::new(Config::ntsc(), args.width, args.height);

    let mut settings = RgbField {
        rgb: &rgb,
        w: w as i32,
        h: h as i32,
        raw: args.raw,
        as_color: !args.monochrome,
        field: i32::from(args.field),
        subcarrier: Subcarrier::with_phase(args.phase_offset),
    };

    for _ in 0..args.frames {
        crt.encode_rgb(&settings);
        crt.decode(args.noise);
        if !args.progressive {
            settings.field ^= 1;
            crt.encode_rgb(&settings);
            crt.decode(args.noise);
        }
    }

    let mut output = RgbImage::new(args.width as u32, args.height as u32);
    for (pixel, &packed) in output.pixels_mut().zip(crt.output()) {
        pixel.0 = [
            ((packed >> 16) & 0xff) as u8,
            ((packed >> 8) & 0xff) as u8,
            (packed & 0xff) as u8,
        ];
    }
    output.save(&args.output)?;
    tracing::info!(output = %args.output.display(), "wrote frame");

    Ok(())
}
