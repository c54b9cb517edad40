use anyhow::{bail, Context};
use radiokit::{init_logging, load_config, measurement_report, open_canvas, render_frame};
use radiokit::AnnotationDocument;
use std::path::PathBuf;

const USAGE: &str = "usage: radiokit <image> [annotations.json] [output.png]";

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        println!("{}", USAGE);
        return Ok(());
    }
    if args.iter().any(|arg| arg == "-V" || arg == "--version") {
        println!("radiokit {} ({})", radiokit::VERSION, radiokit::BUILD_DATE);
        return Ok(());
    }
    let (image, document, output) = match args.as_slice() {
        [image] => (PathBuf::from(image), None, None),
        [image, document] => (PathBuf::from(image), Some(PathBuf::from(document)), None),
        [image, document, output] => (
            PathBuf::from(image),
            Some(PathBuf::from(document)),
            Some(PathBuf::from(output)),
        ),
        _ => bail!(USAGE),
    };

    let config = load_config();
    let document = document
        .map(AnnotationDocument::load_from_file)
        .transpose()?;
    let canvas = open_canvas(&config, &image, document)?;

    for line in measurement_report(&canvas) {
        println!("{}", line);
    }

    let output = output.unwrap_or_else(|| image.with_extension("annotated.png"));
    render_frame(&canvas)?
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Wrote {}", output.display());

    Ok(())
}
