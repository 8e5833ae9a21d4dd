use std::fs;

use sandwich::{
    FontResource, FontSizing, JobOptions, PlacementOptions, PopplerRasterizer, TesseractOcr,
    run_job,
};

use crate::cli::Cli;

/// Run a conversion described by the parsed command line.
///
/// Returns `Err(exit_code)` with a message already printed; the process
/// never unwinds out of here with a panic for user-facing failures.
pub fn run(cli: &Cli) -> Result<(), i32> {
    if cli.min_font_size <= 0.0 || cli.max_font_size < cli.min_font_size {
        eprintln!(
            "Error: invalid font size range [{}, {}]",
            cli.min_font_size, cli.max_font_size
        );
        return Err(2);
    }

    let font = match &cli.font {
        Some(path) => {
            let data = fs::read(path).map_err(|e| {
                eprintln!("Error: failed to read font {}: {e}", path.display());
                1
            })?;
            FontResource::embedded(data).map_err(|e| {
                eprintln!("Error: {e}");
                1
            })?
        }
        None => FontResource::builtin(),
    };

    let options = JobOptions {
        placement: PlacementOptions {
            sizing: FontSizing {
                min: cli.min_font_size,
                max: cli.max_font_size,
            },
            min_confidence: cli.min_confidence,
        },
        pages: cli.pages.clone(),
        skip_empty_pages: cli.skip_empty_pages,
        keep_artifacts: cli.keep_artifacts,
        workdir: cli.workdir.clone(),
        font,
    };

    let rasterizer = PopplerRasterizer::new(cli.dpi);
    let engine = TesseractOcr::new(&cli.lang);

    println!(
        "Converting {} -> {}",
        cli.input.display(),
        cli.output.display()
    );

    match run_job(&cli.input, &cli.output, &options, &rasterizer, &engine) {
        Ok(report) => {
            for failure in &report.failures {
                println!("Error processing {failure}");
            }
            if let Some(e) = &report.cleanup_error {
                println!("Warning: cleanup failed: {e}");
            }
            println!(
                "Searchable PDF created: {} ({}/{} pages)",
                cli.output.display(),
                report.pages_written,
                report.pages_total
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            Err(1)
        }
    }
}
