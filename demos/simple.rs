use mask_wordcloud::{generate, ExportFormat};
use image::{Rgba, RgbaImage};
use std::fs;
use std::time::Instant;

const TEXT: &str = "Rust is a systems programming language focused on safety, speed and \
    concurrency. Rust achieves memory safety without garbage collection. The borrow \
    checker enforces ownership rules at compile time. Cargo builds Rust code, Cargo \
    fetches crates, and crates make Rust productive. Fearless concurrency, zero-cost \
    abstractions and a friendly community make Rust a joy.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    // a dark ellipse on white: words go inside it
    let mask = RgbaImage::from_fn(600, 400, |x, y| {
        let dx = (x as f32 - 300.0) / 280.0;
        let dy = (y as f32 - 200.0) / 180.0;
        if dx * dx + dy * dy <= 1.0 {
            Rgba([40, 90, 160, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });

    let rendering = generate(TEXT, &mask)?;
    println!(
        "Placed {} of {} words",
        rendering.placements.len(),
        rendering.words.len()
    );

    fs::write("output_simple.png", rendering.encode(ExportFormat::Png)?)?;
    fs::write("output_simple.svg", rendering.to_svg())?;

    println!("Done! Saved to output_simple.png and output_simple.svg");
    println!("Time elapsed: {:?}", start.elapsed());

    Ok(())
}
