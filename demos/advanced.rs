use mask_wordcloud::{Color, ColorMode, ExportFormat, WordCloudBuilder};
use image::{Rgba, RgbaImage};
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // horizontal rainbow bands inside a rounded square
    let mask = RgbaImage::from_fn(500, 500, |x, y| {
        let inside = x > 30 && x < 470 && y > 30 && y < 470;
        if !inside {
            return Rgba([255, 255, 255, 255]);
        }
        match y / 100 {
            0 => Rgba([230, 57, 70, 255]),
            1 => Rgba([244, 162, 97, 255]),
            2 => Rgba([42, 157, 143, 255]),
            3 => Rgba([69, 123, 157, 255]),
            _ => Rgba([123, 44, 191, 255]),
        }
    });

    let text = "custom colors seed fixed layout custom colors seed layout custom seed \
        custom sampling rainbow bands rainbow mask words words words";

    let wordcloud = WordCloudBuilder::new()
        .background(Color::rgb(0x1a, 0x1a, 0x1a))
        .color_mode(ColorMode::WordMean)
        .max_font_size(100)
        .min_font_size(10)
        .prefer_horizontal(0.7)
        .extra_stopwords(["fixed"])
        .seed(42)
        .build()?;

    let rendering = wordcloud.render(text, &mask)?;
    for warning in &rendering.warnings {
        println!("warning: {warning:?}");
    }

    fs::write("output_advanced.png", rendering.encode(ExportFormat::Png)?)?;
    fs::write("output_advanced.html", format!(
        r#"<a href="{}" download="wordcloud.png">Download Word Cloud as Image</a>"#,
        rendering.data_uri(ExportFormat::Png)?
    ))?;
    println!("Generated advanced word cloud: output_advanced.png");

    Ok(())
}
