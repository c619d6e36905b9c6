use mask_wordcloud::{ExportFormat, WordCloudBuilder};
use std::fs;

const HEART: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
  <path d="M50 88 L12 50 A20 20 0 0 1 50 20 A20 20 0 0 1 88 50 Z" fill="#c0392b"/>
</svg>"##;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = "output_mask_heart.png";

    let mut text = String::new();
    for i in 0..300 {
        text.push_str("love rust heart mask ");
        if i % 3 == 0 {
            text.push_str("love ");
        }
        if i % 5 == 0 {
            text.push_str("silhouette ");
        }
    }

    println!("Building word cloud...");
    let wordcloud = WordCloudBuilder::new()
        .mask_size(800, 800)
        .max_font_size(160)
        .margin(2)
        .seed(7)
        .build()?;
    let rendering = wordcloud.render_bytes(&text, HEART.as_bytes())?;

    println!("Saving to {}...", output_path);
    fs::write(output_path, rendering.encode(ExportFormat::Png)?)?;
    rendering
        .side_by_side()
        .save("output_mask_heart_compare.png")?;

    println!("Done! Check {}", output_path);
    Ok(())
}
