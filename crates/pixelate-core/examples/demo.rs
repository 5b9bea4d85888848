//! Pixelate Demo - interactive session with a debounced slider
//!
//! Run with: cargo run --example demo

use std::time::{Duration, Instant};

use pixelate_core::{PixelBuffer, Pixelator, Settings, SliderQueue};

fn main() {
    println!("=== Pixelate Demo ===\n");

    // 40x40 gradient: red grows left to right, green top to bottom.
    let width = 40u32;
    let height = 40u32;
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = ((x as f32 / (width - 1) as f32) * 255.0) as u8;
            let g = ((y as f32 / (height - 1) as f32) * 255.0) as u8;
            data.extend_from_slice(&[r, g, 128, 255]);
        }
    }
    let image = PixelBuffer::from_rgba(width, height, data).expect("valid gradient");
    println!("1. Created a {}x{} gradient image\n", width, height);

    let mut session = Pixelator::new();
    let out = session.load(image).expect("image loaded");
    println!("2. Rendered with default settings (block size 10)");
    println!("   Top-left block:     {:?}", out.image.pixel(0, 0));
    println!("   Bottom-right block: {:?}\n", out.image.pixel(39, 39));

    // A slider firing every 10ms; only the final value is rendered.
    let start = Instant::now();
    let mut sliders = SliderQueue::default();
    let mut renders = 0;
    for (step, brightness) in [1.1, 1.2, 1.3, 1.4, 1.5].into_iter().enumerate() {
        let now = start + Duration::from_millis(step as u64 * 10);
        sliders.queue_brightness(brightness, now);
        if let Some(update) = sliders.poll(now) {
            session.apply_sliders(&update);
            renders += 1;
        }
    }
    if let Some(update) = sliders.poll(start + Duration::from_millis(200)) {
        session.apply_sliders(&update);
        renders += 1;
    }
    println!("3. Brightness slider: 5 events, {} render(s)", renders);
    println!("   Brightness now {}\n", session.settings().brightness);

    for palette in ["sepia", "nightMode", "blackAndWhite"] {
        session.set_palette(palette);
        let out = session.output().expect("ready");
        println!("4. Palette {:<14} top-left {:?}", palette, out.image.pixel(0, 0));
    }

    session.set_show_grid(true);
    let lines = session
        .output()
        .and_then(|out| out.grid.as_ref())
        .map_or(0, |grid| grid.lines.len());
    println!("\n5. Grid enabled: {} overlay lines", lines);

    let png = session.export_png().expect("export").expect("ready");
    println!("6. Exported PNG: {} bytes", png.len());

    session.reset();
    assert_eq!(session.settings(), &Settings::default());
    println!("\n=== Demo Complete ===");
}
