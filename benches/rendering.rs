//! Rendering benchmarks

use std::time::{Duration, Instant};

use amourcard::card::{CardData, Relation, Tone, Vibe};
use amourcard::config::ExportPreferences;
use amourcard::effects::ConfettiBurst;
use amourcard::export::{load_font, render_face};
use amourcard::generation::build_prompt;
use amourcard::photo::{half_block_cells, EmbeddedPhoto};
use amourcard::presentation::Face;
use amourcard::theme::CardTheme;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, RgbImage};

fn create_test_image(width: u32, height: u32) -> DynamicImage {
    let mut img = RgbImage::new(width, height);
    for x in 0..width {
        for y in 0..height {
            let r = ((x as f32 / width as f32) * 255.0) as u8;
            let g = ((y as f32 / height as f32) * 255.0) as u8;
            let b = (((x + y) as f32 / (width + height) as f32) * 255.0) as u8;
            img.put_pixel(x, y, image::Rgb([r, g, b]));
        }
    }
    DynamicImage::ImageRgb8(img)
}

fn sample_card() -> CardData {
    CardData::default()
        .with_sender_name("Alex")
        .with_recipient_name("Sam")
        .with_relation(Relation::Girlfriend)
        .with_vibe(Vibe::SoftPastel)
        .with_tone(Tone::Poetic)
        .with_age("30")
        .with_fav_memory("the night we got lost looking for the lighthouse")
}

fn benchmark_face_export(c: &mut Criterion) {
    let prefs = ExportPreferences::default();
    let Ok(font) = load_font(&prefs) else {
        eprintln!("No system font found, skipping face export benchmarks");
        return;
    };

    let photo = EmbeddedPhoto::from_image(&create_test_image(640, 480)).ok();
    let card = sample_card()
        .with_photo(photo)
        .finalize("Another year of adventures, and I would not want to take them with anyone else.".to_string())
        .expect("fresh card");

    let mut group = c.benchmark_group("Face Export");
    group.sample_size(20);

    for vibe in Vibe::all() {
        let theme = CardTheme::for_vibe(*vibe);
        for face in [Face::Front, Face::Back] {
            group.bench_function(format!("{}_{:?}", vibe.name(), face), |b| {
                b.iter(|| {
                    render_face(
                        black_box(&card),
                        face,
                        &theme,
                        &font,
                        prefs.width,
                        prefs.height,
                    )
                })
            });
        }
    }

    group.finish();
}

fn benchmark_prompt(c: &mut Criterion) {
    let card = sample_card();
    c.bench_function("build_prompt", |b| b.iter(|| build_prompt(black_box(&card))));
}

fn benchmark_half_blocks(c: &mut Criterion) {
    let image = create_test_image(512, 512);

    let mut group = c.benchmark_group("Photo Preview");
    for (columns, rows) in [(20, 10), (40, 20), (80, 40)] {
        group.bench_function(format!("{}x{}", columns, rows), |b| {
            b.iter(|| half_block_cells(black_box(&image), columns, rows))
        });
    }
    group.finish();
}

fn benchmark_confetti(c: &mut Criterion) {
    c.bench_function("confetti_3s_at_60fps", |b| {
        b.iter(|| {
            let start = Instant::now();
            let mut burst = ConfettiBurst::with_seed(start, Duration::from_secs(3), 42);
            for frame in 1..=180u64 {
                burst.tick(start + Duration::from_millis(frame * 16));
            }
            black_box(burst.particles().len())
        })
    });
}

criterion_group!(
    benches,
    benchmark_face_export,
    benchmark_prompt,
    benchmark_half_blocks,
    benchmark_confetti,
);
criterion_main!(benches);
