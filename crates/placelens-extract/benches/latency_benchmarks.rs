//! Latency benchmarks for the extraction pipeline
//!
//! Run with: cargo bench -p placelens-extract

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use placelens_extract::{EntityRegistry, HierarchicalExtractor, NoiseFilter, PhraseClassifier};
use std::sync::Arc;
use tokio::runtime::Runtime;

const SAMPLES: &[(&str, &str)] = &[
    ("street_address", "123 Main Street"),
    (
        "single_line_noise",
        "Be Veo Suse Nery og El Cerrito Plaza Dave's Hot Chicken - Chicken restaurant - Open - Closes 00:00",
    ),
    (
        "map_listing",
        "Tilden Regional Park\nBerkeley, CA\n4.7 (2,345) · Park\nDirections | Save | Share\n2501 Grizzly Peak Blvd",
    ),
    (
        "heavy_noise",
        "YE Ole ALS lial? OS8 mre Wi a + n\\e gle i \\ es Beet FWA t > | \\ae *\\1ash) a AN, 4 Sie Dat i Peele A Be | Funky Elephant Berkeley (} x - Thai restaurant - - Open - Closes 20:30 Saved in 1X A Start",
    ),
];

fn benchmark_extractor(c: &mut Criterion) {
    let extractor = HierarchicalExtractor::builtin().expect("Failed to create extractor");

    let mut group = c.benchmark_group("Extractor");
    group.sample_size(100);

    for (name, text) in SAMPLES {
        group.bench_with_input(BenchmarkId::new("extract", name), text, |b, text| {
            b.iter(|| extractor.extract_text(black_box(text), 0.8))
        });
    }

    group.finish();
}

fn benchmark_classifier(c: &mut Criterion) {
    let registry = EntityRegistry::builtin().expect("Failed to build registry").shared();
    let classifier =
        PhraseClassifier::new(registry, 16 * 1024).expect("Failed to create classifier");

    let phrases = [
        ("known", "Dave's Hot Chicken"),
        ("pattern_business", "Golden Lotus Restaurant"),
        ("landmark", "Tilden Regional Park"),
        ("fallthrough", "Be Veo Suse Nery og"),
    ];

    let mut group = c.benchmark_group("Classifier");
    for (name, phrase) in phrases {
        group.bench_with_input(BenchmarkId::new("classify", name), &phrase, |b, phrase| {
            b.iter(|| classifier.classify(black_box(phrase), 0.8).unwrap())
        });
    }
    group.finish();
}

fn benchmark_noise_filter(c: &mut Criterion) {
    let filter = NoiseFilter::new().expect("Failed to create noise filter");

    c.bench_function("noise_filter/is_noise", |b| {
        b.iter(|| filter.is_noise(black_box("es WF Fe ea 3 sie oy")))
    });
    c.bench_function("noise_filter/strip_ui_noise", |b| {
        b.iter(|| filter.strip_ui_noise(black_box("Acme Bread 4.8 (1,278) $$ Open now 08:00")))
    });
}

fn benchmark_batch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let extractor = Arc::new(HierarchicalExtractor::builtin().expect("Failed to create extractor"));

    let transcripts: Vec<_> = SAMPLES
        .iter()
        .cycle()
        .take(32)
        .map(|(_, text)| placelens_core::Transcript::new(*text, 0.8))
        .collect();

    c.bench_function("batch/32_transcripts", |b| {
        b.iter(|| {
            rt.block_on(placelens_extract::extract_batch(
                Arc::clone(&extractor),
                black_box(transcripts.clone()),
            ))
        })
    });
}

criterion_group!(
    benches,
    benchmark_extractor,
    benchmark_classifier,
    benchmark_noise_filter,
    benchmark_batch
);
criterion_main!(benches);
