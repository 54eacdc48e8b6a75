use criterion::{black_box, criterion_group, criterion_main, Criterion};
use video_captioner::{allocate_frames, pack_lines, CaptionEngine, RenderMetrics, TranscriptSegment};

const SAMPLE_TEXT: &str = "the quick brown fox jumps over the lazy dog while the \
                           narrator keeps talking about everything happening on \
                           screen in long meandering sentences";

fn bench_packing(c: &mut Criterion) {
    c.bench_function("pack_short_segment", |b| {
        b.iter(|| pack_lines(black_box("the quick brown fox jumps"), 200.0, 10.0))
    });

    c.bench_function("pack_long_segment", |b| {
        b.iter(|| pack_lines(black_box(SAMPLE_TEXT), 250.0, 9.5))
    });
}

fn bench_allocation(c: &mut Criterion) {
    let lines = pack_lines(SAMPLE_TEXT, 250.0, 9.5);

    c.bench_function("allocate_frames", |b| {
        b.iter(|| allocate_frames(black_box(&lines), 0.0, 8.0, 30.0, 15))
    });
}

fn bench_timeline_build(c: &mut Criterion) {
    let metrics = RenderMetrics {
        average_char_width_px: 9.5,
        line_width_budget_px: 250.0,
    };
    let engine = CaptionEngine::new(metrics, 30.0);

    let segments: Vec<TranscriptSegment> = (0..50)
        .map(|i| TranscriptSegment {
            text: SAMPLE_TEXT.to_string(),
            start_seconds: i as f64 * 8.0,
            end_seconds: (i + 1) as f64 * 8.0,
        })
        .collect();

    c.bench_function("build_timeline_50_segments", |b| {
        b.iter(|| engine.build_timeline(black_box(&segments)))
    });
}

criterion_group!(benches, bench_packing, bench_allocation, bench_timeline_build);
criterion_main!(benches);
