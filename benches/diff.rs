use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use termquilt::cell::{AttributeMode, Attributes, Char};
use termquilt::color::{RGB_BLACK, RGB_WHITE};
use termquilt::display::Display;
use termquilt::geometry::Vector;
use termquilt::text::Text;

fn full_text(width: i16, height: i16) -> Text {
    Text::filled(
        Char::styled('X', RGB_WHITE, RGB_BLACK, Attributes::empty(), AttributeMode::Merge),
        Vector::new(width, height),
        AttributeMode::Merge,
    )
}

fn bench_display_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("Display Diff");

    for (width, height) in [(80i16, 24i16), (200, 60)] {
        let size = Vector::new(width, height);

        group.bench_with_input(
            BenchmarkId::new("No Changes", format!("{width}x{height}")),
            &size,
            |b, &size| {
                let mut display = Display::new(Vec::new(), Vector::default(), size, size);
                let text = full_text(size.x, size.y);
                display.render(Vector::default(), &text).unwrap();
                b.iter(|| {
                    display.render(Vector::default(), black_box(&text)).unwrap();
                    display.writer_mut().clear();
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("Full Repaint", format!("{width}x{height}")),
            &size,
            |b, &size| {
                let mut display = Display::new(Vec::new(), Vector::default(), size, size);
                let a = full_text(size.x, size.y);
                let mut b_text = full_text(size.x, size.y);
                b_text.fill(
                    Char::styled('O', RGB_BLACK, RGB_WHITE, Attributes::empty(), AttributeMode::Merge),
                    termquilt::geometry::RECT_MAX,
                );
                let mut flip = false;
                b.iter(|| {
                    let text = if flip { &a } else { &b_text };
                    flip = !flip;
                    display.render(Vector::default(), black_box(text)).unwrap();
                    display.writer_mut().clear();
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("One Cell", format!("{width}x{height}")),
            &size,
            |b, &size| {
                let mut display = Display::new(Vec::new(), Vector::default(), size, size);
                display.render(Vector::default(), &full_text(size.x, size.y)).unwrap();
                let x = full_text(1, 1);
                let mut o = full_text(1, 1);
                o.fill(
                    Char::styled('O', RGB_WHITE, RGB_BLACK, Attributes::empty(), AttributeMode::Merge),
                    termquilt::geometry::RECT_MAX,
                );
                let mut flip = false;
                b.iter(|| {
                    let text = if flip { &x } else { &o };
                    flip = !flip;
                    display.render(Vector::new(size.x / 2, size.y / 2), black_box(text)).unwrap();
                    display.writer_mut().clear();
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_display_diff);
criterion_main!(benches);
