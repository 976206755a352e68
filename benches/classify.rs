use criterion::{black_box, criterion_group, criterion_main, Criterion};
use metasift::ClassifiedMetadata;

const GROUPS: [&str; 10] = [
    "[GPS]", "[IFD0]", "[ExifIFD]", "[IPTC]", "[XMP-dc]", "[Composite]", "[Canon]", "[File]",
    "[System]", "[ICC_Profile]",
];

// Roughly the size of a full -a -G1 dump of a RAW file with maker notes.
fn synthetic_dump(lines: usize) -> String {
    (0..lines)
        .map(|i| {
            format!(
                "{:<16}Tag{:<28}: value {} with: colons\n",
                GROUPS[i % GROUPS.len()],
                i,
                i
            )
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let dump = synthetic_dump(2_000);

    c.bench_function("classify 2000 lines", |b| {
        b.iter(|| {
            let classified = ClassifiedMetadata::from_output(black_box(&dump));
            black_box(classified.total_lines())
        })
    });

    c.bench_function("map link", |b| {
        let classified = ClassifiedMetadata::from_output(
            "[Composite] GPSPosition : 37 deg 48' 0.00\" N, 122 deg 24' 0.00\" W",
        );
        b.iter(|| black_box(classified.critical().gps.map_link()))
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
