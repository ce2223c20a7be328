use criterion::{black_box, criterion_group, criterion_main, Criterion};
use diffnav_core::{align_hunk, parse_diff, FileWordDiff};
use std::fmt::Write as _;

fn synthetic_diff(files: usize, hunks: usize) -> String {
    let mut out = String::new();
    for f in 0..files {
        let _ = writeln!(out, "diff --git a/src/mod{f}/file.rs b/src/mod{f}/file.rs");
        let _ = writeln!(out, "--- a/src/mod{f}/file.rs");
        let _ = writeln!(out, "+++ b/src/mod{f}/file.rs");
        for h in 0..hunks {
            let start = h * 20 + 1;
            let _ = writeln!(out, "@@ -{start},6 +{start},7 @@ fn item_{h}()");
            out.push_str(" let a = 1;\n let b = 2;\n");
            let _ = writeln!(out, "-    call_old({h}, \"value\");");
            out.push_str("-    other();\n");
            let _ = writeln!(out, "+    call_new({h}, \"value\");");
            out.push_str("+    other(true);\n+    extra();\n");
            out.push_str(" let c = 3;\n let d = 4;\n");
        }
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let text = synthetic_diff(50, 40);
    c.bench_function("parse_diff 50x40", |b| {
        b.iter(|| parse_diff(black_box(&text)))
    });
}

fn bench_align(c: &mut Criterion) {
    let files = parse_diff(&synthetic_diff(50, 40)).unwrap_or_default();
    c.bench_function("align_hunk all", |b| {
        b.iter(|| {
            files
                .iter()
                .flat_map(|f| f.hunks.iter())
                .map(|h| align_hunk(black_box(h)).len())
                .sum::<usize>()
        })
    });
}

fn bench_word_diff(c: &mut Criterion) {
    let files = parse_diff(&synthetic_diff(5, 40)).unwrap_or_default();
    c.bench_function("word diff 5 files", |b| {
        b.iter(|| {
            files
                .iter()
                .map(|f| FileWordDiff::compute(black_box(f)).len())
                .sum::<usize>()
        })
    });
}

criterion_group!(benches, bench_parse, bench_align, bench_word_diff);
criterion_main!(benches);
