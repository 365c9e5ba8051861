use criterion::{black_box, criterion_group, criterion_main, Criterion};

use comm_eval::community::Community;
use comm_eval::compare::calculate_nmi;

/// Two-block ground truth over 1000 vertices against a prediction that
/// misplaces every 25th vertex.
fn build_partitions() -> (Vec<Community<u32>>, Vec<Community<u32>>) {
    let truth = vec![
        (0..500u32).collect::<Community<u32>>(),
        (500..1000u32).collect::<Community<u32>>(),
    ];

    let mut pred_low = Community::new();
    let mut pred_high = Community::new();
    for vertex in 0..1000u32 {
        let misplaced = vertex % 25 == 0;
        if (vertex < 500) != misplaced {
            pred_low.add_node(vertex);
        } else {
            pred_high.add_node(vertex);
        }
    }
    (truth, vec![pred_low, pred_high])
}

fn bench_nmi(c: &mut Criterion) {
    let (truth, predicted) = build_partitions();
    c.bench_function("nmi_two_blocks_1000", |b| {
        b.iter(|| black_box(calculate_nmi(black_box(&truth), black_box(&predicted))))
    });
}

criterion_group!(benches, bench_nmi);
criterion_main!(benches);
