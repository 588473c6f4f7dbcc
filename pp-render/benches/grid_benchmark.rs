use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pp_core::{function, ExtendedComplex};
use pp_render::{ComputeConfig, GridComputer, PortraitRequest};

criterion_main!(benches);
criterion_group!(benches, bench_multithread);

/// Sample each builtin over the same window, across threads.
pub fn bench_multithread(c: &mut Criterion) {
    let mut group = c.benchmark_group("multithreading-base");

    let lower_left = ExtendedComplex::new(-2.0, -2.0).unwrap();
    let upper_right = ExtendedComplex::new(2.0, 2.0).unwrap();
    let resolution = 16;
    // Count grid points:
    let side = 4 * resolution as u64 + 1;
    group.throughput(criterion::Throughput::Elements(side * side));
    // Don't spend too long preparing:
    group.warm_up_time(Duration::from_secs(1));

    // Count up powers of two:
    let thread_range = (0..).map(|x| 1 << x).take_while({
        let x = num_cpus::get().next_power_of_two();
        move |y| (*y <= x)
    });
    for threads in thread_range {
        let exec = GridComputer::with_config(ComputeConfig {
            threads,
            ..Default::default()
        })
        .unwrap();

        for name in ["exp", "gamma", "zeta"] {
            let f = function::builtin(name).unwrap();
            let req = PortraitRequest {
                lower_left,
                upper_right,
                resolution,
                function: &f,
                store: None,
            };
            group.bench_with_input(BenchmarkId::new(name, threads), &req, |b, input| {
                b.iter_with_large_drop(|| exec.compute(black_box(input)).unwrap())
            });
        }
    }

    group.finish();
}
