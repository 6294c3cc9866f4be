use dcrp::config::PlannerConfig;
use dcrp::kernel::build_kernel;
use dcrp::search::search;
use dcrp::valuation::v_static;
use rand::rngs::SmallRng;
use rand::SeedableRng;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        evaluating_v_static,
        running_a_short_search,
}

fn uniform_likelihood(_improvement: f64, _optimum: f64) -> f64 {
    1.0
}

fn evaluating_v_static(c: &mut criterion::Criterion) {
    let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
    let kernel = build_kernel(&values, uniform_likelihood, 3).unwrap();
    let belief = vec![1.0 / values.len() as f64; values.len()];
    c.bench_function("evaluate V_static over a 10-period horizon", |b| {
        b.iter(|| v_static(&belief, &kernel, 10))
    });
}

fn running_a_short_search(c: &mut criterion::Criterion) {
    let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
    let kernels: Vec<_> = (0..4)
        .map(|n| build_kernel(&values, uniform_likelihood, n).unwrap())
        .collect();
    let prior = vec![1.0 / values.len() as f64; values.len()];
    let config = PlannerConfig::new(values.len(), kernels.len(), 0.1, 3)
        .unwrap()
        .with_n_search(2_000);
    c.bench_function("run a 2,000-iteration search", |b| {
        b.iter(|| {
            let mut rng = SmallRng::seed_from_u64(0);
            search(&prior, &kernels, &config, &mut rng)
        })
    });
}
