use auto_pca::dimred::eigen::symmetric_eigen;
use auto_pca::statistics::covariance_matrix;
use auto_pca::{LinearRegression, PcaBuilder, Standardizer};
use criterion::measurement::Measurement;
use criterion::{criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::distr::{Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;

#[derive(Clone)]
pub struct DenseMatrixConfig {
    seed: u64,
    matrix_sizes: Vec<(usize, usize)>,
    measurement_time: u64,
    sample_size: usize,
}

impl Default for DenseMatrixConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            matrix_sizes: vec![(400, 7), (1000, 20), (5000, 50)],
            measurement_time: 5,
            sample_size: 20,
        }
    }
}

fn create_test_matrix(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let value_dist = Uniform::try_from(-1.0..1.0).unwrap();
    Array2::from_shape_simple_fn((rows, cols), || value_dist.sample(&mut rng))
}

fn configure_group<'a, M: Measurement>(
    c: &'a mut Criterion<M>,
    name: &str,
    config: &DenseMatrixConfig,
) -> BenchmarkGroup<'a, M> {
    let mut group = c.benchmark_group(name);
    group.measurement_time(Duration::from_secs(config.measurement_time));
    group.sample_size(config.sample_size);
    group
}

pub fn bench_covariance_and_eigen(c: &mut Criterion) {
    let config = DenseMatrixConfig::default();
    let mut group = configure_group(c, "Covariance_Eigen", &config);

    for &(rows, cols) in config.matrix_sizes.iter() {
        let seed = config.seed + (rows * cols) as u64;
        let x = create_test_matrix(rows, cols, seed);
        let cov = covariance_matrix(x.view(), 1).unwrap();

        group.bench_with_input(
            BenchmarkId::new("covariance", format!("{}x{}", rows, cols)),
            &(rows, cols),
            |b, _| {
                b.iter(|| covariance_matrix(x.view(), 1).unwrap());
            },
        );

        group.bench_with_input(
            BenchmarkId::new("symmetric_eigen", format!("{}x{}", cols, cols)),
            &(rows, cols),
            |b, _| {
                b.iter(|| symmetric_eigen(cov.view()).unwrap());
            },
        );
    }
    group.finish();
}

pub fn bench_pipeline_steps(c: &mut Criterion) {
    let config = DenseMatrixConfig::default();
    let mut group = configure_group(c, "Pipeline_Steps", &config);

    for &(rows, cols) in config.matrix_sizes.iter() {
        let seed = config.seed + (rows * cols) as u64;
        let x = create_test_matrix(rows, cols, seed);
        let y = Array1::from_iter(x.rows().into_iter().map(|r| r.sum()));
        let z = Standardizer::new().fit_transform(x.view()).unwrap();
        let k = (cols / 2).max(1);

        group.bench_with_input(
            BenchmarkId::new("standardize", format!("{}x{}", rows, cols)),
            &(rows, cols),
            |b, _| {
                b.iter(|| Standardizer::new().fit_transform(x.view()).unwrap());
            },
        );

        group.bench_with_input(
            BenchmarkId::new("pca_fit_transform", format!("{}x{}_k{}", rows, cols, k)),
            &(rows, cols),
            |b, _| {
                b.iter(|| {
                    let mut pca = PcaBuilder::new().n_components(k).build();
                    pca.fit_transform(z.view()).unwrap()
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("ols_fit", format!("{}x{}", rows, cols)),
            &(rows, cols),
            |b, _| {
                b.iter(|| {
                    let mut model = LinearRegression::new();
                    model.fit(z.view(), y.view()).unwrap();
                    model.intercept()
                });
            },
        );
    }
    group.finish();
}

criterion_group!(pca_benches, bench_covariance_and_eigen, bench_pipeline_steps);
criterion_main!(pca_benches);
