//! Benchmarks for mesh generation, assembly, and the linear solvers

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use surface_fem::prelude::*;

fn benchmark_mesh_generation(c: &mut Criterion) {
    c.bench_function("mesh_generate_sphere_subdiv_32", |b| {
        b.iter(|| {
            let mesh = Mesh::generate(32, MeshTopology::Sphere, false).unwrap();
            black_box(&mesh);
        })
    });
}

fn benchmark_assembly(c: &mut Criterion) {
    let mesh = Mesh::generate(32, MeshTopology::Sphere, false).unwrap();
    c.bench_function("assemble_stiffness_csr_subdiv_32", |b| {
        b.iter(|| {
            let csr = build_stiffness_matrix_csr(&mesh);
            black_box(&csr);
        })
    });
}

fn benchmark_conjugate_gradient(c: &mut Criterion) {
    let mesh = Mesh::generate(24, MeshTopology::Sphere, false).unwrap();
    let n = mesh.vertex_count();
    let stiffness = build_stiffness_matrix_csr(&mesh);
    let mass = build_mass_matrix_csr(&mesh);
    let mut combined = stiffness.clone();
    surface_fem::matrix::csr::add_scaled(&mut combined, &stiffness, 1.0, &mass);
    let b = surface_fem::vecmath::Vec::from_element(n, 1.0);

    c.bench_function("cg_solve_combined_subdiv_24", |b_iter| {
        b_iter.iter(|| {
            let mut x = surface_fem::vecmath::zeros(n);
            let mut scratch = surface_fem::krylov::CgScratch::new(n);
            let outcome =
                surface_fem::krylov::conjugate_gradient(&combined, &b, &mut x, &mut scratch, 1e-8, 500)
                    .unwrap();
            black_box(&outcome);
        })
    });
}

fn benchmark_cholesky(c: &mut Criterion) {
    let mesh = Mesh::generate(24, MeshTopology::Sphere, false).unwrap();
    let stiffness = build_stiffness_matrix_csr(&mesh);
    let mass = build_mass_matrix_csr(&mesh);
    let mut combined = stiffness.clone();
    surface_fem::matrix::csr::add_scaled(&mut combined, &stiffness, 1.0, &mass);

    c.bench_function("cholesky_factor_subdiv_24", |b| {
        b.iter(|| {
            let mut chol = CholeskyState::attach(&combined, 0.0);
            chol.compute().unwrap();
            black_box(&chol);
        })
    });
}

criterion_group!(
    benches,
    benchmark_mesh_generation,
    benchmark_assembly,
    benchmark_conjugate_gradient,
    benchmark_cholesky,
);

criterion_main!(benches);
