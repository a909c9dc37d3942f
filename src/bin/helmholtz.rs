//! `helmholtz {cube|sphere} <subdiv> [threads]` — assemble the stiffness and
//! mass matrices, factor `S + M` by Cholesky, and solve against a synthetic
//! load to report the residual.

use std::process::ExitCode;

use surface_fem::prelude::*;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: helmholtz {{cube|sphere}} <subdiv> [threads]");
        return ExitCode::from(1);
    }

    let topology = match args[1].as_str() {
        "cube" => MeshTopology::Cube,
        "sphere" => MeshTopology::Sphere,
        other => {
            eprintln!("unknown topology '{other}', expected 'cube' or 'sphere'");
            return ExitCode::from(1);
        }
    };

    let subdiv: usize = match args[2].parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("invalid subdiv '{}': expected a positive integer", args[2]);
            return ExitCode::from(1);
        }
    };

    if let Some(threads) = args.get(3).and_then(|s| s.parse::<usize>().ok()) {
        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global();
    }

    let options = SolverOptions::helmholtz();

    let mesh = match Mesh::generate(subdiv, topology, false) {
        Ok(mesh) => mesh,
        Err(err) => {
            eprintln!("mesh generation failed: {err}");
            return ExitCode::from(2);
        }
    };

    let n = mesh.vertex_count();
    let stiffness = build_stiffness_matrix_csr(&mesh);
    let mass = build_mass_matrix_csr(&mesh);
    let mut combined = stiffness.clone();
    surface_fem::matrix::csr::add_scaled(&mut combined, &stiffness, 1.0, &mass);

    let mut chol = CholeskyState::attach(&combined, options.cholesky_shift);
    if let Err(err) = chol.compute() {
        eprintln!("cholesky factorization failed: {err}");
        return ExitCode::from(2);
    }

    let b = surface_fem::vecmath::Vec::from_element(n, 1.0);
    let mut x = surface_fem::vecmath::zeros(n);
    if let Err(err) = chol.solve(&b, &mut x) {
        eprintln!("triangular solve failed: {err}");
        return ExitCode::from(2);
    }

    let mut check = surface_fem::vecmath::zeros(n);
    let _ = combined.apply(&x, &mut check);
    let mut residual = surface_fem::vecmath::zeros(n);
    for i in 0..n {
        residual[i] = b[i] - check[i];
    }
    println!(
        "vertices={} residual_norm={:.3e}",
        n,
        surface_fem::vecmath::norm(&residual)
    );
    ExitCode::SUCCESS
}
