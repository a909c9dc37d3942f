//! `ns-sim {cube|sphere} <subdiv> [threads]` — run a short Navier-Stokes
//! vorticity-stream-function simulation from a synthetic initial condition
//! and report the final time and residual state.

use std::process::ExitCode;

use surface_fem::prelude::*;

const STEPS: usize = 10;
const DT: f64 = 0.01;
const NU: f64 = 0.05;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: ns-sim {{cube|sphere}} <subdiv> [threads]");
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

    let mesh = match Mesh::generate(subdiv, topology, false) {
        Ok(mesh) => mesh,
        Err(err) => {
            eprintln!("mesh generation failed: {err}");
            return ExitCode::from(2);
        }
    };

    let options = SolverOptions::navier_stokes();
    let mut solver = NavierStokesSolver::new(mesh, NU, DT, options.cholesky_shift);
    for i in 0..solver.omega.len() {
        solver.omega[i] = (i % 7) as f64 - 3.0;
    }
    solver.project_omega_zero_mean();

    for step in 1..=STEPS {
        match solver.time_step(options.tol, options.iter_max) {
            Ok(outcome) if outcome.converged => {
                log::debug!("step {step}: converged in {} iters", outcome.iterations);
            }
            Ok(outcome) => {
                log::warn!(
                    "step {step}: did not converge (rel_error = {})",
                    outcome.rel_error
                );
            }
            Err(err) => {
                eprintln!("time step {step} failed: {err}");
                return ExitCode::from(2);
            }
        }
    }

    println!("t={:.4} vol={:.6e}", solver.t, solver.vol);
    ExitCode::SUCCESS
}
