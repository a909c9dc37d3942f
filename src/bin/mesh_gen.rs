//! `mesh-gen {cube|sphere} <subdiv> [threads]` — generate a mesh and report its stats

use std::process::ExitCode;

use surface_fem::prelude::*;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: mesh-gen {{cube|sphere}} <subdiv> [threads]");
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

    match Mesh::generate(subdiv, topology, false) {
        Ok(mesh) => {
            println!(
                "vertices={} triangles={}",
                mesh.vertex_count(),
                mesh.triangle_count()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("mesh generation failed: {err}");
            eprintln!("mesh generation failed: {err}");
            ExitCode::from(2)
        }
    }
}
