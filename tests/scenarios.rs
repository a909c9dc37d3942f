//! End-to-end scenarios exercising the public API scenario-by-scenario.

use approx::assert_relative_eq;
use surface_fem::prelude::*;

#[test]
fn s3_helmholtz_on_sphere_spherical_harmonic() {
    let mesh = Mesh::generate(10, MeshTopology::Sphere, false).unwrap();
    let n = mesh.vertex_count();

    let mut f = surface_fem::vecmath::zeros(n);
    for i in 0..n {
        let p = mesh.vertices[i];
        let (x, y) = (p.x, p.y);
        f[i] = 5.0 * x.powi(4) * y - 10.0 * x.powi(2) * y.powi(3) + y.powi(5);
    }

    let stiffness = build_stiffness_matrix_csr(&mesh);
    let mass = build_mass_matrix_csr(&mesh);
    let mut combined = stiffness.clone();
    surface_fem::matrix::csr::add_scaled(&mut combined, &stiffness, 1.0, &mass);

    let mut rhs = surface_fem::vecmath::zeros(n);
    mass.apply(&f, &mut rhs).unwrap();

    let mut u = surface_fem::vecmath::zeros(n);
    let mut scratch = surface_fem::krylov::CgScratch::new(n);
    let outcome =
        surface_fem::krylov::conjugate_gradient(&combined, &rhs, &mut u, &mut scratch, 1e-6, 2000)
            .unwrap();
    assert!(outcome.converged, "CG failed to converge: {outcome:?}");

    let mut check = surface_fem::vecmath::zeros(n);
    combined.apply(&u, &mut check).unwrap();
    let mut residual = surface_fem::vecmath::zeros(n);
    for i in 0..n {
        residual[i] = check[i] - rhs[i];
    }
    let rel_residual = surface_fem::vecmath::norm(&residual) / surface_fem::vecmath::norm(&rhs);
    assert!(rel_residual <= 1e-6, "rel residual {rel_residual} too large");

    let u_inf = u.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()));
    assert!(u_inf < 10.0, "||u||_inf = {u_inf} too large");
}

#[test]
fn s4_cholesky_matches_known_factor() {
    // Grounded on `original_source/src/test_cholesky.cpp`'s worked example.
    let csr = CsrMatrix {
        rows: 3,
        cols: 3,
        row_offset: vec![0, 3, 6, 9],
        elm_idx: vec![0, 1, 2, 0, 1, 2, 0, 1, 2],
        elements: surface_fem::vecmath::Vec::from_vec(vec![
            4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0,
        ]),
    };

    let mut chol = CholeskyState::attach(&csr, 0.0);
    chol.compute().unwrap();

    let expected = [
        (0, 0, 2.0),
        (1, 0, 6.0),
        (1, 1, 1.0),
        (2, 0, -8.0),
        (2, 1, 5.0),
        (2, 2, 3.0),
    ];
    for (i, j, v) in expected {
        assert_relative_eq!(chol.factor_value(i, j), v, epsilon = 1e-10);
    }

    let b = surface_fem::vecmath::Vec::from_vec(vec![1.0, 2.0, 3.0]);
    let mut x = surface_fem::vecmath::zeros(3);
    chol.solve(&b, &mut x).unwrap();
    let mut check = surface_fem::vecmath::zeros(3);
    csr.apply(&x, &mut check).unwrap();
    for i in 0..3 {
        assert_relative_eq!(check[i], b[i], epsilon = 1e-10);
    }
}

#[test]
fn s5_cholesky_on_arrow_matrix() {
    // 5x5 SPD "arrow" matrix: diagonal 10 plus a dense last row/column.
    let n = 5;
    let mut row_offset = vec![0usize];
    let mut elm_idx = std::vec::Vec::new();
    let mut elements = std::vec::Vec::new();
    for i in 0..n - 1 {
        elm_idx.push(i as u32);
        elements.push(10.0);
        elm_idx.push((n - 1) as u32);
        elements.push(1.0 + i as f64);
        row_offset.push(elm_idx.len());
    }
    for j in 0..n {
        elm_idx.push(j as u32);
        elements.push(if j == n - 1 { 20.0 } else { 1.0 + j as f64 });
    }
    row_offset.push(elm_idx.len());
    let csr = CsrMatrix {
        rows: n,
        cols: n,
        row_offset,
        elm_idx,
        elements: surface_fem::vecmath::Vec::from_vec(elements),
    };

    let mut chol = CholeskyState::attach(&csr, 0.0);
    chol.compute().unwrap();

    let b = surface_fem::vecmath::Vec::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let mut x = surface_fem::vecmath::zeros(n);
    chol.solve(&b, &mut x).unwrap();

    let mut check = surface_fem::vecmath::zeros(n);
    csr.apply(&x, &mut check).unwrap();
    for i in 0..n {
        assert_relative_eq!(check[i], b[i], epsilon = 1e-12);
    }
}

#[test]
fn s6_navier_stokes_on_sphere() {
    let mesh = Mesh::generate(20, MeshTopology::Sphere, false).unwrap();
    let mut solver = NavierStokesSolver::new(mesh, 1e-4, 0.005, 1e-8);

    for i in 0..solver.omega.len() {
        let p = solver.mesh.vertices[i];
        let (x, y, z) = (p.x, p.y, p.z);
        let theta = (x * x + y * y).sqrt().atan2(z);
        solver.omega[i] =
            100.0 * z * (-50.0 * z * z).exp() * (1.0 + 0.5 * (20.0 * theta).cos());
    }
    solver.project_omega_zero_mean();

    for step in 1..=5 {
        let outcome = solver.time_step(1e-6, 1000).unwrap();
        assert!(outcome.converged, "step {step} failed to converge: {outcome:?}");

        let mut mw = surface_fem::vecmath::zeros(solver.omega.len());
        solver.mass.apply(&solver.omega, &mut mw).unwrap();
        let mean = surface_fem::vecmath::sum(&mw) / solver.vol;
        assert!(mean.abs() < 1e-10, "step {step}: zero-mean drift {mean}");
    }
}
