use lesfem::prelude::*;
use lesfem::les::AveragerPhase;
use lesfem::StrError;
use russell_lab::*;

// Dynamic Lagrangian model with a uniform velocity field
//
// TEST GOAL
//
// This test verifies that a uniform flow produces no subgrid-scale activity:
// the rate of strain, the Mij tensor and the JMM average vanish after the
// bootstrap step, and so does the eddy viscosity. The coefficient stays bounded
// even though JLM / JMM is undefined (0 / 0).
//
// MESH
//
// Unit square with 2 × 4 × 4 Tri3 and unit cube with 6 × 2³ Tet4
//
// CONFIGURATION AND PARAMETERS
//
// Default configuration (cs = 0.1677, cs_comp_step = 1, alpha = 2.5)

fn run(mesh: &gemlab::mesh::Mesh, values: &[f64]) -> Result<(), StrError> {
    let ndim = mesh.ndim;
    let space = FunctionSpace::new(mesh, SpaceKind::Cg1)?;
    let config = Config::new();
    let bcs: Vec<Vec<DirichletBc>> = (0..ndim).map(|_| Vec::new()).collect();
    let input = LesInput {
        mesh,
        velocity_space: &space,
        bcs: &bcs,
        config: &config,
    };
    let mut model = DynamicLagrangian::setup(&input)?;
    let u: Vec<Vector> = values.iter().map(|c| Vector::filled(space.ndof, *c)).collect();
    let velocity = Velocity {
        current: &u,
        extrapolated: &u,
    };
    for tstep in 1..4 {
        model.update(tstep, &velocity)?;
        assert_eq!(model.phase(), AveragerPhase::Steady);
        for comp in &model.mij().comps {
            assert!(vec_norm(comp, Norm::Max) < 1e-10);
        }
        assert!(vec_norm(model.mag_s(), Norm::Max) < 1e-10);
        assert!(vec_norm(model.jmm(), Norm::Max) < 1e-18);
        assert!(vec_norm(model.nut(), Norm::Max) < 1e-12);
        for i in 0..space.ndof {
            assert!(model.cs()[i] <= 0.1);
            assert!(model.jlm()[i] >= 1e-32 || tstep == 1);
        }
    }
    Ok(())
}

#[test]
fn test_dynamic_uniform_flow_2d() -> Result<(), StrError> {
    let mesh = SampleMeshes::unit_square_tri3(4);
    run(&mesh, &[1.0, -2.0])
}

#[test]
fn test_dynamic_uniform_flow_3d() -> Result<(), StrError> {
    let mesh = SampleMeshes::unit_cube_tet4(2);
    run(&mesh, &[0.5, 0.25, -1.0])
}
