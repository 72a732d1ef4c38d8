use lesfem::base::{RunSummary, DEFAULT_OUT_DIR};
use lesfem::prelude::*;
use lesfem::StrError;
use russell_lab::Vector;
use std::f64::consts::PI;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "lesfem_run",
    about = "Runs a subgrid-scale model on a decaying Taylor-Green vortex"
)]
struct Options {
    /// Model: none, dynamic or wale
    #[structopt(short, long, default_value = "dynamic")]
    model: LesKind,

    /// Space dimension (2 or 3)
    #[structopt(long, default_value = "2")]
    ndim: usize,

    /// Number of divisions along each side of the unit square/cube
    #[structopt(long, default_value = "8")]
    ndiv: usize,

    /// Use a quadratic (CG2) velocity space
    #[structopt(short, long)]
    quadratic: bool,

    /// Number of time steps
    #[structopt(long, default_value = "10")]
    steps: usize,

    /// Time step
    #[structopt(long, default_value = "0.01")]
    dt: f64,

    /// Kinematic viscosity of the decaying vortex
    #[structopt(long, default_value = "0.01")]
    nu: f64,

    /// JSON file with the model configuration
    #[structopt(short, long)]
    config: Option<String>,

    /// Output directory (default: /tmp/lesfem/results)
    #[structopt(long)]
    out_dir: Option<String>,
}

/// Evaluates the Taylor-Green velocity components at time t
fn taylor_green(space: &FunctionSpace, t: f64, nu: f64) -> Vec<Vector> {
    let ndim = space.ndim;
    let decay = f64::exp(-(ndim as f64) * PI * PI * nu * t);
    (0..ndim)
        .map(|a| {
            let mut u = space.new_vector();
            for (i, x) in space.dof_coords.iter().enumerate() {
                let (sx, cx) = (f64::sin(PI * x[0]), f64::cos(PI * x[0]));
                let (sy, cy) = (f64::sin(PI * x[1]), f64::cos(PI * x[1]));
                let cz = if ndim == 3 { f64::cos(PI * x[2]) } else { 1.0 };
                u[i] = decay
                    * match a {
                        0 => sx * cy * cz,
                        1 => -cx * sy * cz,
                        _ => 0.0,
                    };
            }
            u
        })
        .collect()
}

fn main() -> Result<(), StrError> {
    // parse options
    env_logger::init();
    let options = Options::from_args();

    // configuration
    let config = match &options.config {
        Some(path) => Config::read_json(path)?,
        None => Config::new(),
    };

    // mesh and velocity space
    let linear = match options.ndim {
        2 => SampleMeshes::unit_square_tri3(options.ndiv),
        3 => SampleMeshes::unit_cube_tet4(options.ndiv),
        _ => return Err("ndim must be 2 or 3"),
    };
    let (mesh, kind) = if options.quadratic {
        (SampleMeshes::with_midside_points(&linear)?, SpaceKind::Cg2)
    } else {
        (linear, SpaceKind::Cg1)
    };
    let space = FunctionSpace::new(&mesh, kind)?;
    let bcs: Vec<Vec<DirichletBc>> = (0..options.ndim).map(|_| Vec::new()).collect();

    // model
    let input = LesInput {
        mesh: &mesh,
        velocity_space: &space,
        bcs: &bcs,
        config: &config,
    };
    let mut model = les_setup(options.model, &input)?;

    // run
    let mut summary = RunSummary::new(model.name(), mesh.cells.len(), model.nut().dim());
    let mut previous = taylor_green(&space, 0.0, options.nu);
    for tstep in 1..(options.steps + 1) {
        let t = (tstep as f64) * options.dt;
        let current = taylor_green(&space, t - options.dt, options.nu);
        let extrapolated: Vec<Vector> = current
            .iter()
            .zip(&previous)
            .map(|(u, u_old)| {
                let mut u_ab = space.new_vector();
                for i in 0..u_ab.dim() {
                    u_ab[i] = 1.5 * u[i] - 0.5 * u_old[i];
                }
                u_ab
            })
            .collect();
        let velocity = Velocity {
            current: &current,
            extrapolated: &extrapolated,
        };
        model.update(tstep, &velocity)?;
        summary.push(tstep, t, model.nut());
        previous = current;
    }

    // write summary
    let out_dir = options.out_dir.as_deref().unwrap_or(DEFAULT_OUT_DIR);
    let full_path = format!("{}/{}_{}d.json", out_dir, model.name(), options.ndim);
    summary.write(&full_path)?;

    // message
    let thin_line = format!("{:─^1$}", "", full_path.len());
    println!("\n{}", thin_line);
    let nut_max = summary.nut_max.last().copied().unwrap_or(0.0);
    println!("{} steps of {} done; max nut = {:e}", options.steps, model.name(), nut_max);
    println!("{}", full_path);
    println!("{}\n", thin_line);
    Ok(())
}
