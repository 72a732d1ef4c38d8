use crate::StrError;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the eddy-viscosity history of a run
#[derive(Serialize, Deserialize)]
pub struct RunSummary {
    pub model: String,      // name of the subgrid-scale model
    pub ncell: usize,       // number of cells
    pub ndof: usize,        // number of CG1 DOFs
    pub tstep: Vec<usize>,  // time step index
    pub time: Vec<f64>,     // simulated time
    pub nut_max: Vec<f64>,  // max nodal eddy viscosity
    pub nut_mean: Vec<f64>, // mean nodal eddy viscosity
}

impl RunSummary {
    /// Allocates a new structure
    pub fn new(model: &str, ncell: usize, ndof: usize) -> Self {
        RunSummary {
            model: model.to_string(),
            ncell,
            ndof,
            tstep: Vec::new(),
            time: Vec::new(),
            nut_max: Vec::new(),
            nut_mean: Vec::new(),
        }
    }

    /// Records the eddy viscosity at the end of a time step
    pub fn push(&mut self, tstep: usize, time: f64, nut: &Vector) {
        let n = usize::max(nut.dim(), 1) as f64;
        let max = nut.as_data().iter().fold(0.0, |acc: f64, x| f64::max(acc, *x));
        let mean = nut.as_data().iter().sum::<f64>() / n;
        self.tstep.push(tstep);
        self.time.push(time);
        self.nut_max.push(max);
        self.nut_mean.push(mean);
    }

    /// Reads a JSON file containing the summary
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn from<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(&path).map_err(|_| "file not found")?;
        let reader = BufReader::new(file);
        let summary = serde_json::from_reader(reader).map_err(|_| "deserialize failed")?;
        Ok(summary)
    }

    /// Writes a JSON file with the summary
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer_pretty(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
