//! The shared model state: an ordered name → field mapping.
//!
//! A [`ModelContainer`] holds the full computational state of one model
//! run. It grows monotonically while a pipeline executes (fields are
//! added, never removed) until the final export step selects the output
//! subset. The orchestrator owns the container exclusively for the
//! duration of a run; nothing else mutates it.

use crate::errors::{EtLookError, EtLookResult};
use crate::grid::{broadcast_to_grid, Grid, GridField};
use crate::variable;
use crate::version::ExportSelection;
use ndarray::{ArrayD, IxDyn};

/// An ordered collection of named grid fields on a common geometry.
#[derive(Debug, Clone)]
pub struct ModelContainer {
    grid: Grid,
    fields: Vec<GridField>,
}

impl ModelContainer {
    /// Create an empty container and seed it with the coordinate fields
    /// (`doy`, `dtime`, `lat`, `lon`) broadcast to the full grid shape, so
    /// location- and date-based formulas read them like any other field.
    pub fn new(grid: Grid) -> Self {
        let [nt, ny, nx] = grid.shape();
        let target = IxDyn(&[nt, ny, nx]);

        let doy = ArrayD::from_shape_fn(target.clone(), |idx| grid.doy()[idx[0]]);
        let dtime = ArrayD::from_shape_fn(target.clone(), |idx| grid.dtime()[idx[0]]);
        let lat = ArrayD::from_shape_fn(target.clone(), |idx| grid.lat()[idx[1]]);
        let lon = ArrayD::from_shape_fn(target, |idx| grid.lon()[idx[2]]);

        let mut container = Self {
            grid,
            fields: Vec::new(),
        };
        container.push("doy", doy);
        container.push("dtime", dtime);
        container.push("lat", lat);
        container.push("lon", lon);
        container
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Full `(time, y, x)` shape of every field in this container.
    pub fn shape(&self) -> [usize; 3] {
        self.grid.shape()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Add a field, broadcasting it up to the grid shape.
    ///
    /// Accepts `(time, y, x)`, static `(y, x)`, per-step `(time,)` and 0-d
    /// scalar arrays; anything else is a [`EtLookError::ShapeMismatch`].
    /// Attributes for known variable names are filled in automatically.
    ///
    /// Panics if a field with the same name already exists; within one run
    /// every quantity is computed exactly once.
    pub fn insert(&mut self, name: &str, data: ArrayD<f64>) -> EtLookResult<()> {
        if self.contains(name) {
            panic!("field {} already exists", name);
        }
        let data = broadcast_to_grid(name, data, self.shape())?;
        self.push(name, data);
        Ok(())
    }

    /// Add a spatially constant field.
    pub fn insert_constant(&mut self, name: &str, value: f64) {
        let [nt, ny, nx] = self.shape();
        let data = ArrayD::from_elem(IxDyn(&[nt, ny, nx]), value);
        if self.contains(name) {
            panic!("field {} already exists", name);
        }
        self.push(name, data);
    }

    fn push(&mut self, name: &str, data: ArrayD<f64>) {
        let field = match variable::attrs(name) {
            Some(def) => GridField::new(name, data).with_attrs(def.unit, def.description),
            None => GridField::new(name, data),
        };
        self.fields.push(field);
    }

    pub fn field(&self, name: &str) -> Option<&GridField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn array(&self, name: &str) -> Option<&ArrayD<f64>> {
        self.field(name).map(|f| &f.data)
    }

    /// Get a field's data, panicking if absent.
    ///
    /// Evaluation steps only run after the executor has checked that all
    /// their declared inputs are present, so a miss here is a programming
    /// error (an undeclared dependency), not a data problem.
    pub fn expect_array(&self, name: &str) -> &ArrayD<f64> {
        self.array(name)
            .unwrap_or_else(|| panic!("field {} not found", name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridField> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build the output container for a finished run.
    ///
    /// `default_vars` is the pipeline's documented default subset; names in
    /// it that were never computed (e.g. because their steps were skipped)
    /// are dropped silently. An explicit custom list is stricter: a name
    /// absent from the container is a configuration error.
    pub fn select(
        &self,
        selection: &ExportSelection,
        default_vars: &[&str],
    ) -> EtLookResult<ModelContainer> {
        let keep: Vec<&GridField> = match selection {
            ExportSelection::All => self.fields.iter().collect(),
            ExportSelection::Default => default_vars
                .iter()
                .filter_map(|name| self.field(name))
                .collect(),
            ExportSelection::Custom(names) => {
                let mut fields = Vec::with_capacity(names.len());
                for name in names {
                    match self.field(name) {
                        Some(field) => fields.push(field),
                        None => {
                            return Err(EtLookError::UnknownExportVariable(name.clone()));
                        }
                    }
                }
                fields
            }
        };

        Ok(ModelContainer {
            grid: self.grid.clone(),
            fields: keep.into_iter().cloned().collect(),
        })
    }
}
