//! Shared grid geometry and named fields.
//!
//! Every model run operates on a single harmonized geometry: a common time
//! axis and a common y/x raster. Fields of lower dimensionality (static
//! maps, per-step scalars) are broadcast up to the full `(time, y, x)`
//! shape when they enter a container, so the formula layer only ever sees
//! arrays of one shape.

use crate::errors::{EtLookError, EtLookResult};
use ndarray::{Array1, ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

/// The harmonized geometry shared by all fields of a model run.
///
/// The ingest layer (out of scope here) is responsible for reprojection and
/// temporal binning; by the time a `Grid` exists, every input is on this
/// geometry. Time steps carry a day-of-year and a decimal hour so the solar
/// geometry formulas need no calendar handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    doy: Array1<f64>,
    dtime: Array1<f64>,
    lat: Array1<f64>,
    lon: Array1<f64>,
}

impl Grid {
    /// Create a grid from per-step day-of-year and decimal-hour values plus
    /// latitude (degrees, y axis) and longitude (degrees, x axis).
    pub fn new(
        doy: Array1<f64>,
        dtime: Array1<f64>,
        lat: Array1<f64>,
        lon: Array1<f64>,
    ) -> EtLookResult<Self> {
        if doy.len() != dtime.len() {
            return Err(EtLookError::ShapeMismatch {
                name: "dtime".to_string(),
                expected: vec![doy.len()],
                actual: vec![dtime.len()],
            });
        }
        Ok(Self {
            doy,
            dtime,
            lat,
            lon,
        })
    }

    /// Grid for a daily-aggregate run, where the decimal hour is unused.
    pub fn daily(doy: Array1<f64>, lat: Array1<f64>, lon: Array1<f64>) -> Self {
        let dtime = Array1::zeros(doy.len());
        Self {
            doy,
            dtime,
            lat,
            lon,
        }
    }

    /// Full shape `(time, y, x)` of fields on this grid.
    pub fn shape(&self) -> [usize; 3] {
        [self.doy.len(), self.lat.len(), self.lon.len()]
    }

    pub fn doy(&self) -> &Array1<f64> {
        &self.doy
    }

    pub fn dtime(&self) -> &Array1<f64> {
        &self.dtime
    }

    pub fn lat(&self) -> &Array1<f64> {
        &self.lat
    }

    pub fn lon(&self) -> &Array1<f64> {
        &self.lon
    }
}

/// A named N-d field on a shared grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridField {
    pub name: String,
    pub unit: String,
    pub description: String,
    pub data: ArrayD<f64>,
}

impl GridField {
    /// Create a field without attribute metadata.
    pub fn new(name: impl Into<String>, data: ArrayD<f64>) -> Self {
        Self {
            name: name.into(),
            unit: String::new(),
            description: String::new(),
            data,
        }
    }

    pub fn with_attrs(mut self, unit: &str, description: &str) -> Self {
        self.unit = unit.to_string();
        self.description = description.to_string();
        self
    }
}

/// Broadcast `data` up to the full grid shape.
///
/// Accepted input shapes: `(time, y, x)` as-is, `(y, x)` static maps,
/// `(time,)` per-step values, and 0-d scalars. Anything else is a
/// configuration error.
pub fn broadcast_to_grid(
    name: &str,
    data: ArrayD<f64>,
    shape: [usize; 3],
) -> EtLookResult<ArrayD<f64>> {
    let [nt, ny, nx] = shape;
    let target = IxDyn(&[nt, ny, nx]);

    let mismatch = |actual: &[usize]| EtLookError::ShapeMismatch {
        name: name.to_string(),
        expected: vec![nt, ny, nx],
        actual: actual.to_vec(),
    };

    match data.ndim() {
        3 => {
            if data.shape() == [nt, ny, nx] {
                // Fields are kept in standard layout so the formula layer
                // can iterate them as contiguous slices.
                Ok(data.as_standard_layout().into_owned())
            } else {
                Err(mismatch(data.shape()))
            }
        }
        2 => {
            if data.shape() == [ny, nx] {
                Ok(ArrayD::from_shape_fn(target, |idx| {
                    data[[idx[1], idx[2]]]
                }))
            } else {
                Err(mismatch(data.shape()))
            }
        }
        1 => {
            if data.shape() == [nt] {
                Ok(ArrayD::from_shape_fn(target, |idx| data[[idx[0]]]))
            } else {
                Err(mismatch(data.shape()))
            }
        }
        0 => {
            let value = data.iter().copied().next().unwrap_or(f64::NAN);
            Ok(ArrayD::from_elem(target, value))
        }
        _ => Err(mismatch(data.shape())),
    }
}
