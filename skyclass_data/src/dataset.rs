/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! loading flight datasets from trace directories and splitting them into train and test sets

use std::{collections::BTreeMap, path::{Path,PathBuf}};
use ndarray::Array2;
use tracing::{info, warn};

use crate::config::Context;
use crate::extraction::{flight_to_feature_array, ExtractOptions};
use crate::labels::LabelTable;
use crate::pad::PadVector;
use crate::trace::{list_flights, read_trajectory};
use crate::errors::{Result, SkyclassError};

/// a preprocessed flight. `data` is immutable after loading
#[derive(Debug,Clone)]
pub struct Flight {
    /// file stem of the trace this flight was read from
    pub id: String,
    pub icao24: String,
    pub label: Option<i64>,
    pub data: Array2<f32>,
}

impl Flight {
    #[inline] pub fn len (&self)->usize { self.data.nrows() }
    #[inline] pub fn is_empty (&self)->bool { self.data.nrows() == 0 }
}

/// what happened during a dataset load
#[derive(Debug,Clone,Default)]
pub struct LoadReport {
    pub files: usize,
    pub loaded: usize,
    /// skip reason → count
    pub skipped: BTreeMap<String,usize>,
}

impl LoadReport {
    pub fn n_skipped (&self)->usize { self.skipped.values().sum() }
}

#[derive(Debug,Clone)]
pub struct Dataset {
    pub flights: Vec<Flight>,
    pub pad: PadVector,
    pub report: LoadReport,
}

fn issue_kind (e: &SkyclassError)->String {
    match e {
        SkyclassError::DataQuality(issue) => issue.kind().to_string(),
        _ => "other".to_string()
    }
}

fn load_flight (ctx: &Context, path: &Path, labels: Option<&LabelTable>)->Result<Flight> {
    let trace = read_trajectory( path)?;
    let label = match labels {
        Some(table) => Some( table.filtered_label_of( &trace.icao24, ctx.config.label_filter.as_deref())?),
        None => None
    };
    let data = flight_to_feature_array( ctx, &trace.table, ExtractOptions::default())?;
    let id = path.file_stem().map( |s| s.to_string_lossy().to_string()).unwrap_or_default();

    Ok( Flight { id, icao24: trace.icao24, label, data } )
}

/// read and preprocess all traces of `dir`. Flights with data quality issues are skipped (and counted),
/// all other errors abort the load. NaNs are not yet replaced
pub fn load_flights<P: AsRef<Path>> (ctx: &Context, dir: P, labels: Option<&LabelTable>)->Result<(Vec<Flight>,LoadReport)> {
    let files = list_flights( dir.as_ref(), ctx.config.flight_limit)?;
    load_flight_files( ctx, &files, labels)
}

pub fn load_flight_files (ctx: &Context, files: &[PathBuf], labels: Option<&LabelTable>)->Result<(Vec<Flight>,LoadReport)> {
    let mut report = LoadReport { files: files.len(), ..Default::default() };
    let mut flights = Vec::with_capacity( files.len());

    for path in files {
        match load_flight( ctx, path, labels) {
            Ok(flight) => {
                flights.push( flight);
                report.loaded += 1;
            }
            Err(e) if e.is_recoverable() => {
                warn!("skipping {:?}: {}", path, e);
                *report.skipped.entry( issue_kind(&e)).or_default() += 1;
            }
            Err(e) => return Err(e)
        }
    }

    info!("loaded {} of {} flights ({} skipped)", report.loaded, report.files, report.n_skipped());
    Ok( (flights, report) )
}

/// load flights, compute the pad vector over all of them (unless one is given) and replace NaNs
/// with pad values. The pad vector computation is a full reduction, windows can only be generated after it
pub fn load_dataset<P: AsRef<Path>> (ctx: &Context, dir: P, labels: Option<&LabelTable>, pad: Option<PadVector>)->Result<Dataset> {
    let (flights, report) = load_flights( ctx, dir, labels)?;
    finish_dataset( ctx, flights, report, pad)
}

pub fn finish_dataset (ctx: &Context, mut flights: Vec<Flight>, report: LoadReport, pad: Option<PadVector>)->Result<Dataset> {
    let pad = match pad {
        Some(pad) => { pad.check_width( &ctx.feature_map)?; pad }
        None => {
            let arrays: Vec<&Array2<f32>> = flights.iter().map( |f| &f.data).collect();
            PadVector::compute( ctx, &arrays)
        }
    };

    for f in flights.iter_mut() {
        pad.fill_nan( &mut f.data)?;
    }

    Ok( Dataset { flights, pad, report } )
}

/// keep the first (1-ratio) share of items for training, the rest for testing
pub fn split_dataset<T> (mut items: Vec<T>, ratio: f64)->(Vec<T>,Vec<T>) {
    let split = ((items.len() as f64) * (1.0 - ratio)) as usize;
    let test = items.split_off( split.min( items.len()));
    (items, test)
}
