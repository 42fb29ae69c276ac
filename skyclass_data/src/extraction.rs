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

//! conversion of raw time tables into fixed schema feature matrices

use ndarray::Array2;
use tracing::warn;
use skyclass_common::{angle::relative_angles, geo::capped_distances_km, geo::is_pad_sentinel};

use crate::config::{Context, InputPadding};
use crate::features::Feature;
use crate::table::{RawColumn, RawRow, TimeTable, RAW_COLUMNS};
use crate::errors::{Result, DataQualityIssue};

/// per call options of feature extraction
#[derive(Debug,Clone,Copy)]
pub struct ExtractOptions {
    /// reject flights with fewer rows than the configured history
    pub check_length: bool,
    /// reference time for the relative timestamp feature. Defaults to the first row
    pub t0: Option<f64>,
}

impl Default for ExtractOptions {
    fn default()->Self { ExtractOptions { check_length: true, t0: None } }
}

/// the intermediate dense representation: raw columns plus the pad marker column
struct DenseRows {
    rows: Vec<RawRow>,
    pad: Vec<f64>,
}

fn dense_rows (table: &TimeTable, padding: InputPadding)->DenseRows {
    let rows = table.rows();
    if padding == InputPadding::Valid || rows.is_empty() {
        return DenseRows { rows: rows.to_vec(), pad: vec![0.0; rows.len()] }
    }

    let start = rows[0][0];
    let end = rows[rows.len()-1][0];
    let total = (end - start).round() as usize + 1;

    let mut dense = vec![[f64::NAN; RAW_COLUMNS]; total];
    let mut pad = vec![1.0; total];
    for (i,r) in dense.iter_mut().enumerate() {
        r[0] = start + i as f64;
    }
    for row in rows {
        let i = (row[0] - start).round() as usize;
        dense[i] = *row;
        dense[i][0] = start + i as f64;
        pad[i] = 0.0;
    }

    if padding == InputPadding::Last {
        for i in 1..dense.len() {
            for c in 1..RAW_COLUMNS {
                if dense[i][c].is_nan() { dense[i][c] = dense[i-1][c]; }
            }
        }
    }

    DenseRows { rows: dense, pad }
}

#[inline]
fn clip_negative (v: f64)->f64 { if v < 0.0 { 0.0 } else { v } } // NaN passes

/// calendar features from absolute epoch seconds, computed with integer arithmetic (floored)
pub fn calendar (ts: f64, hour_offset: i64)->(f64,f64,f64,f64) {
    let t = ts.floor() as i64;
    let day = (t.div_euclid(86400) + 4).rem_euclid(7);
    let hour = (t.div_euclid(3600) + hour_offset).rem_euclid(24);
    let min = t.div_euclid(60).rem_euclid(60);
    let sec = t.rem_euclid(60);
    (day as f64, hour as f64, min as f64, sec as f64)
}

/// convert a raw trace into the configured feature matrix (rows × features).
/// Returns `TooShort` if the flight has fewer rows than `history` and `NanPosition` if the `Valid` padding
/// policy finds missing positions. Both are recoverable data quality issues
pub fn flight_to_feature_array (ctx: &Context, table: &TimeTable, opts: ExtractOptions)->Result<Array2<f32>> {
    let cfg = &ctx.config;
    if table.is_empty() { return Err( DataQualityIssue::EmptyTrace.into()) }

    let DenseRows { rows, pad } = dense_rows( table, cfg.input_padding);
    let n = rows.len();

    if cfg.input_padding == InputPadding::Valid {
        for col in [RawColumn::Latitude, RawColumn::Longitude] {
            if rows.iter().any( |r| r[col.idx()].is_nan()) {
                warn!("NaN in {}", col.name());
                return Err( DataQualityIssue::NanPosition{ column: col.name().to_string() }.into())
            }
        }
    }

    if opts.check_length && n < cfg.history {
        return Err( DataQualityIssue::TooShort{ len: n, required: cfg.history }.into())
    }

    let t0 = opts.t0.unwrap_or( rows[0][0]);
    let lat = |i: usize| rows[i][RawColumn::Latitude.idx()];
    let lon = |i: usize| rows[i][RawColumn::Longitude.idx()];

    let has_ref = ctx.feature_map.features().iter().any( |f| matches!( f, Feature::RefDistance(_)));
    let ref_dists: Vec<Vec<f64>> = if has_ref {
        let refs = ctx.reference_coords();
        (0..n).map( |i| {
            if is_pad_sentinel( lat(i), lon(i)) { vec![0.0; refs.len()] }
            else { capped_distances_km( lat(i), lon(i), &refs, cfg.max_distance_km) }
        }).collect()
    } else {
        Vec::new()
    };

    let calendar_rows: Vec<(f64,f64,f64,f64)> = rows.iter().map( |r| calendar( r[0], cfg.hour_offset)).collect();

    let relative_track = if ctx.feature_map.has( Feature::RelativeTrack) {
        relative_angles( &rows.iter().map( |r| r[RawColumn::Track.idx()]).collect::<Vec<f64>>())
    } else {
        Vec::new()
    };
    let value = |i: usize, f: &Feature| -> f64 {
        match f {
            Feature::Timestamp => rows[i][0] - t0,
            Feature::Altitude => clip_negative( rows[i][RawColumn::Altitude.idx()]),
            Feature::Geoaltitude => clip_negative( rows[i][RawColumn::Geoaltitude.idx()]),
            Feature::Day => calendar_rows[i].0,
            Feature::Hour => calendar_rows[i].1,
            Feature::Min => calendar_rows[i].2,
            Feature::Sec => calendar_rows[i].3,
            Feature::RelativeTrack => relative_track[i],
            Feature::Pad => pad[i],
            Feature::RefDistance(k) => ref_dists[i][*k],
            other => match other.raw_column() {
                Some(col) => rows[i][col.idx()],
                None => f64::NAN
            }
        }
    };

    let features = ctx.feature_map.features();
    Ok( Array2::from_shape_fn( (n, features.len()), |(i,j)| value( i, &features[j]) as f32) )
}
