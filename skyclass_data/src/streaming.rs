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

//! message-by-message window generation for live ADS-B streams

use std::collections::{HashMap, VecDeque};
use ndarray::{Array2, Array3, Axis};
use rand::rngs::StdRng;
use serde::{Serialize,Deserialize};
use tracing::{debug, info};
use skyclass_common::collections::push_to_ringbuffer;

use crate::batches::new_rng;
use crate::config::Context;
use crate::extraction::{flight_to_feature_array, ExtractOptions};
use crate::normalize::{batch_preprocess, NormalizeOptions, ReferenceFrame};
use crate::pad::PadVector;
use crate::scalers::Scaler;
use crate::table::{RawRow, TimeTable};
use crate::trace::RawObservation;
use crate::window::{check_sample, gen_window};
use crate::errors::{Result, SkyclassError};

/// tri-state sample validity. `Unknown` means there is not enough history yet to decide
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum Validity {
    Valid,
    Invalid,
    Unknown
}

/// a ready to score window (1 × input_len × features)
#[derive(Debug,Clone)]
pub struct StreamSample {
    pub x: Array3<f32>,
    pub validity: Validity,
    /// needed to map predictions back into geographic coordinates
    pub frame: Option<ReferenceFrame>,
}

struct AircraftCache {
    last_raw: RawRow,
    /// timestamp of the first message, timestamps of cached rows are relative to it
    t0: f64,
    rows: VecDeque<Vec<f32>>,
}

/// per aircraft bounded caches of preprocessed rows. Each new message is converted together with the
/// previous one, so that timestamp gaps get padded the same way as in offline traces
pub struct TrajectoryStreamer<S> {
    ctx: Context,
    pad: PadVector,
    x_scaler: S,
    caches: HashMap<String,AircraftCache>,
    max_len: usize,
    rng: StdRng,
}

impl<S> TrajectoryStreamer<S> where S: Scaler<Array3<f32>, Output=Array3<f32>> {
    pub fn new (ctx: Context, pad: PadVector, x_scaler: S)->Result<Self> {
        pad.check_width( &ctx.feature_map)?;
        let max_len = ctx.config.history + ctx.config.horizon;
        let rng = new_rng( &ctx);
        Ok( TrajectoryStreamer { ctx, pad, x_scaler, caches: HashMap::new(), max_len, rng } )
    }

    #[inline] pub fn len (&self)->usize { self.caches.len() }
    #[inline] pub fn is_empty (&self)->bool { self.caches.is_empty() }
    #[inline] pub fn is_tracking (&self, icao24: &str)->bool { self.caches.contains_key( &cache_key( icao24)) }

    /// number of cached rows for the given aircraft
    pub fn cached_len (&self, icao24: &str)->usize {
        self.caches.get( &cache_key( icao24)).map( |c| c.rows.len()).unwrap_or(0)
    }

    /// add a message and produce the window that ends with it. Messages that are out of order or that
    /// cannot be converted are not cached, their sample is flagged `Invalid`
    pub fn stream (&mut self, obs: &RawObservation)->Result<StreamSample> {
        let key = cache_key( &obs.icao24);
        let row = obs.to_row();

        let prev = self.caches.get( &key).map( |c| (c.last_raw, c.t0));
        let (table, t0) = match prev {
            Some((last, _)) if !(row[0] > last[0]) => {
                debug!("out of order message for {key} at {}", row[0]);
                return self.cached_sample( &key, Validity::Invalid)
            }
            Some((last, t0)) => (TimeTable::from_rows( [last, row]), t0),
            None => (TimeTable::from_rows( [row]), row[0])
        };

        let opts = ExtractOptions { check_length: false, t0: Some(t0) };
        let mut array = match flight_to_feature_array( &self.ctx, &table, opts) {
            Ok(array) => array,
            Err(e) if e.is_recoverable() => {
                debug!("rejected message for {key}: {e}");
                return self.cached_sample( &key, Validity::Invalid)
            }
            Err(e) => return Err(e)
        };
        self.pad.fill_nan( &mut array)?;

        let skip = if prev.is_some() { 1 } else { 0 };
        let max_len = self.max_len;
        let cache = self.caches.entry( key.clone()).or_insert_with( || {
            AircraftCache { last_raw: row, t0, rows: VecDeque::with_capacity( max_len) }
        });
        for r in array.rows().into_iter().skip( skip) {
            push_to_ringbuffer( &mut cache.rows, max_len, r.to_vec());
        }
        cache.last_raw = row;

        self.cached_sample( &key, Validity::Unknown)
    }

    /// sample from the current cache content. `fallback` is used if the cache is missing, or if it is
    /// not `Unknown` it overrides the computed validity
    fn cached_sample (&mut self, key: &str, fallback: Validity)->Result<StreamSample> {
        let nf = self.ctx.features_in();
        let rows: Vec<f32> = match self.caches.get( key) {
            Some(cache) => cache.rows.iter().flat_map( |r| r.iter().copied()).collect(),
            None => Vec::new()
        };
        let n = rows.len() / nf.max(1);
        if n == 0 {
            let x = Array3::<f32>::zeros( (1, self.ctx.input_len, nf));
            return Ok( StreamSample { x, validity: Validity::Invalid, frame: None } )
        }
        let flight = Array2::from_shape_vec( (n, nf), rows)?;
        let t = n - 1;

        let validity = if fallback != Validity::Unknown {
            fallback
        } else if n < self.ctx.config.dilation_rate + 1 {
            Validity::Unknown
        } else if check_sample( &self.ctx, flight.view(), t, 0) {
            Validity::Valid
        } else {
            Validity::Invalid
        };

        let mut w = gen_window( &self.ctx, flight.view(), &self.pad, t)?;
        let opts = NormalizeOptions::inference( &self.ctx);
        let frame = batch_preprocess( &self.ctx, &mut w, &self.pad, opts, &mut self.rng, None)?;
        let x = self.x_scaler.apply( &w.insert_axis( Axis(0)))?;

        Ok( StreamSample { x, validity, frame } )
    }

    /// drop all aircraft whose last message is older than `drop_after` seconds. Returns the number of
    /// removed caches
    pub fn remove_stale (&mut self, now: f64, drop_after: f64)->usize {
        let n = self.caches.len();
        self.caches.retain( |_,c| now - c.last_raw[0] <= drop_after);
        let removed = n - self.caches.len();
        if removed > 0 { info!("removed {removed} stale aircraft") }
        removed
    }
}

fn cache_key (icao24: &str)->String {
    icao24.trim().to_lowercase()
}
