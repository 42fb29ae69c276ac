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

//! the windowing engine: slicing dilated history windows out of flights and validating sample locations

use ndarray::{Array2, ArrayView2};
use rand::Rng;
use tracing::debug;
use uom::si::length::kilometer;
use skyclass_common::geo::{haversine_distance, is_pad_sentinel};

use crate::config::Context;
use crate::pad::PadVector;
use crate::errors::{Result, DataQualityIssue, shape_error};

/// bounds of the window that ends at (and includes) timestep t
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct WindowSlice {
    pub start: usize,
    /// exclusive
    pub end: usize,
    pub length: usize,
    /// number of leading pad rows in the dilated window
    pub pad_length: usize,
    /// offset into [start,end) of the first sampled row, so that the last sampled row is end-1
    pub shift: usize,
}

impl WindowSlice {
    /// flight row indices that make up the non-pad part of the dilated window
    pub fn rows (&self, dilation_rate: usize)->impl Iterator<Item=usize> {
        (self.start + self.shift .. self.end).step_by( dilation_rate)
    }
}

pub fn window_slice (t: usize, history: usize, dilation_rate: usize)->WindowSlice {
    let start = (t + 1).saturating_sub( history);
    let end = t + 1;
    let length = end - start;
    let pad_length = (history - length) / dilation_rate;

    let d = dilation_rate as i64;
    let l = length as i64;
    let shift = (l - (l / d) * d - 1).rem_euclid(d) as usize;

    WindowSlice { start, end, length, pad_length, shift }
}

/// the dilated window of `flight` that ends at t, left padded with the pad vector (input_len × features)
pub fn gen_window (ctx: &Context, flight: ArrayView2<f32>, pad: &PadVector, t: usize)->Result<Array2<f32>> {
    let nf = ctx.features_in();
    if flight.ncols() != nf { return Err( shape_error!("flight has {} features, expected {nf}", flight.ncols())) }
    if t >= flight.nrows() { return Err( shape_error!("timestep {t} outside of flight with {} rows", flight.nrows())) }

    let d = ctx.config.dilation_rate;
    let ws = window_slice( t, ctx.config.history, d);
    let mut x = Array2::<f32>::zeros( (ctx.input_len, nf));

    for i in 0..ws.pad_length {
        for (v,p) in x.row_mut(i).iter_mut().zip( pad.values.iter()) { *v = *p }
    }

    let mut i = ws.pad_length;
    for r in ws.rows( d) {
        if i >= ctx.input_len { return Err( shape_error!("window overflow at t={t}")) }
        x.row_mut(i).assign( &flight.row(r));
        i += 1;
    }
    if i != ctx.input_len { return Err( shape_error!("window underflow at t={t}: {i} rows")) }

    Ok(x)
}

/// index of the most recent row that is not the pad sentinel
pub fn last_valid_index (ctx: &Context, window: ArrayView2<f32>)->Option<usize> {
    let fm = &ctx.feature_map;
    (0..window.nrows()).rev().find( |&i| {
        !is_pad_sentinel( window[[i, fm.lat()]] as f64, window[[i, fm.lon()]] as f64)
    })
}

/// is timestep t a usable sample location for a target `horizon` steps ahead. Rejects
/// pad sentinel positions at t or t+horizon, timestamp gaps between them and consecutive steps within the
/// tail of the window (last dilation_rate rows up to the target) outside the configured distance range.
/// Without a timestamp feature only horizon 0 samples can pass
pub fn check_sample (ctx: &Context, flight: ArrayView2<f32>, t: usize, horizon: usize)->bool {
    let fm = &ctx.feature_map;
    let cfg = &ctx.config;
    let th = t + horizon;
    if th >= flight.nrows() { return false }

    let lat = |i: usize| flight[[i, fm.lat()]] as f64;
    let lon = |i: usize| flight[[i, fm.lon()]] as f64;

    if is_pad_sentinel( lat(t), lon(t)) || is_pad_sentinel( lat(th), lon(th)) { return false }

    match fm.timestamp() {
        Some(ts) => if flight[[t, ts]] as f64 + horizon as f64 != flight[[th, ts]] as f64 { return false }
        None => if horizon > 0 { return false } // elapsed time can't be verified
    }

    let first = (t + 1).saturating_sub( cfg.dilation_rate).max(1);
    for k in first..=th {
        let d = haversine_distance( lat(k-1), lon(k-1), lat(k), lon(k)).get::<kilometer>();
        if !(d >= cfg.min_step_distance_km && d <= cfg.max_step_distance_km) { return false }
    }

    true
}

/// pick a random (flight,timestep) pair that passes [`check_sample`], giving up after the configured
/// number of attempts
pub fn pick_random_loc<R: Rng> (ctx: &Context, flights: &[ArrayView2<f32>], rng: &mut R)->Result<(usize,usize)> {
    let horizon = ctx.config.horizon;
    let max_attempts = ctx.config.max_resample_attempts;

    if !flights.is_empty() {
        for attempt in 0..max_attempts {
            let i = rng.random_range( 0..flights.len());
            let len = flights[i].nrows();
            if len <= horizon { continue }

            let t = rng.random_range( 0..len - horizon);
            if check_sample( ctx, flights[i], t, horizon) {
                if attempt > 0 { debug!("found valid sample after {} resamples", attempt) }
                return Ok((i,t))
            }
        }
    }
    Err( DataQualityIssue::SamplingExhausted{ attempts: max_attempts }.into())
}
