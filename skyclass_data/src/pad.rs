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

//! the per-feature pad values that fill windows without enough history and replace NaNs

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Serialize,Deserialize};
use tracing::debug;

use crate::config::{Context, PadPolicy};
use crate::features::FeatureMap;
use crate::scalers::fill_nan;
use crate::errors::{Result, shape_error};

/// computed once per dataset after all flights are loaded, immutable afterwards.
/// Latitude and longitude pad values are always 0 which makes padded rows recognizable as the pad sentinel
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct PadVector {
    pub values: Vec<f32>,
}

impl PadVector {
    pub fn zeros (n_features: usize)->Self {
        PadVector { values: vec![0.0; n_features] }
    }

    /// full reduction over all flights according to the configured policy
    pub fn compute (ctx: &Context, flights: &[&Array2<f32>])->Self {
        let fm = &ctx.feature_map;
        let mut pad = PadVector::zeros( fm.len());

        if ctx.config.pad_policy == PadPolicy::Min {
            for (j,p) in pad.values.iter_mut().enumerate() {
                let mut min = f32::INFINITY;
                for f in flights {
                    for v in f.column(j) {
                        if *v < min { min = *v } // NaN never compares
                    }
                }
                if min.is_finite() { *p = min }
            }
            pad.values[fm.lat()] = 0.0;
            pad.values[fm.lon()] = 0.0;
        }
        debug!("pad vector {:?}", pad.values);
        pad
    }

    #[inline] pub fn len (&self)->usize { self.values.len() }
    #[inline] pub fn is_empty (&self)->bool { self.values.is_empty() }

    pub fn to_array (&self)->Array1<f32> { Array1::from_vec( self.values.clone()) }

    pub fn fill_nan (&self, flight: &mut Array2<f32>)->Result<()> {
        fill_nan( flight, &self.values)
    }

    /// is this row a pad row, i.e. has it the lat/lon of the pad vector
    #[inline]
    pub fn is_pad_row (&self, fm: &FeatureMap, row: ArrayView1<f32>)->bool {
        row[fm.lat()] == self.values[fm.lat()] && row[fm.lon()] == self.values[fm.lon()]
    }

    pub fn check_width (&self, fm: &FeatureMap)->Result<()> {
        if self.values.len() != fm.len() {
            Err( shape_error!("pad vector has {} values for {} features", self.values.len(), fm.len()))
        } else {
            Ok(())
        }
    }
}
