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

//! fit-once feature scalers.
//!
//! All scalers follow the same life cycle: they are created unfitted, get fitted exactly once (either
//! explicitly or lazily by the first [`Scaler::transform`] call) and are read-only afterwards. A second
//! `fit` is a no-op. Array scalers compute their statistics per feature (the last axis) jointly over all
//! other axes, ignoring NaN values

use std::path::Path;
use itertools::Itertools;
use ndarray::{Array, Array2, ArrayView1, Axis, Dimension};
use serde::{Serialize, Deserialize, de::DeserializeOwned};

use crate::errors::{Result, SkyclassError, shape_error};

pub trait Fitted {
    fn is_fitted (&self)->bool;
}

pub trait Scaler<In: ?Sized>: Fitted {
    type Output;

    /// compute the scaler parameters. Does nothing if the scaler is already fitted
    fn fit (&mut self, x: &In)->Result<()>;

    /// apply the fitted parameters. Fails with `NotFitted` if called before `fit`
    fn apply (&self, x: &In)->Result<Self::Output>;

    /// lazily fit on the first call, then apply
    fn transform (&mut self, x: &In)->Result<Self::Output> {
        self.fit( x)?;
        self.apply( x)
    }
}

fn not_fitted (name: &str)->SkyclassError {
    SkyclassError::NotFitted( name.to_string())
}

fn n_features<D: Dimension> (x: &Array<f32,D>)->Result<usize> {
    if x.ndim() == 0 { return Err( shape_error!("scalar arrays have no feature axis")) }
    Ok( x.shape()[x.ndim()-1])
}

/// per feature (min,max,sum,sum²,count) over all non-NaN values
fn feature_stats<D: Dimension> (x: &Array<f32,D>)->Result<Vec<(f64,f64,f64,f64,usize)>> {
    let nf = n_features( x)?;
    let mut stats = vec![(f64::INFINITY, f64::NEG_INFINITY, 0.0, 0.0, 0usize); nf];
    let last = Axis( x.ndim()-1);
    for lane in x.lanes( last) {
        for (j,v) in lane.iter().enumerate() {
            if !v.is_nan() {
                let v = *v as f64;
                let s = &mut stats[j];
                if v < s.0 { s.0 = v }
                if v > s.1 { s.1 = v }
                s.2 += v;
                s.3 += v*v;
                s.4 += 1;
            }
        }
    }
    Ok(stats)
}

/// map every feature value through `f(feature_index, value)`
fn map_features<D,F> (x: &Array<f32,D>, n: usize, f: F)->Result<Array<f32,D>>
    where D: Dimension, F: Fn(usize,f32)->f32
{
    let nf = n_features( x)?;
    if nf != n { return Err( shape_error!("expected {n} features, got {nf}")) }

    let mut y = x.clone();
    let last = Axis( y.ndim()-1);
    for mut lane in y.lanes_mut( last) {
        for (j,v) in lane.iter_mut().enumerate() {
            *v = f( j, *v);
        }
    }
    Ok(y)
}

/* #region MinMaxScaler ***********************************************************************************/

/// scales each feature into [0,1]. Features with zero range (or no values) are left unscaled
#[derive(Debug,Clone,Default,Serialize,Deserialize,PartialEq)]
pub struct MinMaxScaler {
    pub mins: Vec<f32>,
    pub maxs: Vec<f32>,
}

impl MinMaxScaler {
    pub fn new ()->Self { MinMaxScaler::default() }

    #[inline]
    fn has_range (&self, j: usize)->bool { self.maxs[j] > self.mins[j] }

    pub fn inverse_transform<D: Dimension> (&self, x: &Array<f32,D>)->Result<Array<f32,D>> {
        if !self.is_fitted() { return Err( not_fitted("MinMaxScaler")) }
        map_features( x, self.mins.len(), |j,v| {
            if self.has_range(j) { v * (self.maxs[j] - self.mins[j]) + self.mins[j] } else { v }
        })
    }
}

impl Fitted for MinMaxScaler {
    fn is_fitted (&self)->bool { !self.mins.is_empty() }
}

impl<D: Dimension> Scaler<Array<f32,D>> for MinMaxScaler {
    type Output = Array<f32,D>;

    fn fit (&mut self, x: &Array<f32,D>)->Result<()> {
        if self.is_fitted() { return Ok(()) }

        let stats = feature_stats( x)?;
        self.mins = stats.iter().map( |s| if s.4 > 0 { s.0 as f32 } else { 0.0 }).collect();
        self.maxs = stats.iter().map( |s| if s.4 > 0 { s.1 as f32 } else { 0.0 }).collect();
        Ok(())
    }

    fn apply (&self, x: &Array<f32,D>)->Result<Array<f32,D>> {
        if !self.is_fitted() { return Err( not_fitted("MinMaxScaler")) }
        map_features( x, self.mins.len(), |j,v| {
            if self.has_range(j) { (v - self.mins[j]) / (self.maxs[j] - self.mins[j]) } else { v }
        })
    }
}

/* #endregion MinMaxScaler */

/* #region StandardScaler *********************************************************************************/

/// zero mean, unit variance per feature. Features with zero variance are left unscaled
#[derive(Debug,Clone,Default,Serialize,Deserialize,PartialEq)]
pub struct StandardScaler {
    pub means: Vec<f32>,
    pub stds: Vec<f32>,
}

impl StandardScaler {
    pub fn new ()->Self { StandardScaler::default() }

    #[inline]
    fn has_spread (&self, j: usize)->bool { self.stds[j] > 0.0 }

    pub fn inverse_transform<D: Dimension> (&self, x: &Array<f32,D>)->Result<Array<f32,D>> {
        if !self.is_fitted() { return Err( not_fitted("StandardScaler")) }
        map_features( x, self.means.len(), |j,v| {
            if self.has_spread(j) { v * self.stds[j] + self.means[j] } else { v }
        })
    }
}

impl Fitted for StandardScaler {
    fn is_fitted (&self)->bool { !self.means.is_empty() }
}

impl<D: Dimension> Scaler<Array<f32,D>> for StandardScaler {
    type Output = Array<f32,D>;

    fn fit (&mut self, x: &Array<f32,D>)->Result<()> {
        if self.is_fitted() { return Ok(()) }

        let stats = feature_stats( x)?;
        let mut means = Vec::with_capacity( stats.len());
        let mut stds = Vec::with_capacity( stats.len());
        for (_,_,sum,sum2,n) in stats {
            if n > 0 {
                let mean = sum / n as f64;
                let var = (sum2 / n as f64 - mean * mean).max(0.0);
                means.push( mean as f32);
                stds.push( var.sqrt() as f32);
            } else {
                means.push( 0.0);
                stds.push( 0.0);
            }
        }
        self.means = means;
        self.stds = stds;
        Ok(())
    }

    fn apply (&self, x: &Array<f32,D>)->Result<Array<f32,D>> {
        if !self.is_fitted() { return Err( not_fitted("StandardScaler")) }
        map_features( x, self.means.len(), |j,v| {
            if self.has_spread(j) { (v - self.means[j]) / self.stds[j] } else { v }
        })
    }
}

/* #endregion StandardScaler */

/* #region SigmoidScaler2D ********************************************************************************/

/// logistic squashing of bounded 2-D regression targets (sample × feature). Each feature is centered on
/// the middle of its fitted range and scaled by the half range, so the fitted range maps to
/// [σ(-1), σ(1)] and values outside of it still stay within (0,1)
#[derive(Debug,Clone,Default,Serialize,Deserialize,PartialEq)]
pub struct SigmoidScaler2D {
    pub centers: Vec<f32>,
    pub scales: Vec<f32>,
}

impl SigmoidScaler2D {
    pub fn new ()->Self { SigmoidScaler2D::default() }

    pub fn inverse_transform (&self, y: &Array2<f32>)->Result<Array2<f32>> {
        if !self.is_fitted() { return Err( not_fitted("SigmoidScaler2D")) }
        map_features( y, self.centers.len(), |j,v| {
            let v = (v as f64).clamp( f64::EPSILON, 1.0 - f64::EPSILON);
            let logit = (v / (1.0 - v)).ln();
            (self.centers[j] as f64 + logit * self.scales[j] as f64) as f32
        })
    }
}

impl Fitted for SigmoidScaler2D {
    fn is_fitted (&self)->bool { !self.centers.is_empty() }
}

impl Scaler<Array2<f32>> for SigmoidScaler2D {
    type Output = Array2<f32>;

    fn fit (&mut self, x: &Array2<f32>)->Result<()> {
        if self.is_fitted() { return Ok(()) }

        let stats = feature_stats( x)?;
        self.centers = stats.iter().map( |s| if s.4 > 0 { ((s.0 + s.1) / 2.0) as f32 } else { 0.0 }).collect();
        self.scales = stats.iter().map( |s| {
            let half = (s.1 - s.0) / 2.0;
            if s.4 > 0 && half > 0.0 { half as f32 } else { 1.0 }
        }).collect();
        Ok(())
    }

    fn apply (&self, x: &Array2<f32>)->Result<Array2<f32>> {
        if !self.is_fitted() { return Err( not_fitted("SigmoidScaler2D")) }
        map_features( x, self.centers.len(), |j,v| {
            let z = (v as f64 - self.centers[j] as f64) / self.scales[j] as f64;
            (1.0 / (1.0 + (-z).exp())) as f32
        })
    }
}

/* #endregion SigmoidScaler2D */

/* #region SparseLabelBinarizer ***************************************************************************/

/// one-hot encoder for arbitrary (non contiguous) integer label codes
#[derive(Debug,Clone,Default,Serialize,Deserialize,PartialEq)]
pub struct SparseLabelBinarizer {
    /// sorted distinct label codes seen during fit
    pub classes_: Vec<i64>,
}

impl SparseLabelBinarizer {
    pub fn new ()->Self { SparseLabelBinarizer::default() }

    #[inline] pub fn n_classes (&self)->usize { self.classes_.len() }

    /// column of the given label code in transformed rows
    pub fn class_index (&self, label: i64)->Option<usize> {
        self.classes_.binary_search( &label).ok()
    }

    /// one-hot row of a single label, all zero for unknown labels
    pub fn encode (&self, label: i64)->Vec<f32> {
        let mut row = vec![0.0; self.classes_.len()];
        if let Some(i) = self.class_index( label) { row[i] = 1.0; }
        row
    }

    /// label of the arg-max column
    pub fn decode (&self, row: ArrayView1<f32>)->Option<i64> {
        row.iter().enumerate()
            .fold( None, |acc: Option<(usize,f32)>, (i,v)| match acc {
                Some((_,m)) if !(*v > m) => acc,
                _ => Some((i,*v))
            })
            .and_then( |(i,_)| self.classes_.get(i).copied())
    }

    pub fn inverse_transform (&self, y: &Array2<f32>)->Result<Vec<i64>> {
        if !self.is_fitted() { return Err( not_fitted("SparseLabelBinarizer")) }
        if y.ncols() != self.classes_.len() {
            return Err( shape_error!("expected {} classes, got {}", self.classes_.len(), y.ncols()))
        }
        Ok( y.rows().into_iter().filter_map( |row| self.decode( row)).collect() )
    }
}

impl Fitted for SparseLabelBinarizer {
    fn is_fitted (&self)->bool { !self.classes_.is_empty() }
}

impl Scaler<[i64]> for SparseLabelBinarizer {
    type Output = Array2<f32>;

    fn fit (&mut self, labels: &[i64])->Result<()> {
        if self.is_fitted() { return Ok(()) }
        self.classes_ = labels.iter().copied().sorted().dedup().collect();
        Ok(())
    }

    fn apply (&self, labels: &[i64])->Result<Array2<f32>> {
        if !self.is_fitted() { return Err( not_fitted("SparseLabelBinarizer")) }
        let mut y = Array2::<f32>::zeros( (labels.len(), self.classes_.len()));
        for (i,label) in labels.iter().enumerate() {
            if let Some(j) = self.class_index( *label) { y[[i,j]] = 1.0; }
        }
        Ok(y)
    }
}

/* #endregion SparseLabelBinarizer */

/// replace NaN values by the pad value of their feature (last axis)
pub fn fill_nan<D: Dimension> (x: &mut Array<f32,D>, pad: &[f32])->Result<()> {
    let nf = n_features( x)?;
    if nf != pad.len() { return Err( shape_error!("expected {} features, got {nf}", pad.len())) }

    let last = Axis( x.ndim()-1);
    for mut lane in x.lanes_mut( last) {
        for (v,p) in lane.iter_mut().zip( pad.iter()) {
            if v.is_nan() { *v = *p }
        }
    }
    Ok(())
}

/// store fitted parameters (scalers, pad vectors) as RON
pub fn save_ron<T: Serialize, P: AsRef<Path>> (v: &T, path: P)->Result<()> {
    Ok( skyclass_common::ron::to_path( v, path)? )
}

pub fn load_ron<T: DeserializeOwned, P: AsRef<Path>> (path: P)->Result<T> {
    Ok( skyclass_common::ron::from_path( path)? )
}
