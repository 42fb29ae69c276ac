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

//! trajectory normalization: recentering and derotating windows into a canonical spherical frame.
//!
//! Positions are moved to unit sphere cartesian coordinates, rotated around z by the reference longitude,
//! around y by the reference latitude and finally around x by the reference rotation (which is also
//! applied to the track). The reference is either the center of the configured bounding box or the
//! last valid observation of the window (the origin)

use ndarray::{Array2, ArrayViewMut1};
use rand::Rng;
use serde::{Serialize,Deserialize};
use skyclass_common::{rad, angle::normalize_360};
use skyclass_common::cartesian3::{AxisRotation, spherical_to_cartesian, cartesian_to_spherical, spherical_to_cartesian_all, cartesian_to_spherical_all};

use crate::config::Context;
use crate::features::FeatureMap;
use crate::pad::PadVector;
use crate::errors::Result;

/// the reference observation of a window
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Origin {
    pub lat: f64,
    pub lon: f64,
    pub track: f64,
    pub timestamp: Option<f64>,
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Default)]
pub struct NormalizeOptions {
    pub relative_position: bool,
    pub relative_track: bool,
    /// random rotation, only to be used as training augmentation
    pub random_track: bool,
}

impl NormalizeOptions {
    pub fn training (ctx: &Context)->Self {
        let c = &ctx.config;
        NormalizeOptions { relative_position: c.relative_position, relative_track: c.relative_track, random_track: c.random_track }
    }

    /// same as training options but never randomized
    pub fn inference (ctx: &Context)->Self {
        NormalizeOptions { random_track: false, ..NormalizeOptions::training(ctx) }
    }
}

/// the resolved normalization transform. `lat`, `lon` are the negated reference position and `rot` the
/// rotation in degrees, all of which are needed to undo the normalization
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct ReferenceFrame {
    pub lat: f64,
    pub lon: f64,
    pub rot: f64,
    pub origin: Option<Origin>,
}

impl ReferenceFrame {
    pub fn new<R: Rng> (box_center: (f64,f64), origin: Origin, opts: NormalizeOptions, rng: &mut R)->Self {
        let (mut lat, mut lon) = (-box_center.0, -box_center.1);
        if opts.relative_position {
            lat = -origin.lat;
            lon = -origin.lon;
        }

        let rot = if opts.random_track {
            rng.random_range( 0.0..360.0)
        } else if opts.relative_track {
            -origin.track
        } else {
            0.0
        };

        ReferenceFrame { lat, lon, rot, origin: Some(origin) }
    }

    /// the bounding box centered frame without rotation
    pub fn fixed (box_center: (f64,f64))->Self {
        ReferenceFrame { lat: -box_center.0, lon: -box_center.1, rot: 0.0, origin: None }
    }

    pub fn normalize_position (&self, lat: f64, lon: f64)->(f64,f64) {
        let p = spherical_to_cartesian( lat, lon)
            .rotate_z( rad(self.lon))
            .rotate_y( rad(self.lat))
            .rotate_x( rad(self.rot));
        cartesian_to_spherical( &p)
    }

    pub fn undo_position (&self, lat: f64, lon: f64)->(f64,f64) {
        let p = spherical_to_cartesian( lat, lon)
            .rotate_x( rad(-self.rot))
            .rotate_y( rad(-self.lat))
            .rotate_z( rad(-self.lon));
        cartesian_to_spherical( &p)
    }

    #[inline] pub fn normalize_track (&self, track: f64)->f64 { normalize_360( track + self.rot) }
    #[inline] pub fn undo_track (&self, track: f64)->f64 { normalize_360( track - self.rot) }
}

/// normalize position and track arrays of equal length, returns (lats,lons,tracks)
pub fn normalize_trajectory (frame: &ReferenceFrame, lats: &[f64], lons: &[f64], tracks: &[f64])->(Vec<f64>,Vec<f64>,Vec<f64>) {
    let ps = spherical_to_cartesian_all( lats, lons)
        .rotate_z( rad(frame.lon))
        .rotate_y( rad(frame.lat))
        .rotate_x( rad(frame.rot));
    let (lats, lons) = cartesian_to_spherical_all( &ps);
    let tracks = tracks.iter().map( |t| frame.normalize_track(*t)).collect();
    (lats, lons, tracks)
}

/// exact inverse of [`normalize_trajectory`] for positions, returns (lats,lons)
pub fn undo_normalize_trajectory (frame: &ReferenceFrame, lats: &[f64], lons: &[f64])->(Vec<f64>,Vec<f64>) {
    let ps = spherical_to_cartesian_all( lats, lons)
        .rotate_x( rad(-frame.rot))
        .rotate_y( rad(-frame.lat))
        .rotate_z( rad(-frame.lon));
    cartesian_to_spherical_all( &ps)
}

fn origin_of (fm: &FeatureMap, row: &[f32])->Origin {
    Origin {
        lat: row[fm.lat()] as f64,
        lon: row[fm.lon()] as f64,
        track: row[fm.track()] as f64,
        timestamp: fm.timestamp().map( |i| row[i] as f64),
    }
}

fn normalize_row (fm: &FeatureMap, frame: &ReferenceFrame, mut row: ArrayViewMut1<f32>) {
    let (lat, lon) = frame.normalize_position( row[fm.lat()] as f64, row[fm.lon()] as f64);
    row[fm.lat()] = lat as f32;
    row[fm.lon()] = lon as f32;
    row[fm.track()] = frame.normalize_track( row[fm.track()] as f64) as f32;

    if let (Some(i), Some(ts)) = (fm.timestamp(), frame.origin.and_then( |o| o.timestamp)) {
        row[i] = (ts - row[i] as f64) as f32;
    }
}

/// normalize a window (and optionally rows past its end, e.g. a regression target) in place.
/// The origin is the last non-pad row of the window. Pad rows are not transformed, a window without
/// any non-pad row is left unchanged and `None` is returned.
/// Pad rows also keep their pad timestamp, they are not re-expressed relative to the origin
pub fn batch_preprocess<R: Rng> (ctx: &Context, window: &mut Array2<f32>, pad: &PadVector, opts: NormalizeOptions,
                                 rng: &mut R, post: Option<&mut Array2<f32>>)->Result<Option<ReferenceFrame>> {
    let fm = &ctx.feature_map;
    pad.check_width( fm)?;

    let is_pad: Vec<bool> = window.rows().into_iter().map( |r| pad.is_pad_row( fm, r)).collect();
    let Some(oi) = is_pad.iter().rposition( |p| !p) else { return Ok(None) };

    let origin_row = window.row(oi).to_vec();
    let frame = ReferenceFrame::new( ctx.box_center, origin_of( fm, &origin_row), opts, rng);

    for (row, p) in window.rows_mut().into_iter().zip( is_pad.iter()) {
        if !p { normalize_row( fm, &frame, row) }
    }

    if let Some(post) = post {
        for row in post.rows_mut() {
            if !pad.is_pad_row( fm, row.view()) { normalize_row( fm, &frame, row) }
        }
    }

    Ok( Some(frame) )
}
