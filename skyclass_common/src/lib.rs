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
#![allow(unused,uncommon_codepoints)]

use std::f64::consts::{PI as STD_PI};
use serde::{Serialize,Deserialize};
use tracing_subscriber::EnvFilter;

pub mod errors;
pub mod macros;
pub mod collections;
pub mod angle;
pub mod geo_constants;
pub mod cartesian3;
pub mod geo;
pub mod tiles;
pub mod ron;

#[inline(always)] pub fn rad(x:f64)->f64 { x.to_radians() }

/// a geographic box in degrees, used for the fixed normalization frame and the map image extent
#[derive(Debug,Copy,Clone,Serialize,Deserialize,PartialEq)]
pub struct GeoBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64
}

impl GeoBox {
    pub fn new (south: f64, west: f64, north: f64, east: f64)->Self {
        GeoBox{ south, west, north, east }
    }

    /// (lat,lon) of the box center
    pub fn center (&self) -> (f64,f64) {
        ( (self.south + self.north) / 2.0, (self.west + self.east) / 2.0 )
    }

    pub fn is_valid (&self)->bool {
        self.south < self.north && self.west < self.east
            && self.south >= -90.0 && self.north <= 90.0
            && self.west >= -180.0 && self.east <= 180.0
    }
}

/// install a global fmt subscriber that is controlled by RUST_LOG.
/// Note this only succeeds if there is no global subscriber set yet, subsequent calls are ignored
pub fn init_tracing () {
    let _ = tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())
        .try_init();
}

pub const PI: f64 = STD_PI;
