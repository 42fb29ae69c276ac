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

use std::ops::Sub;
use serde::{Serialize,Deserialize};

/// unit sphere cartesian coordinates. This is not ECEF - normalization only needs directions, which
/// also means all rotations are length preserving and exactly invertible (up to fp precision)
#[derive(Debug,Clone,Copy,Serialize,Deserialize,PartialEq)]
pub struct Cartesian3 {
    pub x: f64,
    pub y: f64,
    pub z: f64
}

impl Cartesian3 {
    pub fn new (x: f64, y: f64, z: f64)->Cartesian3 {
        Cartesian3{x,y,z}
    }

    /// x = cos(lon)·cos(lat), y = sin(lon)·cos(lat), z = sin(lat)
    pub fn from_lat_lon_degrees (lat: f64, lon: f64)->Cartesian3 {
        let φ = lat.to_radians();
        let λ = lon.to_radians();
        let cos_φ = φ.cos();

        Cartesian3 {
            x: λ.cos() * cos_φ,
            y: λ.sin() * cos_φ,
            z: φ.sin()
        }
    }

    /// inverse of `from_lat_lon_degrees`, returns (lat,lon) in degrees with lon in (-180,180]
    pub fn to_lat_lon_degrees (&self)->(f64,f64) {
        let z = self.z.clamp(-1.0, 1.0); // guard asin against accumulated rounding
        ( z.asin().to_degrees(), self.y.atan2(self.x).to_degrees() )
    }

    pub fn length(&self) -> f64 {
        ((self.x * self.x) + (self.y * self.y) + (self.z * self.z)).sqrt()
    }
}

/// rotations around the cartesian axes. Angles are in radians. Note the sign conventions of the
/// x and y rotations are inverted (they rotate by `-a`), which is what the normalization frame
/// expects: `rotate_z(-lon)` followed by `rotate_y(-lat)` maps (lat,lon) onto (0,0)
pub trait AxisRotation: Sized {
    fn rotate_x (&self, a: f64)->Self;
    fn rotate_y (&self, a: f64)->Self;
    fn rotate_z (&self, a: f64)->Self;
}

impl AxisRotation for Cartesian3 {
    fn rotate_x (&self, a: f64)->Self {
        let (sin_a, cos_a) = (-a).sin_cos();
        Cartesian3 {
            x: self.x,
            y: self.y * cos_a - self.z * sin_a,
            z: self.y * sin_a + self.z * cos_a
        }
    }

    fn rotate_y (&self, a: f64)->Self {
        let (sin_a, cos_a) = (-a).sin_cos();
        Cartesian3 {
            x: self.x * cos_a + self.z * sin_a,
            y: self.y,
            z: -self.x * sin_a + self.z * cos_a
        }
    }

    fn rotate_z (&self, a: f64)->Self {
        let (sin_a, cos_a) = a.sin_cos();
        Cartesian3 {
            x: self.x * cos_a - self.y * sin_a,
            y: self.x * sin_a + self.y * cos_a,
            z: self.z
        }
    }
}

// the vector form keeps the shape of its input
impl AxisRotation for Vec<Cartesian3> {
    fn rotate_x (&self, a: f64)->Self { self.iter().map( |p| p.rotate_x(a)).collect() }
    fn rotate_y (&self, a: f64)->Self { self.iter().map( |p| p.rotate_y(a)).collect() }
    fn rotate_z (&self, a: f64)->Self { self.iter().map( |p| p.rotate_z(a)).collect() }
}

#[inline]
pub fn spherical_to_cartesian (lat: f64, lon: f64)->Cartesian3 {
    Cartesian3::from_lat_lon_degrees( lat, lon)
}

#[inline]
pub fn cartesian_to_spherical (p: &Cartesian3)->(f64,f64) {
    p.to_lat_lon_degrees()
}

/// vector form of `spherical_to_cartesian`. Input slices have to be of same length
pub fn spherical_to_cartesian_all (lats: &[f64], lons: &[f64])->Vec<Cartesian3> {
    lats.iter().zip( lons.iter()).map( |(lat,lon)| Cartesian3::from_lat_lon_degrees( *lat, *lon)).collect()
}

/// vector form of `cartesian_to_spherical`, returns (lats,lons)
pub fn cartesian_to_spherical_all (ps: &[Cartesian3])->(Vec<f64>,Vec<f64>) {
    ps.iter().map( |p| p.to_lat_lon_degrees()).unzip()
}

impl std::fmt::Display for Cartesian3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ {}, {}, {} ]", self.x, self.y, self.z)
    }
}

impl Sub for Cartesian3 {
    type Output = Self;

    fn sub (self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z
        }
    }
}
