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

/// great circle distances on top of the [geo](https://docs.rs/geo/latest/geo/index.html) crate, with
/// [uom](https://docs.rs/uom/latest/uom/) lengths as results

use geo::{Distance, Haversine, Point};
use uom::si::f64::Length;
use uom::si::length::{kilometer, meter};

use crate::geo_constants::{PAD_SENTINEL_LAT, PAD_SENTINEL_LON};

/// haversine distance between two (lat,lon) degree positions
pub fn haversine_distance (lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Length {
    // note geo points use x=lon, y=lat order
    let p1 = Point::new( lon1, lat1);
    let p2 = Point::new( lon2, lat2);
    Length::new::<meter>( Haversine.distance( p1, p2))
}

/// distances from one position to a set of reference points in km, capped at `max_km`
pub fn capped_distances_km (lat: f64, lon: f64, refs: &[(f64,f64)], max_km: f64) -> Vec<f64> {
    refs.iter().map( |(rlat,rlon)| {
        let d = haversine_distance( lat, lon, *rlat, *rlon).get::<kilometer>();
        d.clamp( 0.0, max_km) // NaN positions stay NaN
    }).collect()
}

#[inline]
pub fn is_pad_sentinel (lat: f64, lon: f64)->bool {
    lat == PAD_SENTINEL_LAT && lon == PAD_SENTINEL_LON
}
