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

/// slippy map (web mercator) tile coordinates, used to locate aircraft positions inside a
/// pre-rendered map image of the bounding box

use serde::{Serialize,Deserialize};
use crate::{GeoBox, PI};

/// fractional tile coordinates (x,y) of a lat/lon position for the given zoom level
pub fn deg2num (lat_deg: f64, lon_deg: f64, zoom: u32) -> (f64,f64) {
    let lat_rad = lat_deg.to_radians();
    let n = 2f64.powi( zoom as i32);
    let xtile = (lon_deg + 180.0) / 360.0 * n;
    let ytile = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;
    (xtile, ytile)
}

/// integral tile that contains the given position
pub fn deg2num_int (lat_deg: f64, lon_deg: f64, zoom: u32) -> (i64,i64) {
    let (x,y) = deg2num( lat_deg, lon_deg, zoom);
    (x as i64, y as i64)
}

/// (lat,lon) degrees of the north-west corner of a (fractional) tile coordinate
pub fn num2deg (xtile: f64, ytile: f64, zoom: u32) -> (f64,f64) {
    let n = 2f64.powi( zoom as i32);
    let lon_deg = xtile / n * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * ytile / n)).sinh().atan();
    (lat_rad.to_degrees(), lon_deg)
}

/// the pixel rectangle of a map image, upper bounds are exclusive
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub struct PixelWindow {
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64
}

/// the map image geometry: which box it covers, at what zoom level and with how many pixels per tile
#[derive(Debug,Clone,Copy,Serialize,Deserialize)]
pub struct MapGeometry {
    pub map_box: GeoBox,
    pub zoom: u32,
    pub tile_px: f64,
    pub width: i64,
    pub height: i64
}

impl MapGeometry {
    /// square `size` pixel window centered on the given position, shifted to stay inside the image
    pub fn map_window (&self, lat: f64, lon: f64, size: i64) -> PixelWindow {
        let (xmin, _) = deg2num_int( self.map_box.south, self.map_box.west, self.zoom);
        let (_, ymin) = deg2num_int( self.map_box.north, self.map_box.east, self.zoom);

        let (xc, yc) = deg2num( lat, lon, self.zoom);
        let xc = (xc - xmin as f64) * self.tile_px;
        let yc = (yc - ymin as f64) * self.tile_px;
        let half = size as f64 / 2.0;

        let (x_min, x_max) = clamp_span( (xc - half) as i64, (xc + half) as i64, size, self.width);
        let (y_min, y_max) = clamp_span( (yc - half) as i64, (yc + half) as i64, size, self.height);

        PixelWindow { x_min, x_max, y_min, y_max }
    }
}

fn clamp_span (lo: i64, hi: i64, size: i64, limit: i64) -> (i64,i64) {
    if lo < 0 { (0, size) }
    else if hi > limit { (limit - size, limit) }
    else { (lo, hi) }
}
