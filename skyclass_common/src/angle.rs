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
#![allow(unused)]

/// angle normalization for plain f64 degree values. We do not use new types here since all angles
/// of the preprocessing pipeline live in f32/f64 feature columns

#[inline]
pub fn normalize_360 (d: f64) -> f64 {
    let x = d % 360.0;
    if x < 0.0 { 360.0 + x } else { x }
}

/// signed minimal difference `b - a` in degrees, result is in (-180,180]
#[inline]
pub fn angle_difference (a: f64, b: f64) -> f64 {
    let diff = normalize_360(b) - normalize_360(a);

    if diff > 180.0 { diff - 360.0 }
    else if diff <= -180.0 { diff + 360.0 }
    else { diff }
}

/// element-wise relative heading of consecutive samples, first element is 0
pub fn relative_angles (angles: &[f64]) -> Vec<f64> {
    let mut rel = Vec::with_capacity( angles.len());
    if !angles.is_empty() {
        rel.push(0.0);
        for w in angles.windows(2) {
            rel.push( angle_difference( w[0], w[1]));
        }
    }
    rel
}
