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

/// common geodetic constants that should be consistent through the pipeline

/// mean earth radius in meters
pub const MEAN_EARTH_RADIUS: f64 = 6371000.0; 

/// the lat/lon value that marks padded or missing positions
pub const PAD_SENTINEL_LAT: f64 = 0.0;
pub const PAD_SENTINEL_LON: f64 = 0.0;

/// degrees tolerance we use for spherical round trips
pub const ROUND_TRIP_EPSILON: f64 = 1e-6;
