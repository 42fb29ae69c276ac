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

//! typed data pipeline configuration.
//! [`DataConfig`] is what gets deserialized from RON files, [`Context`] is the validated and resolved
//! version of it that is passed into every pipeline function

use std::{collections::HashMap, path::Path};
use serde::{Serialize,Deserialize};
use skyclass_common::GeoBox;

use crate::features::{Feature, FeatureMap};
use crate::errors::{Result, config_error};

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum Task {
    /// aircraft type classification, one label per flight
    Classification,
    /// regression of the position `horizon` seconds ahead
    Trajectory
}

/// how timestamp gaps in raw traces are handled
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum InputPadding {
    /// keep observations as they are, reject flights with missing positions
    Valid,
    /// dense per-second rows, gaps stay NaN until they get replaced by pad values
    Zero,
    /// dense per-second rows, gaps are filled with the last observation
    Last
}

/// how the per-feature pad values are computed
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum PadPolicy {
    Zero,
    /// global minimum of each feature over the loaded flights (lat/lon stay 0)
    Min
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct ReferencePoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub task: Task,
    pub used_features: Vec<String>,
    pub input_padding: InputPadding,
    pub pad_policy: PadPolicy,

    pub history: usize,
    pub dilation_rate: usize,
    pub horizon: usize,

    pub test_ratio: f64,
    pub nb_batch: usize,
    pub batch_size: usize,
    pub max_batch_size: usize,
    pub train_window: usize,
    pub step: usize,
    pub training_noise: f64,

    pub relative_position: bool,
    pub relative_track: bool,
    pub random_track: bool,

    pub bounding_box: GeoBox,
    pub reference_points: Vec<ReferencePoint>,
    pub max_distance_km: f64,

    pub merge_labels: HashMap<i64,Vec<i64>>,
    pub label_filter: Option<Vec<i64>>,

    pub max_resample_attempts: usize,
    pub min_step_distance_km: f64,
    pub max_step_distance_km: f64,

    pub hour_offset: i64,
    pub flight_limit: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for DataConfig {
    fn default()->Self {
        let used_features = [
            "latitude", "longitude", "groundspeed", "track", "vertical_rate", "onground",
            "alert", "spi", "squawk", "altitude", "geoaltitude"
        ].iter().map(|s| s.to_string()).collect();

        let merge_labels = HashMap::from([
            (2, vec![1, 2, 3, 4]),
            (6, vec![5, 6, 7, 8, 10]),
            (9, vec![9]),
            (11, vec![11]),
        ]);

        DataConfig {
            task: Task::Classification,
            used_features,
            input_padding: InputPadding::Valid,
            pad_policy: PadPolicy::Zero,
            history: 64,
            dilation_rate: 2,
            horizon: 0,
            test_ratio: 0.1,
            nb_batch: 32,
            batch_size: 128,
            max_batch_size: 1024,
            train_window: 8,
            step: 2,
            training_noise: 0.0,
            relative_position: false,
            relative_track: false,
            random_track: false,
            bounding_box: GeoBox::new( 43.11581, 0.72561, 44.07449, 2.16344),
            reference_points: default_reference_points(),
            max_distance_km: 50.0,
            merge_labels,
            label_filter: None,
            max_resample_attempts: 10_000,
            min_step_distance_km: 1.0,
            max_step_distance_km: 200.0,
            hour_offset: 1,
            flight_limit: None,
            seed: None,
        }
    }
}

fn default_reference_points ()->Vec<ReferencePoint> {
    [ ("LFBO", 43.6294, 1.3678),  // Toulouse-Blagnac
      ("LFBF", 43.5456, 1.3675),  // Toulouse-Francazal
      ("LFCL", 43.5861, 1.4992),  // Toulouse-Lasbordes
      ("LFBR", 43.4489, 1.2633) ] // Muret-Lherm
        .iter()
        .map( |(name,lat,lon)| ReferencePoint { name: name.to_string(), lat: *lat, lon: *lon })
        .collect()
}

/// the validated configuration. Construction fails if the config has conflicting or out-of-range values
#[derive(Debug,Clone)]
pub struct Context {
    pub config: DataConfig,
    pub feature_map: FeatureMap,
    /// number of rows of a window after dilation
    pub input_len: usize,
    pub box_center: (f64,f64),
}

impl Context {
    pub fn new (config: DataConfig)->Result<Self> {
        let c = &config;

        if c.dilation_rate < 1 { return Err( config_error!("dilation_rate has to be >= 1")) }
        if c.history < c.dilation_rate {
            return Err( config_error!("history {} shorter than dilation_rate {}", c.history, c.dilation_rate))
        }
        if c.history % c.dilation_rate != 0 {
            return Err( config_error!("history {} not a multiple of dilation_rate {}", c.history, c.dilation_rate))
        }
        if !(0.0..=1.0).contains( &c.training_noise) {
            return Err( config_error!("training_noise {} outside [0,1]", c.training_noise))
        }
        if !(0.0..1.0).contains( &c.test_ratio) {
            return Err( config_error!("test_ratio {} outside [0,1)", c.test_ratio))
        }
        if c.task == Task::Trajectory && c.horizon < 1 {
            return Err( config_error!("trajectory task requires horizon >= 1"))
        }
        if c.relative_track && c.random_track {
            return Err( config_error!("relative_track and random_track are mutually exclusive"))
        }
        if c.batch_size == 0 || c.nb_batch == 0 || c.max_batch_size == 0 {
            return Err( config_error!("batch sizes have to be > 0"))
        }
        if c.train_window == 0 || c.step == 0 {
            return Err( config_error!("train_window and step have to be > 0"))
        }
        if c.max_resample_attempts == 0 {
            return Err( config_error!("max_resample_attempts has to be > 0"))
        }
        if !(c.min_step_distance_km < c.max_step_distance_km) {
            return Err( config_error!("invalid step distance range [{},{}]", c.min_step_distance_km, c.max_step_distance_km))
        }
        if !c.bounding_box.is_valid() {
            return Err( config_error!("invalid bounding box {:?}", c.bounding_box))
        }

        let features = c.used_features.iter()
            .map( |s| s.parse::<Feature>())
            .collect::<Result<Vec<Feature>>>()?;

        for f in &features {
            if let Feature::RefDistance(i) = f {
                if *i >= c.reference_points.len() {
                    return Err( config_error!("{f} refers to undefined reference point (have {})", c.reference_points.len()))
                }
            }
        }
        let feature_map = FeatureMap::new( features)?;

        // sample locations are validated against elapsed seconds between t and t+horizon
        if c.task == Task::Trajectory && feature_map.timestamp().is_none() {
            return Err( config_error!("trajectory task requires the timestamp feature"))
        }

        let input_len = c.history / c.dilation_rate;
        let box_center = c.bounding_box.center();

        Ok( Context { config, feature_map, input_len, box_center } )
    }

    pub fn from_path<P: AsRef<Path>> (path: P)->Result<Self> {
        let config: DataConfig = skyclass_common::ron::from_path( path)?;
        Context::new( config)
    }

    #[inline] pub fn features_in (&self)->usize { self.feature_map.len() }

    /// output width for the trajectory task (lat,lon), classification gets it from the fitted label binarizer
    #[inline] pub fn trajectory_features_out (&self)->usize { 2 }

    pub fn reference_coords (&self)->Vec<(f64,f64)> {
        self.config.reference_points.iter().map( |p| (p.lat, p.lon)).collect()
    }
}
