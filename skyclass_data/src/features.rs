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

//! the feature vocabulary and the name → column resolution

use std::{collections::HashMap, fmt, str::FromStr};
use crate::table::RawColumn;
use crate::errors::{Result, SkyclassError, config_error};

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum Feature {
    Timestamp,
    Latitude,
    Longitude,
    Groundspeed,
    Track,
    VerticalRate,
    Onground,
    Alert,
    Spi,
    Squawk,
    Altitude,
    Geoaltitude,
    Day,
    Hour,
    Min,
    Sec,
    RelativeTrack,
    /// 1 for rows inserted to fill timestamp gaps, 0 for real observations
    Pad,
    /// capped great circle distance to the reference point with the given index
    RefDistance(usize),
}

const REF_DIST_PREFIX: &str = "ref_dist_";

impl Feature {
    /// the raw column this feature is directly taken from, if any
    pub fn raw_column (&self)->Option<RawColumn> {
        use Feature::*;
        match self {
            Timestamp => Some(RawColumn::Timestamp),
            Latitude => Some(RawColumn::Latitude),
            Longitude => Some(RawColumn::Longitude),
            Groundspeed => Some(RawColumn::Groundspeed),
            Track => Some(RawColumn::Track),
            VerticalRate => Some(RawColumn::VerticalRate),
            Onground => Some(RawColumn::Onground),
            Alert => Some(RawColumn::Alert),
            Spi => Some(RawColumn::Spi),
            Squawk => Some(RawColumn::Squawk),
            Altitude => Some(RawColumn::Altitude),
            Geoaltitude => Some(RawColumn::Geoaltitude),
            _ => None
        }
    }
}

impl FromStr for Feature {
    type Err = SkyclassError;

    fn from_str (s: &str)->Result<Self> {
        use Feature::*;
        let f = match s {
            "timestamp" => Timestamp,
            "latitude" => Latitude,
            "longitude" => Longitude,
            "groundspeed" => Groundspeed,
            "track" => Track,
            "vertical_rate" => VerticalRate,
            "onground" => Onground,
            "alert" => Alert,
            "spi" => Spi,
            "squawk" => Squawk,
            "altitude" => Altitude,
            "geoaltitude" => Geoaltitude,
            "day" => Day,
            "hour" => Hour,
            "min" => Min,
            "sec" => Sec,
            "relative_track" => RelativeTrack,
            "pad" => Pad,
            _ => {
                if let Some(idx) = s.strip_prefix( REF_DIST_PREFIX) {
                    let i = idx.parse::<usize>().map_err( |_| config_error!("invalid reference distance feature '{s}'"))?;
                    RefDistance(i)
                } else {
                    return Err( config_error!("unknown feature '{s}'"))
                }
            }
        };
        Ok(f)
    }
}

impl fmt::Display for Feature {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        use Feature::*;
        let s = match self {
            Day => "day",
            Hour => "hour",
            Min => "min",
            Sec => "sec",
            RelativeTrack => "relative_track",
            Pad => "pad",
            RefDistance(i) => return write!( f, "{REF_DIST_PREFIX}{i}"),
            other => match other.raw_column() {
                Some(col) => col.name(),
                None => "?"
            }
        };
        write!( f, "{s}")
    }
}

/// ordered feature list with resolved column indices. Constructed once per [`crate::config::Context`],
/// latitude, longitude and track are mandatory so their indices are cached
#[derive(Debug,Clone)]
pub struct FeatureMap {
    features: Vec<Feature>,
    index: HashMap<Feature,usize>,
    lat: usize,
    lon: usize,
    track: usize,
    timestamp: Option<usize>,
}

impl FeatureMap {
    pub fn new (features: Vec<Feature>)->Result<Self> {
        let mut index = HashMap::with_capacity( features.len());
        for (i,f) in features.iter().enumerate() {
            if index.insert( *f, i).is_some() {
                return Err( config_error!("duplicate feature '{f}'"))
            }
        }

        let required = |f: Feature| index.get( &f).copied().ok_or_else( || config_error!("required feature '{f}' missing"));
        let lat = required( Feature::Latitude)?;
        let lon = required( Feature::Longitude)?;
        let track = required( Feature::Track)?;
        let timestamp = index.get( &Feature::Timestamp).copied();

        Ok( FeatureMap { features, index, lat, lon, track, timestamp } )
    }

    pub fn from_names<S: AsRef<str>> (names: &[S])->Result<Self> {
        let features = names.iter().map( |s| s.as_ref().parse()).collect::<Result<Vec<Feature>>>()?;
        FeatureMap::new( features)
    }

    #[inline] pub fn len (&self)->usize { self.features.len() }
    #[inline] pub fn is_empty (&self)->bool { self.features.is_empty() }
    #[inline] pub fn features (&self)->&[Feature] { &self.features }

    #[inline] pub fn index_of (&self, f: Feature)->Option<usize> { self.index.get( &f).copied() }
    #[inline] pub fn has (&self, f: Feature)->bool { self.index.contains_key( &f) }

    #[inline] pub fn lat (&self)->usize { self.lat }
    #[inline] pub fn lon (&self)->usize { self.lon }
    #[inline] pub fn track (&self)->usize { self.track }
    #[inline] pub fn timestamp (&self)->Option<usize> { self.timestamp }

    pub fn names (&self)->Vec<String> {
        self.features.iter().map( |f| f.to_string()).collect()
    }
}
