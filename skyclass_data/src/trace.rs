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

//! reading raw per-flight ADS-B trace files (CSV with a header line)

use std::{fs, path::{Path,PathBuf}};
use serde::{Deserialize, Deserializer};

use crate::table::{RawColumn, RawRow, TimeTable, RAW_COLUMNS};
use crate::errors::{Result, DataQualityIssue};

/// one raw message as it is stored in trace files. Missing values are mapped to NaN by [`RawObservation::to_row`]
#[derive(Debug,Clone,Default,Deserialize)]
pub struct RawObservation {
    pub timestamp: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub groundspeed: Option<f64>,
    pub track: Option<f64>,
    pub vertical_rate: Option<f64>,
    #[serde(default, deserialize_with = "de_flag")]
    pub onground: Option<bool>,
    #[serde(default, deserialize_with = "de_flag")]
    pub alert: Option<bool>,
    #[serde(default, deserialize_with = "de_flag")]
    pub spi: Option<bool>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub squawk: Option<f64>,
    pub altitude: Option<f64>,
    pub geoaltitude: Option<f64>,
    pub icao24: String,
    #[serde(default)]
    pub callsign: Option<String>,
}

/// accepts true/false in any case and 0/1, empty fields are None
fn de_flag<'de,D> (deserializer: D)->std::result::Result<Option<bool>,D::Error> where D: Deserializer<'de> {
    let s: Option<String> = Option::deserialize( deserializer)?;
    Ok( s.and_then( |s| match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" => Some(true),
        "false" | "0" | "0.0" => Some(false),
        _ => None
    }))
}

/// numeric field that might also hold non-numeric text, which is mapped to None
fn de_lenient_f64<'de,D> (deserializer: D)->std::result::Result<Option<f64>,D::Error> where D: Deserializer<'de> {
    let s: Option<String> = Option::deserialize( deserializer)?;
    Ok( s.and_then( |s| s.trim().parse::<f64>().ok()))
}

#[inline]
fn num (v: Option<f64>)->f64 { v.unwrap_or( f64::NAN) }

#[inline]
fn flag (v: Option<bool>)->f64 {
    match v {
        Some(true) => 1.0,
        Some(false) => 0.0,
        None => f64::NAN
    }
}

impl RawObservation {
    pub fn to_row (&self)->RawRow {
        let mut row = [f64::NAN; RAW_COLUMNS];
        row[RawColumn::Timestamp.idx()] = self.timestamp;
        row[RawColumn::Latitude.idx()] = num( self.latitude);
        row[RawColumn::Longitude.idx()] = num( self.longitude);
        row[RawColumn::Groundspeed.idx()] = num( self.groundspeed);
        row[RawColumn::Track.idx()] = num( self.track);
        row[RawColumn::VerticalRate.idx()] = num( self.vertical_rate);
        row[RawColumn::Onground.idx()] = flag( self.onground);
        row[RawColumn::Alert.idx()] = flag( self.alert);
        row[RawColumn::Spi.idx()] = flag( self.spi);
        row[RawColumn::Squawk.idx()] = num( self.squawk);
        row[RawColumn::Altitude.idx()] = num( self.altitude);
        row[RawColumn::Geoaltitude.idx()] = num( self.geoaltitude);
        row
    }
}

/// the rows of one trace file plus its aircraft identification
#[derive(Debug,Clone)]
pub struct RawTrace {
    pub icao24: String,
    pub callsign: Option<String>,
    pub table: TimeTable,
}

/// sorted list of `*.csv` files in `dir`, truncated to `limit` entries
pub fn list_flights<P: AsRef<Path>> (dir: P, limit: Option<usize>)->Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir( dir.as_ref())?
        .filter_map( |e| e.ok())
        .map( |e| e.path())
        .filter( |p| p.is_file() && p.extension().map( |x| x == "csv").unwrap_or(false))
        .collect();
    files.sort();

    if let Some(limit) = limit { files.truncate( limit); }
    Ok(files)
}

pub fn read_observations<R: std::io::Read> (rdr: R)->Result<Vec<RawObservation>> {
    let mut csv_rdr = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader( rdr);
    let mut obs = Vec::new();
    for rec in csv_rdr.deserialize() {
        obs.push( rec?);
    }
    Ok(obs)
}

/// read a trace file into a timestamp ordered table. The aircraft id is taken from the first message
pub fn read_trajectory<P: AsRef<Path>> (path: P)->Result<RawTrace> {
    let file = fs::File::open( path.as_ref())?;
    let obs = read_observations( file)?;
    trace_from_observations( obs)
}

pub fn trace_from_observations (obs: Vec<RawObservation>)->Result<RawTrace> {
    let first = obs.first().ok_or( DataQualityIssue::EmptyTrace)?;
    let icao24 = first.icao24.clone();
    let callsign = first.callsign.clone();

    let table = TimeTable::from_rows( obs.iter().map( |o| o.to_row()));
    if table.is_empty() { return Err( DataQualityIssue::EmptyTrace.into()) }

    Ok( RawTrace { icao24, callsign, table } )
}
