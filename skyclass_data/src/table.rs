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

//! the sorted time table that holds raw observations of a single aircraft

use strum::{EnumCount, EnumIter, IntoStaticStr};

/// fixed column layout of raw observation rows
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,EnumCount,EnumIter,IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RawColumn {
    Timestamp = 0,
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
}

pub const RAW_COLUMNS: usize = RawColumn::COUNT;

pub type RawRow = [f64; RAW_COLUMNS];

impl RawColumn {
    #[inline] pub fn idx (self)->usize { self as usize }
    pub fn name (self)->&'static str { self.into() }
}

/// raw rows ordered by timestamp, with at most one row per timestamp.
/// Lookup and insertion are binary searches on the timestamp column
#[derive(Debug,Clone,Default)]
pub struct TimeTable {
    rows: Vec<RawRow>
}

impl TimeTable {
    pub fn new ()->Self { TimeTable { rows: Vec::new() } }

    pub fn with_capacity (cap: usize)->Self { TimeTable { rows: Vec::with_capacity(cap) } }

    /// build from unordered rows. Rows with NaN timestamps are dropped, duplicate timestamps keep the later row
    pub fn from_rows<I> (rows: I)->Self where I: IntoIterator<Item=RawRow> {
        let mut table = TimeTable::new();
        for row in rows {
            if !row[0].is_nan() { table.set( row); }
        }
        table
    }

    #[inline]
    fn find (&self, ts: f64)->std::result::Result<usize,usize> {
        self.rows.binary_search_by( |r| r[0].total_cmp( &ts))
    }

    /// insert row if there is none for its timestamp yet. Returns false if there already was one
    pub fn add (&mut self, row: RawRow)->bool {
        match self.find( row[0]) {
            Ok(_) => false,
            Err(i) => { self.rows.insert( i, row); true }
        }
    }

    /// insert or replace the row for its timestamp
    pub fn set (&mut self, row: RawRow) {
        match self.find( row[0]) {
            Ok(i) => self.rows[i] = row,
            Err(i) => self.rows.insert( i, row)
        }
    }

    pub fn get (&self, ts: f64)->Option<&RawRow> {
        self.find( ts).ok().map( |i| &self.rows[i])
    }

    pub fn remove (&mut self, ts: f64)->Option<RawRow> {
        self.find( ts).ok().map( |i| self.rows.remove(i))
    }

    /// copy of all rows up to (including) the given timestamp
    pub fn subset (&self, until: f64)->TimeTable {
        let end = match self.find( until) {
            Ok(i) => i+1,
            Err(i) => i
        };
        TimeTable { rows: self.rows[..end].to_vec() }
    }

    /// the last n rows (or all if there are fewer)
    pub fn tail (&self, n: usize)->TimeTable {
        let start = self.rows.len().saturating_sub(n);
        TimeTable { rows: self.rows[start..].to_vec() }
    }

    #[inline] pub fn len (&self)->usize { self.rows.len() }
    #[inline] pub fn is_empty (&self)->bool { self.rows.is_empty() }
    #[inline] pub fn rows (&self)->&[RawRow] { &self.rows }
    #[inline] pub fn first (&self)->Option<&RawRow> { self.rows.first() }
    #[inline] pub fn last (&self)->Option<&RawRow> { self.rows.last() }

    pub fn column (&self, col: RawColumn)->Vec<f64> {
        self.rows.iter().map( |r| r[col.idx()]).collect()
    }

    pub fn start_time (&self)->Option<f64> { self.first().map( |r| r[0]) }
    pub fn end_time (&self)->Option<f64> { self.last().map( |r| r[0]) }
}
