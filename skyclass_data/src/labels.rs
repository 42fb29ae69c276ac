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

//! the aircraft label table (icao24 → class code)

use std::{collections::HashMap, io::Read, path::Path, fs};
use tracing::warn;

use crate::errors::{Result, DataQualityIssue};

/// explicitly constructed label lookup. Merged labels are resolved at load time
#[derive(Debug,Clone,Default)]
pub struct LabelTable {
    labels: HashMap<String,i64>,
}

impl LabelTable {
    /// read `icao24,label` rows (no header). Rows with missing or non-numeric labels are ignored
    pub fn from_reader<R: Read> (rdr: R, merge_labels: &HashMap<i64,Vec<i64>>)->Result<Self> {
        let mut csv_rdr = csv::ReaderBuilder::new().has_headers(false).flexible(true).from_reader( rdr);
        let merge = invert_merge( merge_labels);

        let mut labels = HashMap::new();
        let mut n_invalid = 0;
        for rec in csv_rdr.records() {
            let rec = rec?;
            let (Some(icao24), Some(label)) = (rec.get(0), rec.get(1)) else { n_invalid += 1; continue };
            match label.trim().parse::<i64>() {
                Ok(label) => {
                    let label = merge.get( &label).copied().unwrap_or( label);
                    labels.insert( icao24.trim().to_lowercase(), label);
                }
                Err(_) => n_invalid += 1
            }
        }
        if n_invalid > 0 { warn!("ignored {n_invalid} label rows without valid label") }

        Ok( LabelTable { labels } )
    }

    pub fn from_path<P: AsRef<Path>> (path: P, merge_labels: &HashMap<i64,Vec<i64>>)->Result<Self> {
        LabelTable::from_reader( fs::File::open( path.as_ref())?, merge_labels)
    }

    pub fn from_pairs<I,S> (pairs: I, merge_labels: &HashMap<i64,Vec<i64>>)->Self where I: IntoIterator<Item=(S,i64)>, S: AsRef<str> {
        let merge = invert_merge( merge_labels);
        let labels = pairs.into_iter()
            .map( |(icao24,label)| (icao24.as_ref().to_lowercase(), merge.get( &label).copied().unwrap_or( label)))
            .collect();
        LabelTable { labels }
    }

    pub fn label_of (&self, icao24: &str)->std::result::Result<i64,DataQualityIssue> {
        self.labels.get( &icao24.trim().to_lowercase()).copied()
            .ok_or_else( || DataQualityIssue::Unlabeled{ icao24: icao24.to_string() })
    }

    /// label lookup that also applies an optional label filter
    pub fn filtered_label_of (&self, icao24: &str, filter: Option<&[i64]>)->std::result::Result<i64,DataQualityIssue> {
        let label = self.label_of( icao24)?;
        match filter {
            Some(keep) if !keep.contains( &label) => Err( DataQualityIssue::FilteredLabel{ label }),
            _ => Ok(label)
        }
    }

    #[inline] pub fn len (&self)->usize { self.labels.len() }
    #[inline] pub fn is_empty (&self)->bool { self.labels.is_empty() }
}

/// source label → merged target label
fn invert_merge (merge_labels: &HashMap<i64,Vec<i64>>)->HashMap<i64,i64> {
    let mut map = HashMap::new();
    for (target, sources) in merge_labels {
        for src in sources { map.insert( *src, *target); }
    }
    map
}
