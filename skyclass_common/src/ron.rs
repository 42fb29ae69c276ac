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

/// module with utility functions for RON (de)serialization of config and parameter files

use std::{fs, path::Path};
use ron::ser::PrettyConfig;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use crate::errors::Result;

/// read and deserialize a RON file
pub fn from_path<T,P> (path: P)->Result<T> where T: DeserializeOwned, P: AsRef<Path> {
    debug!("reading {:?}", path.as_ref());
    let data = fs::read( path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

pub fn from_str<T> (s: &str)->Result<T> where T: DeserializeOwned {
    Ok( ron::from_str(s)? )
}

/// serialize into a pretty printed RON file, replacing existing files
pub fn to_path<T,P> (v: &T, path: P)->Result<()> where T: Serialize, P: AsRef<Path> {
    let s = ron::ser::to_string_pretty( v, PrettyConfig::new().compact_arrays(true))?;
    fs::write( path.as_ref(), s)?;
    debug!("saved {:?}", path.as_ref());
    Ok(())
}
