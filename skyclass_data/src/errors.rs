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

use thiserror::Error;

pub type Result<T> = std::result::Result<T,SkyclassError>;

/// per-flight or per-sample problems. These are logged and the offending flight/sample is skipped
#[derive(Error,Debug,Clone,PartialEq)]
pub enum DataQualityIssue {
    #[error("flight too short: {len} rows, {required} required")]
    TooShort { len: usize, required: usize },

    #[error("NaN in position column {column}")]
    NanPosition { column: String },

    #[error("empty trace")]
    EmptyTrace,

    #[error("aircraft {icao24} not in label table")]
    Unlabeled { icao24: String },

    #[error("label {label} is filtered")]
    FilteredLabel { label: i64 },

    #[error("no valid sample found after {attempts} attempts")]
    SamplingExhausted { attempts: usize },
}

impl DataQualityIssue {
    pub fn kind (&self)->&'static str {
        use DataQualityIssue::*;
        match self {
            TooShort{..} => "too_short",
            NanPosition{..} => "nan_position",
            EmptyTrace => "empty_trace",
            Unlabeled{..} => "unlabeled",
            FilteredLabel{..} => "filtered_label",
            SamplingExhausted{..} => "sampling_exhausted",
        }
    }
}

#[derive(Error,Debug)]
pub enum SkyclassError {

    #[error("data quality issue: {0}")]
    DataQuality(DataQualityIssue),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("numeric integrity error: {0}")]
    NumericIntegrity(String),

    #[error("scaler not fitted: {0}")]
    NotFitted(String),

    #[error("shape error: {0}")]
    Shape(String),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("CSV error {0}")]
    CsvError( #[from] csv::Error),

    #[error("RON error {0}")]
    RonError( #[from] ron::Error),

    #[error("RON parse error {0}")]
    RonSpannedError( #[from] ron::error::SpannedError),

    #[error("array shape error {0}")]
    ShapeError( #[from] ndarray::ShapeError),

    #[error("common error {0}")]
    Common( #[from] skyclass_common::errors::SkyclassCommonError),
}

impl SkyclassError {
    /// data quality issues only affect a single flight or sample, everything else is fatal
    pub fn is_recoverable (&self)->bool {
        matches!( self, SkyclassError::DataQuality(_))
    }
}

impl From<DataQualityIssue> for SkyclassError {
    fn from (issue: DataQualityIssue)->Self { SkyclassError::DataQuality(issue) }
}

macro_rules! config_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        $crate::errors::SkyclassError::Configuration( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use config_error;

macro_rules! shape_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        $crate::errors::SkyclassError::Shape( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use shape_error;
