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

//! ADS-B trajectory preprocessing: converts raw per-flight traces into fixed shape, normalized and
//! scaled window tensors for aircraft classification and trajectory regression models.
//!
//! The data flow is
//! ```text
//!   trace file → TimeTable → feature matrix (Flight) → PadVector (over all flights)
//!     → window slice → trajectory normalization → scalers → batch tensors
//! ```
//! Everything is configured through a validated [`config::Context`] that is passed into each step

pub mod errors;
pub mod config;
pub mod features;
pub mod table;
pub mod trace;
pub mod extraction;
pub mod pad;
pub mod window;
pub mod normalize;
pub mod scalers;
pub mod labels;
pub mod dataset;
pub mod batches;
pub mod streaming;

pub use errors::{Result, SkyclassError, DataQualityIssue};
pub use config::{Context, DataConfig, Task, InputPadding, PadPolicy, ReferencePoint};
pub use features::{Feature, FeatureMap};
pub use window::{window_slice, WindowSlice, check_sample, gen_window, last_valid_index};
pub use normalize::{normalize_trajectory, undo_normalize_trajectory, batch_preprocess, NormalizeOptions, Origin, ReferenceFrame};
pub use scalers::{Fitted, Scaler, MinMaxScaler, StandardScaler, SigmoidScaler2D, SparseLabelBinarizer};
pub use pad::PadVector;
pub use dataset::{Flight, Dataset};
pub use batches::{Batches, BatchGenerator, ClassificationGenerator, TrajectoryGenerator};
pub use streaming::{TrajectoryStreamer, Validity, StreamSample};
