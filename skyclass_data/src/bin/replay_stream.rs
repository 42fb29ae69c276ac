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

use std::fs::File;
use anyhow::Result;
use ndarray::Array3;
use skyclass_common::{define_cli, check_cli, init_tracing};
use skyclass_data::{
    Context, Task, PadVector, Scaler, MinMaxScaler, StandardScaler, TrajectoryStreamer,
    scalers::load_ron, trace::read_observations,
};

define_cli! { ARGS [about="replay an ADS-B trace file message by message through the trajectory streamer"] =
    config: String [help="pathname of the RON data config", short, long],
    pad: Option<String> [help="pathname of the pad vector RON file (default: all zero)", long],
    scaler: String [help="pathname of the fitted input scaler RON file", long],
    drop_after: f64 [help="seconds after which silent aircraft are dropped", long, default_value="60"],
    trace: String [help="CSV trace file to replay"]
}

fn replay<S> (ctx: Context, pad: PadVector, scaler: S)->Result<()> where S: Scaler<Array3<f32>, Output=Array3<f32>> {
    let mut obs = read_observations( File::open( &ARGS.trace)?)?;
    obs.sort_by( |a,b| a.timestamp.total_cmp( &b.timestamp));

    let mut streamer = TrajectoryStreamer::new( ctx, pad, scaler)?;
    for o in &obs {
        let sample = streamer.stream( o)?;
        println!("{:>12} {:>8} {:?}", o.timestamp, o.icao24, sample.validity);
        streamer.remove_stale( o.timestamp, ARGS.drop_after);
    }
    Ok(())
}

fn main()->Result<()> {
    check_cli!(ARGS);
    init_tracing();

    let ctx = Context::from_path( &ARGS.config)?;
    let pad = match &ARGS.pad {
        Some(path) => load_ron( path)?,
        None => PadVector::zeros( ctx.features_in())
    };

    match ctx.config.task {
        Task::Classification => {
            let scaler: MinMaxScaler = load_ron( &ARGS.scaler)?;
            replay( ctx, pad, scaler)
        }
        Task::Trajectory => {
            let scaler: StandardScaler = load_ron( &ARGS.scaler)?;
            replay( ctx, pad, scaler)
        }
    }
}
