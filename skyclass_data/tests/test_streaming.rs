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

use ndarray::Array3;
use skyclass_data::{
    Context, DataConfig, InputPadding, PadVector, SkyclassError, Scaler, MinMaxScaler,
    TrajectoryStreamer, Validity, trace::RawObservation,
};

// run with "cargo test test_streaming -- --nocapture"

fn features (names: &[&str])->Vec<String> { names.iter().map(|s| s.to_string()).collect() }

fn context (padding: InputPadding)->Context {
    let config = DataConfig {
        used_features: features( &["timestamp", "latitude", "longitude", "track"]),
        input_padding: padding,
        history: 8,
        dilation_rate: 2,
        seed: Some(0),
        ..DataConfig::default()
    };
    Context::new( config).unwrap()
}

fn fitted_scaler ()->MinMaxScaler {
    let mut scaler = MinMaxScaler::new();
    scaler.fit( &Array3::from_shape_fn( (2, 4, 4), |(i,_,_)| i as f32)).unwrap();
    scaler
}

/// northbound aircraft, about 2.2km per second
fn obs (icao24: &str, ts: f64, step: f64)->RawObservation {
    RawObservation {
        timestamp: 1000.0 + ts,
        latitude: Some( 43.2 + step * ts),
        longitude: Some( 1.4),
        track: Some( 0.0),
        icao24: icao24.to_string(),
        ..RawObservation::default()
    }
}

fn new_streamer (padding: InputPadding)->TrajectoryStreamer<MinMaxScaler> {
    let ctx = context( padding);
    TrajectoryStreamer::new( ctx, PadVector::zeros(4), fitted_scaler()).unwrap()
}

#[test]
fn test_stream_validity () {
    let mut streamer = new_streamer( InputPadding::Valid);

    let validity: Vec<Validity> = (0..3).map( |i| streamer.stream( &obs( "ABC123", i as f64, 0.02)).unwrap().validity).collect();
    println!("{validity:?}");
    assert_eq!( validity, vec![Validity::Unknown, Validity::Unknown, Validity::Valid]);
    assert!( streamer.is_tracking( "abc123"));

    let sample = streamer.stream( &obs( "ABC123", 3.0, 0.02)).unwrap();
    assert_eq!( sample.x.shape(), &[1, 4, 4]);
    assert_eq!( sample.validity, Validity::Valid);
    assert!( sample.frame.is_some());

    // out of order and duplicate messages are not cached
    let sample = streamer.stream( &obs( "ABC123", 1.0, 0.02)).unwrap();
    assert_eq!( sample.validity, Validity::Invalid);
    let sample = streamer.stream( &obs( "ABC123", 3.0, 0.02)).unwrap();
    assert_eq!( sample.validity, Validity::Invalid);
    assert_eq!( streamer.cached_len( "ABC123"), 4);

    // missing position
    let mut o = obs( "ABC123", 4.0, 0.02);
    o.latitude = None;
    assert_eq!( streamer.stream( &o).unwrap().validity, Validity::Invalid);
    assert_eq!( streamer.cached_len( "ABC123"), 4);
}

#[test]
fn test_stream_ringbuffer () {
    let mut streamer = new_streamer( InputPadding::Valid);
    for i in 0..20 {
        let sample = streamer.stream( &obs( "abc123", i as f64, 0.02)).unwrap();
        assert!( streamer.cached_len( "abc123") <= 8);
    }
    assert_eq!( streamer.cached_len( "abc123"), 8);
    assert_eq!( streamer.len(), 1);
}

#[test]
fn test_stream_stuck_sensor () {
    let mut streamer = new_streamer( InputPadding::Valid);
    let validity: Vec<Validity> = (0..4).map( |i| streamer.stream( &obs( "def456", i as f64, 0.0)).unwrap().validity).collect();
    println!("{validity:?}");
    assert_eq!( validity[3], Validity::Invalid);
}

#[test]
fn test_stream_gap_padding () {
    let mut streamer = new_streamer( InputPadding::Zero);
    streamer.stream( &obs( "abc123", 0.0, 0.02)).unwrap();
    streamer.stream( &obs( "abc123", 1.0, 0.02)).unwrap();
    let sample = streamer.stream( &obs( "abc123", 4.0, 0.02)).unwrap();
    assert_eq!( streamer.cached_len( "abc123"), 5);
    // the gap rows are pad rows at the sentinel position
    assert_eq!( sample.validity, Validity::Invalid);

    let mut streamer = new_streamer( InputPadding::Last);
    streamer.stream( &obs( "abc123", 0.0, 0.02)).unwrap();
    streamer.stream( &obs( "abc123", 1.0, 0.02)).unwrap();
    streamer.stream( &obs( "abc123", 4.0, 0.02)).unwrap();
    assert_eq!( streamer.cached_len( "abc123"), 5);
}

#[test]
fn test_remove_stale () {
    let mut streamer = new_streamer( InputPadding::Valid);
    streamer.stream( &obs( "abc123", 0.0, 0.02)).unwrap();
    streamer.stream( &obs( "def456", 50.0, 0.02)).unwrap();
    assert_eq!( streamer.len(), 2);

    assert_eq!( streamer.remove_stale( 1070.0, 60.0), 1);
    assert!( !streamer.is_tracking( "abc123"));
    assert!( streamer.is_tracking( "def456"));

    assert_eq!( streamer.remove_stale( 2000.0, 60.0), 1);
    assert!( streamer.is_empty());

    // a dropped aircraft starts over
    let sample = streamer.stream( &obs( "abc123", 3000.0, 0.02)).unwrap();
    assert_eq!( sample.validity, Validity::Unknown);
    assert_eq!( streamer.cached_len( "abc123"), 1);

    // an untracked aircraft with an unusable first message gets an empty invalid window
    let mut o = obs( "ghi789", 3000.0, 0.02);
    o.longitude = None;
    let sample = streamer.stream( &o).unwrap();
    assert_eq!( sample.validity, Validity::Invalid);
    assert!( sample.x.iter().all( |v| *v == 0.0));
    assert!( !streamer.is_tracking( "ghi789"));
}

#[test]
fn test_stream_unfitted_scaler () {
    let mut streamer = TrajectoryStreamer::new( context( InputPadding::Valid), PadVector::zeros(4), MinMaxScaler::new()).unwrap();
    let res = streamer.stream( &obs( "abc123", 0.0, 0.02));
    assert!( matches!( res, Err(SkyclassError::NotFitted(_))));

    let res = TrajectoryStreamer::new( context( InputPadding::Valid), PadVector::zeros(3), fitted_scaler());
    assert!( matches!( res, Err(SkyclassError::Shape(_))));
}
