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

use ndarray::{Array2, ArrayView2};
use rand::{SeedableRng, rngs::StdRng};
use skyclass_data::{
    Context, DataConfig, Task, PadVector, SkyclassError, DataQualityIssue,
    window_slice, WindowSlice, check_sample, gen_window, last_valid_index, window::pick_random_loc,
};

// run with "cargo test test_window -- --nocapture"

fn features (names: &[&str])->Vec<String> { names.iter().map(|s| s.to_string()).collect() }

fn context (history: usize, dilation_rate: usize, horizon: usize)->Context {
    let config = DataConfig {
        task: if horizon > 0 { Task::Trajectory } else { Task::Classification },
        used_features: features( &["timestamp", "latitude", "longitude", "track"]),
        history,
        dilation_rate,
        horizon,
        max_resample_attempts: 50,
        ..DataConfig::default()
    };
    Context::new( config).unwrap()
}

/// northbound flight with one row per second, `step` degrees latitude per row
fn flight (n: usize, step: f32)->Array2<f32> {
    Array2::from_shape_fn( (n, 4), |(i,j)| match j {
        0 => i as f32,
        1 => 43.0 + i as f32 * step,
        2 => 1.0,
        _ => 0.0
    })
}

#[test]
fn test_window_slice () {
    let ws = window_slice( 10, 8, 1);
    println!("{ws:?}");
    assert_eq!( ws, WindowSlice { start: 3, end: 11, length: 8, pad_length: 0, shift: 0 });

    let ws = window_slice( 3, 8, 2);
    println!("{ws:?}");
    assert_eq!( (ws.start, ws.end, ws.length, ws.pad_length), (0, 4, 4, 2));
    assert_eq!( ws.shift, 1);
}

#[test]
fn test_window_slice_last_row_aligned () {
    for d in 1..5 {
        let history = 4 * d;
        for t in 0..30 {
            let ws = window_slice( t, history, d);
            let rows: Vec<usize> = ws.rows( d).collect();
            assert_eq!( rows.last(), Some(&t), "t={t} d={d}");
            assert_eq!( ws.pad_length + rows.len(), history / d, "t={t} d={d}");
        }
    }
}

#[test]
fn test_gen_window () {
    let ctx = context( 8, 2, 0);
    let pad = PadVector::zeros( 4);
    let f = flight( 20, 0.02);

    let w = gen_window( &ctx, f.view(), &pad, 3).unwrap();
    println!("{w}");
    assert_eq!( w.shape(), &[4, 4]);
    assert_eq!( w.row(0).to_vec(), vec![0.0; 4]);
    assert_eq!( w.row(1).to_vec(), vec![0.0; 4]);
    assert_eq!( w[[2,0]], 1.0);
    assert_eq!( w[[3,0]], 3.0);

    let w = gen_window( &ctx, f.view(), &pad, 10).unwrap();
    let ts: Vec<f32> = w.column(0).to_vec();
    assert_eq!( ts, vec![4.0, 6.0, 8.0, 10.0]);

    assert!( gen_window( &ctx, f.view(), &pad, 20).is_err());
}

#[test]
fn test_check_sample () {
    let ctx = context( 8, 2, 1);

    let f = flight( 20, 0.02); // ~2.2km per step
    assert!( check_sample( &ctx, f.view(), 5, 1));
    assert!( !check_sample( &ctx, f.view(), 19, 1)); // no target row

    // 300km jump between the last two points
    let mut g = f.clone();
    g[[6,1]] = g[[5,1]] + 2.7;
    assert!( !check_sample( &ctx, g.view(), 5, 1));

    // timestamp gap between t and t+horizon
    let mut g = f.clone();
    g[[6,0]] = 7.0;
    assert!( !check_sample( &ctx, g.view(), 5, 1));

    // pad sentinel at t
    let mut g = f.clone();
    g[[5,1]] = 0.0;
    g[[5,2]] = 0.0;
    assert!( !check_sample( &ctx, g.view(), 5, 1));

    // stuck sensor
    let g = flight( 20, 0.001);
    assert!( !check_sample( &ctx, g.view(), 5, 1));
}

#[test]
fn test_check_sample_without_timestamp () {
    let no_ts = features( &["latitude", "longitude", "track"]);

    let res = Context::new( DataConfig {
        task: Task::Trajectory, horizon: 1, used_features: no_ts.clone(), ..DataConfig::default()
    });
    println!("{res:?}");
    assert!( matches!( res, Err(SkyclassError::Configuration(_))));

    let res = Context::new( DataConfig { task: Task::Trajectory, horizon: 1, ..DataConfig::default() });
    assert!( matches!( res, Err(SkyclassError::Configuration(_))));

    // valid padding keeps gapped rows, 60s between rows 5 and 6 is not visible in the columns
    let ctx = Context::new( DataConfig { history: 8, used_features: no_ts, ..DataConfig::default() }).unwrap();
    let f = Array2::from_shape_fn( (20, 3), |(i,j)| match j {
        0 => 43.0 + i as f32 * 0.02,
        1 => 1.0,
        _ => 0.0
    });
    assert!( !check_sample( &ctx, f.view(), 5, 1));
    assert!( check_sample( &ctx, f.view(), 5, 0));
}

#[test]
fn test_pick_random_loc () {
    let ctx = context( 8, 2, 1);
    let mut rng = StdRng::seed_from_u64( 42);

    let flights = vec![ flight( 30, 0.02), flight( 25, 0.03)];
    let views: Vec<ArrayView2<f32>> = flights.iter().map( |f| f.view()).collect();
    for _ in 0..20 {
        let (i,t) = pick_random_loc( &ctx, &views, &mut rng).unwrap();
        assert!( check_sample( &ctx, views[i], t, 1));
    }

    let stuck = vec![ flight( 30, 0.0)];
    let views: Vec<ArrayView2<f32>> = stuck.iter().map( |f| f.view()).collect();
    match pick_random_loc( &ctx, &views, &mut rng) {
        Err(SkyclassError::DataQuality(DataQualityIssue::SamplingExhausted{attempts})) => assert_eq!( attempts, 50),
        other => panic!("expected exhausted sampling, got {other:?}")
    }
}

#[test]
fn test_last_valid_index () {
    let ctx = context( 8, 2, 0);
    let mut w = flight( 6, 0.02);
    assert_eq!( last_valid_index( &ctx, w.view()), Some(5));

    for i in 4..6 { w[[i,1]] = 0.0; w[[i,2]] = 0.0; }
    assert_eq!( last_valid_index( &ctx, w.view()), Some(3));

    let w = Array2::<f32>::zeros( (4,4));
    assert_eq!( last_valid_index( &ctx, w.view()), None);
}
