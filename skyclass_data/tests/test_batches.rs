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

use ndarray::{array, Array1, Array2, Array3, Axis};
use rand::{SeedableRng, rngs::StdRng};
use skyclass_data::{
    Context, DataConfig, Task, PadVector, SkyclassError, DataQualityIssue, Scaler, NormalizeOptions,
    dataset::{Dataset, Flight, LoadReport},
    batches::{add_noise, check_integrity, test_epoch_size},
    ClassificationGenerator, TrajectoryGenerator, BatchGenerator,
};

// run with "cargo test test_batches -- --nocapture"

fn features (names: &[&str])->Vec<String> { names.iter().map(|s| s.to_string()).collect() }

fn config (task: Task, horizon: usize)->DataConfig {
    DataConfig {
        task,
        used_features: features( &["timestamp", "latitude", "longitude", "track"]),
        history: 8,
        dilation_rate: 2,
        horizon,
        nb_batch: 2,
        batch_size: 4,
        test_ratio: 0.5,
        train_window: 2,
        step: 2,
        seed: Some(42),
        ..DataConfig::default()
    }
}

/// northbound flight with one row per second, about 2.2km per row
fn flight_data (n: usize, lon: f32, step: f32)->Array2<f32> {
    Array2::from_shape_fn( (n, 4), |(i,j)| match j {
        0 => i as f32,
        1 => 43.2 + i as f32 * step,
        2 => lon,
        _ => 0.0
    })
}

fn dataset (labels: &[i64], step: f32)->Dataset {
    let flights = labels.iter().enumerate().map( |(i,label)| Flight {
        id: format!("f{i}"),
        icao24: format!("abc00{i}"),
        label: Some(*label),
        data: flight_data( 20, 1.0 + 0.1 * i as f32, step),
    }).collect();
    Dataset { flights, pad: PadVector::zeros(4), report: LoadReport::default() }
}

#[test]
fn test_test_epoch_size () {
    let ctx = Context::new( config( Task::Classification, 0)).unwrap();
    assert_eq!( test_epoch_size( &ctx).unwrap(), (1, 4));

    let ctx = Context::new( DataConfig { nb_batch: 32, batch_size: 128, test_ratio: 0.5, max_batch_size: 1000, ..config( Task::Classification, 0) }).unwrap();
    assert_eq!( test_epoch_size( &ctx).unwrap(), (2, 1000));

    let ctx = Context::new( DataConfig { test_ratio: 0.0, ..config( Task::Classification, 0) }).unwrap();
    assert!( matches!( test_epoch_size( &ctx), Err(SkyclassError::Configuration(_))));
}

#[test]
fn test_classification_epochs () {
    let ctx = Context::new( config( Task::Classification, 0)).unwrap();
    let mut generator = ClassificationGenerator::new( ctx, dataset( &[2, 6, 2, 6], 0.02)).unwrap();
    assert_eq!( generator.features_out(), 2);
    assert_eq!( (generator.train_flights().len(), generator.test_flights().len()), (2, 2));

    let b = generator.gen_epoch_train().unwrap();
    println!("x: {:?}, y: {:?}", b.x.shape(), b.y.shape());
    assert_eq!( b.x.shape(), &[2, 4, 4, 4]);
    assert_eq!( b.y.shape(), &[2, 4, 2]);
    for row in b.y.lanes( Axis(2)) {
        assert_eq!( row.sum(), 1.0);
        assert!( row.iter().all( |v| *v == 0.0 || *v == 1.0));
    }
    assert!( b.x.iter().all( |v| (0.0..=1.0).contains(v)));

    let b = generator.gen_epoch_test().unwrap();
    assert_eq!( b.x.shape(), &[1, 4, 4, 4]);
    assert_eq!( b.y.shape(), &[1, 4, 2]);
}

#[test]
fn test_classification_noise () {
    let ctx = Context::new( DataConfig { training_noise: 0.5, ..config( Task::Classification, 0) }).unwrap();
    let mut generator = ClassificationGenerator::new( ctx, dataset( &[2, 6, 2, 6], 0.02)).unwrap();

    let b = generator.gen_epoch_train().unwrap();
    for row in b.y.lanes( Axis(2)) {
        let max = row.iter().cloned().fold( 0.0f32, f32::max);
        println!("{row}");
        assert!( max > 0.5 && max <= 1.0);
    }
}

#[test]
fn test_add_noise () {
    let mut rng = StdRng::seed_from_u64( 0);
    let mut x = Array2::<f32>::from_elem( (4, 3), 0.5);
    let mut y = array![0.0f32, 1.0];

    add_noise( x.view_mut(), y.view_mut(), 0.0, 0.5, &mut rng).unwrap();
    assert!( x.iter().all( |v| *v == 0.5));
    assert_eq!( y, array![0.0f32, 1.0]);

    let res = add_noise( x.view_mut(), y.view_mut(), 1.5, 0.5, &mut rng);
    assert!( matches!( res, Err(SkyclassError::Configuration(_))));

    add_noise( x.view_mut(), y.view_mut(), 0.2, 0.5, &mut rng).unwrap();
    println!("{x}\n{y}");
    assert!( x.iter().all( |v| (*v - 0.5).abs() < 0.2));
    assert!( y[1] > 0.5 && y[1] <= 1.0);
    assert_eq!( y[0], 0.0);
}

#[test]
fn test_check_integrity () {
    let x = Array3::<f32>::zeros( (2, 2, 2));
    let mut y = Array2::<f32>::zeros( (2, 2));
    assert!( check_integrity( &x, &y).is_ok());

    y[[1,1]] = f32::NAN;
    let res = check_integrity( &x, &y);
    println!("{res:?}");
    assert!( matches!( res, Err(SkyclassError::NumericIntegrity(_))));
}

#[test]
fn test_classification_eval () {
    let ctx = Context::new( config( Task::Classification, 0)).unwrap();
    let mut generator = ClassificationGenerator::new( ctx, dataset( &[2, 6, 2, 6], 0.02)).unwrap();
    let flights = generator.test_flights().to_vec();

    let eval = generator.gen_eval( &flights).unwrap();
    assert_eq!( eval.x.shape(), &[40, 4, 4]);
    assert_eq!( eval.flight_ids.len(), 40);
    assert_eq!( eval.flight_ids[0], "f2");
    assert_eq!( eval.flight_ids[39], "f3");

    // feeding the targets back as predictions recovers the flight labels
    let labels = generator.aggregate_predictions( &eval, &eval.y).unwrap();
    println!("{labels:?}");
    assert_eq!( labels, vec![ ("f2".to_string(), 2), ("f3".to_string(), 6) ]);

    let res = generator.aggregate_predictions( &eval, &Array2::zeros( (3, 2)));
    assert!( matches!( res, Err(SkyclassError::Shape(_))));
}

#[test]
fn test_no_labeled_flights () {
    let ctx = Context::new( config( Task::Classification, 0)).unwrap();
    let mut ds = dataset( &[2, 6], 0.02);
    for f in ds.flights.iter_mut() { f.label = None }
    assert!( matches!( ClassificationGenerator::new( ctx, ds), Err(SkyclassError::Configuration(_))));
}

#[test]
fn test_trajectory_epochs () {
    let ctx = Context::new( config( Task::Trajectory, 2)).unwrap();
    let mut generator = TrajectoryGenerator::new( ctx, dataset( &[0, 0, 0, 0], 0.02)).unwrap();
    assert_eq!( generator.features_out(), 2);

    let b = generator.gen_epoch_train().unwrap();
    println!("x: {:?}, y: {:?}", b.x.shape(), b.y.shape());
    assert_eq!( b.x.shape(), &[2, 4, 4, 4]);
    assert_eq!( b.y.shape(), &[2, 4, 2]);
    assert!( b.y.iter().all( |v| *v > 0.0 && *v < 1.0));

    let b = generator.gen_epoch_test().unwrap();
    assert_eq!( b.x.shape(), &[1, 4, 4, 4]);
    assert!( b.y.iter().all( |v| *v > 0.0 && *v < 1.0));
}

#[test]
fn test_trajectory_positions () {
    let ctx = Context::new( DataConfig { relative_position: true, ..config( Task::Trajectory, 2) }).unwrap();
    let mut generator = TrajectoryGenerator::new( ctx, dataset( &[0, 0, 0, 0], 0.02)).unwrap();
    generator.gen_epoch_train().unwrap(); // fits the scalers

    let flight = flight_data( 20, 1.3, 0.02);
    let opts = NormalizeOptions::inference( generator.context());
    let sample = generator.gen_sample( flight.view(), 8, opts).unwrap();
    let frame = sample.frame.unwrap();
    println!("{:?} -> {:?}", sample.y, frame);

    let y_pred = generator.y_scaler.apply( &Array2::from_shape_vec( (1, 2), sample.y.to_vec()).unwrap()).unwrap();
    let pos = generator.predictions_to_positions( &y_pred, &[frame]).unwrap();
    println!("{pos:?}");
    assert!( (pos[0].0 - flight[[10,1]] as f64).abs() < 1e-3);
    assert!( (pos[0].1 - flight[[10,2]] as f64).abs() < 1e-3);

    assert!( matches!( generator.predictions_to_positions( &y_pred, &[]), Err(SkyclassError::Shape(_))));
}

#[test]
fn test_trajectory_sampling_exhausted () {
    let ctx = Context::new( DataConfig { max_resample_attempts: 20, ..config( Task::Trajectory, 2) }).unwrap();
    let mut generator = TrajectoryGenerator::new( ctx, dataset( &[0, 0, 0, 0], 0.0)).unwrap(); // stuck sensors

    match generator.gen_epoch_train() {
        Err(SkyclassError::DataQuality( DataQualityIssue::SamplingExhausted{ attempts })) => assert_eq!( attempts, 20),
        other => panic!("expected SamplingExhausted, got {other:?}")
    }
}

#[test]
fn test_generator_trait () {
    let ctx = Context::new( config( Task::Classification, 0)).unwrap();
    let mut generators: Vec<Box<dyn BatchGenerator>> = vec![
        Box::new( ClassificationGenerator::new( ctx, dataset( &[2, 6, 2, 6], 0.02)).unwrap()),
        Box::new( TrajectoryGenerator::new( Context::new( config( Task::Trajectory, 2)).unwrap(), dataset( &[0, 0, 0, 0], 0.02)).unwrap()),
    ];
    for generator in generators.iter_mut() {
        assert_eq!( generator.gen_epoch_train().unwrap().nb_batches(), 2);
    }
}
