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

use std::{collections::HashMap, fs, path::PathBuf};
use ndarray::array;
use skyclass_data::{
    Context, DataConfig, Task, InputPadding, PadPolicy, PadVector, SkyclassError, DataQualityIssue,
    labels::LabelTable,
    dataset::{load_dataset, split_dataset},
    trace::{list_flights, read_observations, trace_from_observations},
};

// run with "cargo test test_dataset -- --nocapture"

fn features (names: &[&str])->Vec<String> { names.iter().map(|s| s.to_string()).collect() }

fn is_config_error (config: DataConfig)->bool {
    match Context::new( config) {
        Err(e) => { println!("{e}"); matches!( e, SkyclassError::Configuration(_)) }
        Ok(_) => false
    }
}

#[test]
fn test_config_validation () {
    assert!( Context::new( DataConfig::default()).is_ok());

    assert!( is_config_error( DataConfig { history: 63, dilation_rate: 2, ..DataConfig::default() }));
    assert!( is_config_error( DataConfig { training_noise: 1.5, ..DataConfig::default() }));
    assert!( is_config_error( DataConfig { relative_track: true, random_track: true, ..DataConfig::default() }));
    assert!( is_config_error( DataConfig { task: Task::Trajectory, horizon: 0, ..DataConfig::default() }));
    assert!( is_config_error( DataConfig { used_features: features( &["longitude", "track"]), ..DataConfig::default() }));
    assert!( is_config_error( DataConfig { used_features: features( &["latitude", "longitude", "track", "wingspan"]), ..DataConfig::default() }));
    assert!( is_config_error( DataConfig { used_features: features( &["latitude", "longitude", "track", "track"]), ..DataConfig::default() }));
    assert!( is_config_error( DataConfig { used_features: features( &["latitude", "longitude", "track", "ref_dist_9"]), ..DataConfig::default() }));

    let ctx = Context::new( DataConfig { history: 16, dilation_rate: 4, ..DataConfig::default() }).unwrap();
    assert_eq!( ctx.input_len, 4);
    assert_eq!( ctx.features_in(), 11);
}

#[test]
fn test_config_from_ron () {
    let src = r#"(
        task: Trajectory,
        used_features: ["timestamp", "latitude", "longitude", "track", "ref_dist_1"],
        history: 32,
        dilation_rate: 4,
        horizon: 10,
        input_padding: Last,
    )"#;
    let config: DataConfig = ron::from_str( src).unwrap();
    let ctx = Context::new( config).unwrap();
    println!("{:?}", ctx.feature_map.names());
    assert_eq!( ctx.input_len, 8);
    assert_eq!( ctx.config.input_padding, InputPadding::Last);
    assert_eq!( ctx.feature_map.lat(), 1);
    assert_eq!( ctx.feature_map.timestamp(), Some(0));
    assert_eq!( ctx.config.batch_size, 128); // default
}

#[test]
fn test_labels () {
    let merge = DataConfig::default().merge_labels;
    let csv = "ABC123,3\n4ca7b5,6\nddd000,\nfff111,x\n39ac45,11\n";
    let labels = LabelTable::from_reader( csv.as_bytes(), &merge).unwrap();

    assert_eq!( labels.len(), 3);
    assert_eq!( labels.label_of( "abc123"), Ok(2));
    assert_eq!( labels.label_of( "4CA7B5"), Ok(6));
    assert_eq!( labels.label_of( "ddd000"), Err( DataQualityIssue::Unlabeled{ icao24: "ddd000".to_string() }));

    let keep: [i64; 2] = [2, 6];
    assert_eq!( labels.filtered_label_of( "39ac45", Some(&keep[..])), Err( DataQualityIssue::FilteredLabel{ label: 11 }));
    assert_eq!( labels.filtered_label_of( "39ac45", None), Ok(11));
}

#[test]
fn test_pad_min () {
    let config = DataConfig {
        used_features: features( &["latitude", "longitude", "track", "altitude", "squawk"]),
        pad_policy: PadPolicy::Min,
        ..DataConfig::default()
    };
    let ctx = Context::new( config).unwrap();
    let f1 = array![[43.0f32, 1.0, 90.0, 300.0, f32::NAN], [43.1, 1.1, 80.0, 250.0, f32::NAN]];
    let f2 = array![[44.0f32, 2.0, 10.0, f32::NAN, f32::NAN], [44.1, 2.1, 20.0, 1000.0, f32::NAN]];

    let pad = PadVector::compute( &ctx, &[&f1, &f2]);
    println!("{pad:?}");
    assert_eq!( pad.values, vec![0.0, 0.0, 10.0, 250.0, 0.0]);

    let ctx = Context::new( DataConfig { pad_policy: PadPolicy::Zero, ..ctx.config.clone() }).unwrap();
    assert_eq!( PadVector::compute( &ctx, &[&f1, &f2]), PadVector::zeros( 5));
}

#[test]
fn test_split () {
    let (train, test) = split_dataset( (0..10).collect::<Vec<i32>>(), 0.2);
    assert_eq!( train, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!( test, vec![8, 9]);

    let (train, test) = split_dataset( vec![1, 2, 3], 0.0);
    assert_eq!( (train.len(), test.len()), (3, 0));
}

const HEADER: &str = "timestamp,icao24,latitude,longitude,groundspeed,track,vertical_rate,onground,alert,spi,squawk,altitude,geoaltitude,callsign\n";

fn trace_csv (icao24: &str, n: usize, t0: f64)->String {
    let mut s = HEADER.to_string();
    for i in 0..n {
        let gap = if i == 2 { "" } else { "120.5" }; // one missing groundspeed
        s.push_str( &format!("{},{},{},1.0,{},90.0,0.0,False,False,0,7000,{},{},AFR123\n",
                    t0 + i as f64, icao24, 43.0 + 0.005 * i as f64, gap, 1000.0 + 10.0 * i as f64, 1050.0));
    }
    s
}

fn dataset_dir (name: &str)->PathBuf {
    let dir = std::env::temp_dir().join( name);
    let _ = fs::remove_dir_all( &dir);
    fs::create_dir_all( &dir).unwrap();
    dir
}

#[test]
fn test_read_trace () {
    let obs = read_observations( trace_csv( "ABC123", 3, 1000.0).as_bytes()).unwrap();
    assert_eq!( obs.len(), 3);
    assert_eq!( obs[0].onground, Some(false));
    assert_eq!( obs[0].squawk, Some(7000.0));
    assert!( obs[2].groundspeed.is_none());

    let trace = trace_from_observations( obs).unwrap();
    assert_eq!( trace.icao24, "ABC123");
    assert_eq!( trace.callsign.as_deref(), Some("AFR123"));
    assert_eq!( trace.table.len(), 3);

    assert!( matches!( trace_from_observations( Vec::new()), Err(SkyclassError::DataQuality( DataQualityIssue::EmptyTrace))));
}

#[test]
fn test_load_dataset () {
    let dir = dataset_dir( "skyclass_test_load_dataset");
    fs::write( dir.join( "a.csv"), trace_csv( "ABC123", 10, 1000.0)).unwrap();
    fs::write( dir.join( "b.csv"), trace_csv( "abc123", 2, 2000.0)).unwrap();
    fs::write( dir.join( "c.csv"), trace_csv( "000000", 10, 3000.0)).unwrap();
    fs::write( dir.join( "d.csv"), trace_csv( "39ac45", 10, 4000.0)).unwrap();
    fs::write( dir.join( "notes.txt"), "not a trace").unwrap();

    assert_eq!( list_flights( &dir, None).unwrap().len(), 4);
    assert_eq!( list_flights( &dir, Some(2)).unwrap().len(), 2);

    let config = DataConfig {
        used_features: features( &["timestamp", "latitude", "longitude", "groundspeed", "track"]),
        history: 4,
        dilation_rate: 2,
        label_filter: Some( vec![2, 6, 9]),
        ..DataConfig::default()
    };
    let ctx = Context::new( config).unwrap();
    let labels = LabelTable::from_pairs( [("abc123", 1), ("39AC45", 11)], &ctx.config.merge_labels);

    let ds = load_dataset( &ctx, &dir, Some(&labels), None).unwrap();
    println!("{:?}", ds.report);
    assert_eq!( ds.report.files, 4);
    assert_eq!( ds.report.loaded, 1);
    assert_eq!( ds.report.skipped.get( "too_short"), Some(&1));
    assert_eq!( ds.report.skipped.get( "unlabeled"), Some(&1));
    assert_eq!( ds.report.skipped.get( "filtered_label"), Some(&1));

    let flight = &ds.flights[0];
    assert_eq!( flight.id, "a");
    assert_eq!( flight.label, Some(2));
    assert_eq!( flight.data.dim(), (10, 5));
    assert_eq!( flight.data[[2,3]], 0.0); // missing groundspeed replaced by pad value
    assert!( flight.data.iter().all( |v| !v.is_nan()));

    // inference style load with a given pad vector and no labels
    let ds = load_dataset( &ctx, &dir, None, Some( ds.pad.clone())).unwrap();
    assert_eq!( ds.report.loaded, 3);
    assert!( ds.flights.iter().all( |f| f.label.is_none()));

    let res = load_dataset( &ctx, &dir, None, Some( PadVector::zeros(3)));
    assert!( matches!( res, Err(SkyclassError::Shape(_))));

    let _ = fs::remove_dir_all( &dir);
}
