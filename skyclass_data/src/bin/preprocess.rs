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

use std::path::{Path,PathBuf};
use anyhow::{Result, anyhow};
use skyclass_common::{define_cli, check_cli, init_tracing};
use skyclass_data::{
    Context, Task, Batches, ClassificationGenerator, TrajectoryGenerator,
    dataset::load_dataset, labels::LabelTable, scalers::save_ron,
};

define_cli! { ARGS [about="preprocess a directory of ADS-B traces into one train and one test epoch"] =
    config: String [help="pathname of the RON data config", short, long],
    labels: Option<String> [help="pathname of the icao24,label CSV file (default: labels.csv next to dataset dir)", short, long],
    output: Option<String> [help="directory where pad vector and fitted scalers are stored", short, long],
    dataset: String [help="directory with per-flight CSV trace files"]
}

fn report (name: &str, b: &Batches) {
    println!("{name:>6}: x {:?}, y {:?}", b.x.shape(), b.y.shape());
}

fn default_labels_path (dataset: &str)->PathBuf {
    Path::new( dataset).parent().unwrap_or( Path::new(".")).join( "labels.csv")
}

fn main()->Result<()> {
    check_cli!(ARGS);
    init_tracing();

    let ctx = Context::from_path( &ARGS.config)?;
    let output = ARGS.output.as_ref().map( PathBuf::from);
    if let Some(dir) = &output { std::fs::create_dir_all( dir)?; }

    match ctx.config.task {
        Task::Classification => {
            let labels_path = ARGS.labels.as_ref().map( PathBuf::from).unwrap_or_else( || default_labels_path( &ARGS.dataset));
            let labels = LabelTable::from_path( &labels_path, &ctx.config.merge_labels)?;
            println!("{} labeled aircraft in {:?}", labels.len(), labels_path);

            let dataset = load_dataset( &ctx, &ARGS.dataset, Some(&labels), None)?;
            println!("loaded {} flights, skipped: {:?}", dataset.report.loaded, dataset.report.skipped);

            let mut generator = ClassificationGenerator::new( ctx, dataset)?;
            report( "train", &generator.gen_epoch_train()?);
            report( "test", &generator.gen_epoch_test()?);
            println!("classes: {:?}", generator.y_scaler.classes_);

            if let Some(dir) = &output {
                save_ron( generator.pad(), dir.join("pad.ron"))?;
                save_ron( &generator.x_scaler, dir.join("x_scaler.ron"))?;
                save_ron( &generator.y_scaler, dir.join("y_scaler.ron"))?;
            }
        }
        Task::Trajectory => {
            let dataset = load_dataset( &ctx, &ARGS.dataset, None, None)?;
            println!("loaded {} flights, skipped: {:?}", dataset.report.loaded, dataset.report.skipped);
            if dataset.flights.is_empty() { return Err( anyhow!("no usable flights in {}", ARGS.dataset)) }

            let mut generator = TrajectoryGenerator::new( ctx, dataset)?;
            report( "train", &generator.gen_epoch_train()?);
            report( "test", &generator.gen_epoch_test()?);

            if let Some(dir) = &output {
                save_ron( generator.pad(), dir.join("pad.ron"))?;
                save_ron( &generator.x_scaler, dir.join("x_scaler.ron"))?;
                save_ron( &generator.y_scaler, dir.join("y_scaler.ron"))?;
            }
        }
    }

    Ok(())
}
