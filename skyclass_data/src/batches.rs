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

//! epoch generation for training and testing.
//!
//! Classification epochs are balanced by class: a class is drawn uniformly, then a flight of that class,
//! from which `train_window` consecutive windows `step` timesteps apart are taken. Trajectory epochs draw
//! random (flight,timestep) locations that pass the sample check, with the normalized position `horizon`
//! steps ahead as target. Assembled epochs are scanned for NaNs before they are returned

use ndarray::{s, Array, Array2, Array3, Array4, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis, Dimension};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::{debug, error, info, warn};

use crate::config::Context;
use crate::dataset::{Dataset, Flight, split_dataset};
use crate::normalize::{batch_preprocess, NormalizeOptions, ReferenceFrame};
use crate::pad::PadVector;
use crate::scalers::{Fitted, Scaler, MinMaxScaler, StandardScaler, SigmoidScaler2D, SparseLabelBinarizer};
use crate::window::{gen_window, pick_random_loc};
use crate::errors::{Result, SkyclassError, DataQualityIssue, config_error};

/// model input (batch × sample × time × feature) and target (batch × sample × output) tensors
#[derive(Debug,Clone)]
pub struct Batches {
    pub x: Array4<f32>,
    pub y: Array3<f32>,
}

impl Batches {
    #[inline] pub fn nb_batches (&self)->usize { self.x.shape()[0] }
    #[inline] pub fn batch_size (&self)->usize { self.x.shape()[1] }
}

/// sliding windows over complete flights, each window tagged with the id of its flight
#[derive(Debug,Clone)]
pub struct EvalSet {
    pub x: Array3<f32>,
    pub y: Array2<f32>,
    pub flight_ids: Vec<String>,
}

pub trait BatchGenerator {
    fn gen_epoch_train (&mut self)->Result<Batches>;
    fn gen_epoch_test (&mut self)->Result<Batches>;
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
enum Split { Train, Test }

pub fn new_rng (ctx: &Context)->StdRng {
    match ctx.config.seed {
        Some(seed) => StdRng::seed_from_u64( seed),
        None => StdRng::from_os_rng()
    }
}

/// (nb_batches, batch_size) of test epochs: the test share of a training epoch, split into batches
/// of at most `max_batch_size`
pub fn test_epoch_size (ctx: &Context)->Result<(usize,usize)> {
    let c = &ctx.config;
    let size = ((c.nb_batch * c.batch_size) as f64 * c.test_ratio) as usize;
    if size == 0 { return Err( config_error!("test epoch is empty (test_ratio {})", c.test_ratio)) }

    let batch_size = c.max_batch_size.min( size);
    Ok( (size / batch_size, batch_size) )
}

/// add uniform noise of a random strength in [0,noise) to a sample and soften its label accordingly.
/// A noise of 0 is a no-op, values outside of [0,1] are rejected
pub fn add_noise<R: Rng> (mut x: ArrayViewMut2<f32>, mut label: ArrayViewMut1<f32>, noise: f64, noised_label_min: f64, rng: &mut R)->Result<()> {
    if !(0.0..=1.0).contains( &noise) { return Err( config_error!("noise {noise} outside [0,1]")) }
    if noise == 0.0 { return Ok(()) }

    let strength = rng.random_range( 0.0..noise);
    if strength > 0.0 {
        for v in x.iter_mut() {
            *v += rng.random_range( -strength..strength) as f32;
        }
    }

    let factor = (1.0 - strength / noise * (1.0 - noised_label_min)) as f32;
    label.mapv_inplace( |v| v * factor);
    Ok(())
}

/// reject tensors that contain NaN values. These would corrupt model training
pub fn check_integrity<D1: Dimension, D2: Dimension> (x: &Array<f32,D1>, y: &Array<f32,D2>)->Result<()> {
    let nx = x.iter().filter( |v| v.is_nan()).count();
    let ny = y.iter().filter( |v| v.is_nan()).count();
    if nx > 0 || ny > 0 {
        error!("assembled batches contain NaN values (x: {nx}, y: {ny})");
        return Err( SkyclassError::NumericIntegrity( format!("{nx} NaN in inputs, {ny} NaN in targets")))
    }
    Ok(())
}

fn to_batches (x: Array3<f32>, y: Array2<f32>, nb_batches: usize, batch_size: usize)->Result<Batches> {
    let (t, f) = (x.shape()[1], x.shape()[2]);
    let o = y.ncols();
    let n = nb_batches * batch_size;

    let x = x.slice_move( s![..n, .., ..]).into_shape_with_order( (nb_batches, batch_size, t, f))?;
    let y = y.slice_move( s![..n, ..]).into_shape_with_order( (nb_batches, batch_size, o))?;
    check_integrity( &x, &y)?;

    Ok( Batches { x, y } )
}

fn window_at<R: Rng> (ctx: &Context, flight: ArrayView2<f32>, pad: &PadVector, t: usize, opts: NormalizeOptions, rng: &mut R)->Result<Array2<f32>> {
    let mut w = gen_window( ctx, flight, pad, t)?;
    batch_preprocess( ctx, &mut w, pad, opts, rng, None)?;
    Ok(w)
}

/* #region classification *********************************************************************************/

pub struct ClassificationGenerator {
    ctx: Context,
    pad: PadVector,
    train: Vec<Flight>,
    test: Vec<Flight>,
    train_by_class: Vec<Vec<usize>>,
    test_by_class: Vec<Vec<usize>>,
    pub x_scaler: MinMaxScaler,
    pub y_scaler: SparseLabelBinarizer,
    rng: StdRng,
}

fn by_class (flights: &[Flight], y_scaler: &SparseLabelBinarizer)->Vec<Vec<usize>> {
    let mut lists = vec![Vec::new(); y_scaler.n_classes()];
    for (i,f) in flights.iter().enumerate() {
        if let Some(c) = f.label.and_then( |l| y_scaler.class_index(l)) { lists[c].push(i) }
    }
    lists
}

impl ClassificationGenerator {
    pub fn new (ctx: Context, dataset: Dataset)->Result<Self> {
        let rng = new_rng( &ctx);
        ClassificationGenerator::with_rng( ctx, dataset, rng)
    }

    pub fn with_rng (ctx: Context, dataset: Dataset, rng: StdRng)->Result<Self> {
        let Dataset { flights, pad, .. } = dataset;
        pad.check_width( &ctx.feature_map)?;

        let n = flights.len();
        let flights: Vec<Flight> = flights.into_iter().filter( |f| f.label.is_some() && !f.is_empty()).collect();
        if flights.len() < n { warn!("ignoring {} unlabeled or empty flights", n - flights.len()) }
        if flights.is_empty() { return Err( config_error!("no labeled flights")) }

        let labels: Vec<i64> = flights.iter().filter_map( |f| f.label).collect();
        let mut y_scaler = SparseLabelBinarizer::new();
        y_scaler.fit( labels.as_slice())?;

        let (train, test) = split_dataset( flights, ctx.config.test_ratio);
        let train_by_class = by_class( &train, &y_scaler);
        let test_by_class = by_class( &test, &y_scaler);
        info!("{} train and {} test flights, classes {:?}", train.len(), test.len(), y_scaler.classes_);

        Ok( ClassificationGenerator { ctx, pad, train, test, train_by_class, test_by_class, x_scaler: MinMaxScaler::new(), y_scaler, rng } )
    }

    #[inline] pub fn context (&self)->&Context { &self.ctx }
    #[inline] pub fn pad (&self)->&PadVector { &self.pad }
    #[inline] pub fn features_out (&self)->usize { self.y_scaler.n_classes() }
    #[inline] pub fn train_flights (&self)->&[Flight] { &self.train }
    #[inline] pub fn test_flights (&self)->&[Flight] { &self.test }

    /// uniform class, then uniform flight of that class. Classes without flights in the split are not drawn
    fn pick_flight (&mut self, split: Split)->Result<usize> {
        let lists = match split { Split::Train => &self.train_by_class, Split::Test => &self.test_by_class };
        let classes: Vec<usize> = (0..lists.len()).filter( |c| !lists[*c].is_empty()).collect();
        if classes.is_empty() { return Err( DataQualityIssue::SamplingExhausted{ attempts: 0 }.into()) }

        let c = classes[ self.rng.random_range( 0..classes.len())];
        Ok( lists[c][ self.rng.random_range( 0..lists[c].len())] )
    }

    pub fn gen_epoch_train (&mut self)->Result<Batches> {
        let cfg = &self.ctx.config;
        let (nb, bs) = (cfg.nb_batch, cfg.batch_size);
        let (train_window, step, noise) = (cfg.train_window, cfg.step, cfg.training_noise);
        let total = nb * bs;
        let nc = self.y_scaler.n_classes();
        let opts = NormalizeOptions::training( &self.ctx);

        let mut x = Array3::<f32>::zeros( (total, self.ctx.input_len, self.ctx.features_in()));
        let mut y = Array2::<f32>::zeros( (total, nc));

        let mut fragment: Option<(usize,usize,usize)> = None; // (flight, t, remaining windows)
        for n in 0..total {
            let (fi, t, left) = match fragment.take() {
                Some(frag) => frag,
                None => {
                    let fi = self.pick_flight( Split::Train)?;
                    let span = train_window * step;
                    let t0 = self.rng.random_range( 0..self.train[fi].len().saturating_sub( span).max(1));
                    (fi, t0, train_window)
                }
            };

            let flight = &self.train[fi];
            let w = window_at( &self.ctx, flight.data.view(), &self.pad, t.min( flight.len().saturating_sub(1)), opts, &mut self.rng)?;
            x.index_axis_mut( Axis(0), n).assign( &w);
            if let Some(label) = flight.label {
                y.row_mut(n).assign( &ndarray::Array1::from_vec( self.y_scaler.encode( label)));
            }

            if left > 1 { fragment = Some( (fi, t + step, left - 1)) }
        }

        let mut perm: Vec<usize> = (0..total).collect();
        perm.shuffle( &mut self.rng);
        let x = x.select( Axis(0), &perm);
        let mut y = y.select( Axis(0), &perm);

        let mut x = self.x_scaler.transform( &x)?;
        if noise > 0.0 {
            for n in 0..total {
                add_noise( x.index_axis_mut( Axis(0), n), y.row_mut(n), noise, 0.5, &mut self.rng)?;
            }
        }

        debug!("generated classification train epoch of {nb}×{bs}");
        to_batches( x, y, nb, bs)
    }

    pub fn gen_epoch_test (&mut self)->Result<Batches> {
        let (nb, bs) = test_epoch_size( &self.ctx)?;
        let size = nb * bs;
        let nc = self.y_scaler.n_classes();
        let opts = NormalizeOptions::inference( &self.ctx);

        let mut x = Array3::<f32>::zeros( (size, self.ctx.input_len, self.ctx.features_in()));
        let mut y = Array2::<f32>::zeros( (size, nc));

        for n in 0..size {
            let fi = self.pick_flight( Split::Test)?;
            let flight = &self.test[fi];
            let t = self.rng.random_range( 0..flight.len());

            let w = window_at( &self.ctx, flight.data.view(), &self.pad, t, opts, &mut self.rng)?;
            x.index_axis_mut( Axis(0), n).assign( &w);
            if let Some(label) = flight.label {
                y.row_mut(n).assign( &ndarray::Array1::from_vec( self.y_scaler.encode( label)));
            }
        }

        let x = self.x_scaler.transform( &x)?;
        to_batches( x, y, nb, bs)
    }

    /// every window of every labeled flight (left padded at the start of each flight)
    pub fn gen_eval (&mut self, flights: &[Flight])->Result<EvalSet> {
        let opts = NormalizeOptions::inference( &self.ctx);
        let labeled: Vec<&Flight> = flights.iter().filter( |f| f.label.is_some()).collect();
        let total: usize = labeled.iter().map( |f| f.len()).sum();

        let mut x = Array3::<f32>::zeros( (total, self.ctx.input_len, self.ctx.features_in()));
        let mut y = Array2::<f32>::zeros( (total, self.y_scaler.n_classes()));
        let mut flight_ids = Vec::with_capacity( total);

        let mut n = 0;
        for flight in labeled {
            let label = self.y_scaler.encode( flight.label.unwrap_or_default());
            for t in 0..flight.len() {
                let w = window_at( &self.ctx, flight.data.view(), &self.pad, t, opts, &mut self.rng)?;
                x.index_axis_mut( Axis(0), n).assign( &w);
                for (v,l) in y.row_mut(n).iter_mut().zip( label.iter()) { *v = *l }
                flight_ids.push( flight.id.clone());
                n += 1;
            }
        }

        let x = self.x_scaler.transform( &x)?;
        check_integrity( &x, &y)?;
        Ok( EvalSet { x, y, flight_ids } )
    }

    /// per flight label: arg-max of the summed window probabilities
    pub fn aggregate_predictions (&self, eval: &EvalSet, y_pred: &Array2<f32>)->Result<Vec<(String,i64)>> {
        if y_pred.nrows() != eval.flight_ids.len() {
            return Err( SkyclassError::Shape( format!("{} predictions for {} windows", y_pred.nrows(), eval.flight_ids.len())))
        }

        let mut result: Vec<(String,Array2<f32>)> = Vec::new();
        for (i,id) in eval.flight_ids.iter().enumerate() {
            let row = y_pred.slice( s![i..i+1, ..]);
            let same_flight = matches!( result.last(), Some((last_id,_)) if last_id == id);
            match result.last_mut() {
                Some((_, sum)) if same_flight => *sum += &row,
                _ => result.push( (id.clone(), row.to_owned()))
            }
        }

        Ok( result.into_iter()
            .filter_map( |(id,sum)| self.y_scaler.decode( sum.row(0)).map( |label| (id,label)))
            .collect() )
    }
}

impl BatchGenerator for ClassificationGenerator {
    fn gen_epoch_train (&mut self)->Result<Batches> { ClassificationGenerator::gen_epoch_train( self) }
    fn gen_epoch_test (&mut self)->Result<Batches> { ClassificationGenerator::gen_epoch_test( self) }
}

/* #endregion classification */

/* #region trajectory *************************************************************************************/

/// a single regression sample before scaling
#[derive(Debug,Clone)]
pub struct TrajectorySample {
    pub x: Array2<f32>,
    /// normalized (lat,lon) `horizon` steps ahead
    pub y: [f32;2],
    pub frame: Option<ReferenceFrame>,
}

fn sample_at<R: Rng> (ctx: &Context, pad: &PadVector, flight: ArrayView2<f32>, t: usize, opts: NormalizeOptions, rng: &mut R)->Result<TrajectorySample> {
    let fm = &ctx.feature_map;
    let th = t + ctx.config.horizon;
    if th >= flight.nrows() {
        return Err( SkyclassError::Shape( format!("target {th} outside of flight with {} rows", flight.nrows())))
    }

    let mut x = gen_window( ctx, flight, pad, t)?;
    let mut target = flight.slice( s![th..th+1, ..]).to_owned();
    let frame = batch_preprocess( ctx, &mut x, pad, opts, rng, Some(&mut target))?;
    let y = [target[[0, fm.lat()]], target[[0, fm.lon()]]];

    Ok( TrajectorySample { x, y, frame } )
}

pub struct TrajectoryGenerator {
    ctx: Context,
    pad: PadVector,
    train: Vec<Flight>,
    test: Vec<Flight>,
    pub x_scaler: StandardScaler,
    pub y_scaler: SigmoidScaler2D,
    rng: StdRng,
}

impl TrajectoryGenerator {
    pub fn new (ctx: Context, dataset: Dataset)->Result<Self> {
        let rng = new_rng( &ctx);
        TrajectoryGenerator::with_rng( ctx, dataset, rng)
    }

    pub fn with_rng (ctx: Context, dataset: Dataset, rng: StdRng)->Result<Self> {
        if ctx.config.horizon < 1 { return Err( config_error!("trajectory generation requires horizon >= 1")) }
        let Dataset { flights, pad, .. } = dataset;
        pad.check_width( &ctx.feature_map)?;
        if flights.is_empty() { return Err( config_error!("no flights")) }

        let (train, test) = split_dataset( flights, ctx.config.test_ratio);
        info!("{} train and {} test flights", train.len(), test.len());

        Ok( TrajectoryGenerator { ctx, pad, train, test, x_scaler: StandardScaler::new(), y_scaler: SigmoidScaler2D::new(), rng } )
    }

    #[inline] pub fn context (&self)->&Context { &self.ctx }
    #[inline] pub fn pad (&self)->&PadVector { &self.pad }
    #[inline] pub fn features_out (&self)->usize { self.ctx.trajectory_features_out() }

    /// window ending at t of the given flight, normalized together with its target row
    pub fn gen_sample (&mut self, flight: ArrayView2<f32>, t: usize, opts: NormalizeOptions)->Result<TrajectorySample> {
        sample_at( &self.ctx, &self.pad, flight, t, opts, &mut self.rng)
    }

    fn gen_samples (&mut self, split: Split, size: usize, opts: NormalizeOptions)->Result<(Array3<f32>,Array2<f32>)> {
        let mut x = Array3::<f32>::zeros( (size, self.ctx.input_len, self.ctx.features_in()));
        let mut y = Array2::<f32>::zeros( (size, 2));

        let flights = match split { Split::Train => &self.train, Split::Test => &self.test };
        let views: Vec<ArrayView2<f32>> = flights.iter().map( |f| f.data.view()).collect();

        for n in 0..size {
            let (i,t) = pick_random_loc( &self.ctx, &views, &mut self.rng)?;
            let sample = sample_at( &self.ctx, &self.pad, views[i], t, opts, &mut self.rng)?;
            x.index_axis_mut( Axis(0), n).assign( &sample.x);
            y[[n,0]] = sample.y[0];
            y[[n,1]] = sample.y[1];
        }
        Ok( (x,y) )
    }

    pub fn gen_epoch_train (&mut self)->Result<Batches> {
        let (nb, bs) = (self.ctx.config.nb_batch, self.ctx.config.batch_size);
        let opts = NormalizeOptions::training( &self.ctx);

        let (x, y) = self.gen_samples( Split::Train, nb * bs, opts)?;
        let x = self.x_scaler.transform( &x)?;
        let y = self.y_scaler.transform( &y)?;
        to_batches( x, y, nb, bs)
    }

    pub fn gen_epoch_test (&mut self)->Result<Batches> {
        let (nb, bs) = test_epoch_size( &self.ctx)?;
        let opts = NormalizeOptions::inference( &self.ctx);

        let (x, y) = self.gen_samples( Split::Test, nb * bs, opts)?;
        let x = self.x_scaler.transform( &x)?;
        let y = self.y_scaler.transform( &y)?;
        to_batches( x, y, nb, bs)
    }

    /// map scaled model outputs back to geographic (lat,lon) positions, one reference frame per row
    pub fn predictions_to_positions (&self, y_pred: &Array2<f32>, frames: &[ReferenceFrame])->Result<Vec<(f64,f64)>> {
        if y_pred.nrows() != frames.len() {
            return Err( SkyclassError::Shape( format!("{} predictions for {} frames", y_pred.nrows(), frames.len())))
        }
        let y = self.y_scaler.inverse_transform( y_pred)?;
        Ok( y.rows().into_iter().zip( frames.iter())
            .map( |(r,frame)| frame.undo_position( r[0] as f64, r[1] as f64))
            .collect() )
    }
}

impl BatchGenerator for TrajectoryGenerator {
    fn gen_epoch_train (&mut self)->Result<Batches> { TrajectoryGenerator::gen_epoch_train( self) }
    fn gen_epoch_test (&mut self)->Result<Batches> { TrajectoryGenerator::gen_epoch_test( self) }
}

/* #endregion trajectory */
