use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use ndarray::{Array2, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    MlErr, Result,
    arch::{
        Model, Sequential,
        layers::{BasicLayer, Dense},
    },
};

/// What actually gets written to disk: the layers and the flat parameter buffer. The model is
/// rebuilt from the layers when reading it back.
#[derive(Serialize, Deserialize)]
struct NetworkState {
    layers: Vec<BasicLayer>,
    params: Vec<f64>,
}

/// A finalized feed-forward network: a fixed list of layers and the parameters linking them.
///
/// The activation of the input layer is never applied, and the bias flag of the output layer has
/// no effect since there is no layer after it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkState", into = "NetworkState")]
pub struct Network {
    layers: Vec<BasicLayer>,
    model: Sequential,
    params: Vec<f64>,
}

impl Network {
    /// Finalizes the structure described by `layers` and randomizes its parameters.
    ///
    /// # Errors
    /// `MlErr::NotEnoughLayers` for less than two layers, `MlErr::EmptyLayer` if any layer has no
    /// neurons.
    pub fn new(layers: Vec<BasicLayer>) -> Result<Self> {
        Self::with_rng(layers, &mut rand::rng())
    }

    /// Same as `new` but drawing the initial parameters from `rng`.
    pub fn with_rng<R: Rng>(layers: Vec<BasicLayer>, rng: &mut R) -> Result<Self> {
        let model = Self::finalize(&layers)?;
        let mut network = Self {
            params: vec![0.; model.size()],
            layers,
            model,
        };

        network.reset(rng);
        Ok(network)
    }

    fn finalize(layers: &[BasicLayer]) -> Result<Sequential> {
        if layers.len() < 2 {
            return Err(MlErr::NotEnoughLayers { got: layers.len() });
        }

        if let Some(index) = layers.iter().position(|layer| layer.neurons == 0) {
            return Err(MlErr::EmptyLayer { index });
        }

        let links = layers.windows(2).map(|pair| {
            let (from, to) = (&pair[0], &pair[1]);
            Dense::new((from.neurons, to.neurons), from.bias, Some(to.act_fn))
        });

        Ok(Sequential::new(links))
    }

    /// Draws every parameter uniformly from `[-1, 1)`.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.params
            .iter_mut()
            .for_each(|p| *p = rng.random_range(-1.0..1.0));
    }

    pub fn layers(&self) -> &[BasicLayer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_neuron_count(&self, layer: usize) -> Option<usize> {
        self.layers.get(layer).map(|l| l.neurons)
    }

    pub fn input_count(&self) -> usize {
        self.layers[0].neurons
    }

    pub fn output_count(&self) -> usize {
        self.layers[self.layers.len() - 1].neurons
    }

    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Splits the network into its model and a mutable handle to the parameters, so that a
    /// trainer can update them while reading the model.
    pub fn parts_mut(&mut self) -> (&Sequential, &mut [f64]) {
        (&self.model, &mut self.params)
    }

    /// Computes the output for a single sample.
    pub fn compute(&self, input: &[f64]) -> Result<Vec<f64>> {
        let x = ArrayView2::from_shape((1, input.len()), input).map_err(|_| {
            MlErr::SizeMismatch {
                what: "network input",
                got: input.len(),
                expected: self.input_count(),
            }
        })?;

        Ok(self.compute_batch(x)?.into_iter().collect())
    }

    /// Computes the outputs for a batch of samples, one per row.
    pub fn compute_batch(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.input_count() {
            return Err(MlErr::SizeMismatch {
                what: "network input",
                got: x.ncols(),
                expected: self.input_count(),
            });
        }

        self.model.predict(&self.params, x)
    }

    /// Writes the network as JSON to `path`, replacing any previous content.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a network previously written by `save`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl TryFrom<NetworkState> for Network {
    type Error = MlErr;

    fn try_from(NetworkState { layers, params }: NetworkState) -> Result<Self> {
        let model = Self::finalize(&layers)?;
        if params.len() != model.size() {
            return Err(MlErr::SizeMismatch {
                what: "stored parameters",
                got: params.len(),
                expected: model.size(),
            });
        }

        Ok(Self {
            layers,
            model,
            params,
        })
    }
}

impl From<Network> for NetworkState {
    fn from(Network { layers, params, .. }: Network) -> Self {
        Self { layers, params }
    }
}
