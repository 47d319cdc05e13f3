//! One-hidden-layer MLP (input -> ReLU hidden -> linear output) with manual backprop and Adam.

use rand::Rng;
use serde::{Deserialize, Serialize};

fn relu(x: f32) -> f32 {
    x.max(0.0)
}

fn relu_derivative(x: f32) -> f32 {
    if x > 0.0 { 1.0 } else { 0.0 }
}

/// Network weights. Matrices are row-major: `w1[h * input + i]`, `w2[o * hidden + h]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Net {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub w1: Vec<f32>,
    pub b1: Vec<f32>,
    pub w2: Vec<f32>,
    pub b2: Vec<f32>,
}

/// Intermediate values of one forward pass, kept for backprop.
pub struct ForwardCache {
    pub hidden_pre: Vec<f32>,
    pub hidden: Vec<f32>,
    pub output: Vec<f32>,
}

/// Accumulated gradients, same layout as `Net`.
#[derive(Clone, Debug)]
pub struct Grads {
    pub w1: Vec<f32>,
    pub b1: Vec<f32>,
    pub w2: Vec<f32>,
    pub b2: Vec<f32>,
}

impl Net {
    /// Uniform init in ±1/sqrt(fan_in) for weights and biases.
    pub fn new<R: Rng>(input: usize, hidden: usize, output: usize, rng: &mut R) -> Self {
        let k1 = 1.0 / (input as f32).sqrt();
        let k2 = 1.0 / (hidden as f32).sqrt();
        let mut uniform = |n: usize, k: f32| -> Vec<f32> { (0..n).map(|_| rng.gen_range(-k..k)).collect() };
        Self {
            input_size: input,
            hidden_size: hidden,
            output_size: output,
            w1: uniform(hidden * input, k1),
            b1: uniform(hidden, k1),
            w2: uniform(output * hidden, k2),
            b2: uniform(output, k2),
        }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.input_size, self.hidden_size, self.output_size)
    }

    /// True when every parameter vector has the length its shape implies.
    pub fn is_consistent(&self) -> bool {
        self.w1.len() == self.hidden_size * self.input_size
            && self.b1.len() == self.hidden_size
            && self.w2.len() == self.output_size * self.hidden_size
            && self.b2.len() == self.output_size
    }

    pub fn forward(&self, x: &[f32]) -> Vec<f32> {
        self.forward_cached(x).output
    }

    pub fn forward_cached(&self, x: &[f32]) -> ForwardCache {
        debug_assert_eq!(x.len(), self.input_size);
        let hidden_pre: Vec<f32> = (0..self.hidden_size)
            .map(|h| {
                let row = &self.w1[h * self.input_size..(h + 1) * self.input_size];
                self.b1[h] + row.iter().zip(x).map(|(w, v)| w * v).sum::<f32>()
            })
            .collect();
        let hidden: Vec<f32> = hidden_pre.iter().map(|&v| relu(v)).collect();
        let output = (0..self.output_size)
            .map(|o| {
                let row = &self.w2[o * self.hidden_size..(o + 1) * self.hidden_size];
                self.b2[o] + row.iter().zip(&hidden).map(|(w, v)| w * v).sum::<f32>()
            })
            .collect();
        ForwardCache { hidden_pre, hidden, output }
    }

    pub fn zero_grads(&self) -> Grads {
        Grads {
            w1: vec![0.0; self.w1.len()],
            b1: vec![0.0; self.b1.len()],
            w2: vec![0.0; self.w2.len()],
            b2: vec![0.0; self.b2.len()],
        }
    }

    /// Accumulate dL/dθ into `grads` given dL/d(output) for one sample.
    pub fn backward(&self, x: &[f32], cache: &ForwardCache, d_out: &[f32], grads: &mut Grads) {
        let mut d_hidden = vec![0.0f32; self.hidden_size];
        // output layer
        for (o, &g) in d_out.iter().enumerate() {
            // zero error at this output: nothing to add
            if g == 0.0 {
                continue;
            }
            grads.b2[o] += g;
            let base = o * self.hidden_size;
            for h in 0..self.hidden_size {
                grads.w2[base + h] += g * cache.hidden[h];
                d_hidden[h] += g * self.w2[base + h];
            }
        }
        // hidden layer, gated by the ReLU
        for h in 0..self.hidden_size {
            let g = d_hidden[h] * relu_derivative(cache.hidden_pre[h]);
            if g == 0.0 {
                continue;
            }
            grads.b1[h] += g;
            let base = h * self.input_size;
            for (i, &v) in x.iter().enumerate() {
                grads.w1[base + i] += g * v;
            }
        }
    }

    fn params_mut(&mut self) -> [&mut Vec<f32>; 4] {
        [&mut self.w1, &mut self.b1, &mut self.w2, &mut self.b2]
    }
}

impl Grads {
    fn parts(&self) -> [&Vec<f32>; 4] {
        [&self.w1, &self.b1, &self.w2, &self.b2]
    }

    pub fn l2(&self) -> f32 {
        self.parts().iter().flat_map(|p| p.iter()).map(|g| g * g).sum::<f32>().sqrt()
    }
}

/// Adam optimiser state for one `Net`.
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    t: i32,
    m: Grads,
    v: Grads,
}

impl Adam {
    pub fn new(net: &Net, lr: f32) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            t: 0,
            m: net.zero_grads(),
            v: net.zero_grads(),
        }
    }

    pub fn step(&mut self, net: &mut Net, grads: &Grads) {
        self.t += 1;
        // bias correction for the zero-initialised moments
        let bc1 = 1.0 - self.beta1.powi(self.t);
        let bc2 = 1.0 - self.beta2.powi(self.t);
        let (b1, b2, lr, eps) = (self.beta1, self.beta2, self.lr, self.eps);

        let ms = [&mut self.m.w1, &mut self.m.b1, &mut self.m.w2, &mut self.m.b2];
        let vs = [&mut self.v.w1, &mut self.v.b1, &mut self.v.w2, &mut self.v.b2];
        for (((param, g), m), v) in net.params_mut().into_iter().zip(grads.parts()).zip(ms).zip(vs) {
            for k in 0..param.len() {
                // running mean and uncentred variance of the gradient
                m[k] = b1 * m[k] + (1.0 - b1) * g[k];
                v[k] = b2 * v[k] + (1.0 - b2) * g[k] * g[k];
                let m_hat = m[k] / bc1;
                let v_hat = v[k] / bc2;
                param[k] -= lr * m_hat / (v_hat.sqrt() + eps);
            }
        }
    }
}
