use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/*
Partitioned FFT Convolution
===========================

Convolving a signal with a 10 second impulse response directly costs
441 000 multiply-adds per output sample. FFT convolution turns that into a
handful of FFTs, but a single FFT over the whole response would make the
output wait 10 seconds. Partitioning splits the difference.

Uniform partitioning (overlap-save):

  1. Cut the impulse response into P partitions of B samples. Zero-pad each
     to 2B and keep its spectrum H[p].

  2. Every B input samples, FFT the last 2B inputs into X and push it onto a
     frequency-domain delay line (newest first).

  3. The output spectrum is  Y = Σ X[p] · H[p]  (spectrum of the input block
     from p blocks ago times partition p).

  4. Inverse FFT Y and keep the last B samples. The first B are circular
     wrap-around and are thrown away.

  Impulse:   [ h0 | h1 | h2 | h3 ]           P = 4 partitions
  Delay line: X0   X1   X2   X3              X0 = current block
  Output:     X0·H0 + X1·H1 + X2·H2 + X3·H3

The output of a block depends only on that block and earlier ones, so a
caller that feeds whole blocks gets the result with no added latency.

Only the first B + 1 bins of each spectrum are stored. The input is real,
so the upper half is the mirrored complex conjugate and is rebuilt just
before the inverse transform.
*/

pub struct Convolver {
    block_size: usize,
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    partitions: Vec<Vec<Complex<f32>>>,
    delay_line: Vec<Vec<Complex<f32>>>,
    newest: usize,
    input_window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    accumulator: Vec<Complex<f32>>,
}

impl Convolver {
    /// Prepare a convolver for `impulse` processing `block_size` samples per
    /// call.
    pub fn new(impulse: &[f32], block_size: usize) -> Self {
        let block_size = block_size.max(1);
        let fft_size = block_size * 2;
        let bins = block_size + 1;

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let ifft = planner.plan_fft_inverse(fft_size);

        let mut scratch = vec![Complex::new(0.0, 0.0); fft_size];
        let partitions: Vec<Vec<Complex<f32>>> = impulse
            .chunks(block_size)
            .map(|chunk| {
                scratch.fill(Complex::new(0.0, 0.0));
                for (slot, &tap) in scratch.iter_mut().zip(chunk) {
                    slot.re = tap;
                }
                fft.process(&mut scratch);
                scratch[..bins].to_vec()
            })
            .collect();

        let delay_line = vec![vec![Complex::new(0.0, 0.0); bins]; partitions.len().max(1)];

        Self {
            block_size,
            fft,
            ifft,
            partitions,
            delay_line,
            newest: 0,
            input_window: vec![0.0; fft_size],
            scratch,
            accumulator: vec![Complex::new(0.0, 0.0); bins],
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Convolve one block. `input` and `output` must both be `block_size`
    /// long; shorter slices are zero-padded and truncated.
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        let b = self.block_size;
        let fft_size = 2 * b;
        let bins = b + 1;

        if self.partitions.is_empty() {
            output.fill(0.0);
            return;
        }

        // Slide the 2B input window by one block.
        self.input_window.copy_within(b.., 0);
        let fresh = &mut self.input_window[b..];
        fresh.fill(0.0);
        let n = input.len().min(b);
        fresh[..n].copy_from_slice(&input[..n]);

        for (slot, &sample) in self.scratch.iter_mut().zip(&self.input_window) {
            *slot = Complex::new(sample, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let slots = self.delay_line.len();
        self.newest = (self.newest + slots - 1) % slots;
        self.delay_line[self.newest].copy_from_slice(&self.scratch[..bins]);

        self.accumulator.fill(Complex::new(0.0, 0.0));
        for (p, partition) in self.partitions.iter().enumerate() {
            let spectrum = &self.delay_line[(self.newest + p) % slots];
            for ((acc, x), h) in self.accumulator.iter_mut().zip(spectrum).zip(partition) {
                *acc += x * h;
            }
        }

        // Rebuild the mirrored upper half before the inverse transform.
        self.scratch[..bins].copy_from_slice(&self.accumulator);
        for k in 1..b {
            self.scratch[fft_size - k] = self.accumulator[k].conj();
        }
        self.ifft.process(&mut self.scratch);

        let norm = 1.0 / fft_size as f32;
        for (out, value) in output.iter_mut().zip(&self.scratch[b..]) {
            *out = value.re * norm;
        }
        if output.len() > b {
            output[b..].fill(0.0);
        }
    }

    pub fn reset(&mut self) {
        for spectrum in &mut self.delay_line {
            spectrum.fill(Complex::new(0.0, 0.0));
        }
        self.input_window.fill(0.0);
        self.newest = 0;
    }
}
