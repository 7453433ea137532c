//! Feed-forward network standing in for the optimizer's genomes.
//!
//! inputs → hidden (tanh) → outputs (sigmoid). Weights are sampled
//! uniformly; the harness never trains them.

use dinorun_core::policy::Policy;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct FeedForward {
    inputs: usize,
    hidden: usize,
    outputs: usize,
    w_ih: Vec<f32>, // hidden × inputs
    b_h: Vec<f32>,
    w_ho: Vec<f32>, // outputs × hidden
    b_o: Vec<f32>,
}

impl FeedForward {
    pub fn random(rng: &mut impl Rng, inputs: usize, hidden: usize, outputs: usize) -> Self {
        let mut sample =
            |n: usize| -> Vec<f32> { (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect() };
        Self {
            inputs,
            hidden,
            outputs,
            w_ih: sample(hidden * inputs),
            b_h: sample(hidden),
            w_ho: sample(outputs * hidden),
            b_o: sample(outputs),
        }
    }

    pub fn weight_count(&self) -> usize {
        self.w_ih.len() + self.b_h.len() + self.w_ho.len() + self.b_o.len()
    }
}

impl Policy for FeedForward {
    fn evaluate(&self, inputs: &[f32]) -> Vec<f32> {
        assert_eq!(inputs.len(), self.inputs, "network expects {} inputs", self.inputs);

        let hidden: Vec<f32> = (0..self.hidden)
            .map(|h| {
                let row = &self.w_ih[h * self.inputs..(h + 1) * self.inputs];
                let sum: f32 = row.iter().zip(inputs).map(|(w, x)| w * x).sum();
                (sum + self.b_h[h]).tanh()
            })
            .collect();

        (0..self.outputs)
            .map(|o| {
                let row = &self.w_ho[o * self.hidden..(o + 1) * self.hidden];
                let sum: f32 = row.iter().zip(&hidden).map(|(w, x)| w * x).sum();
                sigmoid(sum + self.b_o[o])
            })
            .collect()
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_output_shape_and_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let net = FeedForward::random(&mut rng, 5, 8, 3);
        assert_eq!(net.weight_count(), 5 * 8 + 8 + 8 * 3 + 3);

        let out = net.evaluate(&[150.0, 250.0, 900.0, 250.0, 15.0]);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    #[should_panic(expected = "network expects 4 inputs")]
    fn test_wrong_arity_is_fatal() {
        let mut rng = StdRng::seed_from_u64(3);
        FeedForward::random(&mut rng, 4, 2, 1).evaluate(&[1.0; 5]);
    }
}
