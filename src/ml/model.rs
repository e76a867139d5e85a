use anyhow::{bail, Result};
use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig},
        BatchNorm, BatchNormConfig,
        Initializer, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::{leaky_relu, relu, tanh},
};

/// Negative slope of the discriminator's LeakyReLU
const LEAKY_SLOPE: f64 = 0.2;

/// DCGAN weight init: N(0, 0.02) for every convolution
fn dcgan_init() -> Initializer {
    Initializer::Normal { mean: 0.0, std: 0.02 }
}

/// Number of stride-2 blocks between the 4×4 feature map and the final
/// layer: 3 for 64×64 images, 2 for 32×32, etc.
pub fn hidden_depth(image_size: usize) -> Result<usize> {
    if image_size < 16 || !image_size.is_power_of_two() {
        bail!("image size must be a power of two and at least 16, got {image_size}");
    }
    Ok(image_size.trailing_zeros() as usize - 3)
}

// ─── Generator ────────────────────────────────────────────────────────────────

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
#[derive(Config, Debug)]
pub struct GeneratorConfig {
    /// Latent vector size
    pub nz:         usize,
    /// Feature-map width of the last hidden layer
    pub ngf:        usize,
    /// Output image channels
    pub nc:         usize,
    pub image_size: usize,
}

impl GeneratorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Generator<B>> {
        let depth = hidden_depth(self.image_size)?;
        let mut width = self.ngf << depth;

        // nz × 1 × 1 → width × 4 × 4
        let mut blocks = vec![GeneratorBlock {
            conv: ConvTranspose2dConfig::new([self.nz, width], [4, 4])
                .with_bias(false)
                .with_initializer(dcgan_init())
                .init(device),
            norm: BatchNormConfig::new(width).init(device),
        }];

        // Each block doubles the side and halves the width
        for _ in 0..depth {
            blocks.push(GeneratorBlock {
                conv: upsample_conv(width, width / 2, device),
                norm: BatchNormConfig::new(width / 2).init(device),
            });
            width /= 2;
        }

        let output = upsample_conv(self.ngf, self.nc, device);
        Ok(Generator { blocks, output })
    }
}

fn upsample_conv<B: Backend>(from: usize, to: usize, device: &B::Device) -> ConvTranspose2d<B> {
    ConvTranspose2dConfig::new([from, to], [4, 4])
        .with_stride([2, 2])
        .with_padding([1, 1])
        .with_bias(false)
        .with_initializer(dcgan_init())
        .init(device)
}

#[derive(Module, Debug)]
pub struct GeneratorBlock<B: Backend> {
    pub conv: ConvTranspose2d<B>,
    pub norm: BatchNorm<B, 2>,
}

#[derive(Module, Debug)]
pub struct Generator<B: Backend> {
    pub blocks: Vec<GeneratorBlock<B>>,
    pub output: ConvTranspose2d<B>,
}

impl<B: Backend> Generator<B> {
    /// noise: [batch, nz, 1, 1] → images: [batch, nc, size, size] in [-1, 1]
    pub fn forward(&self, noise: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut x = noise;
        for block in &self.blocks {
            x = relu(block.norm.forward(block.conv.forward(x)));
        }
        tanh(self.output.forward(x))
    }
}

// ─── Discriminator ────────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct DiscriminatorConfig {
    /// Feature-map width of the first layer
    pub ndf:        usize,
    /// Input image channels
    pub nc:         usize,
    pub image_size: usize,
}

impl DiscriminatorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Discriminator<B>> {
        let depth = hidden_depth(self.image_size)?;

        // No batch norm on the input layer
        let input = downsample_conv(self.nc, self.ndf, device);

        let mut width = self.ndf;
        let mut blocks = Vec::with_capacity(depth);
        for _ in 0..depth {
            blocks.push(DiscriminatorBlock {
                conv: downsample_conv(width, width * 2, device),
                norm: BatchNormConfig::new(width * 2).init(device),
            });
            width *= 2;
        }

        // width × 4 × 4 → 1 × 1 × 1
        let output = Conv2dConfig::new([width, 1], [4, 4])
            .with_bias(false)
            .with_initializer(dcgan_init())
            .init(device);

        Ok(Discriminator { input, blocks, output })
    }
}

fn downsample_conv<B: Backend>(from: usize, to: usize, device: &B::Device) -> Conv2d<B> {
    Conv2dConfig::new([from, to], [4, 4])
        .with_stride([2, 2])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .with_bias(false)
        .with_initializer(dcgan_init())
        .init(device)
}

#[derive(Module, Debug)]
pub struct DiscriminatorBlock<B: Backend> {
    pub conv: Conv2d<B>,
    pub norm: BatchNorm<B, 2>,
}

#[derive(Module, Debug)]
pub struct Discriminator<B: Backend> {
    pub input:  Conv2d<B>,
    pub blocks: Vec<DiscriminatorBlock<B>>,
    pub output: Conv2d<B>,
}

impl<B: Backend> Discriminator<B> {
    /// images: [batch, nc, size, size] → logits: [batch]
    /// (sigmoid of a logit is the probability the image is real)
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 1> {
        let mut x = leaky_relu(self.input.forward(images), LEAKY_SLOPE);
        for block in &self.blocks {
            x = leaky_relu(block.norm.forward(block.conv.forward(x)), LEAKY_SLOPE);
        }
        self.output.forward(x).flatten::<1>(0, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, tensor::Distribution};

    type TestBackend = NdArray;

    #[test]
    fn test_hidden_depth() {
        assert_eq!(hidden_depth(64).unwrap(), 3);
        assert_eq!(hidden_depth(32).unwrap(), 2);
        assert_eq!(hidden_depth(16).unwrap(), 1);
        assert!(hidden_depth(48).is_err());
        assert!(hidden_depth(8).is_err());
    }

    #[test]
    fn test_classic_64px_shapes() {
        let device = Default::default();
        let g: Generator<TestBackend> = GeneratorConfig::new(100, 8, 3, 64).init(&device).unwrap();
        let d: Discriminator<TestBackend> = DiscriminatorConfig::new(8, 3, 64).init(&device).unwrap();
        assert_eq!(g.blocks.len(), 4);
        assert_eq!(d.blocks.len(), 3);

        let noise = Tensor::<TestBackend, 4>::random([2, 100, 1, 1], Distribution::Normal(0.0, 1.0), &device);
        let fake = g.forward(noise);
        assert_eq!(fake.dims(), [2, 3, 64, 64]);

        let logits = d.forward(fake);
        assert_eq!(logits.dims(), [2]);
    }

    #[test]
    fn test_generator_output_is_bounded() {
        let device = Default::default();
        let g: Generator<TestBackend> = GeneratorConfig::new(16, 4, 1, 32).init(&device).unwrap();
        let noise = Tensor::<TestBackend, 4>::random([3, 16, 1, 1], Distribution::Normal(0.0, 1.0), &device);
        let fake = g.forward(noise);
        assert_eq!(fake.dims(), [3, 1, 32, 32]);

        let values = fake.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_discriminator_32px_grayscale() {
        let device = Default::default();
        let d: Discriminator<TestBackend> = DiscriminatorConfig::new(4, 1, 32).init(&device).unwrap();
        assert_eq!(d.blocks.len(), 2);

        let images = Tensor::<TestBackend, 4>::random([5, 1, 32, 32], Distribution::Normal(0.0, 1.0), &device);
        assert_eq!(d.forward(images).dims(), [5]);
    }

    #[test]
    fn test_invalid_image_size_is_rejected() {
        let device = Default::default();
        let g = GeneratorConfig::new(16, 4, 3, 100).init::<TestBackend>(&device);
        assert!(g.is_err());
    }
}
