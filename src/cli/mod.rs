// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and hands off to Layer 2.
//
//   dcgan --dataset cifar10 --dataroot ./data [flags]   train
//   dcgan generate --netG out/netG_epoch_24.pth         sample
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, GenerateArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "dcgan",
    version,
    about = "Train a DCGAN on an image dataset, or sample from a trained generator.",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub train: TrainArgs,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Some(Commands::Generate(args)) => run_generate(args),
            None                           => run_train(self.train),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::{TrainConfig, TrainUseCase};

    let cfg = TrainConfig::try_from(args)?;
    tracing::info!("Starting training on dataset '{}'", cfg.dataset);
    let outf = cfg.outf.clone();

    let summary = TrainUseCase::new(cfg).execute()?;

    match summary.last_epoch {
        Some(last) => println!(
            "Training complete: {} epochs, {} iterations. Final epoch Loss_D: {:.4} Loss_G: {:.4}. Output in '{}'.",
            summary.epochs, summary.iterations, last.loss_d, last.loss_g, outf
        ),
        None => println!("Training complete. Output in '{}'.", outf),
    }
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    use crate::application::generate_use_case::GenerateUseCase;

    let out = GenerateUseCase::new(args.into()).execute()?;
    println!("Samples written to '{}'.", out.display());
    Ok(())
}
