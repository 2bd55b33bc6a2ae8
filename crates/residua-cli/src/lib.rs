use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "residua")]
#[command(about = "Residua: protein embeddings from encoder checkpoints", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Report the encoder shape stored in a checkpoint
    Inspect {
        /// Checkpoint file or directory
        checkpoint: String,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Embed protein sequences
    Embed {
        /// Checkpoint file or directory
        checkpoint: String,

        /// Sequences, one per line or FASTA (stdin if omitted or '-')
        #[arg(short, long)]
        input: Option<String>,

        #[arg(short, long, default_value_t = 32)]
        batch_size: usize,

        /// Token budget per sequence, <eos> included
        #[arg(long, default_value_t = 512)]
        max_length: usize,

        /// Emit one vector per residue instead of the pooled mean
        #[arg(long)]
        per_token: bool,

        /// Device: cpu, auto
        #[arg(long, default_value = "cpu")]
        device: String,

        /// Gated MLP activation: swiglu, gelu
        #[arg(long, default_value = "swiglu")]
        mlp_activation: String,

        /// Output format: jsonl, json, raw
        #[arg(short, long, default_value = "jsonl")]
        format: String,
    },
}
