//! CLI entry point for onekey.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::ProviderId;

/// One hotkey: copy, translate, notify.
#[derive(Parser, Debug)]
#[command(name = "onekey", version, about = "Copy, translate and notify with one hotkey")]
pub struct Cli {
    /// Config file (defaults to $ONEKEY_CONFIG or the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy the selection, translate it and show a notification
    Translate,
    /// Run one translation per line read from stdin (bind your hotkey daemon to this)
    Listen,
    /// Send a prompt to a provider and print the reply
    Generate(GenerateArgs),
    /// List providers and their credential status
    Providers,
    /// Select the current provider
    Use { provider: ProviderId },
    /// Store an API key for a provider
    SetKey { provider: ProviderId, key: String },
    /// Store a base URL (endpoint) for a provider
    SetUrl { provider: ProviderId, url: String },
    /// Print the config file location
    ConfigPath,
}

/// Arguments for the `generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Provider to call instead of the current one
    #[arg(short, long)]
    pub provider: Option<ProviderId>,

    /// Model id (defaults to the provider's configured model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Temperature
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Max tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Prompt text
    pub prompt: String,
}
